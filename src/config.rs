use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::scoring::{FitWeights, GravityConfig, TierThresholds};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    pub artifact_path: String,
    pub feature_list_path: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            artifact_path: "model/rank_classifier.json".to_string(),
            feature_list_path: "model/feature_cols.json".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ForecastConfig {
    pub model: ModelConfig,
    pub gravity: GravityConfig,
    pub tiers: TierThresholds,
    pub fit: FitWeights,
}

impl ForecastConfig {
    pub fn load(path: Option<PathBuf>) -> Result<(Self, Option<PathBuf>), String> {
        let config_path = path.or_else(default_config_path);
        let mut config = if let Some(path) = config_path.as_ref() {
            if path.exists() {
                let contents = std::fs::read_to_string(path)
                    .map_err(|err| format!("failed to read config: {}", err))?;
                toml::from_str(&contents)
                    .map_err(|err| format!("failed to parse config: {}", err))?
            } else {
                ForecastConfig::default()
            }
        } else {
            ForecastConfig::default()
        };

        config.apply_env_overrides();
        Ok((config, config_path))
    }

    pub fn write(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|err| format!("failed to create config dir: {}", err))?;
        }
        let payload = toml::to_string_pretty(self)
            .map_err(|err| format!("failed to serialize config: {}", err))?;
        std::fs::write(path, payload).map_err(|err| format!("failed to write config: {}", err))?;
        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(path) = env::var("RANKCAST_MODEL_PATH") {
            if !path.trim().is_empty() {
                self.model.artifact_path = path;
            }
        }
        if let Ok(path) = env::var("RANKCAST_FEATURES_PATH") {
            if !path.trim().is_empty() {
                self.model.feature_list_path = path;
            }
        }
    }
}

fn default_config_path() -> Option<PathBuf> {
    env::var("RANKCAST_CONFIG_PATH")
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(PathBuf::from)
        .or_else(|| Some(PathBuf::from("config/rankcast.toml")))
}
