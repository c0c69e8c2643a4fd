use serde::{Deserialize, Serialize};

/// Discount ladder for the authority gap (own authority minus reference
/// median). Cutoffs are negative gaps in authority points.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorityGapConfig {
    pub near_cutoff: f64,
    pub far_cutoff: f64,
    pub near_factor: f64,
    pub far_factor: f64,
    pub floor_factor: f64,
}

impl Default for AuthorityGapConfig {
    fn default() -> Self {
        Self {
            near_cutoff: -10.0,
            far_cutoff: -20.0,
            near_factor: 0.85,
            far_factor: 0.70,
            floor_factor: 0.50,
        }
    }
}

/// Discount ladder for own-vs-reference referring-domain ratio.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacklinkRatioConfig {
    pub healthy_ratio: f64,
    pub healthy_factor: f64,
    pub thin_ratio: f64,
    pub thin_factor: f64,
    pub sparse_ratio: f64,
    pub sparse_factor: f64,
    pub floor_factor: f64,
}

impl Default for BacklinkRatioConfig {
    fn default() -> Self {
        Self {
            healthy_ratio: 0.5,
            healthy_factor: 0.90,
            thin_ratio: 0.2,
            thin_factor: 0.75,
            sparse_ratio: 0.05,
            sparse_factor: 0.40,
            floor_factor: 0.20,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrandDominanceConfig {
    pub heavy_count: usize,
    pub heavy_factor: f64,
    pub present_count: usize,
    pub present_factor: f64,
}

impl Default for BrandDominanceConfig {
    fn default() -> Self {
        Self {
            heavy_count: 4,
            heavy_factor: 0.40,
            present_count: 2,
            present_factor: 0.70,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeadTermConfig {
    pub head_tokens: usize,
    pub head_factor: f64,
    pub mid_tokens: usize,
    pub mid_factor: f64,
}

impl Default for HeadTermConfig {
    fn default() -> Self {
        Self {
            head_tokens: 2,
            head_factor: 0.50,
            mid_tokens: 3,
            mid_factor: 0.80,
        }
    }
}

/// Hand-tuned competitive-gravity constants. The values encode observed
/// product behavior; tune them here, not in the calibration control flow.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GravityConfig {
    pub authority: AuthorityGapConfig,
    pub backlinks: BacklinkRatioConfig,
    pub brands: BrandDominanceConfig,
    pub head_term: HeadTermConfig,
    pub clamp: ProbabilityClamp,
}

/// The calibrator never reports below `min` (always some chance) nor above
/// `max` (organic ranking is never safe).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbabilityClamp {
    pub min: f64,
    pub max: f64,
}

impl Default for ProbabilityClamp {
    fn default() -> Self {
        Self { min: 0.01, max: 0.50 }
    }
}

/// Applies the four multiplicative risk factors to a raw model probability.
#[derive(Debug, Clone)]
pub struct GravityCalibrator {
    config: GravityConfig,
}

impl GravityCalibrator {
    pub fn new(config: GravityConfig) -> Self {
        Self { config }
    }

    /// Calibrated probability in `[clamp.min, clamp.max]`. A NaN raw
    /// probability yields 0.0 with no factors applied.
    #[allow(clippy::too_many_arguments)]
    pub fn calibrate(
        &self,
        raw_prob: f64,
        ref_authority: f64,
        ref_backlinks: f64,
        own_authority: f64,
        own_backlinks: f64,
        query: &str,
        giant_brand_count: usize,
    ) -> f64 {
        if raw_prob.is_nan() {
            return 0.0;
        }

        let factor = self.authority_factor(own_authority, ref_authority)
            * self.backlink_factor(own_backlinks, ref_backlinks)
            * self.brand_factor(giant_brand_count)
            * self.head_term_factor(query);

        (raw_prob * factor).clamp(self.config.clamp.min, self.config.clamp.max)
    }

    fn authority_factor(&self, own: f64, reference: f64) -> f64 {
        if own.is_nan() || reference.is_nan() {
            return 1.0;
        }
        let ladder = &self.config.authority;
        let gap = own - reference;
        if gap >= 0.0 {
            1.0
        } else if gap > ladder.near_cutoff {
            ladder.near_factor
        } else if gap > ladder.far_cutoff {
            ladder.far_factor
        } else {
            ladder.floor_factor
        }
    }

    fn backlink_factor(&self, own: f64, reference: f64) -> f64 {
        if own.is_nan() || reference.is_nan() || reference <= 0.0 {
            return 1.0;
        }
        let ladder = &self.config.backlinks;
        let ratio = own / reference;
        if ratio >= 1.0 {
            1.0
        } else if ratio >= ladder.healthy_ratio {
            ladder.healthy_factor
        } else if ratio >= ladder.thin_ratio {
            ladder.thin_factor
        } else if ratio >= ladder.sparse_ratio {
            ladder.sparse_factor
        } else {
            ladder.floor_factor
        }
    }

    fn brand_factor(&self, giant_brand_count: usize) -> f64 {
        let brands = &self.config.brands;
        if giant_brand_count >= brands.heavy_count {
            brands.heavy_factor
        } else if giant_brand_count >= brands.present_count {
            brands.present_factor
        } else {
            1.0
        }
    }

    fn head_term_factor(&self, query: &str) -> f64 {
        let head_term = &self.config.head_term;
        let tokens = query.split_whitespace().count();
        if tokens <= head_term.head_tokens {
            head_term.head_factor
        } else if tokens <= head_term.mid_tokens {
            head_term.mid_factor
        } else {
            1.0
        }
    }
}
