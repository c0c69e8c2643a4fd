pub mod classifier;
pub mod config;
pub mod error;
pub mod features;
pub mod scoring;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

pub use crate::classifier::{Classifier, ClassifierArtifact, DecisionTree, TreeNode};
pub use crate::config::{ForecastConfig, ModelConfig};
pub use crate::error::ForecastError;
pub use crate::features::{build_features, FeatureVector, FEATURE_NAMES};
pub use crate::scoring::{
    build_profiles, count_giant_brands, extract_domain, ClientFitScorer, ClientForecast,
    ClientProfile, ClientTier, FitScore, FitWeights, GravityCalibrator, GravityConfig,
    OpportunityTier, PercentileProfiles, SemanticScorer, TierClassifier, TierThresholds,
};

/// Scalar content and authority signals for one page, as captured by the
/// content-analysis collaborator. NaN marks a signal that could not be
/// measured; it never escapes into derived outputs.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct MetricSet {
    pub word_count: f64,
    pub sentence_count: f64,
    pub average_words_per_sentence: f64,
    pub flesch_reading_ease: f64,
    pub internal_links: f64,
    pub total_schema_types: f64,
    pub unique_schema_types: f64,
    pub rich_result_features: f64,
    pub semantic_topic_score: f64,
    pub domain_authority: f64,
    pub referring_domains: f64,
}

/// Per-signal medians across the reference group share the MetricSet shape.
pub type ReferenceMedians = MetricSet;

/// One observed ranking result. The URL is used only for giant-brand
/// domain matching.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerpPage {
    pub url: String,
    pub metrics: MetricSet,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastRequest {
    pub keyword: String,
    /// Observed results, best-ranked first. At most the first 10 form the
    /// reference group.
    pub pages: Vec<SerpPage>,
    pub medians: ReferenceMedians,
    pub own_domain: Option<String>,
    pub own_authority: Option<f64>,
    pub own_backlinks: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileForecast {
    pub raw_probability: f64,
    /// Calibrated percentage, 0-100, one decimal.
    pub calibrated_pct: f64,
    pub tier: OpportunityTier,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastResult {
    pub keyword: String,
    pub own_domain: Option<String>,
    pub reference_median_authority: f64,
    pub reference_median_backlinks: f64,
    /// Own authority after the unknown-caller fallback (reference median
    /// stands in when the caller's authority was not supplied).
    pub own_authority: f64,
    pub own_backlinks: f64,
    pub authority_gap: f64,
    pub giant_brand_count: usize,
    /// 25th-percentile content profile.
    pub weak: ProfileForecast,
    /// Median content profile.
    pub median: ProfileForecast,
    /// 75th-percentile content profile.
    pub strong: ProfileForecast,
    /// Explanation for the median profile's tier.
    pub explanation: String,
    /// Set when the reference group was empty; all probabilities are zero.
    pub insufficient_data: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientAssessment {
    pub domain_fit: FitScore,
    pub intent_fit: FitScore,
    pub forecast: ClientForecast,
}

/// The forecast engine: classifier handle plus the calibration, tiering
/// and fit scorers built from one config. Cheap to clone, safe to share
/// across threads; the classifier is loaded exactly once before the engine
/// is constructed.
#[derive(Clone)]
pub struct ForecastEngine {
    classifier: Arc<Classifier>,
    calibrator: GravityCalibrator,
    tiers: TierClassifier,
    fit: ClientFitScorer,
}

impl ForecastEngine {
    pub fn new(classifier: Arc<Classifier>, config: &ForecastConfig) -> Self {
        Self {
            classifier,
            calibrator: GravityCalibrator::new(config.gravity.clone()),
            tiers: TierClassifier::new(config.tiers.clone()),
            fit: ClientFitScorer::new(config.fit.clone()),
        }
    }

    /// Forecast how likely the caller's site is to break into the top 10
    /// for this keyword. An empty reference group yields a marked zero
    /// result rather than an error.
    pub fn forecast(&self, request: &ForecastRequest) -> Result<ForecastResult, ForecastError> {
        let reference: Vec<MetricSet> = request
            .pages
            .iter()
            .take(10)
            .map(|page| page.metrics)
            .collect();

        if reference.is_empty() {
            return Ok(self.empty_result(request));
        }

        let giant_brand_count = count_giant_brands(request.pages.iter().map(|p| p.url.as_str()));

        let median_authority = request.medians.domain_authority;
        let median_backlinks = request.medians.referring_domains;

        // Unknown caller authority: assume parity with the reference median
        // so the forecast answers "could a median-authority site with this
        // content rank". Intentional product behavior.
        let (own_authority, own_backlinks, authority_gap) = match request.own_authority {
            Some(authority) => (
                authority,
                request.own_backlinks.unwrap_or(median_backlinks),
                authority - median_authority,
            ),
            None => (median_authority, median_backlinks, 0.0),
        };

        let profiles = build_profiles(&reference, own_authority, own_backlinks)?;

        let weak = self.score_profile(&profiles.weak, request, own_authority, own_backlinks, giant_brand_count)?;
        let median = self.score_profile(&profiles.median, request, own_authority, own_backlinks, giant_brand_count)?;
        let strong = self.score_profile(&profiles.strong, request, own_authority, own_backlinks, giant_brand_count)?;

        let explanation = self.tiers.explain(
            median.tier,
            authority_gap,
            giant_brand_count,
            &request.keyword,
        );

        debug!(
            keyword = %request.keyword,
            median_pct = median.calibrated_pct,
            tier = median.tier.label(),
            giant_brand_count,
            "forecast complete"
        );

        Ok(ForecastResult {
            keyword: request.keyword.clone(),
            own_domain: request.own_domain.clone(),
            reference_median_authority: median_authority,
            reference_median_backlinks: median_backlinks,
            own_authority,
            own_backlinks,
            authority_gap,
            giant_brand_count,
            weak,
            median,
            strong,
            explanation,
            insufficient_data: false,
        })
    }

    /// Augment a forecast with client-specific fit scores and a blended
    /// recommendation.
    pub fn client_assessment(
        &self,
        result: &ForecastResult,
        client: &ClientProfile,
        semantic: Option<&dyn SemanticScorer>,
        difficulty: Option<f64>,
        volume: Option<u64>,
    ) -> ClientAssessment {
        let domain_fit = self.fit.domain_fit(
            result.own_authority,
            result.own_backlinks,
            result.reference_median_authority,
            result.reference_median_backlinks,
        );
        let intent_fit = self.fit.intent_fit(
            &result.keyword,
            &client.vertical,
            client.vertical_keywords.as_deref(),
            semantic,
        );
        let win_prob = result.median.calibrated_pct / 100.0;
        let forecast = self.fit.client_forecast(
            win_prob,
            domain_fit.score,
            intent_fit.score,
            difficulty,
            volume,
        );

        ClientAssessment {
            domain_fit,
            intent_fit,
            forecast,
        }
    }

    fn score_profile(
        &self,
        profile: &MetricSet,
        request: &ForecastRequest,
        own_authority: f64,
        own_backlinks: f64,
        giant_brand_count: usize,
    ) -> Result<ProfileForecast, ForecastError> {
        let vector = build_features(profile, &request.medians);
        let raw_probability = self.classifier.predict(&vector)?;

        let calibrated = self.calibrator.calibrate(
            raw_probability,
            request.medians.domain_authority,
            request.medians.referring_domains,
            own_authority,
            own_backlinks,
            &request.keyword,
            giant_brand_count,
        );

        let calibrated_pct = round1(calibrated * 100.0);
        Ok(ProfileForecast {
            raw_probability,
            calibrated_pct,
            tier: self.tiers.classify(calibrated_pct),
        })
    }

    fn empty_result(&self, request: &ForecastRequest) -> ForecastResult {
        let zero = ProfileForecast {
            raw_probability: 0.0,
            calibrated_pct: 0.0,
            tier: self.tiers.classify(0.0),
        };

        ForecastResult {
            keyword: request.keyword.clone(),
            own_domain: request.own_domain.clone(),
            reference_median_authority: request.medians.domain_authority,
            reference_median_backlinks: request.medians.referring_domains,
            own_authority: request.own_authority.unwrap_or(request.medians.domain_authority),
            own_backlinks: request.own_backlinks.unwrap_or(request.medians.referring_domains),
            authority_gap: 0.0,
            giant_brand_count: 0,
            weak: zero.clone(),
            median: zero.clone(),
            strong: zero,
            explanation: "No reference results available".to_string(),
            insufficient_data: true,
        }
    }
}

pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

pub fn format_percent(value: f64) -> String {
    format!("{:.1}%", value)
}

pub fn format_float(value: f64, digits: usize) -> String {
    format!("{:.1$}", value, digits)
}
