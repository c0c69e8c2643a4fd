pub mod fit;
pub mod gravity;
pub mod profiles;
pub mod tiers;

pub use fit::{
    ClientFitScorer, ClientForecast, ClientProfile, ClientTier, FitScore, FitWeights,
    SemanticScorer,
};
pub use gravity::{
    AuthorityGapConfig, BacklinkRatioConfig, BrandDominanceConfig, GravityCalibrator,
    GravityConfig, HeadTermConfig, ProbabilityClamp,
};
pub use profiles::{build_profiles, median, quantile, PercentileProfiles};
pub use tiers::{
    count_giant_brands, extract_domain, OpportunityTier, TierClassifier, TierThresholds,
};
