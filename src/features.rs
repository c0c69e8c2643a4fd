use serde::{Deserialize, Serialize};

use crate::MetricSet;

/// Model feature names in the order the training pipeline defined them.
/// The classifier's feature-order file is validated against this list at
/// load time; an unknown name there fails the load.
pub const FEATURE_NAMES: [&str; 15] = [
    "dt_gap",
    "dt_ratio",
    "refdoms_gap",
    "refdoms_ratio",
    "wc_gap",
    "wc_ratio",
    "sent_count_gap",
    "awps_gap",
    "flesch_gap",
    "semantic_gap",
    "semantic_ratio",
    "internal_links_gap",
    "schema_total_gap",
    "schema_unique_gap",
    "rich_features_gap",
];

/// The fixed 15-feature input row for the rankability classifier.
///
/// Gap features are `(candidate - reference) / reference`; ratio features
/// are `candidate / reference`. Both degrade to safe defaults instead of
/// NaN/Inf when the reference is unusable, see [`build_features`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub dt_gap: f64,
    pub dt_ratio: f64,
    pub refdoms_gap: f64,
    pub refdoms_ratio: f64,
    pub wc_gap: f64,
    pub wc_ratio: f64,
    pub sent_count_gap: f64,
    pub awps_gap: f64,
    pub flesch_gap: f64,
    pub semantic_gap: f64,
    pub semantic_ratio: f64,
    pub internal_links_gap: f64,
    pub schema_total_gap: f64,
    pub schema_unique_gap: f64,
    pub rich_features_gap: f64,
}

impl FeatureVector {
    /// Look up a feature by its trained name.
    pub fn get(&self, name: &str) -> Option<f64> {
        let value = match name {
            "dt_gap" => self.dt_gap,
            "dt_ratio" => self.dt_ratio,
            "refdoms_gap" => self.refdoms_gap,
            "refdoms_ratio" => self.refdoms_ratio,
            "wc_gap" => self.wc_gap,
            "wc_ratio" => self.wc_ratio,
            "sent_count_gap" => self.sent_count_gap,
            "awps_gap" => self.awps_gap,
            "flesch_gap" => self.flesch_gap,
            "semantic_gap" => self.semantic_gap,
            "semantic_ratio" => self.semantic_ratio,
            "internal_links_gap" => self.internal_links_gap,
            "schema_total_gap" => self.schema_total_gap,
            "schema_unique_gap" => self.schema_unique_gap,
            "rich_features_gap" => self.rich_features_gap,
            _ => return None,
        };
        Some(value)
    }

    pub fn is_known_name(name: &str) -> bool {
        FEATURE_NAMES.contains(&name)
    }
}

/// Build the classifier input row from a candidate page and the reference
/// medians.
///
/// The asymmetry is deliberate and matches the classifier's training data:
/// a ratio with an unusable reference defaults to 1.0 ("on par"), while a
/// gap defaults to 0.0 ("no measurable gap"). Malformed inputs never panic
/// and never leak NaN/Inf into the vector.
pub fn build_features(candidate: &MetricSet, reference: &MetricSet) -> FeatureVector {
    FeatureVector {
        dt_gap: gap(candidate.domain_authority, reference.domain_authority),
        dt_ratio: ratio(candidate.domain_authority, reference.domain_authority),
        refdoms_gap: gap(candidate.referring_domains, reference.referring_domains),
        refdoms_ratio: ratio(candidate.referring_domains, reference.referring_domains),
        wc_gap: gap(candidate.word_count, reference.word_count),
        wc_ratio: ratio(candidate.word_count, reference.word_count),
        sent_count_gap: gap(candidate.sentence_count, reference.sentence_count),
        awps_gap: gap(
            candidate.average_words_per_sentence,
            reference.average_words_per_sentence,
        ),
        flesch_gap: gap(candidate.flesch_reading_ease, reference.flesch_reading_ease),
        semantic_gap: gap(candidate.semantic_topic_score, reference.semantic_topic_score),
        semantic_ratio: ratio(candidate.semantic_topic_score, reference.semantic_topic_score),
        internal_links_gap: gap(candidate.internal_links, reference.internal_links),
        schema_total_gap: gap(candidate.total_schema_types, reference.total_schema_types),
        schema_unique_gap: gap(candidate.unique_schema_types, reference.unique_schema_types),
        rich_features_gap: gap(candidate.rich_result_features, reference.rich_result_features),
    }
}

fn gap(candidate: f64, reference: f64) -> f64 {
    if reference.is_nan() || reference <= 0.0 || candidate.is_nan() {
        return 0.0;
    }
    (candidate - reference) / reference
}

fn ratio(candidate: f64, reference: f64) -> f64 {
    if reference.is_nan() || reference <= 0.0 || candidate.is_nan() {
        return 1.0;
    }
    candidate / reference
}
