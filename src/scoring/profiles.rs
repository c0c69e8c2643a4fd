use std::cmp::Ordering;

use crate::error::ForecastError;
use crate::MetricSet;

/// Three synthetic candidate profiles anchored to the reference group's
/// content distribution, all carrying the caller's own authority metrics.
#[derive(Debug, Clone)]
pub struct PercentileProfiles {
    /// 25th-percentile content.
    pub weak: MetricSet,
    /// Median content.
    pub median: MetricSet,
    /// 75th-percentile content.
    pub strong: MetricSet,
}

/// Build weak/median/strong profiles from the reference pages' content
/// metrics. Small groups and ties are fine (estimates are just noisier);
/// an empty group is `InsufficientReferenceData`.
pub fn build_profiles(
    reference: &[MetricSet],
    own_authority: f64,
    own_backlinks: f64,
) -> Result<PercentileProfiles, ForecastError> {
    if reference.is_empty() {
        return Err(ForecastError::InsufficientReferenceData);
    }

    Ok(PercentileProfiles {
        weak: profile_at(reference, 0.25, own_authority, own_backlinks),
        median: profile_at(reference, 0.50, own_authority, own_backlinks),
        strong: profile_at(reference, 0.75, own_authority, own_backlinks),
    })
}

fn profile_at(reference: &[MetricSet], q: f64, own_authority: f64, own_backlinks: f64) -> MetricSet {
    MetricSet {
        word_count: metric_quantile(reference, q, |m| m.word_count),
        sentence_count: metric_quantile(reference, q, |m| m.sentence_count),
        average_words_per_sentence: metric_quantile(reference, q, |m| {
            m.average_words_per_sentence
        }),
        flesch_reading_ease: metric_quantile(reference, q, |m| m.flesch_reading_ease),
        internal_links: metric_quantile(reference, q, |m| m.internal_links),
        total_schema_types: metric_quantile(reference, q, |m| m.total_schema_types),
        unique_schema_types: metric_quantile(reference, q, |m| m.unique_schema_types),
        rich_result_features: metric_quantile(reference, q, |m| m.rich_result_features),
        semantic_topic_score: metric_quantile(reference, q, |m| m.semantic_topic_score),
        domain_authority: own_authority,
        referring_domains: own_backlinks,
    }
}

fn metric_quantile(reference: &[MetricSet], q: f64, select: impl Fn(&MetricSet) -> f64) -> f64 {
    let values: Vec<f64> = reference.iter().map(|metrics| select(metrics)).collect();
    quantile(&values, q)
}

/// Quantile with linear interpolation between closest ranks. NaN
/// observations are dropped before ranking; an all-NaN or empty slice
/// yields 0.0.
pub fn quantile(values: &[f64], q: f64) -> f64 {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    if sorted.is_empty() {
        return 0.0;
    }
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

    let position = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    if lower == upper {
        return sorted[lower];
    }
    let weight = position - lower as f64;
    sorted[lower] * (1.0 - weight) + sorted[upper] * weight
}

pub fn median(values: &[f64]) -> f64 {
    quantile(values, 0.5)
}
