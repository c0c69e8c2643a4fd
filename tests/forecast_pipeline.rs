use std::sync::Arc;

use rankcast::scoring::{build_profiles, quantile, GravityCalibrator, GravityConfig};
use rankcast::{
    build_features, count_giant_brands, extract_domain, Classifier, ClassifierArtifact,
    ClientFitScorer, ClientTier, DecisionTree, FitWeights, ForecastConfig, ForecastEngine,
    ForecastError, ForecastRequest, MetricSet, OpportunityTier, SemanticScorer, SerpPage,
    TierClassifier, TierThresholds, TreeNode, FEATURE_NAMES,
};

fn leaf(value: f64) -> TreeNode {
    TreeNode {
        feature: -1,
        threshold: 0.0,
        left: 0,
        right: 0,
        value,
    }
}

fn leaf_artifact(probability: f64) -> ClassifierArtifact {
    ClassifierArtifact {
        version: 1,
        trees: vec![DecisionTree {
            nodes: vec![leaf(probability)],
        }],
    }
}

fn feature_order() -> Vec<String> {
    FEATURE_NAMES.iter().map(|name| name.to_string()).collect()
}

fn engine_with(probability: f64) -> ForecastEngine {
    let classifier = Classifier::from_parts(leaf_artifact(probability), feature_order()).unwrap();
    ForecastEngine::new(Arc::new(classifier), &ForecastConfig::default())
}

fn metrics(authority: f64, backlinks: f64, word_count: f64) -> MetricSet {
    MetricSet {
        word_count,
        sentence_count: 60.0,
        average_words_per_sentence: 20.0,
        flesch_reading_ease: 55.0,
        internal_links: 10.0,
        total_schema_types: 4.0,
        unique_schema_types: 3.0,
        rich_result_features: 2.0,
        semantic_topic_score: 0.7,
        domain_authority: authority,
        referring_domains: backlinks,
    }
}

fn pages(urls: &[&str]) -> Vec<SerpPage> {
    urls.iter()
        .map(|url| SerpPage {
            url: url.to_string(),
            metrics: metrics(50.0, 30.0, 1200.0),
        })
        .collect()
}

fn plain_urls(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| format!("https://example{}.com/post", i))
        .collect()
}

#[test]
fn ratio_and_gap_default_on_unusable_reference() {
    let candidate = metrics(60.0, 30.0, 1200.0);

    let mut reference = metrics(0.0, 0.0, 0.0);
    reference.sentence_count = 0.0;
    reference.semantic_topic_score = f64::NAN;
    let vector = build_features(&candidate, &reference);

    assert!((vector.dt_gap - 0.0).abs() < 1e-9);
    assert!((vector.dt_ratio - 1.0).abs() < 1e-9);
    assert!((vector.wc_gap - 0.0).abs() < 1e-9);
    assert!((vector.wc_ratio - 1.0).abs() < 1e-9);
    assert!((vector.semantic_gap - 0.0).abs() < 1e-9);
    assert!((vector.semantic_ratio - 1.0).abs() < 1e-9);

    let mut negative = metrics(-5.0, -1.0, 1000.0);
    negative.word_count = -1.0;
    let vector = build_features(&candidate, &negative);
    assert!((vector.dt_ratio - 1.0).abs() < 1e-9);
    assert!((vector.wc_gap - 0.0).abs() < 1e-9);
}

#[test]
fn nan_candidate_degrades_to_defaults() {
    let mut candidate = metrics(f64::NAN, 30.0, f64::NAN);
    candidate.semantic_topic_score = f64::NAN;
    let reference = metrics(50.0, 30.0, 1200.0);

    let vector = build_features(&candidate, &reference);

    assert!((vector.dt_gap - 0.0).abs() < 1e-9);
    assert!((vector.dt_ratio - 1.0).abs() < 1e-9);
    assert!((vector.wc_ratio - 1.0).abs() < 1e-9);
    assert!((vector.semantic_gap - 0.0).abs() < 1e-9);

    for name in FEATURE_NAMES {
        let value = vector.get(name).unwrap();
        assert!(value.is_finite(), "{} must be finite", name);
    }
}

#[test]
fn gap_and_ratio_arithmetic() {
    let candidate = metrics(60.0, 45.0, 1800.0);
    let reference = metrics(50.0, 30.0, 1200.0);

    let vector = build_features(&candidate, &reference);

    assert!((vector.dt_gap - 0.2).abs() < 1e-9);
    assert!((vector.dt_ratio - 1.2).abs() < 1e-9);
    assert!((vector.refdoms_gap - 0.5).abs() < 1e-9);
    assert!((vector.refdoms_ratio - 1.5).abs() < 1e-9);
    assert!((vector.wc_gap - 0.5).abs() < 1e-9);
}

#[test]
fn classifier_rejects_unknown_feature_name() {
    let result = Classifier::from_parts(
        leaf_artifact(0.5),
        vec!["dt_gap".to_string(), "page_rank_gap".to_string()],
    );

    match result {
        Err(ForecastError::ModelUnavailable(message)) => {
            assert!(message.contains("page_rank_gap"));
        }
        other => panic!("expected ModelUnavailable, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn classifier_walks_split_trees_in_feature_order() {
    let artifact = ClassifierArtifact {
        version: 1,
        trees: vec![DecisionTree {
            nodes: vec![
                TreeNode {
                    feature: 0,
                    threshold: 0.0,
                    left: 1,
                    right: 2,
                    value: 0.0,
                },
                leaf(0.2),
                leaf(0.8),
            ],
        }],
    };
    let classifier = Classifier::from_parts(artifact, feature_order()).unwrap();

    let ahead = build_features(&metrics(60.0, 30.0, 1200.0), &metrics(50.0, 30.0, 1200.0));
    let behind = build_features(&metrics(40.0, 30.0, 1200.0), &metrics(50.0, 30.0, 1200.0));

    assert!((classifier.predict(&ahead).unwrap() - 0.8).abs() < 1e-9);
    assert!((classifier.predict(&behind).unwrap() - 0.2).abs() < 1e-9);
}

#[test]
fn malformed_tree_is_a_prediction_error() {
    let artifact = ClassifierArtifact {
        version: 1,
        trees: vec![DecisionTree {
            nodes: vec![TreeNode {
                feature: 0,
                threshold: 0.0,
                left: 99,
                right: 99,
                value: 0.0,
            }],
        }],
    };
    let classifier = Classifier::from_parts(artifact, feature_order()).unwrap();
    let vector = build_features(&metrics(60.0, 30.0, 1200.0), &metrics(50.0, 30.0, 1200.0));

    assert!(matches!(
        classifier.predict(&vector),
        Err(ForecastError::Prediction(_))
    ));
}

#[test]
fn classifier_load_round_trip() {
    let dir = std::env::temp_dir().join(format!("rankcast_test_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let artifact_path = dir.join("rank_classifier.json");
    let features_path = dir.join("feature_cols.json");

    std::fs::write(
        &artifact_path,
        serde_json::to_string(&leaf_artifact(0.42)).unwrap(),
    )
    .unwrap();
    std::fs::write(&features_path, serde_json::to_string(&feature_order()).unwrap()).unwrap();

    let classifier = Classifier::load(&artifact_path, &features_path).unwrap();
    let vector = build_features(&metrics(50.0, 30.0, 1200.0), &metrics(50.0, 30.0, 1200.0));
    assert!((classifier.predict(&vector).unwrap() - 0.42).abs() < 1e-9);

    let missing = Classifier::load(&dir.join("absent.json"), &features_path);
    assert!(matches!(missing, Err(ForecastError::ModelUnavailable(_))));

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn quantile_interpolates_between_closest_ranks() {
    let values = [10.0, 20.0, 30.0, 40.0];

    assert!((quantile(&values, 0.25) - 17.5).abs() < 1e-9);
    assert!((quantile(&values, 0.50) - 25.0).abs() < 1e-9);
    assert!((quantile(&values, 0.75) - 32.5).abs() < 1e-9);
    assert!((quantile(&values, 0.0) - 10.0).abs() < 1e-9);
    assert!((quantile(&values, 1.0) - 40.0).abs() < 1e-9);
}

#[test]
fn degenerate_reference_has_no_spread() {
    let reference = vec![
        metrics(50.0, 30.0, 100.0),
        metrics(55.0, 20.0, 100.0),
        metrics(45.0, 40.0, 100.0),
    ];

    let profiles = build_profiles(&reference, 42.0, 120.0).unwrap();

    assert!((profiles.weak.word_count - 100.0).abs() < 1e-9);
    assert!((profiles.median.word_count - 100.0).abs() < 1e-9);
    assert!((profiles.strong.word_count - 100.0).abs() < 1e-9);
    assert!((profiles.weak.domain_authority - 42.0).abs() < 1e-9);
    assert!((profiles.strong.referring_domains - 120.0).abs() < 1e-9);
}

#[test]
fn empty_reference_is_insufficient_data() {
    assert!(matches!(
        build_profiles(&[], 40.0, 100.0),
        Err(ForecastError::InsufficientReferenceData)
    ));
}

#[test]
fn neutral_calibration_clamps_at_half() {
    let calibrator = GravityCalibrator::new(GravityConfig::default());

    let calibrated = calibrator.calibrate(1.0, 50.0, 30.0, 50.0, 30.0, "best crm for small business", 0);
    assert!((calibrated - 0.50).abs() < 1e-9);

    let floor = calibrator.calibrate(1e-4, 50.0, 30.0, 50.0, 30.0, "best crm for small business", 0);
    assert!((floor - 0.01).abs() < 1e-9);
}

#[test]
fn nan_raw_probability_yields_zero() {
    let calibrator = GravityCalibrator::new(GravityConfig::default());
    let calibrated = calibrator.calibrate(f64::NAN, 50.0, 30.0, 20.0, 3.0, "crm", 4);
    assert!((calibrated - 0.0).abs() < 1e-9);
}

#[test]
fn missing_authority_disables_the_gap_factor() {
    let calibrator = GravityCalibrator::new(GravityConfig::default());

    let with_nan = calibrator.calibrate(0.4, f64::NAN, 30.0, 20.0, 30.0, "best crm for small business", 0);
    assert!((with_nan - 0.4).abs() < 1e-9);

    let zero_reference_backlinks =
        calibrator.calibrate(0.4, 50.0, 0.0, 50.0, 0.0, "best crm for small business", 0);
    assert!((zero_reference_backlinks - 0.4).abs() < 1e-9);
}

#[test]
fn widening_authority_gap_never_raises_the_forecast() {
    let calibrator = GravityCalibrator::new(GravityConfig::default());
    let own_authorities = [60.0, 50.0, 45.0, 35.0, 10.0];

    let mut previous = f64::INFINITY;
    for own in own_authorities {
        let calibrated =
            calibrator.calibrate(0.4, 50.0, 30.0, own, 30.0, "best crm for small business", 0);
        assert!(calibrated <= previous + 1e-12);
        previous = calibrated;
    }
}

#[test]
fn tier_boundaries_are_closed_at_threshold() {
    let tiers = TierClassifier::new(TierThresholds::default());

    assert_eq!(tiers.classify(20.0), OpportunityTier::GoNow);
    assert_eq!(tiers.classify(19.9999), OpportunityTier::Strategic);
    assert_eq!(tiers.classify(10.0), OpportunityTier::Strategic);
    assert_eq!(tiers.classify(9.9999), OpportunityTier::LongGame);
    assert_eq!(tiers.classify(4.0), OpportunityTier::LongGame);
    assert_eq!(tiers.classify(3.9999), OpportunityTier::NotWorthIt);
}

#[test]
fn explanation_lists_risk_factors_in_order() {
    let tiers = TierClassifier::new(TierThresholds::default());

    let explanation = tiers.explain(OpportunityTier::NotWorthIt, -30.0, 4, "crm");
    assert!(explanation.contains("Significant authority gap (-30 points)"));
    assert!(explanation.contains("Highly dominated by giant brands (4 major brands)"));
    assert!(explanation.contains("Very generic head term"));
    assert!(explanation.starts_with("Not Worth It"));

    let benign = tiers.explain(OpportunityTier::GoNow, 5.0, 0, "best crm for small business");
    assert!(benign.contains("Competitive but achievable with strong execution"));
}

#[test]
fn giant_brand_counting_matches_bare_hosts() {
    assert_eq!(
        extract_domain("https://www.example.com:8080/path?q=1"),
        Some("example.com".to_string())
    );
    assert_eq!(extract_domain(""), None);

    let urls = [
        "https://www.hubspot.com/blog/crm",
        "http://blog.hubspot.com/tips",
        "https://example.com/guide",
        "https://en.wikipedia.org/wiki/CRM",
    ];
    assert_eq!(count_giant_brands(urls), 3);
}

#[test]
fn domain_fit_parity_is_exactly_fifty() {
    let scorer = ClientFitScorer::new(FitWeights::default());

    let fit = scorer.domain_fit(50.0, 300.0, 50.0, 300.0);
    assert!((fit.score - 50.0).abs() < 1e-9);

    let strong = scorer.domain_fit(100.0, 600.0, 50.0, 300.0);
    assert!((strong.score - 100.0).abs() < 1e-9);
    assert!(strong.explanation.contains("Strong authority match"));

    let weak = scorer.domain_fit(10.0, 30.0, 50.0, 300.0);
    assert!(weak.score < 20.0);
    assert!(weak.explanation.contains("Large authority gap"));
}

struct FixedSimilarity(f64);

impl SemanticScorer for FixedSimilarity {
    fn max_similarity(&self, _keyword: &str, _topics: &[String]) -> Result<f64, String> {
        Ok(self.0)
    }
}

struct OfflineScorer;

impl SemanticScorer for OfflineScorer {
    fn max_similarity(&self, _keyword: &str, _topics: &[String]) -> Result<f64, String> {
        Err("embedding service offline".to_string())
    }
}

#[test]
fn intent_fit_matches_vertical_patterns() {
    let scorer = ClientFitScorer::new(FitWeights::default());

    let fit = scorer.intent_fit("divorce lawyer consultation", "legal", None, None);
    assert!((fit.score - 35.0).abs() < 1e-9);
    assert!(fit.explanation.contains("matched: lawyer, consultation"));

    let none = scorer.intent_fit("chocolate cake recipe", "legal", None, None);
    assert!((none.score - 0.0).abs() < 1e-9);
    assert!(none.explanation.contains("Low vertical match"));
}

#[test]
fn intent_fit_adds_semantic_bonus_with_fallback() {
    let scorer = ClientFitScorer::new(FitWeights::default());
    let topics = vec!["family law".to_string(), "divorce".to_string()];

    let semantic = scorer.intent_fit(
        "divorce lawyer consultation",
        "legal",
        Some(&topics),
        Some(&FixedSimilarity(0.8)),
    );
    assert!((semantic.score - 75.0).abs() < 1e-9);
    assert!(semantic.explanation.contains("Excellent vertical match"));

    let fallback = scorer.intent_fit(
        "divorce lawyer consultation",
        "legal",
        Some(&topics),
        Some(&OfflineScorer),
    );
    assert!((fallback.score - 50.0).abs() < 1e-9);
}

#[test]
fn client_forecast_blends_and_annotates() {
    let scorer = ClientFitScorer::new(FitWeights::default());

    let plain = scorer.client_forecast(0.5, 60.0, 40.0, None, None);
    assert!((plain.score - 51.0).abs() < 1e-9);
    assert_eq!(plain.tier, ClientTier::GoodFit);
    assert!(!plain.recommendation.contains("Note:"));

    let authority_gap = scorer.client_forecast(0.5, 20.0, 70.0, None, None);
    assert!((authority_gap.score - 44.5).abs() < 1e-9);
    assert_eq!(authority_gap.tier, ClientTier::Consider);
    assert!(authority_gap.recommendation.contains("consider link building"));

    let adjusted = scorer.client_forecast(0.5, 50.0, 50.0, Some(30.0), Some(20_000));
    assert!((adjusted.score - 57.0).abs() < 1e-9);

    let low_volume = scorer.client_forecast(0.5, 50.0, 50.0, None, Some(800));
    assert!((low_volume.score - 50.0).abs() < 1e-9);
}

#[test]
fn forecast_scenario_full_parity() {
    // Own metrics match the reference median, no giants, long-tail query:
    // every gravity factor is neutral and the upper clamp applies.
    let engine = engine_with(0.6);
    let urls = plain_urls(10);
    let request = ForecastRequest {
        keyword: "best crm for small business".to_string(),
        pages: pages(&urls.iter().map(String::as_str).collect::<Vec<_>>()),
        medians: metrics(50.0, 30.0, 1200.0),
        own_domain: Some("https://mysite.com".to_string()),
        own_authority: Some(50.0),
        own_backlinks: Some(30.0),
    };

    let result = engine.forecast(&request).unwrap();

    assert!(!result.insufficient_data);
    assert_eq!(result.giant_brand_count, 0);
    assert!((result.authority_gap - 0.0).abs() < 1e-9);
    assert!((result.median.raw_probability - 0.6).abs() < 1e-9);
    assert!((result.median.calibrated_pct - 50.0).abs() < 1e-9);
    assert_eq!(result.median.tier, OpportunityTier::GoNow);
    assert_eq!(result.weak.tier, OpportunityTier::GoNow);
    assert_eq!(result.strong.tier, OpportunityTier::GoNow);
}

#[test]
fn forecast_scenario_stacked_risk() {
    // 30-point authority deficit, 0.1 backlink ratio, three giants, head
    // term: 0.5 * 0.50 * 0.40 * 0.70 * 0.50 = 0.035 -> 3.5%.
    let engine = engine_with(0.5);
    let urls = [
        "https://www.hubspot.com/crm",
        "https://www.semrush.com/crm",
        "https://www.linkedin.com/business",
        "https://example1.com/crm",
        "https://example2.com/crm",
        "https://example3.com/crm",
        "https://example4.com/crm",
        "https://example5.com/crm",
        "https://example6.com/crm",
        "https://example7.com/crm",
    ];
    let request = ForecastRequest {
        keyword: "crm".to_string(),
        pages: pages(&urls),
        medians: metrics(50.0, 30.0, 1200.0),
        own_domain: Some("https://mysite.com".to_string()),
        own_authority: Some(20.0),
        own_backlinks: Some(3.0),
    };

    let result = engine.forecast(&request).unwrap();

    assert_eq!(result.giant_brand_count, 3);
    assert!((result.authority_gap + 30.0).abs() < 1e-9);
    assert!((result.median.calibrated_pct - 3.5).abs() < 1e-9);
    assert_eq!(result.median.tier, OpportunityTier::NotWorthIt);
    assert!(result.explanation.contains("Significant authority gap (-30 points)"));
    assert!(result.explanation.contains("Very generic head term"));
}

#[test]
fn unknown_authority_assumes_reference_parity() {
    let engine = engine_with(0.6);
    let urls = plain_urls(10);
    let request = ForecastRequest {
        keyword: "best crm for small business".to_string(),
        pages: pages(&urls.iter().map(String::as_str).collect::<Vec<_>>()),
        medians: metrics(50.0, 30.0, 1200.0),
        own_domain: None,
        own_authority: None,
        own_backlinks: None,
    };

    let result = engine.forecast(&request).unwrap();

    assert!((result.own_authority - 50.0).abs() < 1e-9);
    assert!((result.own_backlinks - 30.0).abs() < 1e-9);
    assert!((result.authority_gap - 0.0).abs() < 1e-9);
    assert!((result.median.calibrated_pct - 50.0).abs() < 1e-9);
}

#[test]
fn empty_reference_returns_marked_zero_result() {
    let engine = engine_with(0.6);
    let request = ForecastRequest {
        keyword: "best crm for small business".to_string(),
        pages: Vec::new(),
        medians: metrics(50.0, 30.0, 1200.0),
        own_domain: None,
        own_authority: None,
        own_backlinks: None,
    };

    let result = engine.forecast(&request).unwrap();

    assert!(result.insufficient_data);
    assert!((result.median.calibrated_pct - 0.0).abs() < 1e-9);
    assert_eq!(result.median.tier, OpportunityTier::NotWorthIt);
    assert_eq!(result.explanation, "No reference results available");
}

#[test]
fn client_assessment_uses_the_median_forecast() {
    let engine = engine_with(0.6);
    let urls = plain_urls(10);
    let request = ForecastRequest {
        keyword: "divorce lawyer consultation".to_string(),
        pages: pages(&urls.iter().map(String::as_str).collect::<Vec<_>>()),
        medians: metrics(50.0, 30.0, 1200.0),
        own_domain: Some("https://mysite.com".to_string()),
        own_authority: Some(50.0),
        own_backlinks: Some(30.0),
    };
    let result = engine.forecast(&request).unwrap();

    let client = rankcast::ClientProfile {
        vertical: "legal".to_string(),
        vertical_keywords: None,
    };
    let assessment = engine.client_assessment(&result, &client, None, None, None);

    // Median pct is 50.0 (neutral factors, clamp); domain fit parity is
    // 50.0; intent fit is 35.0 (keyword + modifier match).
    assert!((assessment.domain_fit.score - 50.0).abs() < 1e-9);
    assert!((assessment.intent_fit.score - 35.0).abs() < 1e-9);
    assert!((assessment.forecast.score - 46.3).abs() < 1e-9);
    assert_eq!(assessment.forecast.tier, ClientTier::Consider);
}

#[test]
fn default_config_carries_the_tuned_constants() {
    let config = ForecastConfig::default();

    assert!((config.gravity.authority.near_factor - 0.85).abs() < 1e-9);
    assert!((config.gravity.backlinks.sparse_factor - 0.40).abs() < 1e-9);
    assert!((config.gravity.clamp.min - 0.01).abs() < 1e-9);
    assert!((config.gravity.clamp.max - 0.50).abs() < 1e-9);
    assert!((config.tiers.go_now - 20.0).abs() < 1e-9);
    assert!((config.fit.authority_weight - 0.55).abs() < 1e-9);
}

#[test]
fn config_round_trips_through_toml() {
    let config = ForecastConfig::default();
    let payload = toml::to_string_pretty(&config).unwrap();
    let parsed: ForecastConfig = toml::from_str(&payload).unwrap();

    assert!((parsed.gravity.head_term.head_factor - 0.50).abs() < 1e-9);
    assert_eq!(parsed.model.artifact_path, config.model.artifact_path);
}
