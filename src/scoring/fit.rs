use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::round1;

/// Client configuration supplied by the caller: business vertical plus
/// optional core topic keywords.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientProfile {
    pub vertical: String,
    pub vertical_keywords: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitScore {
    pub score: f64,
    pub explanation: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClientTier {
    HighPriority,
    GoodFit,
    Consider,
    LongTerm,
    NotRecommended,
}

impl ClientTier {
    pub fn label(self) -> &'static str {
        match self {
            ClientTier::HighPriority => "HIGH_PRIORITY",
            ClientTier::GoodFit => "GOOD_FIT",
            ClientTier::Consider => "CONSIDER",
            ClientTier::LongTerm => "LONG_TERM",
            ClientTier::NotRecommended => "NOT_RECOMMENDED",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientForecast {
    pub score: f64,
    pub tier: ClientTier,
    pub recommendation: String,
}

/// External embedding-similarity collaborator. Implementations carry their
/// own timeout/retry policy; the scorer falls back to substring matching
/// when a call fails.
pub trait SemanticScorer {
    /// Highest similarity between the keyword and any topic, roughly [0, 1].
    fn max_similarity(&self, keyword: &str, topics: &[String]) -> Result<f64, String>;
}

/// Blend weights for the fit scores and the client forecast.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitWeights {
    pub authority_weight: f64,
    pub backlink_weight: f64,
    pub win_weight: f64,
    pub domain_weight: f64,
    pub intent_weight: f64,
}

impl Default for FitWeights {
    fn default() -> Self {
        Self {
            authority_weight: 0.55,
            backlink_weight: 0.45,
            win_weight: 0.40,
            domain_weight: 0.35,
            intent_weight: 0.25,
        }
    }
}

const KEYWORD_MATCH_BONUS: f64 = 25.0;
const MODIFIER_MATCH_BONUS: f64 = 10.0;
const SIMILARITY_WEIGHT: f64 = 50.0;
const SUBSTRING_FALLBACK_BONUS: f64 = 15.0;

#[derive(Debug, Clone)]
pub struct ClientFitScorer {
    weights: FitWeights,
}

impl ClientFitScorer {
    pub fn new(weights: FitWeights) -> Self {
        Self { weights }
    }

    /// How well the client's authority matches the reference group.
    /// A combined ratio of exactly 1.0 (parity) scores exactly 50.0; above
    /// parity maps into [50, 100] with diminishing returns, below parity
    /// maps linearly into [0, 50).
    pub fn domain_fit(
        &self,
        own_authority: f64,
        own_backlinks: f64,
        ref_authority: f64,
        ref_backlinks: f64,
    ) -> FitScore {
        let authority_ratio = if ref_authority > 0.0 {
            own_authority / ref_authority
        } else {
            1.0
        };
        let backlink_ratio = if ref_backlinks > 0.0 {
            own_backlinks / ref_backlinks
        } else {
            1.0
        };

        let combined = authority_ratio * self.weights.authority_weight
            + backlink_ratio * self.weights.backlink_weight;

        let score = if combined >= 1.0 {
            (50.0 + (combined - 1.0) * 50.0).min(100.0)
        } else {
            (combined * 50.0).max(0.0)
        };

        let explanation = if score >= 80.0 {
            "Strong authority match - your domain can compete with the current Top 10"
        } else if score >= 60.0 {
            "Good authority match - competitive but may need content edge"
        } else if score >= 40.0 {
            "Moderate authority gap - focus on content quality and relevance"
        } else if score >= 20.0 {
            "Significant authority gap - target long-tail or build authority first"
        } else {
            "Large authority gap - this keyword may be out of reach currently"
        };

        FitScore {
            score: round1(score),
            explanation: explanation.to_string(),
        }
    }

    /// How well the keyword matches the client's vertical: fixed pattern
    /// table (first keyword and first modifier match only), plus a semantic
    /// bonus when topic keywords and a similarity collaborator are
    /// available.
    pub fn intent_fit(
        &self,
        keyword: &str,
        vertical: &str,
        vertical_keywords: Option<&[String]>,
        semantic: Option<&dyn SemanticScorer>,
    ) -> FitScore {
        let keyword_lower = keyword.to_lowercase();
        let mut score = 0.0;
        let mut matches: Vec<&str> = Vec::new();

        if let Some(pattern) = vertical_pattern(vertical) {
            if let Some(hit) = pattern
                .keywords
                .iter()
                .find(|term| keyword_lower.contains(**term))
            {
                score += KEYWORD_MATCH_BONUS;
                matches.push(*hit);
            }
            if let Some(hit) = pattern
                .modifiers
                .iter()
                .find(|term| keyword_lower.contains(**term))
            {
                score += MODIFIER_MATCH_BONUS;
                matches.push(*hit);
            }
        }

        if let Some(topics) = vertical_keywords.filter(|topics| !topics.is_empty()) {
            let similarity = semantic.and_then(|scorer| {
                match scorer.max_similarity(keyword, topics) {
                    Ok(value) => Some(value),
                    Err(err) => {
                        warn!(keyword, error = %err, "semantic intent fit failed, using substring fallback");
                        None
                    }
                }
            });

            match similarity {
                Some(value) => score += value * SIMILARITY_WEIGHT,
                None => {
                    let overlaps = topics.iter().any(|topic| {
                        let topic = topic.to_lowercase();
                        topic.contains(&keyword_lower) || keyword_lower.contains(&topic)
                    });
                    if overlaps {
                        score += SUBSTRING_FALLBACK_BONUS;
                    }
                }
            }
        }

        let score = score.min(100.0);

        let mut explanation = if score >= 75.0 {
            format!(
                "Excellent vertical match - keyword directly relates to your {} focus",
                vertical
            )
        } else if score >= 50.0 {
            format!("Good vertical match - keyword is relevant to {}", vertical)
        } else if score >= 25.0 {
            format!("Partial vertical match - some relevance to {}", vertical)
        } else {
            format!(
                "Low vertical match - keyword may be outside your core {} focus",
                vertical
            )
        };

        if !matches.is_empty() {
            let shown: Vec<&str> = matches.iter().take(3).copied().collect();
            explanation.push_str(&format!(" (matched: {})", shown.join(", ")));
        }

        FitScore {
            score: round1(score),
            explanation,
        }
    }

    /// Blend win probability, domain fit and intent fit into one forecast
    /// percentage with an actionable recommendation.
    pub fn client_forecast(
        &self,
        win_prob: f64,
        domain_fit: f64,
        intent_fit: f64,
        difficulty: Option<f64>,
        volume: Option<u64>,
    ) -> ClientForecast {
        let mut forecast = win_prob * 100.0 * self.weights.win_weight
            + domain_fit * self.weights.domain_weight
            + intent_fit * self.weights.intent_weight;

        if let Some(difficulty) = difficulty {
            forecast += (50.0 - difficulty) * 0.1;
        }
        if let Some(volume) = volume {
            if volume > 1000 {
                forecast += (volume as f64 / 2000.0).min(5.0);
            }
        }

        let forecast = forecast.clamp(0.0, 100.0);

        let (tier, base) = if forecast >= 70.0 {
            (
                ClientTier::HighPriority,
                "Strong opportunity - prioritize this keyword for content creation",
            )
        } else if forecast >= 50.0 {
            (
                ClientTier::GoodFit,
                "Good opportunity - include in content strategy with proper optimization",
            )
        } else if forecast >= 35.0 {
            (
                ClientTier::Consider,
                "Moderate opportunity - consider if strategically important or low competition",
            )
        } else if forecast >= 20.0 {
            (
                ClientTier::LongTerm,
                "Challenging opportunity - better suited for long-term authority building",
            )
        } else {
            (
                ClientTier::NotRecommended,
                "Poor fit - focus efforts elsewhere unless strategically critical",
            )
        };

        let mut recommendation = base.to_string();
        if domain_fit < 30.0 && intent_fit >= 60.0 {
            recommendation
                .push_str(". Note: Good topical fit but authority gap - consider link building.");
        } else if intent_fit < 30.0 && domain_fit >= 60.0 {
            recommendation.push_str(
                ". Note: Strong authority but weak topical relevance - ensure content alignment.",
            );
        } else if win_prob < 0.3 && domain_fit >= 50.0 && intent_fit >= 50.0 {
            recommendation.push_str(
                ". Note: Competitive results page - differentiate with a unique content angle.",
            );
        }

        ClientForecast {
            score: round1(forecast),
            tier,
            recommendation,
        }
    }
}

struct VerticalPattern {
    keywords: &'static [&'static str],
    modifiers: &'static [&'static str],
}

/// Keyword/modifier tables per supported vertical. Order matters: the
/// first matching term wins and is echoed in the explanation.
fn vertical_pattern(vertical: &str) -> Option<VerticalPattern> {
    let pattern = match vertical.to_lowercase().as_str() {
        "legal" => VerticalPattern {
            keywords: &[
                "lawyer",
                "attorney",
                "law",
                "legal",
                "court",
                "litigation",
                "lawsuit",
                "divorce",
                "custody",
                "injury",
                "accident",
                "criminal",
                "defense",
                "estate",
                "bankruptcy",
                "immigration",
                "patent",
                "trademark",
                "contract",
            ],
            modifiers: &["firm", "office", "services", "consultation", "representation"],
        },
        "healthcare" => VerticalPattern {
            keywords: &[
                "doctor",
                "hospital",
                "clinic",
                "medical",
                "health",
                "treatment",
                "therapy",
                "surgery",
                "diagnosis",
                "symptoms",
                "disease",
                "condition",
                "care",
                "patient",
                "dental",
                "dentist",
                "orthodontist",
                "physician",
                "specialist",
            ],
            modifiers: &["center", "practice", "services", "treatment", "provider"],
        },
        "ecommerce" => VerticalPattern {
            keywords: &[
                "buy", "shop", "store", "price", "cheap", "discount", "sale", "deal", "product",
                "order", "shipping", "delivery", "review", "best", "top",
            ],
            modifiers: &["online", "free shipping", "wholesale", "retail"],
        },
        "saas" => VerticalPattern {
            keywords: &[
                "software",
                "app",
                "tool",
                "platform",
                "solution",
                "system",
                "api",
                "automation",
                "integration",
                "dashboard",
                "analytics",
                "management",
            ],
            modifiers: &["free", "trial", "pricing", "enterprise", "cloud"],
        },
        "finance" => VerticalPattern {
            keywords: &[
                "loan",
                "mortgage",
                "credit",
                "investment",
                "insurance",
                "bank",
                "finance",
                "tax",
                "accounting",
                "financial",
                "advisor",
                "wealth",
                "retirement",
            ],
            modifiers: &["rates", "calculator", "services", "planning"],
        },
        "real_estate" => VerticalPattern {
            keywords: &[
                "home",
                "house",
                "property",
                "real estate",
                "realtor",
                "agent",
                "buy",
                "sell",
                "rent",
                "apartment",
                "condo",
                "listing",
                "mls",
            ],
            modifiers: &["for sale", "for rent", "near me", "local"],
        },
        "home_services" => VerticalPattern {
            keywords: &[
                "plumber",
                "electrician",
                "hvac",
                "roofing",
                "contractor",
                "repair",
                "install",
                "maintenance",
                "service",
                "cleaning",
                "landscaping",
                "painting",
            ],
            modifiers: &["near me", "local", "emergency", "residential", "commercial"],
        },
        "marketing" => VerticalPattern {
            keywords: &[
                "seo",
                "marketing",
                "advertising",
                "ppc",
                "social media",
                "content",
                "brand",
                "agency",
                "campaign",
                "digital",
                "email",
                "conversion",
            ],
            modifiers: &["services", "strategy", "agency", "consultant"],
        },
        "defense" => VerticalPattern {
            keywords: &[
                "defense",
                "military",
                "aerospace",
                "government",
                "dod",
                "contractor",
                "security",
                "clearance",
                "weapons",
                "systems",
                "tactical",
                "intel",
                "cybersecurity",
                "satellite",
                "missiles",
                "naval",
                "army",
                "air force",
            ],
            modifiers: &["contractor", "supplier", "solutions", "systems", "services"],
        },
        "local_business" => VerticalPattern {
            keywords: &[
                "near me",
                "local",
                "city",
                "town",
                "neighborhood",
                "community",
                "small business",
                "family owned",
                "locally owned",
                "shop local",
            ],
            modifiers: &["near me", "in", "nearby", "around", "closest"],
        },
        "manufacturing" => VerticalPattern {
            keywords: &[
                "manufacturing",
                "factory",
                "production",
                "industrial",
                "fabrication",
                "assembly",
                "machining",
                "cnc",
                "oem",
                "supplier",
                "parts",
                "components",
                "custom",
                "precision",
                "tooling",
                "warehouse",
                "distribution",
            ],
            modifiers: &["company", "services", "solutions", "supplier", "manufacturer"],
        },
        _ => return None,
    };
    Some(pattern)
}
