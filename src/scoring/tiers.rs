use serde::{Deserialize, Serialize};

/// Domains that dominate results pages and are effectively impossible to
/// displace. Matched as substrings of the bare host.
pub const GIANT_DOMAINS: [&str; 16] = [
    "google.com",
    "support.google.com",
    "developers.google.com",
    "wikipedia.org",
    "youtube.com",
    "amazon.com",
    "linkedin.com",
    "facebook.com",
    "instagram.com",
    "hubspot.com",
    "semrush.com",
    "ahrefs.com",
    "moz.com",
    "shopify.com",
    "mailchimp.com",
    "salesforce.com",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OpportunityTier {
    #[serde(rename = "T1_GO_NOW")]
    GoNow,
    #[serde(rename = "T2_STRATEGIC")]
    Strategic,
    #[serde(rename = "T3_LONG_GAME")]
    LongGame,
    #[serde(rename = "T4_NOT_WORTH_IT")]
    NotWorthIt,
}

impl OpportunityTier {
    pub fn label(self) -> &'static str {
        match self {
            OpportunityTier::GoNow => "T1_GO_NOW",
            OpportunityTier::Strategic => "T2_STRATEGIC",
            OpportunityTier::LongGame => "T3_LONG_GAME",
            OpportunityTier::NotWorthIt => "T4_NOT_WORTH_IT",
        }
    }

    fn summary(self) -> &'static str {
        match self {
            OpportunityTier::GoNow => {
                "High-Probability Wins - Your site can credibly break into Top-10 if you build a strong page"
            }
            OpportunityTier::Strategic => {
                "Strategic Targets - Competitive, but achievable with great execution"
            }
            OpportunityTier::LongGame => {
                "Long-Game Plays - Very competitive, require long-term authority growth"
            }
            OpportunityTier::NotWorthIt => {
                "Not Worth It - Dominated by giant brands/head terms, unlikely to crack Top-10"
            }
        }
    }
}

/// Calibrated-percentage cutoffs, closed at the threshold.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TierThresholds {
    pub go_now: f64,
    pub strategic: f64,
    pub long_game: f64,
}

impl Default for TierThresholds {
    fn default() -> Self {
        Self {
            go_now: 20.0,
            strategic: 10.0,
            long_game: 4.0,
        }
    }
}

// Explanation buckets mirror the default gravity ladders; the wording is
// fixed product copy.
const SIGNIFICANT_GAP: f64 = -20.0;
const MODERATE_GAP: f64 = -10.0;
const HEAVY_BRAND_COUNT: usize = 4;
const PRESENT_BRAND_COUNT: usize = 2;
const HEAD_TOKENS: usize = 2;
const MID_TOKENS: usize = 3;

#[derive(Debug, Clone)]
pub struct TierClassifier {
    thresholds: TierThresholds,
}

impl TierClassifier {
    pub fn new(thresholds: TierThresholds) -> Self {
        Self { thresholds }
    }

    pub fn classify(&self, pct: f64) -> OpportunityTier {
        if pct >= self.thresholds.go_now {
            OpportunityTier::GoNow
        } else if pct >= self.thresholds.strategic {
            OpportunityTier::Strategic
        } else if pct >= self.thresholds.long_game {
            OpportunityTier::LongGame
        } else {
            OpportunityTier::NotWorthIt
        }
    }

    /// Deterministic explanation for a tier assignment: ordered risk
    /// reasons plus the fixed per-tier summary sentence. Identical inputs
    /// always produce identical text.
    pub fn explain(
        &self,
        tier: OpportunityTier,
        authority_gap: f64,
        giant_brand_count: usize,
        query: &str,
    ) -> String {
        let mut reasons: Vec<String> = Vec::new();

        if authority_gap < SIGNIFICANT_GAP {
            reasons.push(format!(
                "Significant authority gap (-{} points)",
                authority_gap.abs() as i64
            ));
        } else if authority_gap < MODERATE_GAP {
            reasons.push(format!(
                "Moderate authority gap (-{} points)",
                authority_gap.abs() as i64
            ));
        } else if authority_gap < 0.0 {
            reasons.push(format!(
                "Slight authority gap (-{} points)",
                authority_gap.abs() as i64
            ));
        }

        if giant_brand_count >= HEAVY_BRAND_COUNT {
            reasons.push(format!(
                "Highly dominated by giant brands ({} major brands)",
                giant_brand_count
            ));
        } else if giant_brand_count >= PRESENT_BRAND_COUNT {
            reasons.push(format!(
                "Some giant brand competition ({} major brands)",
                giant_brand_count
            ));
        }

        let tokens = query.split_whitespace().count();
        if tokens <= HEAD_TOKENS {
            reasons.push("Very generic head term (highly competitive)".to_string());
        } else if tokens <= MID_TOKENS {
            reasons.push("Moderately generic term".to_string());
        }

        if reasons.is_empty() {
            reasons.push("Competitive but achievable with strong execution".to_string());
        }

        format!("{}. Factors: {}.", tier.summary(), reasons.join(", "))
    }
}

/// Bare host of a URL: scheme, path, query, userinfo and port stripped,
/// lowercased, leading `www.` removed.
pub fn extract_domain(url: &str) -> Option<String> {
    let trimmed = url.trim();
    let rest = trimmed
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(trimmed);
    let host = rest
        .split(|c| c == '/' || c == '?' || c == '#')
        .next()
        .unwrap_or("");
    let host = host.rsplit('@').next().unwrap_or(host);
    let host = host.split(':').next().unwrap_or(host);
    if host.is_empty() {
        return None;
    }
    let host = host.to_ascii_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host);
    Some(host.to_string())
}

/// How many of the given result URLs belong to giant-brand domains.
pub fn count_giant_brands<'a>(urls: impl IntoIterator<Item = &'a str>) -> usize {
    urls.into_iter()
        .filter_map(extract_domain)
        .filter(|domain| GIANT_DOMAINS.iter().any(|giant| domain.contains(giant)))
        .count()
}
