//! Records returned by the AI insight collaborator

use serde::{Deserialize, Serialize};

/// An account worth following, as suggested by the insight generator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Suggestion {
    /// Handle of the suggested account
    pub username: String,
    /// Display name
    #[serde(alias = "displayName")]
    pub display_name: String,
    /// Why it is suggested
    pub reason: String,
    /// Content category
    pub category: String,
    /// Expected value, 0.0..=1.0
    #[serde(alias = "potentialValue")]
    pub potential_value: f64,
}

impl Suggestion {
    /// The single suggestion used when the generator's reply is unusable
    pub fn fallback() -> Self {
        Self {
            username: String::new(),
            display_name: "Engage with your mutuals".to_string(),
            reason: "Reply to and share posts from people who already follow you back; \
                     they are the most likely to engage."
                .to_string(),
            category: "Lifestyle".to_string(),
            potential_value: 0.5,
        }
    }
}

/// Growth and engagement summary from the insight generator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnalyticsSummary {
    /// Follower growth, percent over the period
    #[serde(alias = "growthRate")]
    pub growth_rate: f64,
    /// Free-form trend label ("rising", "flat", ...)
    #[serde(alias = "engagementTrend")]
    pub engagement_trend: String,
    /// Observations
    #[serde(alias = "topInsights")]
    pub top_insights: Vec<String>,
    /// Suggested actions
    pub recommendations: Vec<String>,
}

impl AnalyticsSummary {
    /// The summary used when the generator's reply is unusable
    pub fn fallback() -> Self {
        Self {
            growth_rate: 0.0,
            engagement_trend: "steady".to_string(),
            top_insights: vec![
                "Not enough data yet to analyze your audience.".to_string(),
            ],
            recommendations: vec!["Keep posting consistently and check back later.".to_string()],
        }
    }
}
