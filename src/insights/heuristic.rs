//! Offline insight provider built from simple audience rules

use serde_json::json;

use crate::error::Result;

use super::{InsightProvider, RelationshipSummary};

/// Growth (percent) above which the trend is reported as rising
const RISING_GROWTH: f64 = 5.0;

/// Rule-based provider used when no generator service is configured.
///
/// Replies in the same JSON shapes a remote generator would, so they go
/// through the same strict parsing.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicInsightProvider;

impl HeuristicInsightProvider {
    fn growth_rate(summary: &RelationshipSummary) -> f64 {
        let established = summary.total_followers.saturating_sub(summary.recent_followers);
        if established == 0 {
            return if summary.recent_followers > 0 { 100.0 } else { 0.0 };
        }
        let rate = summary.recent_followers as f64 / established as f64 * 100.0;
        (rate * 10.0).round() / 10.0
    }
}

impl InsightProvider for HeuristicInsightProvider {
    async fn analytics(&self, summary: &RelationshipSummary) -> Result<String> {
        let growth_rate = Self::growth_rate(summary);
        let trend = if growth_rate > RISING_GROWTH {
            "rising"
        } else if summary.recent_followers == 0 && summary.total_followers > 0 {
            "flat"
        } else {
            "steady"
        };

        let mut insights = vec![format!(
            "{:.0}% of your followers are mutuals.",
            summary.mutual_ratio * 100.0
        )];
        if let Some(top) = summary.top_categories.first() {
            insights.push(format!(
                "{} is your largest audience ({} followers).",
                top.category, top.count
            ));
        }
        if summary.not_following_back_count > 0 {
            insights.push(format!(
                "{} accounts you follow do not follow you back.",
                summary.not_following_back_count
            ));
        }

        let mut recommendations = Vec::new();
        if !summary.follow_back_candidates.is_empty() {
            recommendations.push(format!(
                "Consider following back {} engaged followers.",
                summary.follow_back_candidates.len()
            ));
        }
        if let Some(top) = summary.top_categories.first() {
            recommendations.push(format!("Lean into {} content.", top.category));
        }
        if recommendations.is_empty() {
            recommendations.push("Keep posting consistently and check back later.".to_string());
        }

        Ok(json!({
            "growth_rate": growth_rate,
            "engagement_trend": trend,
            "top_insights": insights,
            "recommendations": recommendations,
        })
        .to_string())
    }

    async fn suggestions(&self, summary: &RelationshipSummary) -> Result<String> {
        let suggestions: Vec<_> = summary
            .follow_back_candidates
            .iter()
            .filter(|c| !c.username.is_empty())
            .map(|c| {
                // log10 of audience size, 1.0 at a million followers
                let reach = ((c.follower_count as f64) + 1.0).log10() / 6.0;
                json!({
                    "username": c.username,
                    "display_name": c.display_name,
                    "reason": format!("Follows you and posts about {}.", c.category),
                    "category": c.category,
                    "potential_value": (reach.clamp(0.0, 1.0) * 100.0).round() / 100.0,
                })
            })
            .collect();
        Ok(serde_json::Value::Array(suggestions).to_string())
    }
}
