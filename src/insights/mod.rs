//! Relationship analytics and follow suggestions
//!
//! The text itself comes from an [`InsightProvider`], which is treated as
//! untrusted: replies are parsed strictly into [`AnalyticsSummary`] /
//! [`Suggestion`] and replaced by a single generic fallback when they do not
//! validate. Analytics are cached under [`CacheCategory::Analytics`].

mod heuristic;

pub use heuristic::HeuristicInsightProvider;

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::cache::{CacheCategory, CacheStore};
use crate::error::Result;
use crate::models::{AnalyticsSummary, Suggestion};
use crate::sync::Relationships;

/// Followers counted as "recent" when estimating growth
const RECENT_DAYS: i64 = 30;

/// Follow-back candidates handed to the provider
const MAX_CANDIDATES: usize = 5;

/// Source of analytics and suggestion text
#[allow(async_fn_in_trait)]
pub trait InsightProvider {
    /// Raw analytics reply for `summary`; expected to be an `AnalyticsSummary` JSON object
    async fn analytics(&self, summary: &RelationshipSummary) -> Result<String>;

    /// Raw suggestions reply for `summary`; expected to be a JSON array of `Suggestion`
    async fn suggestions(&self, summary: &RelationshipSummary) -> Result<String>;
}

/// Category and how many followers fall into it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCount {
    /// Category name
    pub category: String,
    /// Followers in it
    pub count: usize,
}

/// A follower the owner does not follow back yet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    /// Handle
    pub username: String,
    /// Display name
    pub display_name: String,
    /// Content category
    pub category: String,
    /// Their own follower count
    pub follower_count: u64,
}

/// What the provider gets to see about the owner's audience
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipSummary {
    /// Follower count
    pub total_followers: usize,
    /// Following count
    pub total_following: usize,
    /// Mutual follows
    pub mutual_count: usize,
    /// `mutual_count / total_followers`, 0 when there are no followers
    pub mutual_ratio: f64,
    /// Followed accounts not following back
    pub not_following_back_count: usize,
    /// Followers who arrived in the last 30 days
    pub recent_followers: usize,
    /// Most common follower categories, largest first
    pub top_categories: Vec<CategoryCount>,
    /// Non-mutual followers worth a follow back, largest audience first
    pub follow_back_candidates: Vec<Candidate>,
}

impl RelationshipSummary {
    /// Summarize resolved relationships as of `now`
    pub fn from_relationships(rel: &Relationships, now: DateTime<Utc>) -> Self {
        let mut categories: HashMap<&'static str, usize> = HashMap::new();
        for follower in &rel.followers {
            *categories
                .entry(follower.user.content_category.name())
                .or_default() += 1;
        }
        let mut top_categories: Vec<CategoryCount> = categories
            .into_iter()
            .map(|(category, count)| CategoryCount {
                category: category.to_string(),
                count,
            })
            .collect();
        top_categories
            .sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.category.cmp(&b.category)));
        top_categories.truncate(3);

        let cutoff = now - Duration::days(RECENT_DAYS);
        let recent_followers = rel
            .followers
            .iter()
            .filter(|f| f.followed_at > cutoff)
            .count();

        let mut candidates: Vec<_> = rel.followers.iter().filter(|f| !f.is_mutual).collect();
        candidates.sort_by(|a, b| {
            b.engagement_level
                .cmp(&a.engagement_level)
                .then(b.user.follower_count.cmp(&a.user.follower_count))
        });
        let follow_back_candidates = candidates
            .into_iter()
            .take(MAX_CANDIDATES)
            .map(|f| Candidate {
                username: f.user.username.clone(),
                display_name: f.user.label(),
                category: f.user.content_category.name().to_string(),
                follower_count: f.user.follower_count,
            })
            .collect();

        let mutual_ratio = if rel.total_followers == 0 {
            0.0
        } else {
            rel.mutual_count as f64 / rel.total_followers as f64
        };

        Self {
            total_followers: rel.total_followers,
            total_following: rel.total_following,
            mutual_count: rel.mutual_count,
            mutual_ratio,
            not_following_back_count: rel.not_following_back_count,
            recent_followers,
            top_categories,
            follow_back_candidates,
        }
    }
}

/// Strictly parse an analytics reply
pub fn parse_analytics(raw: &str) -> Option<AnalyticsSummary> {
    let summary: AnalyticsSummary = serde_json::from_str(raw.trim())
        .inspect_err(|e| debug!("Rejected analytics reply: {}", e))
        .ok()?;
    let valid = summary.growth_rate.is_finite()
        && !summary.engagement_trend.trim().is_empty()
        && summary.top_insights.iter().all(|s| !s.trim().is_empty())
        && summary.recommendations.iter().all(|s| !s.trim().is_empty());
    valid.then_some(summary)
}

/// Strictly parse a suggestions reply; `None` unless every entry validates
pub fn parse_suggestions(raw: &str) -> Option<Vec<Suggestion>> {
    let suggestions: Vec<Suggestion> = serde_json::from_str(raw.trim())
        .inspect_err(|e| debug!("Rejected suggestions reply: {}", e))
        .ok()?;
    let valid = !suggestions.is_empty()
        && suggestions.iter().all(|s| {
            !s.username.trim().is_empty()
                && !s.reason.trim().is_empty()
                && (0.0..=1.0).contains(&s.potential_value)
        });
    valid.then_some(suggestions)
}

/// Analytics and suggestions over a provider
pub struct InsightService<P> {
    provider: P,
    cache: Arc<CacheStore>,
}

impl<P: InsightProvider> InsightService<P> {
    /// Create a service caching into `cache`
    pub const fn new(provider: P, cache: Arc<CacheStore>) -> Self {
        Self { provider, cache }
    }

    /// Analytics for `rel`, from cache while fresh.
    ///
    /// Only replies that validate are cached, so a fallback is retried on the
    /// next call.
    pub async fn analytics(&self, rel: &Relationships) -> AnalyticsSummary {
        if !self.cache.is_expired(CacheCategory::Analytics).await
            && let Some(cached) = self.cache.get::<AnalyticsSummary>(CacheCategory::Analytics).await
        {
            debug!("Serving analytics from cache");
            return cached;
        }

        let summary = RelationshipSummary::from_relationships(rel, self.cache.clock().now());
        let parsed = match self.provider.analytics(&summary).await {
            Ok(raw) => parse_analytics(&raw),
            Err(e) => {
                warn!("Insight provider failed: {}", e);
                None
            }
        };

        match parsed {
            Some(analytics) => {
                if let Err(e) = self.cache.put(CacheCategory::Analytics, &analytics).await {
                    warn!("Failed to cache analytics: {}", e);
                }
                analytics
            }
            None => {
                warn!("Analytics reply unusable, using fallback");
                AnalyticsSummary::fallback()
            }
        }
    }

    /// Follow suggestions for `rel`; never empty
    pub async fn suggestions(&self, rel: &Relationships) -> Vec<Suggestion> {
        let summary = RelationshipSummary::from_relationships(rel, self.cache.clock().now());
        let parsed = match self.provider.suggestions(&summary).await {
            Ok(raw) => parse_suggestions(&raw),
            Err(e) => {
                warn!("Insight provider failed: {}", e);
                None
            }
        };
        parsed.unwrap_or_else(|| {
            warn!("Suggestions reply unusable, using fallback");
            vec![Suggestion::fallback()]
        })
    }
}
