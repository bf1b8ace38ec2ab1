//! Notification feed: refresh from relationship diffs, plus read-state edits
//!
//! Every write to the feed is a read-modify-write through
//! [`CacheStore::update`], which serializes writers per category, so a
//! `mark_read` racing a `delete` or a refresh cannot lose either change.

use std::cmp::Reverse;
use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::api::RelationshipApi;
use crate::cache::{CacheCategory, CacheStore};
use crate::config::NotificationConfig;
use crate::error::Result;
use crate::models::{Notification, NotificationIdGen, Relationship};

use super::client::RelationshipClient;
use super::diff::compute_notifications;

/// Produces and maintains the notification feed
pub struct NotificationGenerator<A> {
    client: Arc<RelationshipClient<A>>,
    cache: Arc<CacheStore>,
    ids: NotificationIdGen,
    milestones: Vec<usize>,
    max_retained: usize,
}

impl<A: RelationshipApi> NotificationGenerator<A> {
    /// Create a generator over `client` and its cache
    pub fn new(client: Arc<RelationshipClient<A>>, config: &NotificationConfig) -> Self {
        let cache = Arc::clone(client.cache());
        Self {
            client,
            cache,
            ids: NotificationIdGen::default(),
            milestones: config.milestones.clone(),
            max_retained: config.max_retained,
        }
    }

    /// Re-fetch relationships and fold the resulting events into the feed.
    ///
    /// Never fails: when the refresh cannot complete, the last stored feed is
    /// returned unchanged.
    pub async fn refresh(&self) -> Vec<Notification> {
        match self.try_refresh().await {
            Ok(feed) => feed,
            Err(e) => {
                warn!("Notification refresh failed, serving stored feed: {}", e);
                self.notifications().await
            }
        }
    }

    async fn try_refresh(&self) -> Result<Vec<Notification>> {
        // Only refreshes move the snapshot; plain fetches leave it alone
        let previous_followers = self.cache.get_snapshot(CacheCategory::Followers).await;
        let previous_following = self.cache.get_snapshot(CacheCategory::Following).await;
        debug!(
            "Previous snapshot: {} followers, {} following",
            previous_followers.len(),
            previous_following.len()
        );

        let relationships = self.client.fetch_follower_relationships().await?;

        if let Some(max_id) = self.notifications().await.iter().map(|n| n.id).max() {
            self.ids.observe(max_id);
        }
        let now = self.cache.clock().now();
        let fresh = compute_notifications(
            &previous_followers,
            &relationships.followers,
            &self.milestones,
            &self.ids,
            now,
        );

        self.cache
            .put_snapshot(CacheCategory::Followers, &snapshot(&relationships.followers))
            .await?;
        self.cache
            .put_snapshot(CacheCategory::Following, &snapshot(&relationships.following))
            .await?;

        let generated = fresh.len();
        let max_retained = self.max_retained;
        let feed = self
            .cache
            .update_synced(CacheCategory::Notifications, move |feed: &mut Vec<Notification>| {
                feed.extend(fresh);
                let mut seen = HashSet::new();
                feed.retain(|n| seen.insert(n.id));
                sort_feed(feed);
                feed.truncate(max_retained);
                feed.clone()
            })
            .await?;

        info!(
            "Notification refresh: {} new, {} retained",
            generated,
            feed.len()
        );
        Ok(feed)
    }

    /// Stored feed, newest first, without refreshing
    pub async fn notifications(&self) -> Vec<Notification> {
        self.cache
            .get::<Vec<Notification>>(CacheCategory::Notifications)
            .await
            .unwrap_or_default()
    }

    /// Whether the stored feed is older than its TTL
    pub async fn needs_refresh(&self) -> bool {
        self.cache.is_expired(CacheCategory::Notifications).await
    }

    /// Number of unread entries
    pub async fn unread_count(&self) -> usize {
        self.notifications().await.iter().filter(|n| !n.is_read).count()
    }

    /// Mark one entry read; `false` when no entry has that id
    pub async fn mark_read(&self, id: u64) -> Result<bool> {
        self.edit(|feed| {
            feed.iter_mut()
                .find(|n| n.id == id)
                .map(|n| n.is_read = true)
                .is_some()
        })
        .await
    }

    /// Mark every entry read; returns how many changed
    pub async fn mark_all_read(&self) -> Result<usize> {
        self.edit(|feed| {
            let mut changed = 0;
            for n in feed.iter_mut().filter(|n| !n.is_read) {
                n.is_read = true;
                changed += 1;
            }
            changed
        })
        .await
    }

    /// Remove one entry; `false` when no entry has that id
    pub async fn delete(&self, id: u64) -> Result<bool> {
        self.edit(|feed| {
            let before = feed.len();
            feed.retain(|n| n.id != id);
            feed.len() != before
        })
        .await
    }

    /// Drop the whole feed
    pub async fn clear(&self) -> Result<()> {
        self.cache.clear(CacheCategory::Notifications).await
    }

    async fn edit<R>(&self, f: impl FnOnce(&mut Vec<Notification>) -> R) -> Result<R> {
        self.cache.update(CacheCategory::Notifications, f).await
    }
}

/// Newest first; ties broken by id so the order is total
fn sort_feed(feed: &mut [Notification]) {
    feed.sort_by_key(|n| (Reverse(n.timestamp), Reverse(n.id)));
}

fn snapshot<R: Relationship>(list: &[R]) -> Vec<String> {
    list.iter().map(|r| r.id().to_string()).collect()
}
