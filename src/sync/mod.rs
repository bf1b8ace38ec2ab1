//! Relationship sync: fetching, diffing and the notification feed
//!
//! [`SyncManager`] is the composition root. It owns exactly one cache, one
//! rate limiter and one client, and hands references out to callers.

pub mod client;
pub mod diff;
pub mod notifications;

pub use client::{DataSource, Fetched, RelationshipClient, Relationships};
pub use notifications::NotificationGenerator;

use std::sync::Arc;

use tokio::time::{Duration, interval};
use tracing::{Instrument, info, info_span};
use uuid::Uuid;

use crate::api::RelationshipApi;
use crate::api::http::HttpRelationshipApi;
use crate::cache::{CacheStore, CacheTtls};
use crate::clock::SharedClock;
use crate::config::Config;
use crate::db::Database;
use crate::error::Result;
use crate::models::Notification;
use crate::rate_limit::RateLimiter;

/// Wires the sync core together
pub struct SyncManager<A = HttpRelationshipApi> {
    client: Arc<RelationshipClient<A>>,
    notifications: NotificationGenerator<A>,
    limiter: Arc<RateLimiter>,
}

impl SyncManager<HttpRelationshipApi> {
    /// Build against the configured HTTP API
    pub fn from_config(
        config: &Config,
        db: Database,
        token: Option<String>,
        clock: SharedClock,
    ) -> Result<Self> {
        let api = HttpRelationshipApi::new(&config.api_base_url, token, config.request_timeout())?;
        Ok(Self::with_api(api, config, db, clock))
    }
}

impl<A: RelationshipApi> SyncManager<A> {
    /// Build around any API implementation
    pub fn with_api(api: A, config: &Config, db: Database, clock: SharedClock) -> Self {
        let cache = Arc::new(CacheStore::new(
            db,
            Arc::clone(&clock),
            CacheTtls::from(&config.cache),
        ));
        let limiter = Arc::new(RateLimiter::new(&config.rate_limit, clock));
        let client = Arc::new(RelationshipClient::new(
            api,
            cache,
            Arc::clone(&limiter),
            config,
        ));
        let notifications = NotificationGenerator::new(Arc::clone(&client), &config.notifications);

        Self {
            client,
            notifications,
            limiter,
        }
    }

    /// Relationship client
    pub fn client(&self) -> &RelationshipClient<A> {
        &self.client
    }

    /// Notification feed
    pub const fn notifications(&self) -> &NotificationGenerator<A> {
        &self.notifications
    }

    /// Shared cache
    pub fn cache(&self) -> &Arc<CacheStore> {
        self.client.cache()
    }

    /// Shared rate limiter
    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    /// Refresh the notification feed once
    pub async fn refresh(&self) -> Vec<Notification> {
        let run = Uuid::new_v4();
        async {
            let feed = self.notifications.refresh().await;
            info!("Feed has {} notifications", feed.len());
            feed
        }
        .instrument(info_span!("refresh", run = %run))
        .await
    }

    /// Start a background refresh loop
    pub async fn start_background_refresh(self: Arc<Self>, interval_secs: u64) {
        if interval_secs == 0 {
            return; // Manual refresh only
        }

        let mut interval = interval(Duration::from_secs(interval_secs));

        loop {
            interval.tick().await;
            self.refresh().await;
        }
    }
}
