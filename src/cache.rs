//! TTL-governed local cache for relationship data
//!
//! Each [`CacheCategory`] has its own payload, last-sync timestamp and (for
//! the two relationship lists) a parallel index of bare ids plus the id
//! snapshot taken by the last notification refresh. Reads never fail:
//! a payload that cannot be decoded or loaded is reported as absent so callers
//! fall through to a fresh fetch.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::clock::SharedClock;
use crate::config::CacheConfig;
use crate::db::Database;
use crate::error::{Result, RoostError};
use crate::models::Relationship;

/// Cached data categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheCategory {
    /// Accounts following the owner
    Followers,
    /// Accounts the owner follows
    Following,
    /// Notification feed
    Notifications,
    /// AI analytics summary
    Analytics,
    /// Owner's own profile
    UserProfile,
}

impl CacheCategory {
    /// Every category
    pub const ALL: [Self; 5] = [
        Self::Followers,
        Self::Following,
        Self::Notifications,
        Self::Analytics,
        Self::UserProfile,
    ];

    /// Storage key
    pub const fn key(&self) -> &'static str {
        match self {
            Self::Followers => "followers",
            Self::Following => "following",
            Self::Notifications => "notifications",
            Self::Analytics => "analytics",
            Self::UserProfile => "user_profile",
        }
    }

    /// Parse from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "followers" => Some(Self::Followers),
            "following" => Some(Self::Following),
            "notifications" => Some(Self::Notifications),
            "analytics" => Some(Self::Analytics),
            "user_profile" | "profile" => Some(Self::UserProfile),
            _ => None,
        }
    }

    /// Whether an id index is kept next to the payload
    pub const fn has_id_index(&self) -> bool {
        matches!(self, Self::Followers | Self::Following)
    }

    const fn slot(self) -> usize {
        match self {
            Self::Followers => 0,
            Self::Following => 1,
            Self::Notifications => 2,
            Self::Analytics => 3,
            Self::UserProfile => 4,
        }
    }

    fn payload_key(self) -> String {
        format!("cache:{}", self.key())
    }

    fn synced_key(self) -> String {
        format!("synced:{}", self.key())
    }

    fn index_key(self) -> String {
        format!("ids:{}", self.key())
    }

    fn snapshot_key(self) -> String {
        format!("snapshot:{}", self.key())
    }
}

impl std::fmt::Display for CacheCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Time-to-live per category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheTtls {
    followers: Duration,
    following: Duration,
    notifications: Duration,
    analytics: Duration,
    user_profile: Duration,
}

fn hours(h: u64) -> Duration {
    i64::try_from(h)
        .ok()
        .and_then(Duration::try_hours)
        .unwrap_or(Duration::MAX)
}

impl From<&CacheConfig> for CacheTtls {
    fn from(config: &CacheConfig) -> Self {
        Self {
            followers: hours(config.followers_ttl_hours),
            following: hours(config.following_ttl_hours),
            notifications: hours(config.notifications_ttl_hours),
            analytics: hours(config.analytics_ttl_hours),
            user_profile: hours(config.profile_ttl_hours),
        }
    }
}

impl Default for CacheTtls {
    fn default() -> Self {
        Self::from(&CacheConfig::default())
    }
}

impl CacheTtls {
    /// TTL for a category
    pub const fn ttl(&self, category: CacheCategory) -> Duration {
        match category {
            CacheCategory::Followers => self.followers,
            CacheCategory::Following => self.following,
            CacheCategory::Notifications => self.notifications,
            CacheCategory::Analytics => self.analytics,
            CacheCategory::UserProfile => self.user_profile,
        }
    }
}

/// Durable, category-keyed cache
pub struct CacheStore {
    db: Mutex<Database>,
    clock: SharedClock,
    ttls: CacheTtls,
    /// Serializes read-modify-write sequences per category
    locks: [Mutex<()>; 5],
}

impl CacheStore {
    /// Wrap a database
    pub fn new(db: Database, clock: SharedClock, ttls: CacheTtls) -> Self {
        Self {
            db: Mutex::new(db),
            clock,
            ttls,
            locks: Default::default(),
        }
    }

    /// Store a payload and stamp the category as synced now
    pub async fn put<T: Serialize + ?Sized>(
        &self,
        category: CacheCategory,
        payload: &T,
    ) -> Result<()> {
        let json = encode(payload)?;
        let _guard = self.locks[category.slot()].lock().await;
        self.write(category, &json, true).await
    }

    /// Store a relationship list together with its id index
    pub async fn put_relationships<R>(&self, category: CacheCategory, items: &[R]) -> Result<()>
    where
        R: Relationship + Serialize,
    {
        let json = encode(items)?;
        let ids: Vec<String> = items.iter().map(|r| r.id().to_string()).collect();
        let now = self.clock.now();

        let _guard = self.locks[category.slot()].lock().await;
        let db = self.db.lock().await;
        db.atomically(|db| {
            db.set_string(&category.payload_key(), &json)?;
            db.set_timestamp(&category.synced_key(), now)?;
            if category.has_id_index() {
                db.set_string_list(&category.index_key(), &ids)?;
            }
            Ok(())
        })?;
        Ok(())
    }

    /// Last stored payload regardless of freshness
    pub async fn get<T: DeserializeOwned>(&self, category: CacheCategory) -> Option<T> {
        let raw = self.read_raw(category).await?;
        decode(category, &raw)
            .inspect_err(|e| warn!("{}; treating as absent", e))
            .ok()
    }

    /// When the category was last written with [`put`](Self::put)
    pub async fn last_synced(&self, category: CacheCategory) -> Option<DateTime<Utc>> {
        let db = self.db.lock().await;
        db.get_timestamp(&category.synced_key())
            .inspect_err(|e| warn!("Failed to read sync time for {}: {:#}", category, e))
            .ok()
            .flatten()
    }

    /// Whether the category is stale (or was never synced)
    pub async fn is_expired(&self, category: CacheCategory) -> bool {
        match self.last_synced(category).await {
            Some(synced) => self.clock.now() - synced >= self.ttls.ttl(category),
            None => true,
        }
    }

    /// Ids of the last stored relationship list; empty when none was stored
    pub async fn get_ids(&self, category: CacheCategory) -> Vec<String> {
        if !category.has_id_index() {
            return Vec::new();
        }
        let db = self.db.lock().await;
        db.get_string_list(&category.index_key())
            .inspect_err(|e| warn!("Failed to read id index for {}: {:#}", category, e))
            .ok()
            .flatten()
            .unwrap_or_default()
    }

    /// Ids recorded by the last notification refresh; empty when none was taken.
    ///
    /// Unlike the id index this is not touched by fetches, so it only moves
    /// when the notification feed has accounted for the change.
    pub async fn get_snapshot(&self, category: CacheCategory) -> Vec<String> {
        if !category.has_id_index() {
            return Vec::new();
        }
        let db = self.db.lock().await;
        db.get_string_list(&category.snapshot_key())
            .inspect_err(|e| warn!("Failed to read snapshot for {}: {:#}", category, e))
            .ok()
            .flatten()
            .unwrap_or_default()
    }

    /// Replace the notification snapshot for a relationship list
    pub async fn put_snapshot(&self, category: CacheCategory, ids: &[String]) -> Result<()> {
        if !category.has_id_index() {
            return Ok(());
        }
        let _guard = self.locks[category.slot()].lock().await;
        let db = self.db.lock().await;
        db.set_string_list(&category.snapshot_key(), ids)?;
        Ok(())
    }

    /// Drop the given ids from a cached relationship list and its index.
    ///
    /// The sync timestamp is left alone: eviction is not a refresh.
    pub async fn evict<R>(&self, category: CacheCategory, ids: &[&str]) -> Result<usize>
    where
        R: Relationship + Serialize + DeserializeOwned,
    {
        let _guard = self.locks[category.slot()].lock().await;

        let mut removed = 0;
        if let Some(raw) = self.read_raw(category).await
            && let Ok(mut items) = decode::<Vec<R>>(category, &raw)
        {
            let before = items.len();
            items.retain(|r| !ids.contains(&r.id()));
            removed = before - items.len();
            if removed > 0 {
                self.write(category, &encode(&items)?, false).await?;
            }
        }

        if category.has_id_index() {
            let mut index = {
                let db = self.db.lock().await;
                db.get_string_list(&category.index_key())?
            };
            if let Some(index) = index.as_mut() {
                let before = index.len();
                index.retain(|id| !ids.contains(&id.as_str()));
                if index.len() != before {
                    self.write_ids(category, index).await?;
                }
            }
        }

        debug!("Evicted {} of {} ids from {}", removed, ids.len(), category);
        Ok(removed)
    }

    /// Read-modify-write a payload without touching its sync time
    pub async fn update<T, R>(
        &self,
        category: CacheCategory,
        f: impl FnOnce(&mut T) -> R,
    ) -> Result<R>
    where
        T: Serialize + DeserializeOwned + Default,
    {
        self.modify(category, false, f).await
    }

    /// Read-modify-write a payload and stamp it as synced now
    pub async fn update_synced<T, R>(
        &self,
        category: CacheCategory,
        f: impl FnOnce(&mut T) -> R,
    ) -> Result<R>
    where
        T: Serialize + DeserializeOwned + Default,
    {
        self.modify(category, true, f).await
    }

    /// Remove payload, index, snapshot and timestamp for one category
    pub async fn clear(&self, category: CacheCategory) -> Result<()> {
        let _guard = self.locks[category.slot()].lock().await;
        let db = self.db.lock().await;
        db.atomically(|db| {
            db.remove(&category.payload_key())?;
            db.remove(&category.synced_key())?;
            db.remove_string_list(&category.index_key())?;
            db.remove_string_list(&category.snapshot_key())
        })?;
        Ok(())
    }

    /// Remove every category
    pub async fn clear_all(&self) -> Result<()> {
        for category in CacheCategory::ALL {
            self.clear(category).await?;
        }
        Ok(())
    }

    /// Time source shared with the rest of the sync core
    pub fn clock(&self) -> &SharedClock {
        &self.clock
    }

    async fn modify<T, R>(
        &self,
        category: CacheCategory,
        stamp: bool,
        f: impl FnOnce(&mut T) -> R,
    ) -> Result<R>
    where
        T: Serialize + DeserializeOwned + Default,
    {
        let _guard = self.locks[category.slot()].lock().await;

        let mut value: T = match self.read_raw(category).await {
            Some(raw) => decode(category, &raw)
                .inspect_err(|e| warn!("{}; starting from empty", e))
                .unwrap_or_default(),
            None => T::default(),
        };
        let out = f(&mut value);
        self.write(category, &encode(&value)?, stamp).await?;
        Ok(out)
    }

    async fn read_raw(&self, category: CacheCategory) -> Option<String> {
        let db = self.db.lock().await;
        db.get_string(&category.payload_key())
            .inspect_err(|e| warn!("Failed to read {} from cache: {:#}", category, e))
            .ok()
            .flatten()
    }

    async fn write(&self, category: CacheCategory, json: &str, stamp: bool) -> Result<()> {
        let now = self.clock.now();
        let db = self.db.lock().await;
        db.set_string(&category.payload_key(), json)?;
        if stamp {
            db.set_timestamp(&category.synced_key(), now)?;
        }
        Ok(())
    }

    async fn write_ids(&self, category: CacheCategory, ids: &[String]) -> Result<()> {
        if !category.has_id_index() {
            return Ok(());
        }
        let db = self.db.lock().await;
        db.set_string_list(&category.index_key(), ids)?;
        Ok(())
    }
}

fn encode<T: Serialize + ?Sized>(payload: &T) -> Result<String> {
    serde_json::to_string(payload).map_err(|e| RoostError::Storage(e.into()))
}

fn decode<T: DeserializeOwned>(category: CacheCategory, raw: &str) -> Result<T> {
    serde_json::from_str(raw).map_err(|e| RoostError::CacheCorrupt {
        category: category.key(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::models::{EngagementLevel, Follower, Notification, UserRecord};
    use std::sync::Arc;

    fn store() -> (Arc<CacheStore>, ManualClock) {
        let clock = ManualClock::new(
            DateTime::parse_from_rfc3339("2026-06-01T00:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
        );
        let store = CacheStore::new(
            Database::open_in_memory().unwrap(),
            Arc::new(clock.clone()),
            CacheTtls::default(),
        );
        (Arc::new(store), clock)
    }

    fn follower(id: &str) -> Follower {
        Follower {
            user: UserRecord::with_id(id),
            followed_at: DateTime::<Utc>::UNIX_EPOCH,
            is_mutual: false,
            engagement_level: EngagementLevel::Low,
        }
    }

    #[tokio::test]
    async fn test_put_get_round_trip() {
        let (cache, _) = store();
        assert!(cache.get::<Vec<Follower>>(CacheCategory::Followers).await.is_none());

        let list = vec![follower("a"), follower("b")];
        cache
            .put_relationships(CacheCategory::Followers, &list)
            .await
            .unwrap();

        assert_eq!(
            cache.get::<Vec<Follower>>(CacheCategory::Followers).await,
            Some(list)
        );
        assert_eq!(
            cache.get_ids(CacheCategory::Followers).await,
            vec!["a".to_string(), "b".to_string()]
        );
    }

    #[tokio::test]
    async fn test_expiry_follows_ttl() {
        let (cache, clock) = store();
        assert!(cache.is_expired(CacheCategory::Analytics).await);

        cache.put(CacheCategory::Analytics, &"summary").await.unwrap();
        assert!(!cache.is_expired(CacheCategory::Analytics).await);

        clock.advance(Duration::hours(11) + Duration::minutes(59));
        assert!(!cache.is_expired(CacheCategory::Analytics).await);

        clock.advance(Duration::minutes(1));
        assert!(cache.is_expired(CacheCategory::Analytics).await);

        // Stale payload is still readable
        assert_eq!(
            cache.get::<String>(CacheCategory::Analytics).await.as_deref(),
            Some("summary")
        );
    }

    #[tokio::test]
    async fn test_ttls_differ_per_category() {
        let (cache, clock) = store();
        cache.put(CacheCategory::Followers, &Vec::<Follower>::new()).await.unwrap();
        cache
            .put(CacheCategory::Notifications, &Vec::<Notification>::new())
            .await
            .unwrap();

        clock.advance(Duration::hours(30));
        assert!(cache.is_expired(CacheCategory::Followers).await);
        assert!(!cache.is_expired(CacheCategory::Notifications).await);
    }

    #[tokio::test]
    async fn test_corrupt_payload_reads_as_absent() {
        let (cache, _) = store();
        cache.put(CacheCategory::Followers, &"not a list").await.unwrap();
        assert!(cache.get::<Vec<Follower>>(CacheCategory::Followers).await.is_none());

        {
            let db = cache.db.lock().await;
            db.set_raw_list("ids:followers", "[1, 2,").unwrap();
        }
        assert!(cache.get_ids(CacheCategory::Followers).await.is_empty());
    }

    #[tokio::test]
    async fn test_snapshot_is_independent_of_index() {
        let (cache, _) = store();
        assert!(cache.get_snapshot(CacheCategory::Followers).await.is_empty());

        let snapshot = vec!["a".to_string(), "b".to_string()];
        cache
            .put_snapshot(CacheCategory::Followers, &snapshot)
            .await
            .unwrap();
        cache
            .put_relationships(CacheCategory::Followers, &[follower("c")])
            .await
            .unwrap();

        assert_eq!(cache.get_snapshot(CacheCategory::Followers).await, snapshot);
        assert_eq!(cache.get_ids(CacheCategory::Followers).await, vec!["c".to_string()]);

        // Only relationship lists keep snapshots
        cache
            .put_snapshot(CacheCategory::Analytics, &snapshot)
            .await
            .unwrap();
        assert!(cache.get_snapshot(CacheCategory::Analytics).await.is_empty());
    }

    #[tokio::test]
    async fn test_clear_removes_everything() {
        let (cache, _) = store();
        cache
            .put_relationships(CacheCategory::Following, &[follower("x")])
            .await
            .unwrap();
        cache
            .put_snapshot(CacheCategory::Following, &["x".to_string()])
            .await
            .unwrap();
        cache.clear(CacheCategory::Following).await.unwrap();

        assert!(cache.get::<Vec<Follower>>(CacheCategory::Following).await.is_none());
        assert!(cache.get_ids(CacheCategory::Following).await.is_empty());
        assert!(cache.get_snapshot(CacheCategory::Following).await.is_empty());
        assert!(cache.last_synced(CacheCategory::Following).await.is_none());
        assert!(cache.is_expired(CacheCategory::Following).await);
    }

    #[tokio::test]
    async fn test_evict_keeps_sync_time() {
        let (cache, clock) = store();
        cache
            .put_relationships(CacheCategory::Followers, &[follower("a"), follower("b")])
            .await
            .unwrap();
        let synced = cache.last_synced(CacheCategory::Followers).await;

        clock.advance(Duration::hours(1));
        let removed = cache
            .evict::<Follower>(CacheCategory::Followers, &["a", "missing"])
            .await
            .unwrap();

        assert_eq!(removed, 1);
        assert_eq!(cache.last_synced(CacheCategory::Followers).await, synced);
        assert_eq!(cache.get_ids(CacheCategory::Followers).await, vec!["b".to_string()]);
        let left: Vec<Follower> = cache.get(CacheCategory::Followers).await.unwrap();
        assert_eq!(left.len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_updates_do_not_lose_writes() {
        let (cache, _) = store();
        let mut handles = Vec::new();
        for i in 0..25u32 {
            let cache = Arc::clone(&cache);
            handles.push(tokio::spawn(async move {
                cache
                    .update(CacheCategory::Notifications, |list: &mut Vec<u32>| list.push(i))
                    .await
                    .unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let mut list: Vec<u32> = cache.get(CacheCategory::Notifications).await.unwrap();
        list.sort_unstable();
        assert_eq!(list, (0..25).collect::<Vec<_>>());
        // Plain updates are not syncs
        assert!(cache.last_synced(CacheCategory::Notifications).await.is_none());
    }

    #[test]
    fn test_category_parsing() {
        for category in CacheCategory::ALL {
            assert_eq!(CacheCategory::from_str(category.key()), Some(category));
        }
        assert_eq!(
            CacheCategory::from_str("user-profile"),
            Some(CacheCategory::UserProfile)
        );
        assert_eq!(CacheCategory::from_str("posts"), None);
    }
}
