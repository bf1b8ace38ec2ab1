//! Relationship client: cached, rate-limited access to followers and following

use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::api::{ListKind, RawUser, RelationshipApi};
use crate::cache::{CacheCategory, CacheStore};
use crate::config::Config;
use crate::error::{Result, RoostError};
use crate::models::{BatchResult, Follower, Following, ItemOutcome, Relationship, UserProfile};
use crate::rate_limit::RateLimiter;

/// Hard ceiling on ids per batch; config can lower it but never raise it
pub const MAX_BATCH_SIZE: usize = 10;

/// Where a fetched value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DataSource {
    /// Fresh from the remote API
    Remote,
    /// From a cache entry that is still within its TTL
    Cache,
    /// From an expired cache entry after the remote could not be used
    StaleCache,
}

/// A value plus its provenance
#[derive(Debug, Clone, PartialEq)]
pub struct Fetched<T> {
    /// The data
    pub items: T,
    /// Where it came from
    pub source: DataSource,
}

impl<T> Fetched<T> {
    const fn new(items: T, source: DataSource) -> Self {
        Self { items, source }
    }

    /// Whether callers should present this as offline data
    pub const fn is_stale(&self) -> bool {
        matches!(self.source, DataSource::StaleCache)
    }
}

/// Both relationship lists with mutual flags resolved
#[derive(Debug, Clone, PartialEq)]
pub struct Relationships {
    /// Accounts following the owner
    pub followers: Vec<Follower>,
    /// Accounts the owner follows
    pub following: Vec<Following>,
    /// `followers.len()`
    pub total_followers: usize,
    /// `following.len()`
    pub total_following: usize,
    /// Followers the owner follows back
    pub mutual_count: usize,
    /// Followed accounts that do not follow the owner
    pub not_following_back_count: usize,
    /// Least fresh source of the two lists
    pub source: DataSource,
}

impl Relationships {
    /// Cross-reference the two lists.
    ///
    /// `is_mutual` and `follows_back` are recomputed from scratch, so whatever
    /// the inputs carried is ignored.
    pub fn resolve(
        mut followers: Vec<Follower>,
        mut following: Vec<Following>,
        source: DataSource,
    ) -> Self {
        let following_ids: HashSet<&str> = following.iter().map(|f| f.user.id.as_str()).collect();
        let mut mutual_count = 0;
        for follower in &mut followers {
            follower.is_mutual = following_ids.contains(follower.user.id.as_str());
            mutual_count += usize::from(follower.is_mutual);
        }

        let follower_ids: HashSet<&str> = followers.iter().map(|f| f.user.id.as_str()).collect();
        let mut not_following_back_count = 0;
        for followed in &mut following {
            followed.follows_back = follower_ids.contains(followed.user.id.as_str());
            not_following_back_count += usize::from(!followed.follows_back);
        }

        Self {
            total_followers: followers.len(),
            total_following: following.len(),
            mutual_count,
            not_following_back_count,
            followers,
            following,
            source,
        }
    }

    /// Whether either list came from an expired cache
    pub fn is_stale(&self) -> bool {
        self.source == DataSource::StaleCache
    }

    /// Followed accounts that do not follow back
    pub fn not_following_back(&self) -> impl Iterator<Item = &Following> {
        self.following.iter().filter(|f| !f.follows_back)
    }
}

/// A relationship list entry that can be paged in and cached
trait ListEntry: Relationship + Serialize + DeserializeOwned + Sized {
    const KIND: ListKind;
    const CATEGORY: CacheCategory;

    fn from_raw(raw: RawUser) -> Option<Self>;
}

impl ListEntry for Follower {
    const KIND: ListKind = ListKind::Followers;
    const CATEGORY: CacheCategory = CacheCategory::Followers;

    fn from_raw(raw: RawUser) -> Option<Self> {
        raw.into_follower()
    }
}

impl ListEntry for Following {
    const KIND: ListKind = ListKind::Following;
    const CATEGORY: CacheCategory = CacheCategory::Following;

    fn from_raw(raw: RawUser) -> Option<Self> {
        raw.into_following()
    }
}

#[derive(Debug, Clone, Copy)]
enum Mutation {
    Remove,
    Block,
}

impl Mutation {
    const fn verb(self) -> &'static str {
        match self {
            Self::Remove => "remove",
            Self::Block => "block",
        }
    }
}

/// Fetches, caches and mutates the owner's relationships
pub struct RelationshipClient<A> {
    api: A,
    cache: Arc<CacheStore>,
    limiter: Arc<RateLimiter>,
    page_size: usize,
    max_pages: usize,
    batch_limit: usize,
}

impl<A: RelationshipApi> RelationshipClient<A> {
    /// Create a client sharing `cache` and `limiter` with the rest of the core
    pub fn new(api: A, cache: Arc<CacheStore>, limiter: Arc<RateLimiter>, config: &Config) -> Self {
        Self {
            api,
            cache,
            limiter,
            page_size: config.page_size.max(1),
            max_pages: config.max_pages.max(1),
            batch_limit: config.batch_limit.min(MAX_BATCH_SIZE),
        }
    }

    /// Shared cache
    pub fn cache(&self) -> &Arc<CacheStore> {
        &self.cache
    }

    #[cfg(test)]
    pub(crate) const fn api(&self) -> &A {
        &self.api
    }

    /// Whether a credential is available
    pub fn has_credentials(&self) -> bool {
        self.api.has_credentials()
    }

    // ==================== Fetching ====================

    /// Accounts following the owner, newest first
    pub async fn fetch_followers(&self) -> Result<Fetched<Vec<Follower>>> {
        self.fetch_list().await
    }

    /// Accounts the owner follows, newest first
    pub async fn fetch_following(&self) -> Result<Fetched<Vec<Following>>> {
        self.fetch_list().await
    }

    /// Both lists, cross-referenced for mutual status
    pub async fn fetch_follower_relationships(&self) -> Result<Relationships> {
        let (followers, following) = tokio::join!(self.fetch_followers(), self.fetch_following());
        let (followers, following) = (followers?, following?);
        let source = followers.source.max(following.source);

        let relationships = Relationships::resolve(followers.items, following.items, source);
        debug!(
            "Resolved {} followers, {} following, {} mutual ({:?})",
            relationships.total_followers,
            relationships.total_following,
            relationships.mutual_count,
            relationships.source
        );
        Ok(relationships)
    }

    /// The owner's profile
    pub async fn fetch_profile(&self) -> Result<Fetched<UserProfile>> {
        let category = CacheCategory::UserProfile;
        let fetched = self
            .resolve(category, async {
                self.limiter.acquire().await?;
                let raw = self.api.profile().await?;
                Ok::<_, RoostError>(raw.into_profile(self.cache.clock().now()))
            })
            .await?;

        if fetched.source == DataSource::Remote
            && let Err(e) = self.cache.put(category, &fetched.items).await
        {
            warn!("Failed to cache {}: {}", category, e);
        }
        Ok(fetched)
    }

    async fn fetch_list<R: ListEntry>(&self) -> Result<Fetched<Vec<R>>> {
        let category = R::CATEGORY;
        let fetched = self.resolve(category, self.fetch_pages::<R>()).await?;

        if fetched.source == DataSource::Remote
            && let Err(e) = self.cache.put_relationships(category, &fetched.items).await
        {
            warn!("Failed to cache {}: {}", category, e);
        }
        Ok(fetched)
    }

    /// Credential check, then fresh cache, then `remote` with stale-cache fallback.
    ///
    /// `remote` is only polled when the cache cannot answer.
    async fn resolve<T, F>(&self, category: CacheCategory, remote: F) -> Result<Fetched<T>>
    where
        T: DeserializeOwned,
        F: Future<Output = Result<T>>,
    {
        let cached = self.cache.get::<T>(category).await;
        let expired = self.cache.is_expired(category).await;

        if !self.api.has_credentials() {
            return match cached {
                Some(items) => {
                    debug!("No credentials, serving cached {}", category);
                    let source = if expired {
                        DataSource::StaleCache
                    } else {
                        DataSource::Cache
                    };
                    Ok(Fetched::new(items, source))
                }
                None => Err(RoostError::Unauthenticated),
            };
        }

        let cached = match cached {
            Some(items) if !expired => {
                debug!("Serving {} from cache", category);
                return Ok(Fetched::new(items, DataSource::Cache));
            }
            other => other,
        };

        match remote.await {
            Ok(items) => Ok(Fetched::new(items, DataSource::Remote)),
            Err(e) if e.allows_cache_fallback() => match cached {
                Some(items) => {
                    warn!("Fetching {} failed ({}), using cached copy", category, e);
                    Ok(Fetched::new(items, DataSource::StaleCache))
                }
                None => Err(e),
            },
            Err(e) => Err(e),
        }
    }

    async fn fetch_pages<R: ListEntry>(&self) -> Result<Vec<R>> {
        let mut items: Vec<R> = Vec::new();
        let mut seen = HashSet::new();
        let mut cursor: Option<String> = None;

        for page_no in 1..=self.max_pages {
            self.limiter.acquire().await?;
            let cursor_ref = cursor.as_deref();
            let page = match R::KIND {
                ListKind::Followers => self.api.followers_page(cursor_ref, self.page_size).await?,
                ListKind::Following => self.api.following_page(cursor_ref, self.page_size).await?,
            };

            for entry in page.users.into_iter().filter_map(R::from_raw) {
                if seen.insert(entry.id().to_string()) {
                    items.push(entry);
                }
            }

            match page.next_cursor.filter(|c| !c.is_empty()) {
                Some(next) if page_no < self.max_pages => cursor = Some(next),
                Some(_) => {
                    warn!(
                        "Stopped paging {} after {} pages",
                        R::KIND.path(),
                        self.max_pages
                    );
                    break;
                }
                None => break,
            }
        }

        // Stable, so equal timestamps keep server order
        items.sort_by(|a, b| b.followed_at().cmp(&a.followed_at()));
        debug!("Fetched {} {}", items.len(), R::KIND.path());
        Ok(items)
    }

    // ==================== Mutations ====================

    /// Make `user_id` stop following the owner
    pub async fn remove_follower(&self, user_id: &str) -> Result<()> {
        self.mutate(Mutation::Remove, user_id).await
    }

    /// Block `user_id`; drops them from both cached lists
    pub async fn block_user(&self, user_id: &str) -> Result<()> {
        self.mutate(Mutation::Block, user_id).await
    }

    /// Remove several followers one at a time
    pub async fn batch_remove_followers(&self, user_ids: &[String]) -> Result<BatchResult> {
        self.run_batch(Mutation::Remove, user_ids).await
    }

    /// Block several users one at a time
    pub async fn batch_block_users(&self, user_ids: &[String]) -> Result<BatchResult> {
        self.run_batch(Mutation::Block, user_ids).await
    }

    async fn mutate(&self, mutation: Mutation, user_id: &str) -> Result<()> {
        if !self.api.has_credentials() {
            return Err(RoostError::Unauthenticated);
        }
        self.limiter.acquire().await?;

        match mutation {
            Mutation::Remove => self.api.remove_follower(user_id).await?,
            Mutation::Block => self.api.block_user(user_id).await?,
        }
        info!("{} {} succeeded", mutation.verb(), user_id);

        let evicted = match mutation {
            Mutation::Remove => {
                self.cache
                    .evict::<Follower>(CacheCategory::Followers, &[user_id])
                    .await
            }
            Mutation::Block => {
                let followers = self
                    .cache
                    .evict::<Follower>(CacheCategory::Followers, &[user_id])
                    .await;
                let following = self
                    .cache
                    .evict::<Following>(CacheCategory::Following, &[user_id])
                    .await;
                followers.and(following)
            }
        };
        if let Err(e) = evicted {
            warn!("Failed to evict {} from cache: {}", user_id, e);
        }
        Ok(())
    }

    async fn run_batch(&self, mutation: Mutation, user_ids: &[String]) -> Result<BatchResult> {
        if user_ids.len() > self.batch_limit {
            return Err(RoostError::BatchTooLarge {
                requested: user_ids.len(),
                max: self.batch_limit,
            });
        }
        if !self.api.has_credentials() {
            return Err(RoostError::Unauthenticated);
        }

        let mut seen = HashSet::new();
        let mut pending = user_ids
            .iter()
            .map(String::as_str)
            .filter(|id| seen.insert(*id));

        let mut result = BatchResult::default();
        while let Some(user_id) = pending.next() {
            match self.mutate(mutation, user_id).await {
                Ok(()) => result.record(user_id, ItemOutcome::Succeeded),
                Err(RoostError::RateLimitExceeded { retry_after }) => {
                    let reason =
                        format!("rate limited, retry after {}s", retry_after.as_secs().max(1));
                    result.record(
                        user_id,
                        ItemOutcome::Failed {
                            reason: reason.clone(),
                        },
                    );
                    for skipped in pending.by_ref() {
                        result.record(
                            skipped,
                            ItemOutcome::Skipped {
                                reason: reason.clone(),
                            },
                        );
                    }
                    result.retry_after = Some(retry_after);
                    warn!(
                        "Batch {} aborted after {} of {} items: {}",
                        mutation.verb(),
                        result.attempted(),
                        result.items.len(),
                        reason
                    );
                    break;
                }
                Err(e) => {
                    debug!("{} {} failed: {}", mutation.verb(), user_id, e);
                    result.record(
                        user_id,
                        ItemOutcome::Failed {
                            reason: e.to_string(),
                        },
                    );
                }
            }
        }

        info!(
            "Batch {}: {} succeeded, {} failed, {} skipped",
            mutation.verb(),
            result.success_count,
            result.failure_count,
            result.skipped_count
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::{FakeApi, Failure, user};
    use crate::cache::CacheTtls;
    use crate::clock::{ManualClock, SharedClock};
    use crate::db::Database;
    use chrono::{DateTime, Duration, Utc};
    use std::time::Duration as StdDuration;

    fn client(api: FakeApi) -> (RelationshipClient<FakeApi>, ManualClock) {
        let clock = ManualClock::default();
        let shared: SharedClock = Arc::new(clock.clone());
        let cache = Arc::new(CacheStore::new(
            Database::open_in_memory().unwrap(),
            Arc::clone(&shared),
            CacheTtls::default(),
        ));
        let mut config = Config::default();
        config.rate_limit.throttle_delay_ms = 0;
        let limiter = Arc::new(RateLimiter::new(&config.rate_limit, shared));
        (RelationshipClient::new(api, cache, limiter, &config), clock)
    }

    fn ids(list: &[impl Relationship]) -> Vec<&str> {
        list.iter().map(Relationship::id).collect()
    }

    fn strings(ids: &[&str]) -> Vec<String> {
        ids.iter().map(ToString::to_string).collect()
    }

    #[tokio::test]
    async fn test_mutual_flags_match_membership() {
        let (client, _) = client(FakeApi::with_ids(&["a", "b", "c"], &["b", "c", "d", "e"]));
        let rel = client.fetch_follower_relationships().await.unwrap();

        for follower in &rel.followers {
            assert_eq!(
                follower.is_mutual,
                rel.following.iter().any(|f| f.user.id == follower.user.id)
            );
        }
        for followed in &rel.following {
            assert_eq!(
                followed.follows_back,
                rel.followers.iter().any(|f| f.user.id == followed.user.id)
            );
        }
        assert_eq!(rel.total_followers, 3);
        assert_eq!(rel.total_following, 4);
        assert_eq!(rel.mutual_count, 2);
        assert_eq!(rel.not_following_back_count, 2);
        assert_eq!(rel.source, DataSource::Remote);
        let mut lonely: Vec<&str> = rel.not_following_back().map(|f| f.user.id.as_str()).collect();
        lonely.sort_unstable();
        assert_eq!(lonely, ["d", "e"]);
    }

    #[tokio::test]
    async fn test_repeated_fetch_is_idempotent() {
        let (client, _) = client(FakeApi::with_ids(&["a", "b", "c"], &["b", "x"]));
        let first = client.fetch_follower_relationships().await.unwrap();
        let calls = client.api.list_calls();
        let second = client.fetch_follower_relationships().await.unwrap();

        assert_eq!(client.api.list_calls(), calls, "second call should be served from cache");
        assert_eq!(second.source, DataSource::Cache);
        assert_eq!(first.followers, second.followers);
        assert_eq!(first.following, second.following);
        assert_eq!(first.mutual_count, second.mutual_count);
        assert_eq!(first.not_following_back_count, second.not_following_back_count);
    }

    #[tokio::test]
    async fn test_pages_are_followed_and_sorted_newest_first() {
        let base = DateTime::parse_from_rfc3339("2026-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let followers = (0..5)
            .map(|i| {
                let mut raw = user(&format!("u{i}"), "someone");
                raw.followed_at = Some(base + Duration::days(i));
                raw
            })
            .collect();
        let (client, _) = client(FakeApi::new(followers, Vec::new()));

        let fetched = client.fetch_followers().await.unwrap();
        assert_eq!(client.api.list_calls(), 3);
        assert_eq!(ids(&fetched.items), ["u4", "u3", "u2", "u1", "u0"]);
        assert_eq!(
            client.cache().get_ids(CacheCategory::Followers).await,
            strings(&["u4", "u3", "u2", "u1", "u0"])
        );
    }

    #[tokio::test]
    async fn test_network_failure_falls_back_to_stale_cache() {
        let (client, clock) = client(FakeApi::with_ids(&["a", "b"], &[]));
        let fresh = client.fetch_followers().await.unwrap();

        clock.advance(Duration::hours(25));
        client.api.fail_lists(Some(Failure::Network));

        let stale = client.fetch_followers().await.unwrap();
        assert_eq!(stale.items, fresh.items);
        assert!(stale.is_stale());
    }

    #[tokio::test]
    async fn test_network_failure_without_cache_surfaces() {
        let (client, _) = client(FakeApi::with_ids(&["a"], &[]));
        client.api.fail_lists(Some(Failure::Status(502)));

        let err = client.fetch_followers().await.unwrap_err();
        assert!(matches!(
            err,
            RoostError::Remote {
                status_code: Some(502),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_permission_error_is_not_masked_by_cache() {
        let (client, clock) = client(FakeApi::with_ids(&["a"], &[]));
        client.fetch_followers().await.unwrap();
        clock.advance(Duration::hours(24));
        client.api.fail_lists(Some(Failure::Forbidden));

        assert!(matches!(
            client.fetch_followers().await,
            Err(RoostError::InsufficientPermission)
        ));
    }

    #[tokio::test]
    async fn test_rejected_token_serves_cached_copy() {
        let (client, clock) = client(FakeApi::with_ids(&["a", "b"], &["a"]));
        let fresh = client.fetch_follower_relationships().await.unwrap();

        clock.advance(Duration::hours(25));
        client.api.fail_lists(Some(Failure::Rejected));

        let stale = client.fetch_follower_relationships().await.unwrap();
        assert_eq!(stale.source, DataSource::StaleCache);
        assert_eq!(stale.followers, fresh.followers);
        assert_eq!(stale.mutual_count, 1);
    }

    #[tokio::test]
    async fn test_rejected_token_without_cache_is_unauthenticated() {
        let (client, _) = client(FakeApi::with_ids(&["a"], &[]));
        client.api.fail_lists(Some(Failure::Rejected));

        assert!(matches!(
            client.fetch_followers().await,
            Err(RoostError::Unauthenticated)
        ));
    }

    #[tokio::test]
    async fn test_unauthenticated_uses_cache_or_fails() {
        let (client, _) = client(FakeApi::with_ids(&["a"], &[]).unauthenticated());
        assert!(matches!(
            client.fetch_followers().await,
            Err(RoostError::Unauthenticated)
        ));

        let cached: Vec<Follower> = [RawUser::default(), user("z", "Zed")]
            .into_iter()
            .filter_map(RawUser::into_follower)
            .collect();
        client
            .cache()
            .put_relationships(CacheCategory::Followers, &cached)
            .await
            .unwrap();

        let fetched = client.fetch_followers().await.unwrap();
        assert_eq!(ids(&fetched.items), ["z"]);
        assert_eq!(fetched.source, DataSource::Cache);
        assert_eq!(client.api.list_calls(), 0);
    }

    #[tokio::test]
    async fn test_fetch_profile_is_cached() {
        let (client, _) = client(FakeApi::with_ids(&["a", "b"], &["c"]));
        let profile = client.fetch_profile().await.unwrap();
        assert_eq!(profile.items.username, "owner");
        assert_eq!(profile.items.follower_count, 2);

        let again = client.fetch_profile().await.unwrap();
        assert_eq!(again.source, DataSource::Cache);
        assert_eq!(client.api.list_calls(), 1);
    }

    #[tokio::test]
    async fn test_remove_evicts_without_restamping() {
        let (client, _) = client(FakeApi::with_ids(&["a", "b"], &["a"]));
        client.fetch_follower_relationships().await.unwrap();
        let synced = client.cache().last_synced(CacheCategory::Followers).await;

        client.remove_follower("a").await.unwrap();

        let cached: Vec<Follower> = client.cache().get(CacheCategory::Followers).await.unwrap();
        assert_eq!(ids(&cached), ["b"]);
        assert_eq!(client.cache().get_ids(CacheCategory::Followers).await, strings(&["b"]));
        assert_eq!(client.cache().last_synced(CacheCategory::Followers).await, synced);
        // Following untouched by a removal
        assert_eq!(client.cache().get_ids(CacheCategory::Following).await, strings(&["a"]));
    }

    #[tokio::test]
    async fn test_block_evicts_from_both_lists() {
        let (client, _) = client(FakeApi::with_ids(&["a", "b"], &["a", "c"]));
        client.fetch_follower_relationships().await.unwrap();

        client.block_user("a").await.unwrap();

        assert_eq!(client.cache().get_ids(CacheCategory::Followers).await, strings(&["b"]));
        assert_eq!(client.cache().get_ids(CacheCategory::Following).await, strings(&["c"]));
    }

    #[tokio::test]
    async fn test_mutation_error_mapping() {
        let (client, _) = client(FakeApi::with_ids(&[], &[]));
        client.api.fail_mutation("locked", Failure::Forbidden);
        client.api.fail_mutation("busy", Failure::RateLimited);

        assert!(matches!(
            client.remove_follower("locked").await,
            Err(RoostError::InsufficientPermission)
        ));
        assert!(matches!(
            client.block_user("busy").await,
            Err(RoostError::RateLimitExceeded { .. })
        ));
    }

    #[tokio::test]
    async fn test_batch_over_cap_makes_no_calls() {
        let (client, _) = client(FakeApi::with_ids(&[], &[]));
        let ids: Vec<String> = (0..11).map(|i| format!("u{i}")).collect();

        let err = client.batch_remove_followers(&ids).await.unwrap_err();
        assert!(matches!(
            err,
            RoostError::BatchTooLarge {
                requested: 11,
                max: 10
            }
        ));
        assert!(client.api.mutation_calls().is_empty());
    }

    #[tokio::test]
    async fn test_batch_cap_cannot_be_raised_by_config() {
        let clock: SharedClock = Arc::new(ManualClock::default());
        let cache = Arc::new(CacheStore::new(
            Database::open_in_memory().unwrap(),
            Arc::clone(&clock),
            CacheTtls::default(),
        ));
        let mut config = Config::default();
        config.batch_limit = 50;
        let limiter = Arc::new(RateLimiter::new(&config.rate_limit, clock));
        let client = RelationshipClient::new(FakeApi::with_ids(&[], &[]), cache, limiter, &config);

        let ids: Vec<String> = (0..11).map(|i| format!("u{i}")).collect();
        assert!(matches!(
            client.batch_block_users(&ids).await,
            Err(RoostError::BatchTooLarge { max: MAX_BATCH_SIZE, .. })
        ));
        assert!(client.api.mutation_calls().is_empty());
    }

    #[tokio::test]
    async fn test_batch_rate_limit_aborts_remaining() {
        let (client, _) = client(FakeApi::with_ids(&[], &[]));
        client.api.fail_mutation("b", Failure::RateLimited);

        let result = client
            .batch_block_users(&strings(&["a", "b", "c", "d"]))
            .await
            .unwrap();

        assert_eq!(client.api.mutation_calls(), ["a", "b"]);
        assert_eq!(result.success_count, 1);
        assert_eq!(result.failure_count, 1);
        assert_eq!(result.skipped_count, 2);
        assert_eq!(result.attempted(), 2);
        assert_eq!(result.retry_after, Some(StdDuration::from_secs(30)));
        assert!(matches!(result.outcome("b"), Some(ItemOutcome::Failed { .. })));
        assert!(matches!(result.outcome("d"), Some(ItemOutcome::Skipped { .. })));
    }

    #[tokio::test]
    async fn test_batch_keeps_going_after_ordinary_failure() {
        let (client, _) = client(FakeApi::with_ids(&[], &[]));
        client.api.fail_mutation("a", Failure::Status(404));

        let result = client
            .batch_remove_followers(&strings(&["a", "b", "a"]))
            .await
            .unwrap();

        assert_eq!(client.api.mutation_calls(), ["a", "b"]);
        assert_eq!(result.items.len(), 2);
        assert_eq!(result.success_count, 1);
        assert_eq!(result.failure_count, 1);
        assert!(!result.was_aborted());
        assert_eq!(result.succeeded_ids().collect::<Vec<_>>(), ["b"]);
    }
}
