//! Remote relationship API
//!
//! [`RelationshipApi`] is the seam between the sync core and the platform.
//! [`http::HttpRelationshipApi`] talks to the real service; tests plug in a
//! scripted fake.

pub mod http;

#[cfg(test)]
pub(crate) mod fake;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::{ContentCategory, EngagementLevel, Follower, Following, UserProfile, UserRecord};

/// Platform operations the sync core needs
#[allow(async_fn_in_trait)]
pub trait RelationshipApi {
    /// Whether a bearer token is configured
    fn has_credentials(&self) -> bool;

    /// One page of the owner's followers
    async fn followers_page(&self, cursor: Option<&str>, limit: usize) -> Result<UserPage>;

    /// One page of the accounts the owner follows
    async fn following_page(&self, cursor: Option<&str>, limit: usize) -> Result<UserPage>;

    /// The owner's own profile
    async fn profile(&self) -> Result<RawProfile>;

    /// Make a follower stop following the owner
    async fn remove_follower(&self, user_id: &str) -> Result<()>;

    /// Block a user
    async fn block_user(&self, user_id: &str) -> Result<()>;
}

/// Which relationship list to page through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    /// Followers
    Followers,
    /// Following
    Following,
}

impl ListKind {
    /// URL path segment
    pub const fn path(&self) -> &'static str {
        match self {
            Self::Followers => "followers",
            Self::Following => "following",
        }
    }
}

// ==================== Wire Types ====================

/// A page of users
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserPage {
    /// Users on this page
    #[serde(default, alias = "data")]
    pub users: Vec<RawUser>,
    /// Cursor for the next page; absent on the last page
    #[serde(default)]
    pub next_cursor: Option<String>,
}

/// A user as the API returns it. Every field but `id` may be missing.
#[allow(missing_docs)]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawUser {
    /// Platform id
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub follower_count: Option<u64>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub is_verified: Option<bool>,
    /// When the relationship started
    #[serde(default, alias = "created_at")]
    pub followed_at: Option<DateTime<Utc>>,
    /// 0..=100 interaction score
    #[serde(default)]
    pub engagement_score: Option<u32>,
    #[serde(default)]
    pub last_interaction: Option<DateTime<Utc>>,
    #[serde(default)]
    pub mutual_connections: Option<u32>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

/// The owner's profile as the API returns it
#[allow(missing_docs)]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawProfile {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub follower_count: Option<u64>,
    #[serde(default)]
    pub following_count: Option<u64>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub is_verified: Option<bool>,
}

impl RawUser {
    /// Score clamped into 0..=100
    fn score(&self) -> u8 {
        self.engagement_score.map_or(0, |s| s.min(100) as u8)
    }

    fn followed_at_or_epoch(&self) -> DateTime<Utc> {
        self.followed_at.unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
    }

    fn into_user_record(self) -> Option<UserRecord> {
        let id = self.id.trim();
        if id.is_empty() {
            return None;
        }
        let bio = self.bio.unwrap_or_default();
        Some(UserRecord {
            id: id.to_string(),
            username: self.username.unwrap_or_default(),
            display_name: self.display_name.unwrap_or_default(),
            avatar_url: self.avatar_url.filter(|u| !u.is_empty()),
            is_verified: self.is_verified.unwrap_or(false),
            follower_count: self.follower_count.unwrap_or(0),
            content_category: ContentCategory::infer(&bio),
            bio,
        })
    }

    /// Normalize into a follower; `None` when the record has no id
    pub fn into_follower(self) -> Option<Follower> {
        let followed_at = self.followed_at_or_epoch();
        let engagement_level = EngagementLevel::from_score(self.score());
        Some(Follower {
            user: self.into_user_record()?,
            followed_at,
            is_mutual: false,
            engagement_level,
        })
    }

    /// Normalize into a followed account; `None` when the record has no id
    pub fn into_following(self) -> Option<Following> {
        let followed_at = self.followed_at_or_epoch();
        let engagement_score = self.score();
        let last_interaction = self.last_interaction;
        let mutual_connections = self.mutual_connections.unwrap_or(0);
        let is_active = self.is_active.unwrap_or(false);
        Some(Following {
            user: self.into_user_record()?,
            followed_at,
            follows_back: false,
            engagement_score,
            last_interaction,
            mutual_connections,
            is_active,
        })
    }
}

impl RawProfile {
    /// Normalize into a profile stamped with `fetched_at`
    pub fn into_profile(self, fetched_at: DateTime<Utc>) -> UserProfile {
        UserProfile {
            id: self.id,
            username: self.username.unwrap_or_default(),
            display_name: self.display_name.unwrap_or_default(),
            avatar_url: self.avatar_url.filter(|u| !u.is_empty()),
            is_verified: self.is_verified.unwrap_or(false),
            follower_count: self.follower_count.unwrap_or(0),
            following_count: self.following_count.unwrap_or(0),
            bio: self.bio.unwrap_or_default(),
            fetched_at,
        }
    }
}
