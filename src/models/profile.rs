//! Account owner's own profile

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The authenticated user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Platform id
    pub id: String,
    /// Handle without the leading @
    pub username: String,
    /// Display name
    pub display_name: String,
    /// Avatar URL
    pub avatar_url: Option<String>,
    /// Verified badge
    pub is_verified: bool,
    /// Follower count as reported by the platform
    pub follower_count: u64,
    /// Following count as reported by the platform
    pub following_count: u64,
    /// Profile bio
    pub bio: String,
    /// When this copy was fetched
    pub fetched_at: DateTime<Utc>,
}
