//! Notification model

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Follower, Relationship};

/// Kind of relationship event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    /// Someone started following the owner
    NewFollower,
    /// A new follower the owner already follows
    MutualConnection,
    /// A follower left
    Unfollow,
    /// Follower count crossed a threshold
    Milestone,
}

impl NotificationType {
    /// Get type as string
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NewFollower => "new_follower",
            Self::MutualConnection => "mutual_connection",
            Self::Unfollow => "unfollow",
            Self::Milestone => "milestone",
        }
    }

    /// Get emoji for type
    pub const fn emoji(&self) -> &'static str {
        match self {
            Self::NewFollower => "👋",
            Self::MutualConnection => "🤝",
            Self::Unfollow => "👋💨",
            Self::Milestone => "🎉",
        }
    }
}

/// A feed entry. Only `is_read` changes after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Monotonic id derived from creation time plus a sequence
    pub id: u64,
    /// Event kind
    #[serde(rename = "type")]
    pub kind: NotificationType,
    /// Short headline
    pub title: String,
    /// Body text
    pub message: String,
    /// Avatar of the user involved
    pub avatar: Option<String>,
    /// Creation time
    pub timestamp: DateTime<Utc>,
    /// Whether the owner has seen it
    #[serde(default)]
    pub is_read: bool,
    /// Whether the UI should offer an action (e.g. follow back)
    pub actionable: bool,
    /// The user involved, if any
    pub user_id: Option<String>,
}

impl Notification {
    /// A new follower, upgraded to a mutual connection when the owner follows them already
    pub fn for_new_follower(id: u64, follower: &Follower, at: DateTime<Utc>) -> Self {
        let name = follower.user.label();
        let (kind, title, message) = if follower.is_mutual {
            (
                NotificationType::MutualConnection,
                "New mutual connection".to_string(),
                format!("{name} followed you back. You now follow each other."),
            )
        } else {
            (
                NotificationType::NewFollower,
                "New follower".to_string(),
                format!("{name} started following you."),
            )
        };

        Self {
            id,
            kind,
            title,
            message,
            avatar: follower.user.avatar_url.clone(),
            timestamp: at,
            is_read: false,
            actionable: true,
            user_id: Some(follower.id().to_string()),
        }
    }

    /// A follower who is gone; only their id is still known
    pub fn for_unfollow(id: u64, user_id: &str, at: DateTime<Utc>) -> Self {
        Self {
            id,
            kind: NotificationType::Unfollow,
            title: "Lost a follower".to_string(),
            message: format!("User {user_id} unfollowed you."),
            avatar: None,
            timestamp: at,
            is_read: false,
            actionable: false,
            user_id: Some(user_id.to_string()),
        }
    }

    /// Follower count crossed `threshold`
    pub fn for_milestone(id: u64, threshold: usize, at: DateTime<Utc>) -> Self {
        Self {
            id,
            kind: NotificationType::Milestone,
            title: "Milestone reached!".to_string(),
            message: format!("You now have {threshold} followers."),
            avatar: None,
            timestamp: at,
            is_read: false,
            actionable: false,
            user_id: None,
        }
    }
}

/// Hands out strictly increasing notification ids.
///
/// An id is `millis_since_epoch * 1000 + sequence`; when the clock stalls or
/// goes backwards the previous id plus one is used instead.
#[derive(Debug, Default)]
pub struct NotificationIdGen {
    last: AtomicU64,
}

impl NotificationIdGen {
    /// Make sure later ids are above `id`
    pub fn observe(&self, id: u64) {
        self.last.fetch_max(id, Ordering::AcqRel);
    }

    /// Next id for a notification created at `at`
    pub fn next(&self, at: DateTime<Utc>) -> u64 {
        let base = u64::try_from(at.timestamp_millis())
            .unwrap_or(0)
            .saturating_mul(1000);
        let mut current = self.last.load(Ordering::Relaxed);
        loop {
            let candidate = base.max(current.saturating_add(1));
            match self.last.compare_exchange_weak(
                current,
                candidate,
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => return candidate,
                Err(actual) => current = actual,
            }
        }
    }
}
