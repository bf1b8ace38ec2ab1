//! Follower model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Relationship, UserRecord};

/// Someone who follows the account owner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Follower {
    /// The follower
    #[serde(flatten)]
    pub user: UserRecord,
    /// When they started following
    pub followed_at: DateTime<Utc>,
    /// Whether the owner follows them back
    #[serde(default)]
    pub is_mutual: bool,
    /// How much they interact with the owner
    #[serde(default)]
    pub engagement_level: EngagementLevel,
}

impl Relationship for Follower {
    fn user(&self) -> &UserRecord {
        &self.user
    }

    fn followed_at(&self) -> DateTime<Utc> {
        self.followed_at
    }
}

/// Coarse engagement bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngagementLevel {
    /// Rarely interacts
    #[default]
    Low,
    /// Interacts now and then
    Medium,
    /// Interacts often
    High,
}

impl EngagementLevel {
    /// Bucket a 0..=100 score
    pub const fn from_score(score: u8) -> Self {
        match score {
            70.. => Self::High,
            40..=69 => Self::Medium,
            _ => Self::Low,
        }
    }

    /// Get level as string
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engagement_buckets() {
        assert_eq!(EngagementLevel::from_score(0), EngagementLevel::Low);
        assert_eq!(EngagementLevel::from_score(39), EngagementLevel::Low);
        assert_eq!(EngagementLevel::from_score(40), EngagementLevel::Medium);
        assert_eq!(EngagementLevel::from_score(69), EngagementLevel::Medium);
        assert_eq!(EngagementLevel::from_score(70), EngagementLevel::High);
        assert_eq!(EngagementLevel::from_score(100), EngagementLevel::High);
    }

    #[test]
    fn test_flattened_json_shape() {
        let follower = Follower {
            user: UserRecord::with_id("u1"),
            followed_at: DateTime::<Utc>::UNIX_EPOCH,
            is_mutual: true,
            engagement_level: EngagementLevel::High,
        };
        let json = serde_json::to_value(&follower).unwrap();
        assert_eq!(json["id"], "u1");
        assert_eq!(json["engagement_level"], "high");
        let back: Follower = serde_json::from_value(json).unwrap();
        assert_eq!(back, follower);
    }
}
