//! Followed-account model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Relationship, UserRecord};

/// An account the owner follows
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Following {
    /// The followed account
    #[serde(flatten)]
    pub user: UserRecord,
    /// When the owner followed them
    pub followed_at: DateTime<Utc>,
    /// Whether they follow the owner back
    #[serde(default)]
    pub follows_back: bool,
    /// Interaction score, 0..=100
    #[serde(default)]
    pub engagement_score: u8,
    /// Last interaction with the owner, if known
    #[serde(default)]
    pub last_interaction: Option<DateTime<Utc>>,
    /// Accounts both sides follow
    #[serde(default)]
    pub mutual_connections: u32,
    /// Whether the account posted recently
    #[serde(default)]
    pub is_active: bool,
}

impl Relationship for Following {
    fn user(&self) -> &UserRecord {
        &self.user
    }

    fn followed_at(&self) -> DateTime<Utc> {
        self.followed_at
    }
}
