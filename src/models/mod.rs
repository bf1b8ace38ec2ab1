//! Data models for Roost

mod batch;
mod follower;
mod following;
mod insight;
mod notification;
mod profile;
mod user;

pub use batch::{BatchItem, BatchResult, ItemOutcome};
pub use follower::{EngagementLevel, Follower};
pub use following::Following;
pub use insight::{AnalyticsSummary, Suggestion};
pub use notification::{Notification, NotificationIdGen, NotificationType};
pub use profile::UserProfile;
pub use user::{ContentCategory, Relationship, UserRecord};
