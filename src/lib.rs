//! # Roost 🪺
//!
//! Follower-relationship sync and notification diffing for social accounts.
//!
//! ## Overview
//!
//! Roost keeps a local, TTL-governed copy of who follows you and who you
//! follow, works out mutuals, and turns changes between snapshots into a
//! notification feed: new followers, mutual connections, unfollows and
//! follower milestones. Every remote call goes through one shared sliding
//! window rate limiter.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        SyncManager                          │
//! │   Composition root: one cache, one limiter, one client      │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!          ┌───────────────────┼───────────────────┐
//!          ▼                   ▼                   ▼
//! ┌─────────────────┐ ┌─────────────────┐ ┌─────────────────┐
//! │  Notifications  │ │  Relationship   │ │    Insights     │
//! │                 │ │     Client      │ │                 │
//! │ • Snapshot diff │ │ • Fetch + page  │ │ • Summary       │
//! │ • Milestones    │ │ • Mutual flags  │ │ • Strict parse  │
//! │ • Read state    │ │ • Remove/block  │ │ • Fallbacks     │
//! └─────────────────┘ └─────────────────┘ └─────────────────┘
//!          │                   │                   │
//!          └───────────────────┴───────────────────┘
//!                              │
//!          ┌───────────────────┼───────────────────┐
//!          ▼                   ▼                   ▼
//! ┌─────────────────┐ ┌─────────────────┐ ┌─────────────────┐
//! │   Cache Store   │ │  Rate Limiter   │ │       API       │
//! │                 │ │                 │ │                 │
//! │ • Per-category  │ │ • 60s window    │ │ • Bearer auth   │
//! │   TTLs          │ │ • Hard cap      │ │ • 429/403 map   │
//! │ • Id indices    │ │ • Soft throttle │ │ • Pagination    │
//! └─────────────────┘ └─────────────────┘ └─────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`api`] — Remote relationship API trait and HTTP client
//! - [`auth`] — Encrypted bearer-token storage
//! - [`cache`] — TTL cache over the local database
//! - [`clock`] — Injectable time source
//! - [`config`] — Configuration management
//! - [`db`] — `SQLite` key/value store
//! - [`error`] — Error taxonomy
//! - [`insights`] — Analytics and follow suggestions
//! - [`models`] — Data models (Follower, Following, Notification)
//! - [`rate_limit`] — Sliding-window admission control
//! - [`sync`] — Relationship client, diffing and the notification feed
//!
//! ## Example
//!
//! ```no_run
//! use roost::{Config, Database, SyncManager, auth::CredentialStore, clock};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     let token = CredentialStore::open()?.get_token()?;
//!     let manager = SyncManager::from_config(&config, Database::open()?, token, clock::system())?;
//!
//!     for notification in manager.refresh().await {
//!         println!("{} {}", notification.kind.emoji(), notification.message);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Offline first** — Stale cache is served when the network is down
//! - **Polite** — Shared rate limiter with soft backpressure
//! - **Safe batches** — Capped, sequential, with per-item outcomes
//! - **Deterministic** — Clock injection for repeatable tests

#![doc(html_root_url = "https://docs.rs/roost/0.1.0")]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![allow(clippy::unused_async)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::option_if_let_else)]
#![allow(clippy::if_not_else)]
#![allow(clippy::single_match_else)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::trivially_copy_pass_by_ref)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::use_self)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::should_implement_trait)]
#![allow(clippy::similar_names)]
#![allow(clippy::manual_let_else)]
#![allow(clippy::return_self_not_must_use)]

pub mod api;
pub mod auth;
pub mod cache;
pub mod clock;
pub mod config;
pub mod db;
pub mod error;
pub mod insights;
pub mod models;
pub mod paths;
pub mod rate_limit;
pub mod sync;

// Re-export main types for convenience
pub use cache::{CacheCategory, CacheStore};
pub use config::Config;
pub use db::Database;
pub use error::{Result, RoostError};
pub use insights::{InsightService, RelationshipSummary};
pub use models::{
    BatchResult, Follower, Following, ItemOutcome, Notification, NotificationType, UserProfile,
};
pub use rate_limit::RateLimiter;
pub use sync::{DataSource, Fetched, RelationshipClient, Relationships, SyncManager};

/// ASCII logo for the application
pub const LOGO: &str = r"
    ____                  __
   / __ \____  ____  _____/ /_
  / /_/ / __ \/ __ \/ ___/ __/
 / _, _/ /_/ / /_/ (__  ) /_
/_/ |_|\____/\____/____/\__/
";

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Repository URL
pub const REPO_URL: &str = "https://github.com/ricardodantas/roost";
