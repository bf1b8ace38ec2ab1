//! Configuration module for Roost

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use crate::paths;

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the relationship API
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Number of users requested per page
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Upper bound on pages fetched per list
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,

    /// Connect/receive timeout for remote calls, in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Auto-refresh interval in seconds (0 = manual only)
    #[serde(default)]
    pub refresh_interval_secs: u64,

    /// Maximum ids accepted by a batch remove/block, at most 10
    #[serde(default = "default_batch_limit")]
    pub batch_limit: usize,

    /// Outbound request admission
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Cache freshness
    #[serde(default)]
    pub cache: CacheConfig,

    /// Notification feed
    #[serde(default)]
    pub notifications: NotificationConfig,
}

/// Sliding-window rate limit settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Requests allowed per window
    #[serde(default = "default_max_requests")]
    pub max_requests: usize,

    /// Window length in seconds
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,

    /// Fraction of the cap at which callers start slowing down
    #[serde(default = "default_throttle_ratio")]
    pub throttle_ratio: f64,

    /// Soft backpressure delay in milliseconds
    #[serde(default = "default_throttle_delay_ms")]
    pub throttle_delay_ms: u64,
}

/// Per-category cache TTLs, in hours
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Followers list
    #[serde(default = "default_relationship_ttl")]
    pub followers_ttl_hours: u64,

    /// Following list
    #[serde(default = "default_relationship_ttl")]
    pub following_ttl_hours: u64,

    /// AI analytics summary
    #[serde(default = "default_analytics_ttl")]
    pub analytics_ttl_hours: u64,

    /// Notification feed
    #[serde(default = "default_notifications_ttl")]
    pub notifications_ttl_hours: u64,

    /// Account owner's profile
    #[serde(default = "default_relationship_ttl")]
    pub profile_ttl_hours: u64,
}

/// Notification feed settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// Entries kept after each merge (oldest dropped first)
    #[serde(default = "default_max_retained")]
    pub max_retained: usize,

    /// Follower counts that raise a one-time milestone notification
    #[serde(default = "default_milestones")]
    pub milestones: Vec<usize>,
}

fn default_api_base_url() -> String {
    "https://api.example-social.com".to_string()
}

fn default_page_size() -> usize {
    50
}

fn default_max_pages() -> usize {
    40
}

fn default_request_timeout() -> u64 {
    30
}

fn default_batch_limit() -> usize {
    10
}

fn default_max_requests() -> usize {
    100
}

fn default_window_secs() -> u64 {
    60
}

fn default_throttle_ratio() -> f64 {
    0.8
}

fn default_throttle_delay_ms() -> u64 {
    500
}

fn default_relationship_ttl() -> u64 {
    24
}

fn default_analytics_ttl() -> u64 {
    12
}

fn default_notifications_ttl() -> u64 {
    48
}

fn default_max_retained() -> usize {
    200
}

fn default_milestones() -> Vec<usize> {
    vec![100, 500, 1_000, 5_000, 10_000, 50_000, 100_000, 1_000_000]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            page_size: default_page_size(),
            max_pages: default_max_pages(),
            request_timeout_secs: default_request_timeout(),
            refresh_interval_secs: 0,
            batch_limit: default_batch_limit(),
            rate_limit: RateLimitConfig::default(),
            cache: CacheConfig::default(),
            notifications: NotificationConfig::default(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: default_max_requests(),
            window_secs: default_window_secs(),
            throttle_ratio: default_throttle_ratio(),
            throttle_delay_ms: default_throttle_delay_ms(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            followers_ttl_hours: default_relationship_ttl(),
            following_ttl_hours: default_relationship_ttl(),
            analytics_ttl_hours: default_analytics_ttl(),
            notifications_ttl_hours: default_notifications_ttl(),
            profile_ttl_hours: default_relationship_ttl(),
        }
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            max_retained: default_max_retained(),
            milestones: default_milestones(),
        }
    }
}

impl Config {
    /// Get the default config file path
    pub fn default_path() -> Result<PathBuf> {
        paths::config_path()
    }

    /// Load config from the default path or create default
    pub fn load() -> Result<Self> {
        let path = Self::default_path()?;
        Self::load_from(&path)
    }

    /// Load config from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path).context("Failed to read config file")?;
            toml::from_str(&content).context("Failed to parse config file")
        } else {
            Ok(Self::default())
        }
    }

    /// Save config to the default path
    pub fn save(&self) -> Result<()> {
        let path = Self::default_path()?;
        self.save_to(&path)
    }

    /// Save config to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content).context("Failed to write config file")?;

        Ok(())
    }

    /// Remote call timeout
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
