//! Error types for relationship sync

use std::time::Duration;

use thiserror::Error;

/// Errors surfaced by the relationship sync core.
#[derive(Debug, Error)]
pub enum RoostError {
    /// No bearer token is available.
    #[error("not authenticated: run `roost login <token>` first")]
    Unauthenticated,

    /// Too many requests, locally or remotely.
    #[error("rate limit exceeded (retry after {}s)", retry_after.as_secs().max(1))]
    RateLimitExceeded {
        /// How long to wait before trying again
        retry_after: Duration,
    },

    /// The token lacks the scope needed for this operation.
    #[error("insufficient permission: the access token is missing a required scope")]
    InsufficientPermission,

    /// Generic network or API failure.
    #[error("remote error{}: {message}", status_code.map(|c| format!(" {c}")).unwrap_or_default())]
    Remote {
        /// HTTP status, `None` when the request never got a response
        status_code: Option<u16>,
        /// Server or transport message
        message: String,
    },

    /// A batch operation was asked to process too many ids.
    #[error("batch of {requested} ids exceeds the limit of {max}")]
    BatchTooLarge {
        /// Number of ids passed in
        requested: usize,
        /// Configured cap
        max: usize,
    },

    /// A stored payload could not be decoded. Never leaves the cache layer.
    #[error("cached {category} payload is corrupt: {reason}")]
    CacheCorrupt {
        /// Cache category key
        category: &'static str,
        /// Decoder message
        reason: String,
    },

    /// Local storage failed.
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl RoostError {
    /// Build a transport-level error (no HTTP status)
    pub fn network(message: impl Into<String>) -> Self {
        Self::Remote {
            status_code: None,
            message: message.into(),
        }
    }

    /// Whether the same call may succeed if repeated later
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::RateLimitExceeded { .. } => true,
            Self::Remote { status_code, .. } => match status_code {
                None => true,
                Some(code) => *code >= 500,
            },
            _ => false,
        }
    }

    /// Whether a cached copy may stand in for the failed remote call.
    ///
    /// A rejected token counts as having no credential at all.
    pub const fn allows_cache_fallback(&self) -> bool {
        matches!(self, Self::Remote { .. } | Self::Unauthenticated)
    }
}

impl From<reqwest::Error> for RoostError {
    fn from(err: reqwest::Error) -> Self {
        Self::Remote {
            status_code: err.status().map(|s| s.as_u16()),
            message: err.to_string(),
        }
    }
}

/// Result alias used across the sync core
pub type Result<T, E = RoostError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_kinds() {
        assert!(
            RoostError::RateLimitExceeded {
                retry_after: Duration::from_secs(3)
            }
            .is_retryable()
        );
        assert!(RoostError::network("connection reset").is_retryable());
        assert!(
            RoostError::Remote {
                status_code: Some(503),
                message: "unavailable".into()
            }
            .is_retryable()
        );
        assert!(
            !RoostError::Remote {
                status_code: Some(404),
                message: "gone".into()
            }
            .is_retryable()
        );
        assert!(!RoostError::InsufficientPermission.is_retryable());
        assert!(!RoostError::Unauthenticated.is_retryable());
    }

    #[test]
    fn test_cache_fallback_kinds() {
        assert!(RoostError::network("reset").allows_cache_fallback());
        assert!(RoostError::Unauthenticated.allows_cache_fallback());
        assert!(!RoostError::InsufficientPermission.allows_cache_fallback());
        assert!(
            !RoostError::RateLimitExceeded {
                retry_after: Duration::from_secs(1)
            }
            .allows_cache_fallback()
        );
    }

    #[test]
    fn test_display_messages() {
        let err = RoostError::RateLimitExceeded {
            retry_after: Duration::from_millis(200),
        };
        assert_eq!(err.to_string(), "rate limit exceeded (retry after 1s)");

        let err = RoostError::Remote {
            status_code: Some(500),
            message: "boom".into(),
        };
        assert_eq!(err.to_string(), "remote error 500: boom");

        assert_eq!(
            RoostError::network("timed out").to_string(),
            "remote error: timed out"
        );
    }
}
