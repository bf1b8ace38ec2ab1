//! Outcome of a batch remove/block

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// What happened to one id in a batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ItemOutcome {
    /// The remote call succeeded
    Succeeded,
    /// The remote call was made and failed
    Failed {
        /// Error text
        reason: String,
    },
    /// Never attempted because the batch was aborted first
    Skipped {
        /// Why the batch stopped
        reason: String,
    },
}

impl ItemOutcome {
    /// Whether this item did not go through
    pub const fn is_failure(&self) -> bool {
        !matches!(self, Self::Succeeded)
    }
}

/// One id and its outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchItem {
    /// Target user id
    pub user_id: String,
    /// Result for that id
    pub outcome: ItemOutcome,
}

/// Per-item report for a batch operation.
///
/// `success_count + failure_count` equals the number of items actually
/// attempted; `skipped_count` covers the rest after a rate-limit abort.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchResult {
    /// Outcomes in request order
    pub items: Vec<BatchItem>,
    /// Attempted and succeeded
    pub success_count: usize,
    /// Attempted and failed
    pub failure_count: usize,
    /// Not attempted
    pub skipped_count: usize,
    /// Set when a rate limit stopped the batch early
    pub retry_after: Option<Duration>,
}

impl BatchResult {
    /// Record an outcome, keeping the counters in step
    pub fn record(&mut self, user_id: impl Into<String>, outcome: ItemOutcome) {
        match &outcome {
            ItemOutcome::Succeeded => self.success_count += 1,
            ItemOutcome::Failed { .. } => self.failure_count += 1,
            ItemOutcome::Skipped { .. } => self.skipped_count += 1,
        }
        self.items.push(BatchItem {
            user_id: user_id.into(),
            outcome,
        });
    }

    /// Items a remote call was made for
    pub const fn attempted(&self) -> usize {
        self.success_count + self.failure_count
    }

    /// Whether a rate limit cut the batch short
    pub const fn was_aborted(&self) -> bool {
        self.retry_after.is_some()
    }

    /// Look up the outcome for an id
    pub fn outcome(&self, user_id: &str) -> Option<&ItemOutcome> {
        self.items
            .iter()
            .find(|item| item.user_id == user_id)
            .map(|item| &item.outcome)
    }

    /// Ids that went through
    pub fn succeeded_ids(&self) -> impl Iterator<Item = &str> {
        self.items
            .iter()
            .filter(|item| !item.outcome.is_failure())
            .map(|item| item.user_id.as_str())
    }
}
