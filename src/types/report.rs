//! SyncReport - Outcome of one sync run

use super::{ScanWarning, SyncError, SyncOperation};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Overall result of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    /// Every scheduled operation succeeded
    Success,

    /// The run completed but some operations failed
    PartialFailure,

    /// A precondition failed and no operation ran
    Aborted,
}

/// An operation that failed during apply
#[derive(Debug)]
pub struct OperationFailure {
    pub operation: SyncOperation,
    pub error: SyncError,
}

/// Aggregate result of one run, created fresh each time
#[derive(Debug)]
pub struct SyncReport {
    pub status: SyncStatus,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,

    /// Every operation attempted, in execution order
    pub attempted: Vec<SyncOperation>,

    /// Subset of `attempted` that failed, with the cause
    pub failures: Vec<OperationFailure>,

    pub warnings: Vec<ScanWarning>,
    pub bytes_copied: u64,

    /// Set only when `status` is `Aborted`
    pub abort_reason: Option<String>,
}

/// Serializable digest of a report, for structured logging
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub status: SyncStatus,
    pub started_at: DateTime<Utc>,
    pub attempted: usize,
    pub failed: usize,
    pub warnings: usize,
    pub directories_created: usize,
    pub files_copied: usize,
    pub files_deleted: usize,
    pub directories_deleted: usize,
    pub bytes_copied: u64,
    pub duration_ms: u64,
}

impl SyncReport {
    /// Start a new report timestamped now
    pub fn begin() -> Self {
        let now = Utc::now();
        Self {
            status: SyncStatus::Success,
            started_at: now,
            finished_at: now,
            attempted: Vec::new(),
            failures: Vec::new(),
            warnings: Vec::new(),
            bytes_copied: 0,
            abort_reason: None,
        }
    }

    /// A run that stopped before touching the replica
    pub fn aborted(started_at: DateTime<Utc>, reason: impl Into<String>) -> Self {
        Self {
            status: SyncStatus::Aborted,
            started_at,
            finished_at: Utc::now(),
            abort_reason: Some(reason.into()),
            ..Self::begin()
        }
    }

    pub fn record_success(&mut self, operation: SyncOperation, bytes_copied: u64) {
        self.attempted.push(operation);
        self.bytes_copied += bytes_copied;
    }

    pub fn record_failure(&mut self, operation: SyncOperation, error: SyncError) {
        self.attempted.push(operation.clone());
        self.failures.push(OperationFailure { operation, error });
    }

    /// Stamp the finish time and derive the final status
    pub fn finish(&mut self) {
        self.finished_at = Utc::now();
        if self.status != SyncStatus::Aborted {
            self.status = if self.failures.is_empty() {
                SyncStatus::Success
            } else {
                SyncStatus::PartialFailure
            };
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == SyncStatus::Success
    }

    pub fn succeeded_count(&self) -> usize {
        self.attempted.len().saturating_sub(self.failures.len())
    }

    /// Wall-clock time between start and finish
    pub fn duration(&self) -> Duration {
        (self.finished_at - self.started_at)
            .to_std()
            .unwrap_or_default()
    }

    pub fn summary(&self) -> ReportSummary {
        ReportSummary {
            status: self.status,
            started_at: self.started_at,
            attempted: self.attempted.len(),
            failed: self.failures.len(),
            warnings: self.warnings.len(),
            directories_created: self.succeeded_where(|op| matches!(op, SyncOperation::MkDir(_))),
            files_copied: self.succeeded_where(SyncOperation::is_copy),
            files_deleted: self.succeeded_where(|op| matches!(op, SyncOperation::DeleteFile(_))),
            directories_deleted: self
                .succeeded_where(|op| matches!(op, SyncOperation::DeleteDir(_))),
            bytes_copied: self.bytes_copied,
            duration_ms: self.duration().as_millis() as u64,
        }
    }

    fn succeeded_where(&self, predicate: impl Fn(&SyncOperation) -> bool) -> usize {
        let attempted = self.attempted.iter().filter(|&op| predicate(op)).count();
        let failed = self
            .failures
            .iter()
            .filter(|failure| predicate(&failure.operation))
            .count();
        attempted.saturating_sub(failed)
    }
}

impl Default for SyncReport {
    fn default() -> Self {
        Self::begin()
    }
}
