//! SyncEvent - Structured event stream emitted by the engine

use super::{ScanWarning, SyncError, SyncOperation, SyncReport};
use std::path::Path;

/// Events emitted while a run scans, plans and applies
///
/// Mutation events are emitted right before the mutation is attempted.
/// Each run ends with exactly one terminal event: `Aborted` or `Completed`.
#[derive(Debug)]
pub enum SyncEvent<'a> {
    CreatingDirectory {
        path: &'a Path,
    },
    Copying {
        source: &'a Path,
        destination: &'a Path,
    },
    Deleting {
        path: &'a Path,
    },
    /// An operation failed; the executor moves on to the next one
    OperationFailed {
        operation: &'a SyncOperation,
        error: &'a SyncError,
    },
    Warning {
        warning: &'a ScanWarning,
    },
    Aborted {
        reason: &'a str,
    },
    Completed {
        report: &'a SyncReport,
    },
}

impl SyncEvent<'_> {
    /// True for `Aborted` and `Completed`
    pub fn is_terminal(&self) -> bool {
        matches!(self, SyncEvent::Aborted { .. } | SyncEvent::Completed { .. })
    }
}

/// Event sink passed into the engine
pub type EventCallback = dyn Fn(&SyncEvent<'_>) + Send + Sync;

pub(crate) fn emit(on_event: Option<&EventCallback>, event: SyncEvent<'_>) {
    if let Some(callback) = on_event {
        callback(&event);
    }
}
