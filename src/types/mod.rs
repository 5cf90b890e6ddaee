//! Core type definitions for foldsync

mod action;
mod entry;
mod error;
mod event;
mod path;
mod report;
mod tree;
mod warning;

pub use action::SyncOperation;
pub use entry::{DirEntry, EntryKind};
pub use error::SyncError;
pub(crate) use event::emit;
pub use event::{EventCallback, SyncEvent};
pub use path::RelPath;
pub use report::{OperationFailure, ReportSummary, SyncReport, SyncStatus};
pub use tree::Snapshot;
pub use warning::{ScanWarning, WarningKind};
