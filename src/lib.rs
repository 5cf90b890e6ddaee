//! # foldsync - One-way folder mirroring
//!
//! Keeps a replica directory an exact copy of a source directory. Each run
//! scans both trees, plans the minimal set of operations and applies them
//! in an order that is always safe: deletions children-first, creations
//! parents-first.

// Module declarations
pub mod commands;
pub mod config;
pub mod diff;
pub mod executor;
pub mod logging;
pub mod scanner;
pub mod types;

// Re-export commonly used types
pub use commands::{run_sync, Scheduler};
pub use config::Config;
pub use types::{
    DirEntry, EntryKind, EventCallback, RelPath, Snapshot, SyncError, SyncEvent, SyncOperation,
    SyncReport, SyncStatus,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
