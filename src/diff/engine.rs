//! Sync plan types

use crate::types::{ScanWarning, SyncOperation};

/// Ordered operations plus statistics about them
#[derive(Debug, Clone, PartialEq)]
pub struct SyncPlan {
    /// Operations in execution order
    pub operations: Vec<SyncOperation>,

    /// Aggregate statistics about the plan
    pub stats: PlanStats,

    /// Problems met while planning (e.g. a comparison that could not read a file)
    pub warnings: Vec<ScanWarning>,
}

impl SyncPlan {
    /// Create a new empty plan
    pub fn new() -> Self {
        Self {
            operations: Vec::new(),
            stats: PlanStats::default(),
            warnings: Vec::new(),
        }
    }

    /// Append an operation and update statistics
    ///
    /// `bytes` is the source size for copies and ignored otherwise.
    pub fn add_operation(&mut self, operation: SyncOperation, bytes: u64) {
        match &operation {
            SyncOperation::MkDir(_) => self.stats.mkdir_count += 1,
            SyncOperation::CopyFile(_) => {
                self.stats.copy_count += 1;
                self.stats.copy_bytes += bytes;
            }
            SyncOperation::DeleteFile(_) => self.stats.delete_file_count += 1,
            SyncOperation::DeleteDir(_) => self.stats.delete_dir_count += 1,
        }

        self.operations.push(operation);
    }

    /// Count a source entry that already matches the replica
    pub fn mark_unchanged(&mut self) {
        self.stats.unchanged_count += 1;
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

impl Default for SyncPlan {
    fn default() -> Self {
        Self::new()
    }
}

/// Statistics about a sync plan
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PlanStats {
    pub mkdir_count: usize,
    pub copy_count: usize,

    /// Total bytes to transfer
    pub copy_bytes: u64,

    pub delete_file_count: usize,
    pub delete_dir_count: usize,

    /// Source entries that need no operation
    pub unchanged_count: usize,
}

impl PlanStats {
    /// Number of operations that mutate the replica
    pub fn total_operations(&self) -> usize {
        self.mkdir_count + self.copy_count + self.delete_file_count + self.delete_dir_count
    }
}
