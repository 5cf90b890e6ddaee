//! SyncOperation - Filesystem mutations produced by the diff engine

use super::RelPath;
use serde::{Deserialize, Serialize};

/// One step of a sync plan, applied to the replica
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SyncOperation {
    /// Create a directory that exists only in the source
    MkDir(RelPath),

    /// Copy a new or changed file from the source
    CopyFile(RelPath),

    /// Remove a file that no longer exists in the source
    DeleteFile(RelPath),

    /// Remove a now-empty directory that no longer exists in the source
    DeleteDir(RelPath),
}

impl SyncOperation {
    pub fn path(&self) -> &RelPath {
        match self {
            SyncOperation::MkDir(path)
            | SyncOperation::CopyFile(path)
            | SyncOperation::DeleteFile(path)
            | SyncOperation::DeleteDir(path) => path,
        }
    }

    /// Short label used in logs and summaries
    pub fn action_name(&self) -> &'static str {
        match self {
            SyncOperation::MkDir(_) => "MkDir",
            SyncOperation::CopyFile(_) => "CopyFile",
            SyncOperation::DeleteFile(_) => "DeleteFile",
            SyncOperation::DeleteDir(_) => "DeleteDir",
        }
    }

    pub fn is_delete(&self) -> bool {
        matches!(self, SyncOperation::DeleteFile(_) | SyncOperation::DeleteDir(_))
    }

    pub fn is_copy(&self) -> bool {
        matches!(self, SyncOperation::CopyFile(_))
    }
}
