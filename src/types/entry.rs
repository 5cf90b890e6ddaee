//! DirEntry - Represents a single node in a scanned tree

use super::RelPath;
use serde::{Deserialize, Serialize};
use std::time::SystemTime;

/// Node type recorded by the scanner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryKind {
    Directory,
    File,
}

/// Represents a directory or regular file in a snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirEntry {
    /// Relative path from the snapshot root
    pub path: RelPath,

    pub kind: EntryKind,

    /// File size in bytes (0 for directories)
    pub size: u64,

    /// Last modification time (files only)
    pub mtime: Option<SystemTime>,
}

impl DirEntry {
    /// Create a file entry
    pub fn file(path: RelPath, size: u64, mtime: SystemTime) -> Self {
        Self {
            path,
            kind: EntryKind::File,
            size,
            mtime: Some(mtime),
        }
    }

    /// Create a directory entry
    pub fn directory(path: RelPath) -> Self {
        Self {
            path,
            kind: EntryKind::Directory,
            size: 0,
            mtime: None,
        }
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }
}
