//! Snapshot - Point-in-time listing of one directory tree

use super::{DirEntry, EntryKind, RelPath, ScanWarning, WarningKind};
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::time::Duration;

/// Ordered listing of a tree rooted at `root_path`
///
/// Entries keep the order they were inserted in. The scanner inserts in
/// pre-order, so a directory always precedes its descendants.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    entries: Vec<DirEntry>,

    /// Map: relative_path → position in `entries`
    index: HashMap<RelPath, usize>,

    /// Paths that exist under the root but were not recorded
    pub skipped: HashSet<RelPath>,

    /// Skipped symlinks and special files, a subset of `skipped`
    ///
    /// Unlinking one of these never touches what it points at.
    pub links: HashSet<RelPath>,

    pub warnings: Vec<ScanWarning>,

    /// Aggregate statistics
    pub total_size: u64,
    pub total_files: usize,
    pub total_dirs: usize,

    /// Scan metadata
    pub scan_duration: Duration,
    pub root_path: PathBuf,
}

impl Snapshot {
    /// Create a new empty Snapshot
    pub fn new(root_path: PathBuf) -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
            skipped: HashSet::new(),
            links: HashSet::new(),
            warnings: Vec::new(),
            total_size: 0,
            total_files: 0,
            total_dirs: 0,
            scan_duration: Duration::from_secs(0),
            root_path,
        }
    }

    /// Insert an entry
    ///
    /// Updates aggregate statistics. If the path already exists, the old entry
    /// is replaced in place (keeping its position) and statistics are adjusted.
    pub fn insert(&mut self, entry: DirEntry) {
        self.count(&entry);

        let existing = self.index.get(&entry.path).copied();
        match existing {
            Some(position) => {
                let old_entry = std::mem::replace(&mut self.entries[position], entry);
                self.uncount(&old_entry);
            }
            None => {
                self.index.insert(entry.path.clone(), self.entries.len());
                self.entries.push(entry);
            }
        }
    }

    /// Record a path that exists but is not part of the listing
    pub fn skip(&mut self, path: RelPath, warning: ScanWarning) {
        if matches!(warning.kind, WarningKind::Symlink | WarningKind::SpecialFile) {
            self.links.insert(path.clone());
        }
        self.skipped.insert(path);
        self.warnings.push(warning);
    }

    /// True if the path, or one of its ancestors, was skipped
    pub fn is_protected(&self, path: &RelPath) -> bool {
        !self.skipped.is_empty() && path.ancestors().any(|ancestor| self.skipped.contains(&ancestor))
    }

    /// Get an entry by path
    pub fn get(&self, path: &RelPath) -> Option<&DirEntry> {
        self.index.get(path).map(|&position| &self.entries[position])
    }

    /// Check if a path exists in the snapshot
    pub fn contains(&self, path: &RelPath) -> bool {
        self.index.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion (pre-)order
    pub fn iter(&self) -> std::slice::Iter<'_, DirEntry> {
        self.entries.iter()
    }

    /// Just the paths, in insertion order
    pub fn paths(&self) -> impl Iterator<Item = &RelPath> {
        self.entries.iter().map(|entry| &entry.path)
    }

    /// Set the scan duration after scanning completes
    pub fn set_scan_duration(&mut self, duration: Duration) {
        self.scan_duration = duration;
    }

    fn count(&mut self, entry: &DirEntry) {
        match entry.kind {
            EntryKind::File => {
                self.total_files += 1;
                self.total_size += entry.size;
            }
            EntryKind::Directory => self.total_dirs += 1,
        }
    }

    fn uncount(&mut self, entry: &DirEntry) {
        match entry.kind {
            EntryKind::File => {
                self.total_files = self.total_files.saturating_sub(1);
                self.total_size = self.total_size.saturating_sub(entry.size);
            }
            EntryKind::Directory => self.total_dirs = self.total_dirs.saturating_sub(1),
        }
    }
}
