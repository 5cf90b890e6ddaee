//! RelPath - Identity key of an entry inside a tree

use camino::{Utf8Component, Utf8Path};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Relative path from a tree root, always `/`-separated
///
/// Two snapshots of different roots are compared by these keys, so the
/// representation must not depend on the platform separator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RelPath(String);

impl RelPath {
    /// Build a key from a native path relative to a root
    ///
    /// Returns `None` for empty paths, absolute paths, paths that climb with
    /// `..`, and paths that are not valid UTF-8.
    pub fn from_native(path: &Path) -> Option<Self> {
        let utf8 = Utf8Path::from_path(path)?;
        let mut segments = Vec::new();

        for component in utf8.components() {
            match component {
                Utf8Component::Normal(segment) => segments.push(segment),
                Utf8Component::CurDir => continue,
                _ => return None,
            }
        }

        if segments.is_empty() {
            return None;
        }

        Some(Self(segments.join("/")))
    }

    /// Parse a `/`-separated string
    pub fn parse(path: &str) -> Option<Self> {
        Self::from_native(Path::new(path))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Path segments from the root down
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/')
    }

    /// Last segment
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    /// Parent key, `None` for top-level entries
    pub fn parent(&self) -> Option<RelPath> {
        self.0.rfind('/').map(|idx| RelPath(self.0[..idx].to_string()))
    }

    /// This path followed by each of its parents, deepest first
    pub fn ancestors(&self) -> impl Iterator<Item = RelPath> {
        std::iter::successors(Some(self.clone()), RelPath::parent)
    }

    /// Number of segments (`a` is 1, `a/b` is 2)
    pub fn depth(&self) -> usize {
        self.0.matches('/').count() + 1
    }

    /// Append a single child segment
    pub fn join(&self, child: &str) -> RelPath {
        RelPath(format!("{}/{}", self.0, child))
    }

    /// True if `self` is `other` or lies beneath it
    pub fn starts_with(&self, other: &RelPath) -> bool {
        self.0 == other.0
            || (self.0.starts_with(&other.0) && self.0.as_bytes().get(other.0.len()) == Some(&b'/'))
    }

    /// Resolve against a root using the platform separator
    pub fn to_native(&self, root: &Path) -> PathBuf {
        let mut native = root.to_path_buf();
        for segment in self.segments() {
            native.push(segment);
        }
        native
    }
}

impl fmt::Display for RelPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
