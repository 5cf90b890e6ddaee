//! ScanWarning - Nodes that were seen but not recorded

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Why a node was skipped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarningKind {
    /// Symbolic link (never followed, never mirrored)
    Symlink,

    /// FIFO, socket, device node
    SpecialFile,

    /// Metadata or directory listing could not be read
    Unreadable,

    /// Name cannot be represented as UTF-8
    NonUtf8Name,

    /// Content comparison failed; the file was scheduled for copy
    CompareFailed,
}

impl fmt::Display for WarningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            WarningKind::Symlink => "symbolic link skipped",
            WarningKind::SpecialFile => "special file skipped",
            WarningKind::Unreadable => "unreadable entry skipped",
            WarningKind::NonUtf8Name => "non UTF-8 name skipped",
            WarningKind::CompareFailed => "comparison failed",
        };
        f.write_str(label)
    }
}

/// A non-fatal problem found while scanning or comparing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanWarning {
    /// Absolute path of the offending node
    pub path: PathBuf,
    pub kind: WarningKind,
    pub detail: String,
}

impl ScanWarning {
    pub fn new(path: &Path, kind: WarningKind, detail: impl Into<String>) -> Self {
        Self {
            path: path.to_path_buf(),
            kind,
            detail: detail.into(),
        }
    }
}

impl fmt::Display for ScanWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} ({})", self.kind, self.path.display(), self.detail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_contains_kind_path_and_detail() {
        let warning = ScanWarning::new(
            Path::new("/src/link"),
            WarningKind::Symlink,
            "links are not mirrored",
        );
        let text = warning.to_string();

        assert!(text.contains("symbolic link skipped"));
        assert!(text.contains("/src/link"));
        assert!(text.contains("links are not mirrored"));
    }
}
