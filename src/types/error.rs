//! Error types for foldsync

use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error types for foldsync operations
#[derive(Debug, Error)]
pub enum SyncError {
    /// Standard IO error (automatically converted via #[from])
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// A sync root does not exist
    #[error("Root folder does not exist: {path}")]
    RootNotFound { path: PathBuf },

    /// A sync root exists but is not a directory
    #[error("Not a directory: {path}")]
    NotADirectory { path: PathBuf },

    /// The walk could not be completed in a way that keeps the listing trustworthy
    #[error("Failed to scan {path}: {detail}")]
    Scan { path: PathBuf, detail: String },

    /// Permission denied for specific path
    #[error("Permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    /// No space left on the replica device
    #[error("Disk full while writing {path}")]
    DiskFull { path: PathBuf },

    /// A replica path runs through a symbolic link; writing would leave the replica
    #[error("Refusing to write through symbolic link: {path}")]
    LinkInPath { path: PathBuf },
}

impl SyncError {
    /// Classify an IO error raised while touching `path`
    pub fn from_io(path: &Path, error: io::Error) -> Self {
        if matches!(error.kind(), ErrorKind::PermissionDenied) {
            SyncError::PermissionDenied {
                path: path.to_path_buf(),
            }
        } else if matches!(error.kind(), ErrorKind::StorageFull)
            || matches!(error.raw_os_error(), Some(28 | 122))
        {
            SyncError::DiskFull {
                path: path.to_path_buf(),
            }
        } else if matches!(error.kind(), ErrorKind::NotFound) {
            SyncError::Io(io::Error::new(
                ErrorKind::NotFound,
                format!("{}: {}", path.display(), error),
            ))
        } else {
            SyncError::Io(error)
        }
    }

    /// Check if this error came from configuration validation
    pub fn is_config_error(&self) -> bool {
        matches!(self, SyncError::Config(_))
    }

    /// Check if this error is related to permissions
    pub fn is_permission_error(&self) -> bool {
        matches!(self, SyncError::PermissionDenied { .. })
    }

    /// Check if this error is related to disk space
    pub fn is_disk_space_error(&self) -> bool {
        matches!(self, SyncError::DiskFull { .. })
    }

    /// Check if a root was missing at run start
    pub fn is_root_missing(&self) -> bool {
        matches!(
            self,
            SyncError::RootNotFound { .. } | SyncError::NotADirectory { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Error as IoError;

    #[test]
    fn test_io_error_automatic_conversion() {
        let io_error = IoError::new(ErrorKind::NotFound, "file not found");
        let sync_error: SyncError = io_error.into();

        assert!(matches!(sync_error, SyncError::Io(_)));
        assert!(sync_error.to_string().contains("IO error"));
    }

    #[test]
    fn test_io_error_from_function() {
        fn returns_io_error() -> Result<(), SyncError> {
            let _file = std::fs::File::open("/nonexistent/path/file.txt")?;
            Ok(())
        }

        let result = returns_io_error();
        assert!(matches!(result, Err(SyncError::Io(_))));
    }

    #[test]
    fn test_root_not_found() {
        let error = SyncError::RootNotFound {
            path: PathBuf::from("/missing/source"),
        };
        assert!(error.to_string().contains("does not exist"));
        assert!(error.to_string().contains("/missing/source"));
        assert!(error.is_root_missing());
        assert!(!error.is_permission_error());
    }

    #[test]
    fn test_from_io_maps_permission_denied() {
        let error = SyncError::from_io(
            Path::new("/protected/file.txt"),
            IoError::new(ErrorKind::PermissionDenied, "denied"),
        );
        assert!(error.is_permission_error());
        assert!(error.to_string().contains("/protected/file.txt"));
    }

    #[test]
    fn test_from_io_maps_enospc() {
        let error = SyncError::from_io(Path::new("/replica/big.bin"), IoError::from_raw_os_error(28));
        assert!(error.is_disk_space_error());
        assert!(error.to_string().contains("/replica/big.bin"));
    }

    #[test]
    fn test_from_io_not_found_mentions_path() {
        let error = SyncError::from_io(
            Path::new("/src/vanished.txt"),
            IoError::new(ErrorKind::NotFound, "gone"),
        );
        assert!(matches!(error, SyncError::Io(ref e) if e.kind() == ErrorKind::NotFound));
        assert!(error.to_string().contains("/src/vanished.txt"));
    }

    #[test]
    fn test_from_io_passes_other_errors_through() {
        let error = SyncError::from_io(
            Path::new("/x"),
            IoError::new(ErrorKind::InvalidData, "corrupt"),
        );
        assert!(matches!(error, SyncError::Io(_)));
    }

    #[test]
    fn test_config_error() {
        let error = SyncError::Config("Source and replica cannot be the same".to_string());
        assert!(error.to_string().contains("Configuration error"));
        assert!(error.is_config_error());
    }

    #[test]
    fn test_result_propagation() {
        fn inner_function() -> Result<(), SyncError> {
            Err(SyncError::Config("test error".to_string()))
        }

        fn outer_function() -> Result<(), SyncError> {
            inner_function()?;
            Ok(())
        }

        assert!(matches!(outer_function(), Err(SyncError::Config(_))));
    }
}
