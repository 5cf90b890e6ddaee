//! Sequential tree walker

use crate::types::{DirEntry, RelPath, ScanWarning, Snapshot, SyncError, WarningKind};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Instant;

/// Callback for reporting scan progress
///
/// Arguments:
/// - `entries_scanned`: Total number of entries recorded so far
/// - `bytes_scanned`: Total file bytes recorded so far
pub type ProgressCallback = Box<dyn Fn(u64, u64) + Send + Sync>;

/// Scan a directory and build a Snapshot
///
/// Walks the tree in pre-order (a directory before its contents, siblings
/// sorted by name) and records every directory and regular file relative to
/// `root_path`. Only metadata is read; file contents are left to the diff.
///
/// # Errors
/// * `RootNotFound` / `NotADirectory` if the root is missing or not a directory
/// * `PermissionDenied` / `Io` if the root itself cannot be listed
/// * `Scan` if the walker reports an error it cannot attribute to a path
///   below the root, since the listing could then be silently incomplete
///
/// Symlinks, special files, unreadable nodes and non UTF-8 names are skipped
/// and recorded in `Snapshot::warnings` and `Snapshot::skipped`.
pub fn scan_directory(
    root_path: &Path,
    on_progress: Option<&ProgressCallback>,
) -> Result<Snapshot, SyncError> {
    let start_time = Instant::now();
    check_root(root_path)?;

    let mut snapshot = Snapshot::new(root_path.to_path_buf());

    let mut scanned_count: u64 = 0;
    let mut scanned_bytes: u64 = 0;

    // Entries rejected by the filter are never descended into.
    let rejected_names: Arc<Mutex<Vec<PathBuf>>> = Arc::default();
    let rejected = Arc::clone(&rejected_names);

    // Plain walker: mirror everything, hidden files and VCS-ignored files included
    let walker = ignore::WalkBuilder::new(root_path)
        .standard_filters(false)
        .follow_links(false)
        .sort_by_file_name(|a, b| a.cmp(b))
        .filter_entry(move |entry| {
            if entry.depth() == 0 || entry.file_name().to_str().is_some() {
                return true;
            }
            if let Ok(mut names) = rejected.lock() {
                names.push(entry.path().to_path_buf());
            }
            false
        })
        .build();

    for result in walker {
        let entry = match result {
            Ok(entry) => entry,
            Err(err) => {
                record_walk_error(&mut snapshot, root_path, err)?;
                continue;
            }
        };

        if entry.depth() == 0 {
            continue;
        }

        let full_path = entry.path();
        let relative_path = match full_path
            .strip_prefix(root_path)
            .ok()
            .and_then(RelPath::from_native)
        {
            Some(p) => p,
            None => {
                snapshot.warnings.push(ScanWarning::new(
                    full_path,
                    WarningKind::NonUtf8Name,
                    "path cannot be expressed relative to the root",
                ));
                continue;
            }
        };

        let file_type = match entry.file_type() {
            Some(ft) => ft,
            None => {
                snapshot.skip(
                    relative_path,
                    ScanWarning::new(full_path, WarningKind::Unreadable, "unknown file type"),
                );
                continue;
            }
        };

        if file_type.is_symlink() {
            snapshot.skip(
                relative_path,
                ScanWarning::new(
                    full_path,
                    WarningKind::Symlink,
                    "symbolic links are not mirrored",
                ),
            );
            continue;
        }

        if file_type.is_dir() {
            snapshot.insert(DirEntry::directory(relative_path));
            scanned_count += 1;
            report_progress(on_progress, scanned_count, scanned_bytes);
            continue;
        }

        if !file_type.is_file() {
            snapshot.skip(
                relative_path,
                ScanWarning::new(
                    full_path,
                    WarningKind::SpecialFile,
                    "pipes, sockets and devices are not mirrored",
                ),
            );
            continue;
        }

        let metadata = match entry.metadata() {
            Ok(m) => m,
            Err(e) => {
                snapshot.skip(
                    relative_path,
                    ScanWarning::new(full_path, WarningKind::Unreadable, e.to_string()),
                );
                continue;
            }
        };

        let mtime = match metadata.modified() {
            Ok(t) => t,
            Err(e) => {
                snapshot.skip(
                    relative_path,
                    ScanWarning::new(
                        full_path,
                        WarningKind::Unreadable,
                        format!("modification time unavailable: {}", e),
                    ),
                );
                continue;
            }
        };

        snapshot.insert(DirEntry::file(relative_path, metadata.len(), mtime));

        scanned_count += 1;
        scanned_bytes += metadata.len();
        report_progress(on_progress, scanned_count, scanned_bytes);
    }

    if let Ok(mut names) = rejected_names.lock() {
        for path in names.drain(..) {
            snapshot.warnings.push(ScanWarning::new(
                &path,
                WarningKind::NonUtf8Name,
                "file names must be valid UTF-8",
            ));
        }
    }

    snapshot.set_scan_duration(start_time.elapsed());

    Ok(snapshot)
}

/// The root must exist, be a directory, and be listable
fn check_root(root_path: &Path) -> Result<(), SyncError> {
    let metadata = match fs::metadata(root_path) {
        Ok(m) => m,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(SyncError::RootNotFound {
                path: root_path.to_path_buf(),
            })
        }
        Err(e) => return Err(SyncError::from_io(root_path, e)),
    };

    if !metadata.is_dir() {
        return Err(SyncError::NotADirectory {
            path: root_path.to_path_buf(),
        });
    }

    fs::read_dir(root_path).map_err(|e| SyncError::from_io(root_path, e))?;
    Ok(())
}

/// Turn a walker error into a skipped path, or fail the scan
///
/// An error we cannot pin to a node below the root might mean a whole
/// listing is missing, and a missing listing would read as "deleted".
fn record_walk_error(
    snapshot: &mut Snapshot,
    root_path: &Path,
    err: ignore::Error,
) -> Result<(), SyncError> {
    let path = error_path(&err).map(Path::to_path_buf);
    let relative = path
        .as_deref()
        .and_then(|p| p.strip_prefix(root_path).ok())
        .and_then(RelPath::from_native);

    match (relative, path) {
        (Some(relative), Some(path)) => {
            snapshot.skip(
                relative,
                ScanWarning::new(&path, WarningKind::Unreadable, err.to_string()),
            );
            Ok(())
        }
        (_, path) => Err(SyncError::Scan {
            path: path.unwrap_or_else(|| root_path.to_path_buf()),
            detail: err.to_string(),
        }),
    }
}

fn error_path(err: &ignore::Error) -> Option<&Path> {
    match err {
        ignore::Error::WithPath { path, .. } => Some(path.as_path()),
        ignore::Error::WithDepth { err, .. } | ignore::Error::WithLineNumber { err, .. } => {
            error_path(err)
        }
        ignore::Error::Loop { child, .. } => Some(child.as_path()),
        _ => None,
    }
}

fn report_progress(on_progress: Option<&ProgressCallback>, entries: u64, bytes: u64) {
    if let Some(callback) = on_progress {
        callback(entries, bytes);
    }
}
