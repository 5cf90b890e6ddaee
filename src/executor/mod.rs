//! Executor module for replica mutations

pub mod copy;

use crate::types::{
    emit, EventCallback, RelPath, SyncError, SyncEvent, SyncOperation, SyncReport,
};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

pub use copy::copy_file_atomic;

/// Apply operations to the replica, strictly in the given order
///
/// Each mutation is announced through `on_event` right before it is
/// attempted. A failing operation is recorded and reported, and execution
/// moves on to the next one. The returned report is finished: its status is
/// `Success` when nothing failed and `PartialFailure` otherwise.
pub fn apply_operations(
    operations: &[SyncOperation],
    source_root: &Path,
    replica_root: &Path,
    on_event: Option<&EventCallback>,
) -> SyncReport {
    let mut report = SyncReport::begin();

    for operation in operations {
        match execute_operation(operation, source_root, replica_root, on_event) {
            Ok(bytes) => report.record_success(operation.clone(), bytes),
            Err(error) => {
                emit(
                    on_event,
                    SyncEvent::OperationFailed {
                        operation,
                        error: &error,
                    },
                );
                report.record_failure(operation.clone(), error);
            }
        }
    }

    report.finish();
    report
}

fn execute_operation(
    operation: &SyncOperation,
    source_root: &Path,
    replica_root: &Path,
    on_event: Option<&EventCallback>,
) -> Result<u64, SyncError> {
    let target = operation.path().to_native(replica_root);

    match operation {
        SyncOperation::MkDir(path) => {
            emit(on_event, SyncEvent::CreatingDirectory { path: &target });
            ensure_no_link_above(path, replica_root)?;
            create_directory(&target).map(|()| 0)
        }
        SyncOperation::CopyFile(path) => {
            let source = path.to_native(source_root);
            emit(
                on_event,
                SyncEvent::Copying {
                    source: &source,
                    destination: &target,
                },
            );
            ensure_no_link_above(path, replica_root)?;
            copy_file_atomic(&source, &target)
        }
        SyncOperation::DeleteFile(path) => {
            emit(on_event, SyncEvent::Deleting { path: &target });
            ensure_no_link_above(path, replica_root)?;
            ignore_missing(fs::remove_file(&target), &target).map(|()| 0)
        }
        SyncOperation::DeleteDir(path) => {
            emit(on_event, SyncEvent::Deleting { path: &target });
            ensure_no_link_above(path, replica_root)?;
            // Not recursive: descendants were scheduled as their own deletes
            ignore_missing(fs::remove_dir(&target), &target).map(|()| 0)
        }
    }
}

/// Fail if any parent of `path` inside the replica is a symbolic link
///
/// Parents that do not exist are fine: the operation itself will fail.
fn ensure_no_link_above(path: &RelPath, replica_root: &Path) -> Result<(), SyncError> {
    for parent in path.ancestors().skip(1) {
        let native = parent.to_native(replica_root);
        if is_symlink(&native) {
            return Err(SyncError::LinkInPath { path: native });
        }
    }
    Ok(())
}

fn is_symlink(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok_and(|meta| meta.file_type().is_symlink())
}

fn create_directory(path: &Path) -> Result<(), SyncError> {
    match fs::create_dir(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            // A link to a directory does not count
            match fs::symlink_metadata(path) {
                Ok(meta) if meta.file_type().is_dir() => Ok(()),
                Ok(meta) if meta.file_type().is_symlink() => Err(SyncError::LinkInPath {
                    path: path.to_path_buf(),
                }),
                _ => Err(SyncError::from_io(path, e)),
            }
        }
        Err(e) => Err(SyncError::from_io(path, e)),
    }
}

/// Something else already removed it; the replica is in the wanted state
fn ignore_missing(result: std::io::Result<()>, path: &Path) -> Result<(), SyncError> {
    match result {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(SyncError::from_io(path, e)),
    }
}
