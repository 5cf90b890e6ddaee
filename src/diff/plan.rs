//! SyncOperation plan generation

use crate::diff::{compare_files, SyncPlan};
use crate::types::{EntryKind, ScanWarning, Snapshot, SyncOperation, WarningKind};

/// Generate a sync plan by comparing source and replica snapshots
///
/// The plan runs in two passes:
///
/// 1. Replica entries in reverse pre-order: anything the source lacks, or
///    holds with the other kind, is deleted. Children therefore go before
///    their directory. Paths under a skipped source path are left alone.
///    A replica symlink or special file standing where the source has a
///    real entry is unlinked, so nothing is later written through it.
/// 2. Source entries in pre-order: missing directories are created and
///    missing or differing files are copied. Parents therefore exist before
///    their children.
///
/// A path that changed kind is deleted in pass 1 and recreated in pass 2.
///
/// # Example
/// ```
/// use foldsync::diff::plan_sync;
/// use foldsync::types::{DirEntry, RelPath, Snapshot, SyncOperation};
/// use std::path::PathBuf;
/// use std::time::UNIX_EPOCH;
///
/// let mut src = Snapshot::new(PathBuf::from("src"));
/// let replica = Snapshot::new(PathBuf::from("dst"));
/// let path = RelPath::parse("new.txt").unwrap();
/// src.insert(DirEntry::file(path.clone(), 4, UNIX_EPOCH));
///
/// let plan = plan_sync(&src, &replica);
/// assert_eq!(plan.operations, vec![SyncOperation::CopyFile(path)]);
/// ```
pub fn plan_sync(source: &Snapshot, replica: &Snapshot) -> SyncPlan {
    let mut plan = SyncPlan::new();

    for replica_entry in replica.iter().rev() {
        let keep = source
            .get(&replica_entry.path)
            .is_some_and(|src_entry| src_entry.kind == replica_entry.kind);
        if keep || source.is_protected(&replica_entry.path) {
            continue;
        }

        let operation = match replica_entry.kind {
            EntryKind::File => SyncOperation::DeleteFile(replica_entry.path.clone()),
            EntryKind::Directory => SyncOperation::DeleteDir(replica_entry.path.clone()),
        };
        plan.add_operation(operation, 0);
    }

    let mut blocking: Vec<_> = replica
        .links
        .iter()
        .filter(|path| source.contains(path))
        .collect();
    blocking.sort();
    for path in blocking {
        plan.add_operation(SyncOperation::DeleteFile(path.clone()), 0);
    }

    for src_entry in source.iter() {
        let counterpart = replica
            .get(&src_entry.path)
            .filter(|replica_entry| replica_entry.kind == src_entry.kind);

        match (src_entry.kind, counterpart) {
            (EntryKind::Directory, None) => {
                plan.add_operation(SyncOperation::MkDir(src_entry.path.clone()), 0);
            }
            (EntryKind::Directory, Some(_)) => plan.mark_unchanged(),
            (EntryKind::File, None) => {
                plan.add_operation(
                    SyncOperation::CopyFile(src_entry.path.clone()),
                    src_entry.size,
                );
            }
            (EntryKind::File, Some(replica_entry)) => {
                match compare_files(
                    src_entry,
                    replica_entry,
                    &source.root_path,
                    &replica.root_path,
                ) {
                    Ok(verdict) if verdict.is_identical() => plan.mark_unchanged(),
                    Ok(_) => plan.add_operation(
                        SyncOperation::CopyFile(src_entry.path.clone()),
                        src_entry.size,
                    ),
                    Err(e) => {
                        // Unreadable for comparison: copy anyway and let apply report it
                        plan.warnings.push(ScanWarning::new(
                            &src_entry.path.to_native(&source.root_path),
                            WarningKind::CompareFailed,
                            e.to_string(),
                        ));
                        plan.add_operation(
                            SyncOperation::CopyFile(src_entry.path.clone()),
                            src_entry.size,
                        );
                    }
                }
            }
        }
    }

    plan
}
