//! End-to-end synchronization tests.
//!
//! Each case builds real source and replica trees and checks the replica
//! after `run_sync`: convergence, idempotence, failure isolation and aborts.

use foldsync::executor::apply_operations;
use foldsync::scanner::scan_directory;
use foldsync::types::{RelPath, SyncEvent, SyncOperation, SyncStatus};
use foldsync::{run_sync, Snapshot};
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

fn write(root: &Path, path: &str, content: &[u8]) {
    let full = root.join(path);
    if let Some(parent) = full.parent() {
        fs::create_dir_all(parent).expect("create parent dirs");
    }
    fs::write(full, content).expect("write file");
}

/// Path, kind and content of every entry, for whole-tree comparison
fn tree_listing(root: &Path) -> Vec<(String, Option<Vec<u8>>)> {
    let snapshot: Snapshot = scan_directory(root, None).expect("scan tree");
    snapshot
        .iter()
        .map(|entry| {
            let content = entry
                .is_file()
                .then(|| fs::read(entry.path.to_native(root)).expect("read file"));
            (entry.path.as_str().to_string(), content)
        })
        .collect()
}

fn populate_source(root: &Path) {
    write(root, "readme.md", b"# project");
    write(root, "src/main.rs", b"fn main() {}");
    write(root, "src/util/mod.rs", b"pub mod helpers;");
    write(root, "assets/logo.bin", &[0u8, 1, 2, 3, 255]);
    write(root, ".hidden/config", b"secret=1");
    fs::create_dir_all(root.join("empty/nested")).expect("empty dirs");
}

type EventLog = Arc<Mutex<Vec<String>>>;

fn recording_sink() -> (EventLog, impl Fn(&SyncEvent<'_>) + Send + Sync + 'static) {
    let log: EventLog = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&log);
    let callback = move |event: &SyncEvent<'_>| {
        let line = match event {
            SyncEvent::CreatingDirectory { .. } => "mkdir",
            SyncEvent::Copying { .. } => "copy",
            SyncEvent::Deleting { .. } => "delete",
            SyncEvent::OperationFailed { .. } => "failed",
            SyncEvent::Warning { .. } => "warning",
            SyncEvent::Aborted { .. } => "aborted",
            SyncEvent::Completed { .. } => "completed",
        };
        sink.lock().expect("lock").push(line.to_string());
    };
    (log, callback)
}

// ═══════════════════════════════════════════════════════════
// Convergence
// ═══════════════════════════════════════════════════════════

#[test]
fn test_sync_into_empty_replica_converges() {
    let src = TempDir::new().expect("create src tempdir");
    let dst = TempDir::new().expect("create dst tempdir");
    populate_source(src.path());

    let report = run_sync(src.path(), dst.path(), None);

    assert_eq!(report.status, SyncStatus::Success);
    assert_eq!(tree_listing(src.path()), tree_listing(dst.path()));
    assert_eq!(report.bytes_copied, 9 + 12 + 16 + 5 + 8);
}

#[test]
fn test_sync_reconciles_mixed_changes() {
    let src = TempDir::new().expect("create src tempdir");
    let dst = TempDir::new().expect("create dst tempdir");
    populate_source(src.path());

    write(dst.path(), "readme.md", b"# stale"); // changed
    write(dst.path(), "obsolete/deep/file.txt", b"gone"); // orphan subtree
    write(dst.path(), "src", b"file where a dir belongs"); // type change
    write(dst.path(), "assets/logo.bin", &[0u8, 1, 2, 3, 255]); // unchanged

    let report = run_sync(src.path(), dst.path(), None);

    assert_eq!(report.status, SyncStatus::Success, "failures: {:?}", report.failures);
    assert_eq!(tree_listing(src.path()), tree_listing(dst.path()));
    assert!(!dst.path().join("obsolete").exists());
    assert!(!report
        .attempted
        .contains(&SyncOperation::CopyFile(RelPath::parse("assets/logo.bin").expect("path"))));
}

#[test]
fn test_second_run_is_idempotent() {
    let src = TempDir::new().expect("create src tempdir");
    let dst = TempDir::new().expect("create dst tempdir");
    populate_source(src.path());

    let first = run_sync(src.path(), dst.path(), None);
    assert!(first.is_success());
    assert!(!first.attempted.is_empty());

    let (events, sink) = recording_sink();
    let second = run_sync(src.path(), dst.path(), Some(&sink));

    assert!(second.is_success());
    assert!(second.attempted.is_empty(), "unexpected: {:?}", second.attempted);
    assert_eq!(*events.lock().expect("lock"), vec!["completed".to_string()]);
}

#[test]
fn test_source_deletions_propagate() {
    let src = TempDir::new().expect("create src tempdir");
    let dst = TempDir::new().expect("create dst tempdir");
    populate_source(src.path());
    assert!(run_sync(src.path(), dst.path(), None).is_success());

    fs::remove_dir_all(src.path().join("src")).expect("remove source subtree");
    fs::remove_file(src.path().join("readme.md")).expect("remove source file");

    let report = run_sync(src.path(), dst.path(), None);
    assert!(report.is_success());
    assert!(!dst.path().join("src").exists());
    assert!(!dst.path().join("readme.md").exists());
    assert_eq!(tree_listing(src.path()), tree_listing(dst.path()));
}

// ═══════════════════════════════════════════════════════════
// Failure Isolation
// ═══════════════════════════════════════════════════════════

#[test]
fn test_one_failed_copy_does_not_stop_the_rest() {
    let src = TempDir::new().expect("create src tempdir");
    let dst = TempDir::new().expect("create dst tempdir");

    let mut operations = Vec::new();
    for i in 0..10 {
        let name = format!("file{i}.txt");
        if i != 4 {
            write(src.path(), &name, name.as_bytes());
        }
        operations.push(SyncOperation::CopyFile(RelPath::parse(&name).expect("path")));
    }

    let (events, sink) = recording_sink();
    let report = apply_operations(&operations, src.path(), dst.path(), Some(&sink));

    assert_eq!(report.status, SyncStatus::PartialFailure);
    assert_eq!(report.attempted.len(), 10);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].operation, operations[4]);
    for i in (0..10).filter(|&i| i != 4) {
        assert!(dst.path().join(format!("file{i}.txt")).exists());
    }
    assert!(!dst.path().join("file4.txt").exists());

    let events = events.lock().expect("lock");
    assert_eq!(events.iter().filter(|e| *e == "copy").count(), 10);
    assert_eq!(events.iter().filter(|e| *e == "failed").count(), 1);
}

#[cfg(unix)]
#[test]
fn test_unreadable_source_file_fails_alone() {
    use std::os::unix::fs::PermissionsExt;

    let src = TempDir::new().expect("create src tempdir");
    let dst = TempDir::new().expect("create dst tempdir");
    for i in 0..10 {
        let name = format!("file{i}.txt");
        write(src.path(), &name, name.as_bytes());
    }
    let locked = src.path().join("file4.txt");
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).expect("chmod");
    if fs::File::open(&locked).is_ok() {
        // Privileged user: permissions are not enforced
        return;
    }

    let (events, sink) = recording_sink();
    let report = run_sync(src.path(), dst.path(), Some(&sink));
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o644)).expect("restore mode");

    assert_eq!(report.status, SyncStatus::PartialFailure);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(
        report.failures[0].operation,
        SyncOperation::CopyFile(RelPath::parse("file4.txt").expect("path"))
    );
    let copied = (0..10)
        .filter(|i| dst.path().join(format!("file{i}.txt")).exists())
        .count();
    assert_eq!(copied, 9);
    assert!(!dst.path().join("file4.txt").exists());

    let events = events.lock().expect("lock");
    assert_eq!(events.iter().filter(|e| *e == "completed").count(), 1);
    assert_eq!(events.iter().filter(|e| *e == "failed").count(), 1);
    assert_eq!(events.last().map(String::as_str), Some("completed"));
}

// ═══════════════════════════════════════════════════════════
// Aborts
// ═══════════════════════════════════════════════════════════

#[test]
fn test_missing_source_aborts_without_touching_replica() {
    let base = TempDir::new().expect("create base tempdir");
    let dst = TempDir::new().expect("create dst tempdir");
    write(dst.path(), "precious.txt", b"must survive");

    let (events, sink) = recording_sink();
    let report = run_sync(&base.path().join("missing"), dst.path(), Some(&sink));

    assert_eq!(report.status, SyncStatus::Aborted);
    assert!(report.attempted.is_empty());
    assert_eq!(*events.lock().expect("lock"), vec!["aborted".to_string()]);
    assert_eq!(
        fs::read(dst.path().join("precious.txt")).expect("replica file kept"),
        b"must survive"
    );
}

#[test]
fn test_missing_replica_is_not_created() {
    let src = TempDir::new().expect("create src tempdir");
    let base = TempDir::new().expect("create base tempdir");
    populate_source(src.path());
    let replica = base.path().join("replica");

    let (events, sink) = recording_sink();
    let report = run_sync(src.path(), &replica, Some(&sink));

    assert_eq!(report.status, SyncStatus::Aborted);
    assert!(!replica.exists());
    assert_eq!(events.lock().expect("lock").len(), 1);
}

#[test]
fn test_recovers_once_root_reappears() {
    let src = TempDir::new().expect("create src tempdir");
    let base = TempDir::new().expect("create base tempdir");
    write(src.path(), "a.txt", b"a");
    let replica = base.path().join("replica");

    assert_eq!(run_sync(src.path(), &replica, None).status, SyncStatus::Aborted);

    fs::create_dir(&replica).expect("create replica");
    let report = run_sync(src.path(), &replica, None);
    assert!(report.is_success());
    assert_eq!(fs::read(replica.join("a.txt")).expect("read copy"), b"a");
}

// ═══════════════════════════════════════════════════════════
// Event Stream
// ═══════════════════════════════════════════════════════════

#[test]
fn test_events_follow_operation_order() {
    let src = TempDir::new().expect("create src tempdir");
    let dst = TempDir::new().expect("create dst tempdir");
    write(src.path(), "dir/file.txt", b"x");
    write(dst.path(), "stale.txt", b"y");

    let (events, sink) = recording_sink();
    let report = run_sync(src.path(), dst.path(), Some(&sink));

    assert!(report.is_success());
    assert_eq!(
        *events.lock().expect("lock"),
        vec!["delete", "mkdir", "copy", "completed"]
    );
}

#[cfg(unix)]
#[test]
fn test_source_symlink_is_reported_and_not_copied() {
    let src = TempDir::new().expect("create src tempdir");
    let dst = TempDir::new().expect("create dst tempdir");
    write(src.path(), "real.txt", b"r");
    std::os::unix::fs::symlink(src.path().join("real.txt"), src.path().join("alias.txt"))
        .expect("symlink");

    let (events, sink) = recording_sink();
    let report = run_sync(src.path(), dst.path(), Some(&sink));

    assert!(report.is_success());
    assert_eq!(report.warnings.len(), 1);
    assert!(!dst.path().join("alias.txt").exists());
    assert!(events.lock().expect("lock").contains(&"warning".to_string()));
}

#[cfg(unix)]
#[test]
fn test_replica_link_in_place_of_directory_is_replaced() {
    let src = TempDir::new().expect("create src tempdir");
    let dst = TempDir::new().expect("create dst tempdir");
    let outside = TempDir::new().expect("create outside tempdir");
    write(src.path(), "d/secret.txt", b"secret");
    write(outside.path(), "unrelated.txt", b"keep");
    std::os::unix::fs::symlink(outside.path(), dst.path().join("d")).expect("symlink");

    let report = run_sync(src.path(), dst.path(), None);

    assert_eq!(report.status, SyncStatus::Success, "failures: {:?}", report.failures);
    assert!(!outside.path().join("secret.txt").exists());
    assert_eq!(
        fs::read(outside.path().join("unrelated.txt")).expect("link target untouched"),
        b"keep"
    );
    let d = fs::symlink_metadata(dst.path().join("d")).expect("replica d");
    assert!(d.file_type().is_dir());
    assert_eq!(tree_listing(src.path()), tree_listing(dst.path()));

    let second = run_sync(src.path(), dst.path(), None);
    assert!(second.is_success());
    assert!(second.attempted.is_empty(), "unexpected: {:?}", second.attempted);
}
