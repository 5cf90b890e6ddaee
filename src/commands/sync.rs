//! One synchronization run and its log rendering

use crate::diff::plan_sync;
use crate::executor::apply_operations;
use crate::scanner::scan_directory;
use crate::types::{emit, EventCallback, SyncError, SyncEvent, SyncReport, SyncStatus};
use chrono::Utc;
use indicatif::{HumanBytes, HumanDuration};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, error, info, warn};

/// Make `replica_root` an exact mirror of `source_root`
///
/// Both roots must exist and be directories; otherwise the run is aborted
/// before anything is scanned and a single `Aborted` event is emitted. A
/// scan that fails outright aborts the same way. Every other problem is
/// isolated to the operation it affects and the run ends with exactly one
/// `Completed` event.
pub fn run_sync(
    source_root: &Path,
    replica_root: &Path,
    on_event: Option<&EventCallback>,
) -> SyncReport {
    let started_at = Utc::now();

    let abort = |reason: String| {
        emit(on_event, SyncEvent::Aborted { reason: &reason });
        SyncReport::aborted(started_at, reason)
    };

    if let Some(reason) = check_root(source_root, "Source")
        .or_else(|| check_root(replica_root, "Replica"))
    {
        return abort(reason);
    }

    let source = match scan_directory(source_root, None) {
        Ok(snapshot) => snapshot,
        Err(e) => return abort(format!("Source scan failed: {e}")),
    };
    let replica = match scan_directory(replica_root, None) {
        Ok(snapshot) => snapshot,
        Err(e) => return abort(format!("Replica scan failed: {e}")),
    };

    let plan = plan_sync(&source, &replica);

    let warnings: Vec<_> = source
        .warnings
        .into_iter()
        .chain(replica.warnings)
        .chain(plan.warnings)
        .collect();
    for warning in &warnings {
        emit(on_event, SyncEvent::Warning { warning });
    }

    let mut report = apply_operations(&plan.operations, source_root, replica_root, on_event);
    report.started_at = started_at;
    report.warnings = warnings;

    emit(on_event, SyncEvent::Completed { report: &report });
    report
}

fn check_root(path: &Path, label: &str) -> Option<String> {
    if !path.exists() {
        Some(format!("{label} folder does not exist: {}", path.display()))
    } else if !path.is_dir() {
        Some(format!("{label} folder is not a directory: {}", path.display()))
    } else {
        None
    }
}

/// Render an engine event through `tracing`
pub fn log_event(event: &SyncEvent<'_>) {
    match event {
        SyncEvent::CreatingDirectory { path } => info!("Creating directory {}", path.display()),
        SyncEvent::Copying {
            source,
            destination,
        } => info!("Copying {} to {}", source.display(), destination.display()),
        SyncEvent::Deleting { path } => info!("Deleting {}", path.display()),
        SyncEvent::OperationFailed { operation, error } => error!(
            "{} failed for {}: {}",
            operation.action_name(),
            operation.path(),
            error
        ),
        SyncEvent::Warning { warning } => warn!("{warning}"),
        SyncEvent::Aborted { reason } => error!("Synchronization aborted: {reason}"),
        SyncEvent::Completed { report } => {
            if report.is_success() {
                info!("{}", format_completion(report));
            } else {
                warn!("{}", format_completion(report));
            }

            match serde_json::to_string(&report.summary()) {
                Ok(json) => debug!(summary = %json, "Run summary"),
                Err(e) => debug!("Could not serialize run summary: {e}"),
            }
        }
    }
}

/// Human-readable outcome of a finished run
pub fn format_completion(report: &SyncReport) -> String {
    let totals = format!(
        "{} operation(s), {} copied in {}",
        report.attempted.len(),
        HumanBytes(report.bytes_copied),
        HumanDuration(report.duration())
    );

    match report.status {
        SyncStatus::Success => format!("Folders synchronized successfully ({totals})"),
        SyncStatus::PartialFailure => format!(
            "Synchronization finished with {} failed operation(s) ({totals})\n{}",
            report.failures.len(),
            format_failure_summary(report)
        ),
        SyncStatus::Aborted => format!(
            "Synchronization aborted: {}",
            report.abort_reason.as_deref().unwrap_or("unknown reason")
        ),
    }
}

fn format_failure_summary(report: &SyncReport) -> String {
    let mut groups: BTreeMap<&'static str, Vec<_>> = BTreeMap::new();
    for failure in &report.failures {
        groups
            .entry(error_kind_label(&failure.error))
            .or_default()
            .push(failure);
    }

    let mut lines = vec!["Failure summary:".to_string()];
    for (kind, items) in groups {
        lines.push(format!("  {} ({}):", kind, items.len()));
        for failure in items.iter().take(3) {
            lines.push(format!(
                "    - {} {}: {}",
                failure.operation.action_name(),
                failure.operation.path(),
                failure.error
            ));
        }
        if items.len() > 3 {
            lines.push(format!("    - ... {} more", items.len() - 3));
        }
    }
    lines.join("\n")
}

fn error_kind_label(error: &SyncError) -> &'static str {
    match error {
        SyncError::Io(_) => "I/O error",
        SyncError::Config(_) => "Configuration error",
        SyncError::RootNotFound { .. } | SyncError::NotADirectory { .. } => "Missing root",
        SyncError::Scan { .. } => "Scan error",
        SyncError::PermissionDenied { .. } => "Permission denied",
        SyncError::DiskFull { .. } => "Disk full",
        SyncError::LinkInPath { .. } => "Symbolic link in path",
    }
}
