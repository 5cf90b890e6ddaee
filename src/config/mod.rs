//! Configuration management

use crate::types::SyncError;
use clap::Parser;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;

/// Keep a replica folder an exact mirror of a source folder
#[derive(Debug, Parser)]
#[command(name = "foldsync", version)]
pub struct Cli {
    /// Folder to mirror from
    pub source_folder: PathBuf,

    /// Folder to mirror into; anything not in the source is removed
    pub replica_folder: PathBuf,

    /// Minutes between synchronization runs
    #[arg(value_parser = clap::value_parser!(u64).range(1..))]
    pub sync_interval_minutes: u64,

    /// Log file, rotated at 1 MiB with one backup
    pub log_file: PathBuf,
}

/// Runtime configuration for the scheduler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub source: PathBuf,
    pub replica: PathBuf,

    /// Period between runs
    pub interval: Duration,

    /// Console-only logging when `None`
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source: PathBuf::new(),
            replica: PathBuf::new(),
            interval: Duration::from_secs(60),
            log_file: None,
        }
    }
}

impl TryFrom<Cli> for Config {
    type Error = SyncError;

    fn try_from(cli: Cli) -> Result<Self, Self::Error> {
        let minutes = cli.sync_interval_minutes;
        let interval = minutes
            .checked_mul(60)
            .map(Duration::from_secs)
            .ok_or_else(|| SyncError::Config(format!("Sync interval is too large: {minutes}")))?;

        let config = Config {
            source: cli.source_folder,
            replica: cli.replica_folder,
            interval,
            log_file: Some(cli.log_file),
        };
        config.validate()?;
        Ok(config)
    }
}

impl Config {
    /// Validate configuration
    ///
    /// Roots do not have to exist yet: a missing root only aborts the run
    /// that finds it missing.
    pub fn validate(&self) -> Result<(), SyncError> {
        if self.interval.is_zero() {
            return Err(SyncError::Config(
                "Sync interval must be at least one minute".to_string(),
            ));
        }

        let source = absolute_lexical(&self.source)?;
        let replica = absolute_lexical(&self.replica)?;

        if source == replica {
            return Err(SyncError::Config(
                "Source and replica cannot be the same folder".to_string(),
            ));
        }

        if replica.starts_with(&source) || source.starts_with(&replica) {
            return Err(SyncError::Config(format!(
                "Source and replica cannot be nested: {} and {}",
                self.source.display(),
                self.replica.display()
            )));
        }

        Ok(())
    }

    /// Interval in whole minutes, for log messages
    pub fn interval_minutes(&self) -> u64 {
        self.interval.as_secs() / 60
    }
}

/// Absolute form of `path` with `.` and `..` resolved without touching the filesystem
fn absolute_lexical(path: &Path) -> Result<PathBuf, SyncError> {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };

    let mut normalized = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    Ok(normalized)
}
