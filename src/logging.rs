//! Tracing setup: console plus a size-rotated log file

use crate::types::SyncError;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Rotate once the log file would grow past this size
pub const MAX_LOG_BYTES: u64 = 1024 * 1024;

/// Install the global subscriber
///
/// The level comes from `RUST_LOG`, defaulting to `info`. Lines go to stderr
/// and, when `log_file` is set, to that file without ANSI colors.
pub fn init(log_file: Option<&Path>) -> Result<(), SyncError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .map_err(|e| SyncError::Config(format!("Invalid log filter: {e}")))?;

    let console_layer = fmt::layer().with_target(false).with_writer(io::stderr);

    let file_layer = match log_file {
        Some(path) => Some(
            fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(RotatingFile::open(path, MAX_LOG_BYTES)?),
        ),
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| SyncError::Config(format!("Logging already initialized: {e}")))
}

/// Append-only log file that keeps one backup at `<path>.1`
///
/// Clones share the same file handle, so it can be handed to
/// `tracing-subscriber` as a `MakeWriter`.
#[derive(Debug, Clone)]
pub struct RotatingFile {
    inner: Arc<Mutex<RotatingState>>,
}

#[derive(Debug)]
struct RotatingState {
    path: PathBuf,
    file: File,
    written: u64,
    max_bytes: u64,
}

impl RotatingFile {
    /// Open (or create) the log file for appending
    pub fn open(path: &Path, max_bytes: u64) -> Result<Self, SyncError> {
        let file = open_append(path).map_err(|e| SyncError::from_io(path, e))?;
        let written = file
            .metadata()
            .map_err(|e| SyncError::from_io(path, e))?
            .len();

        Ok(Self {
            inner: Arc::new(Mutex::new(RotatingState {
                path: path.to_path_buf(),
                file,
                written,
                max_bytes,
            })),
        })
    }

    /// Location of the single backup file
    pub fn backup_path(path: &Path) -> PathBuf {
        let mut name = path.as_os_str().to_owned();
        name.push(".1");
        PathBuf::from(name)
    }
}

impl RotatingState {
    fn rotate(&mut self) -> io::Result<()> {
        self.file.flush()?;
        fs::rename(&self.path, RotatingFile::backup_path(&self.path))?;
        self.file = open_append(&self.path)?;
        self.written = 0;
        Ok(())
    }
}

fn open_append(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

impl Write for RotatingFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut state = self
            .inner
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log file lock poisoned"))?;

        // A single oversized line still lands in a fresh file
        if state.written > 0 && state.written + buf.len() as u64 > state.max_bytes {
            state.rotate()?;
        }

        state.file.write_all(buf)?;
        state.written += buf.len() as u64;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut state = self
            .inner
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log file lock poisoned"))?;
        state.file.flush()
    }
}

impl<'a> MakeWriter<'a> for RotatingFile {
    type Writer = RotatingFile;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
