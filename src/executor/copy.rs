//! Atomic file copy implementation

use crate::types::SyncError;
use std::fs::{self, File};
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

const BUFFER_SIZE: usize = 128 * 1024;

/// Suffix of the in-progress sibling file
pub const PART_SUFFIX: &str = ".foldsync-part";

/// Copy a file atomically using the write-then-rename strategy
///
/// 1. Stream into a hidden `.<name>.foldsync-part` sibling
/// 2. Flush and sync to disk
/// 3. Preserve permissions and mtime
/// 4. Rename over the final destination
///
/// The destination's parent must already exist; creating it is the job of
/// an earlier `MkDir`. A failed copy leaves the destination untouched and
/// removes the part file.
///
/// # Returns
/// * `Ok(u64)` - Number of bytes copied
/// * `Err(SyncError)` - IO error or other failure
///
/// # Example
/// ```no_run
/// use foldsync::executor::copy_file_atomic;
/// use std::path::Path;
///
/// let bytes = copy_file_atomic(Path::new("source.txt"), Path::new("dest.txt"))?;
/// # Ok::<(), foldsync::types::SyncError>(())
/// ```
pub fn copy_file_atomic(src: &Path, dest: &Path) -> Result<u64, SyncError> {
    let part_path = part_path_for(dest);

    let result = write_part(src, &part_path).and_then(|bytes| {
        fs::rename(&part_path, dest).map_err(|e| SyncError::from_io(dest, e))?;
        Ok(bytes)
    });

    if result.is_err() {
        // Best effort; the part file may never have been created
        let _ = fs::remove_file(&part_path);
    }

    result
}

/// Hidden sibling used while `dest` is being written
pub fn part_path_for(dest: &Path) -> PathBuf {
    let name = dest
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    dest.with_file_name(format!(".{name}{PART_SUFFIX}"))
}

fn write_part(src: &Path, part_path: &Path) -> Result<u64, SyncError> {
    let mut src_file = File::open(src).map_err(|e| SyncError::from_io(src, e))?;
    let mut part_file = File::create(part_path).map_err(|e| SyncError::from_io(part_path, e))?;

    let mut buffer = vec![0u8; BUFFER_SIZE];
    let mut total_bytes = 0u64;

    loop {
        let bytes_read = match src_file.read(&mut buffer) {
            Ok(0) => break, // EOF
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(SyncError::from_io(src, e)),
        };

        part_file
            .write_all(&buffer[..bytes_read])
            .map_err(|e| SyncError::from_io(part_path, e))?;
        total_bytes += bytes_read as u64;
    }

    part_file
        .sync_all()
        .map_err(|e| SyncError::from_io(part_path, e))?;

    // Close before touching metadata and renaming (required on Windows)
    drop(part_file);

    let src_metadata = fs::metadata(src).map_err(|e| SyncError::from_io(src, e))?;
    fs::set_permissions(part_path, src_metadata.permissions())
        .map_err(|e| SyncError::from_io(part_path, e))?;

    let mtime = src_metadata
        .modified()
        .map_err(|e| SyncError::from_io(src, e))?;
    filetime::set_file_mtime(part_path, filetime::FileTime::from_system_time(mtime))
        .map_err(|e| SyncError::from_io(part_path, e))?;

    Ok(total_bytes)
}
