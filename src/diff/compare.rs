//! File comparison logic

use crate::types::{DirEntry, SyncError};
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

const CHUNK_SIZE: usize = 64 * 1024;

/// Verdict of comparing a source file with its replica counterpart
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileComparison {
    /// Same size and same bytes
    Identical,
    SizeDiffers,
    ContentDiffers,
}

impl FileComparison {
    pub fn is_identical(&self) -> bool {
        matches!(self, FileComparison::Identical)
    }
}

/// Compare two files and decide whether the replica needs a fresh copy
///
/// 1. **Size mismatch**: files are definitely different, no I/O needed
/// 2. **Same size**: both files are streamed and compared byte for byte
///
/// Modification times are never trusted to declare two files equal: a
/// matching mtime with different bytes must still be detected.
pub fn compare_files(
    src: &DirEntry,
    replica: &DirEntry,
    source_root: &Path,
    replica_root: &Path,
) -> Result<FileComparison, SyncError> {
    if src.size != replica.size {
        return Ok(FileComparison::SizeDiffers);
    }

    let src_path = src.path.to_native(source_root);
    let replica_path = replica.path.to_native(replica_root);

    if contents_equal(&src_path, &replica_path)? {
        Ok(FileComparison::Identical)
    } else {
        Ok(FileComparison::ContentDiffers)
    }
}

/// True when both files hold the same bytes
pub fn files_equal(
    src: &DirEntry,
    replica: &DirEntry,
    source_root: &Path,
    replica_root: &Path,
) -> Result<bool, SyncError> {
    compare_files(src, replica, source_root, replica_root).map(|verdict| verdict.is_identical())
}

/// Stream both files in 64KB chunks and compare them
pub fn contents_equal(left: &Path, right: &Path) -> Result<bool, SyncError> {
    let mut left_file = File::open(left).map_err(|e| SyncError::from_io(left, e))?;
    let mut right_file = File::open(right).map_err(|e| SyncError::from_io(right, e))?;

    let mut left_buf = vec![0u8; CHUNK_SIZE];
    let mut right_buf = vec![0u8; CHUNK_SIZE];

    loop {
        let left_read =
            fill_chunk(&mut left_file, &mut left_buf).map_err(|e| SyncError::from_io(left, e))?;
        let right_read = fill_chunk(&mut right_file, &mut right_buf)
            .map_err(|e| SyncError::from_io(right, e))?;

        if left_read != right_read || left_buf[..left_read] != right_buf[..right_read] {
            return Ok(false);
        }

        if left_read == 0 {
            return Ok(true); // EOF on both
        }
    }
}

/// Read until the buffer is full or EOF; short reads would misalign chunks
fn fill_chunk(reader: &mut impl Read, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
