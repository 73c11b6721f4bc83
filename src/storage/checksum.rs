//! CRC32 checksums for persisted metadata files
//!
//! Uses CRC32 (IEEE polynomial) via crc32fast. Formatted as `crc32:xxxxxxxx`.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crc32fast::Hasher;

use crate::errors::{SlicerError, SlicerResult};

/// Computes a CRC32 checksum over the provided data
pub fn compute_checksum(data: &[u8]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(data);
    hasher.finalize()
}

/// Computes a CRC32 checksum of an entire file, reading in chunks
pub fn compute_file_checksum(path: &Path) -> SlicerResult<u32> {
    let file = File::open(path).map_err(|e| SlicerError::io_error_at_path(path, e))?;

    let mut reader = BufReader::new(file);
    let mut hasher = Hasher::new();
    let mut buffer = [0u8; 8192];

    loop {
        let bytes_read = reader
            .read(&mut buffer)
            .map_err(|e| SlicerError::io_error_at_path(path, e))?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hasher.finalize())
}

/// Formats a checksum as `crc32:xxxxxxxx` (lowercase hex, zero-padded)
pub fn format_checksum(checksum: u32) -> String {
    format!("crc32:{:08x}", checksum)
}

/// Checksum of a file, formatted
pub fn file_checksum(path: &Path) -> SlicerResult<String> {
    compute_file_checksum(path).map(format_checksum)
}
