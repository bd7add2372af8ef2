//! The shred banner written at the start of every processed file.
//!
//! ## Layout
//!
//! ```text
//! +---------------------------------------------+
//! |            Shredded by The Shredder         |
//! |                made by zorky                |
//! +---------------------------------------------+
//! <empty line>
//! ```
//!
//! The banner is a file-format contract: its bytes are reproduced exactly and
//! always occupy offset 0. Files shorter than the banner carry a clipped
//! prefix of it so the file length never changes.

use crate::util::{read_at, write_all_at};
use std::fs::File;
use std::io;
use std::path::Path;
use tracing::debug;

pub const HEADER: &[u8] = b"+---------------------------------------------+\n\
|            Shredded by The Shredder         |\n\
|                made by zorky                |\n\
+---------------------------------------------+\n\n";

/// Byte length of [`HEADER`]
pub const HEADER_LEN: u64 = HEADER.len() as u64;

/// Number of banner bytes that fit in a file of `file_len` bytes.
pub fn header_len_for(file_len: u64) -> u64 {
    HEADER_LEN.min(file_len)
}

/// Write the banner at offset 0, clipped to `file_len`.
/// Returns the number of bytes written.
pub fn write_header(file: &File, file_len: u64) -> io::Result<u64> {
    let len = header_len_for(file_len);
    write_all_at(file, &HEADER[..len as usize], 0)?;
    debug!(bytes = len, "header written");
    Ok(len)
}

/// True when `bytes` starts with the banner, or is a clipped prefix of it.
pub fn is_shredded(bytes: &[u8]) -> bool {
    if bytes.is_empty() {
        return false;
    }
    let n = bytes.len().min(HEADER.len());
    bytes[..n] == HEADER[..n]
}

/// Read the banner region of an open handle and check it.
pub fn has_marker(file: &File) -> io::Result<bool> {
    let mut buf = [0u8; HEADER.len()];
    let mut filled = 0;
    while filled < buf.len() {
        let n = read_at(file, &mut buf[filled..], filled as u64)?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(is_shredded(&buf[..filled]))
}

/// Check whether the file at `path` carries the banner.
pub async fn read_marker(path: &Path) -> io::Result<bool> {
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || has_marker(&File::open(&path)?))
        .await
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?
}
