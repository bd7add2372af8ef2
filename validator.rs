//! Pre-flight checks for a shred target.
//!
//! [`Validator::validate`] runs the checks below in order and stops at the
//! first failure. Nothing is written, so a rejected file is left as it was.
//!
//! 1. iteration count is an integer in `1..=25`
//! 2. a regular file exists at the path
//! 3. the extension is whitelisted (case-insensitive)
//! 4. the size is in `1..=100_000_000` bytes
//! 5. the file is not read-only
//! 6. no file or directory name in the path holds a reserved character

use crate::error::ShredError;
use crate::request::ShredRequest;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};

pub const MIN_ITERATIONS: u32 = 1;
pub const MAX_ITERATIONS: u32 = 25;

pub const MIN_FILE_SIZE: u64 = 1;
pub const MAX_FILE_SIZE: u64 = 100_000_000;

pub const ALLOWED_EXTENSIONS: &[&str] = &[
    "txt", "docx", "pdf", "xlsx", "doc", "pptx", "ppt", "xls", "csv", "jpg", "jpeg", "png", "gif",
    "bmp", "mp3", "wav", "mp4", "avi", "mov", "exe",
];

/// Characters rejected in any file or directory name of the target path.
/// This is the portable set: it is enforced on every host so a name that is
/// unusable anywhere is refused consistently.
pub const RESERVED_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

pub struct Validator;

impl Validator {
    /// Check `path` and the raw `iterations` argument, producing a request on success.
    pub async fn validate(path: &str, iterations: &str) -> Result<ShredRequest, ShredError> {
        debug!(path, iterations, "validating shred target");

        let iterations = parse_iterations(iterations)?;

        let meta = match fs::metadata(path).await {
            Ok(meta) if meta.is_file() => meta,
            Ok(_) => {
                warn!(path, "target is not a regular file");
                return Err(ShredError::FileNotFound);
            }
            Err(e) => {
                debug!(path, error = %e, "target metadata unavailable");
                return Err(ShredError::FileNotFound);
            }
        };

        let target = PathBuf::from(path);
        if !is_allowed_extension(&target) {
            return Err(ShredError::InvalidExtension);
        }

        let file_len = meta.len();
        check_size(file_len)?;

        if meta.permissions().readonly() {
            return Err(ShredError::PermissionDenied);
        }

        if has_reserved_chars(&target) {
            return Err(ShredError::InvalidPath);
        }

        info!(path, iterations, bytes = file_len, "target approved");
        Ok(ShredRequest::new(target, iterations, file_len))
    }
}

/// Parse the iteration argument, accepting surrounding whitespace.
pub fn parse_iterations(raw: &str) -> Result<u32, ShredError> {
    raw.trim()
        .parse::<u32>()
        .ok()
        .filter(|n| (MIN_ITERATIONS..=MAX_ITERATIONS).contains(n))
        .ok_or(ShredError::InvalidIterations)
}

pub fn is_allowed_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .is_some_and(|e| ALLOWED_EXTENSIONS.contains(&e.as_str()))
}

pub fn check_size(len: u64) -> Result<(), ShredError> {
    if (MIN_FILE_SIZE..=MAX_FILE_SIZE).contains(&len) {
        Ok(())
    } else {
        Err(ShredError::InvalidFileSize)
    }
}

/// True if any named path component contains a reserved or control character,
/// or the path has no file name at all. Separators, roots and drive prefixes
/// are not named components, so they never count as reserved.
pub fn has_reserved_chars(path: &Path) -> bool {
    if path.file_name().is_none() {
        return true;
    }
    path.components().any(|component| match component {
        Component::Normal(name) => name
            .to_string_lossy()
            .chars()
            .any(|c| c.is_control() || RESERVED_CHARS.contains(&c)),
        _ => false,
    })
}
