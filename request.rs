use serde::Serialize;
use std::path::{Path, PathBuf};

/// A target approved by the validator. Only [`crate::validator::Validator`]
/// constructs one, so holding a request means every check has passed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShredRequest {
    path: PathBuf,
    iterations: u32,
    file_len: u64,
}

impl ShredRequest {
    pub(crate) fn new(path: PathBuf, iterations: u32, file_len: u64) -> Self {
        Self {
            path,
            iterations,
            file_len,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    /// Size of the file when it was validated
    pub fn file_len(&self) -> u64 {
        self.file_len
    }
}

/// Terminal status of a completed shred.
#[derive(Debug, Clone, Serialize)]
pub struct ShredReport {
    pub path: PathBuf,
    pub iterations: u32,
    pub workers: usize,
    pub file_len: u64,
    /// Overwrite passes that ran; always equals `iterations` on success
    pub passes: u32,
    pub deleted: bool,
}
