use thiserror::Error;

/// Terminal conditions of a shred operation.
///
/// Every variant except [`ShredError::Io`] is raised before the target file is
/// opened for writing, so the file is left untouched.
#[derive(Debug, Error)]
pub enum ShredError {
    /// Wrong number or shape of command-line arguments
    #[error("Invalid command-line arguments.")]
    InvalidArguments,

    /// Iteration count is not an integer in 1..=25
    #[error("Invalid number of iterations.")]
    InvalidIterations,

    #[error("File not found.")]
    FileNotFound,

    /// Extension is not on the whitelist
    #[error("Invalid file extension.")]
    InvalidExtension,

    /// File is empty or larger than the size ceiling
    #[error("Invalid file size.")]
    InvalidFileSize,

    /// File is marked read-only
    #[error("You do not have permission to shred this file.")]
    PermissionDenied,

    /// File name holds a reserved character
    #[error("Invalid file path.")]
    InvalidPath,

    /// Opening, writing, syncing or deleting the file failed.
    /// The file may be partially overwritten.
    #[error("I/O failure: {0}")]
    Io(String),
}

impl ShredError {
    pub fn io(msg: impl Into<String>) -> Self {
        Self::Io(msg.into())
    }

    /// True for rejections raised by validation (no mutation happened).
    pub fn is_validation(&self) -> bool {
        !matches!(self, Self::Io(_))
    }
}

impl From<std::io::Error> for ShredError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}
