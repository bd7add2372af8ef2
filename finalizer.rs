//! Post-overwrite steps: restore the banner, release the handle, and delete
//! the file when the confirmation provider agrees.

use crate::confirm::ConfirmationProvider;
use crate::error::ShredError;
use crate::header::write_header;
use std::fs::File;
use std::path::Path;
use tokio::fs;
use tracing::{debug, info, warn};

pub struct Finalizer;

impl Finalizer {
    /// Rewrite the banner at offset 0 and flush the file to disk.
    pub fn restore_header(file: &File, file_len: u64) -> Result<(), ShredError> {
        write_header(file, file_len)?;
        file.sync_all()?;
        debug!("header restored");
        Ok(())
    }

    /// Close the handle. Taking it by value guarantees no writer outlives this call.
    pub fn release(file: File) {
        drop(file);
        debug!("file handle released");
    }

    /// Ask `confirm` and remove the file on a yes. Returns whether it was deleted.
    pub async fn delete_if_confirmed(
        path: &Path,
        confirm: &dyn ConfirmationProvider,
    ) -> Result<bool, ShredError> {
        if !confirm.confirm_deletion(path)? {
            info!(path = %path.display(), "keeping shredded file");
            return Ok(false);
        }

        match fs::remove_file(path).await {
            Ok(()) => {
                info!(path = %path.display(), "shredded file deleted");
                Ok(true)
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "delete failed");
                Err(ShredError::io(format!("deleting {}: {}", path.display(), e)))
            }
        }
    }
}
