//! High-level shred operation.
//!
//! [`Shredder`] ties the pieces together for one validated [`ShredRequest`]:
//!
//! 1. open the file for writing and place the banner
//! 2. run the overwrite passes on the worker pool
//! 3. restore the banner, flush and release the handle
//! 4. delete the file if the confirmation provider says yes
//!
//! Steps 1-3 are blocking file I/O and run on tokio's blocking pool.

use crate::config::Config;
use crate::confirm::ConfirmationProvider;
use crate::error::ShredError;
use crate::finalizer::Finalizer;
use crate::header::write_header;
use crate::request::{ShredReport, ShredRequest};
use crate::scheduler::{PassReport, ProgressFn, Scheduler};
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct Shredder {
    workers: usize,
    seed: Option<u64>,
    progress: Option<Arc<ProgressFn>>,
}

impl Shredder {
    pub fn new(cfg: &Config) -> Self {
        Self {
            workers: cfg.worker_count(),
            seed: None,
            progress: None,
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Make the filler reproducible. Intended for tests.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Observe each completed pass. Called from worker threads.
    pub fn with_progress<F>(mut self, progress: F) -> Self
    where
        F: Fn(&PassReport) + Send + Sync + 'static,
    {
        self.progress = Some(Arc::new(progress));
        self
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Overwrite the file without the deletion step.
    /// Returns the number of passes completed.
    pub async fn overwrite(&self, request: &ShredRequest) -> Result<u32, ShredError> {
        let path = request.path().to_path_buf();
        let iterations = request.iterations();
        let expected_len = request.file_len();
        let scheduler = Scheduler::new(self.workers)
            .with_seed(self.seed)
            .with_progress(self.progress.clone());

        debug!(path = %path.display(), iterations, workers = self.workers, "dispatching overwrite");

        tokio::task::spawn_blocking(move || {
            overwrite_in_place(&path, iterations, expected_len, &scheduler)
        })
        .await
        .map_err(|e| ShredError::io(format!("overwrite task failed: {}", e)))?
    }

    /// Overwrite the file, then delete it if `confirm` agrees.
    pub async fn shred(
        &self,
        request: &ShredRequest,
        confirm: &dyn ConfirmationProvider,
    ) -> Result<ShredReport, ShredError> {
        let passes = self.overwrite(request).await?;
        info!(path = %request.path().display(), passes, "file shredded");

        let deleted = Finalizer::delete_if_confirmed(request.path(), confirm).await?;

        Ok(ShredReport {
            path: request.path().to_path_buf(),
            iterations: request.iterations(),
            workers: self.workers(),
            file_len: request.file_len(),
            passes,
            deleted,
        })
    }
}

fn overwrite_in_place(
    path: &Path,
    iterations: u32,
    expected_len: u64,
    scheduler: &Scheduler,
) -> Result<u32, ShredError> {
    let file = OpenOptions::new()
        .write(true)
        .open(path)
        .map_err(|e| ShredError::io(format!("opening {}: {}", path.display(), e)))?;

    let file_len = file.metadata()?.len();
    if file_len != expected_len {
        warn!(
            path = %path.display(),
            expected = expected_len,
            actual = file_len,
            "file size changed since validation"
        );
    }

    let header_len = write_header(&file, file_len)?;
    let passes = scheduler.run(&file, file_len, header_len, iterations)?;

    Finalizer::restore_header(&file, file_len)?;
    Finalizer::release(file);
    Ok(passes)
}
