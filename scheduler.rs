//! Concurrent overwrite passes.
//!
//! The pass range `[0, iterations)` is split into contiguous [`WorkUnit`]s, one
//! per worker thread. Every worker overwrites the whole file once for each pass
//! it owns, using positional writes against the shared handle, so workers
//! never contend for a cursor and the file never grows.
//!
//! ## Header exclusion
//!
//! The banner is written before the workers start. The first pass to begin
//! (whichever worker runs it) leaves the banner region alone and writes
//! `[header_len, file_len)`; every later pass covers `[0, file_len)`. The
//! banner is restored afterwards by the finalizer.

use crate::error::ShredError;
use crate::util::write_all_at;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use rand_core::OsRng;
use std::fs::File;
use std::io;
use std::ops::Range;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use tracing::{debug, error, info, info_span};

/// Random filler is generated and written in chunks of this size (1MB)
pub const CHUNK_SIZE: usize = 1024 * 1024;

/// Half-open range of pass indices owned by one worker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkUnit {
    pub worker: usize,
    pub passes: Range<u32>,
}

impl WorkUnit {
    pub fn len(&self) -> u32 {
        self.passes.end - self.passes.start
    }

    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }
}

/// Emitted after each completed pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassReport {
    pub worker: usize,
    pub pass: u32,
    /// The pass range owned by the reporting worker
    pub unit: Range<u32>,
    /// First byte overwritten by this pass
    pub offset: u64,
    /// Bytes overwritten by this pass
    pub len: u64,
}

pub type ProgressFn = dyn Fn(&PassReport) + Send + Sync;

/// Split `[0, iterations)` across `worker_count` workers.
///
/// Each worker gets `iterations / worker_count` passes and the last one also
/// takes the remainder, so with more workers than passes only the last unit
/// is non-empty. A worker count of zero is treated as one.
pub fn partition(iterations: u32, worker_count: usize) -> Vec<WorkUnit> {
    let worker_count = worker_count.max(1);
    let per_worker = iterations / u32::try_from(worker_count).unwrap_or(u32::MAX);

    (0..worker_count)
        .map(|i| {
            let idx = i as u32;
            let start = idx.saturating_mul(per_worker).min(iterations);
            let end = if i == worker_count - 1 {
                iterations
            } else {
                (idx + 1).saturating_mul(per_worker).min(iterations)
            };
            WorkUnit {
                worker: i,
                passes: start..end,
            }
        })
        .collect()
}

pub struct Scheduler {
    workers: usize,
    seed: Option<u64>,
    progress: Option<Arc<ProgressFn>>,
}

impl Scheduler {
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
            seed: None,
            progress: None,
        }
    }

    /// Seed every worker's generator from `seed + worker_index`.
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_progress(mut self, progress: Option<Arc<ProgressFn>>) -> Self {
        self.progress = progress;
        self
    }

    /// Run `iterations` overwrite passes over `file` and block until every
    /// worker has finished. Returns the number of passes completed.
    ///
    /// The first error from any worker aborts the remaining passes and is
    /// returned once all threads have been joined.
    pub fn run(
        &self,
        file: &File,
        file_len: u64,
        header_len: u64,
        iterations: u32,
    ) -> Result<u32, ShredError> {
        let units = partition(iterations, self.workers);
        let rngs = units
            .iter()
            .map(|unit| self.worker_rng(unit.worker))
            .collect::<Result<Vec<_>, _>>()?;

        info!(
            iterations,
            workers = units.len(),
            bytes = file_len,
            "starting overwrite passes"
        );

        let header_guard = AtomicU64::new(header_len.min(file_len));
        let completed = AtomicU32::new(0);
        let failed = AtomicBool::new(false);

        let outcomes: Vec<Result<(), ShredError>> = thread::scope(|s| {
            let mut handles = Vec::with_capacity(units.len());
            let mut spawn_error = None;
            for (unit, rng) in units.iter().zip(rngs) {
                let worker = Worker {
                    unit,
                    rng,
                    file,
                    file_len,
                    header_guard: &header_guard,
                    completed: &completed,
                    failed: &failed,
                    progress: self.progress.as_deref(),
                };
                let spawned = thread::Builder::new()
                    .name(format!("shred-worker-{}", unit.worker))
                    .spawn_scoped(s, move || worker.run());
                match spawned {
                    Ok(handle) => handles.push((unit.worker, handle)),
                    Err(e) => {
                        // Workers already running stop before their next pass.
                        failed.store(true, Ordering::SeqCst);
                        error!(worker = unit.worker, error = %e, "failed to spawn worker");
                        spawn_error = Some(ShredError::io(format!(
                            "spawning worker {}: {}",
                            unit.worker, e
                        )));
                        break;
                    }
                }
            }

            let mut outcomes: Vec<_> = handles
                .into_iter()
                .map(|(worker, handle)| {
                    handle.join().unwrap_or_else(|_| {
                        Err(ShredError::io(format!("worker {} panicked", worker)))
                    })
                })
                .collect();
            outcomes.extend(spawn_error.map(Err));
            outcomes
        });

        if let Some(err) = outcomes.into_iter().find_map(Result::err) {
            error!(error = %err, "overwrite aborted");
            return Err(err);
        }

        let passes = completed.load(Ordering::SeqCst);
        info!(passes, "overwrite passes complete");
        Ok(passes)
    }

    fn worker_rng(&self, worker: usize) -> Result<StdRng, ShredError> {
        match self.seed {
            Some(seed) => Ok(StdRng::seed_from_u64(seed.wrapping_add(worker as u64))),
            None => StdRng::from_rng(OsRng)
                .map_err(|e| ShredError::io(format!("seeding worker {}: {}", worker, e))),
        }
    }
}

struct Worker<'a> {
    unit: &'a WorkUnit,
    rng: StdRng,
    file: &'a File,
    file_len: u64,
    header_guard: &'a AtomicU64,
    completed: &'a AtomicU32,
    failed: &'a AtomicBool,
    progress: Option<&'a ProgressFn>,
}

impl Worker<'_> {
    fn run(mut self) -> Result<(), ShredError> {
        let _span = info_span!("worker", index = self.unit.worker).entered();
        if self.unit.is_empty() {
            debug!("no passes assigned");
            return Ok(());
        }

        let mut buf = vec![0u8; CHUNK_SIZE.min(self.file_len as usize).max(1)];

        for pass in self.unit.passes.clone() {
            if self.failed.load(Ordering::SeqCst) {
                debug!(pass, "stopping after failure elsewhere");
                return Ok(());
            }

            // Only the first pass to start skips the banner.
            let offset = self.header_guard.swap(0, Ordering::AcqRel);
            let len = self.file_len - offset;

            if let Err(e) = self.overwrite(offset, &mut buf) {
                self.failed.store(true, Ordering::SeqCst);
                error!(pass, error = %e, "overwrite pass failed");
                return Err(ShredError::io(format!("pass {}: {}", pass, e)));
            }

            self.completed.fetch_add(1, Ordering::SeqCst);
            info!(
                pass,
                start = self.unit.passes.start,
                end = self.unit.passes.end,
                offset,
                bytes = len,
                "pass complete"
            );

            if let Some(progress) = self.progress {
                progress(&PassReport {
                    worker: self.unit.worker,
                    pass,
                    unit: self.unit.passes.clone(),
                    offset,
                    len,
                });
            }
        }

        Ok(())
    }

    /// One pass: fill `[offset, file_len)` with fresh random bytes.
    fn overwrite(&mut self, offset: u64, buf: &mut [u8]) -> io::Result<()> {
        let mut pos = offset;
        while pos < self.file_len {
            let n = (self.file_len - pos).min(buf.len() as u64) as usize;
            self.rng.fill_bytes(&mut buf[..n]);
            write_all_at(self.file, &buf[..n], pos)?;
            pos += n as u64;
        }
        self.file.sync_data()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::fs::OpenOptions;
    use std::sync::Mutex;
    use tempfile::TempDir;

    #[test]
    fn twenty_five_over_four() {
        let units = partition(25, 4);
        let ranges: Vec<_> = units.iter().map(|u| u.passes.clone()).collect();
        assert_eq!(ranges, vec![0..6, 6..12, 12..18, 18..25]);
    }

    #[test]
    fn more_workers_than_passes() {
        let units = partition(3, 8);
        assert_eq!(units.len(), 8);
        assert!(units[..7].iter().all(WorkUnit::is_empty));
        assert_eq!(units[7].passes, 0..3);
    }

    #[test]
    fn zero_workers_means_one() {
        let units = partition(5, 0);
        assert_eq!(units, vec![WorkUnit { worker: 0, passes: 0..5 }]);
    }

    proptest! {
        #[test]
        fn partition_covers_every_pass_once(n in 1u32..=25, w in 1usize..=64) {
            let units = partition(n, w);
            prop_assert_eq!(units.len(), w);
            prop_assert_eq!(units.last().unwrap().passes.end, n);

            let mut next = 0;
            for unit in &units {
                prop_assert_eq!(unit.passes.start, next);
                prop_assert!(unit.passes.start <= unit.passes.end);
                next = unit.passes.end;
            }
            prop_assert_eq!(next, n);
            prop_assert_eq!(units.iter().map(WorkUnit::len).sum::<u32>(), n);
        }
    }

    fn scratch_file(tmp: &TempDir, len: usize) -> (std::path::PathBuf, File) {
        let path = tmp.path().join("victim.txt");
        std::fs::write(&path, vec![b'a'; len]).unwrap();
        let file = OpenOptions::new().read(true).write(true).open(&path).unwrap();
        (path, file)
    }

    #[test]
    fn single_worker_skips_header_on_first_pass_only() {
        let tmp = TempDir::new().unwrap();
        let (path, file) = scratch_file(&tmp, 1000);

        let reports = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&reports);
        let progress: Arc<ProgressFn> =
            Arc::new(move |r: &PassReport| sink.lock().unwrap().push(r.clone()));

        let passes = Scheduler::new(1)
            .with_seed(Some(7))
            .with_progress(Some(progress))
            .run(&file, 1000, 193, 3)
            .unwrap();
        drop(file);
        assert_eq!(passes, 3);

        let reports = reports.lock().unwrap();
        let spans: Vec<_> = reports.iter().map(|r| (r.pass, r.offset, r.len)).collect();
        assert_eq!(spans, vec![(0, 193, 807), (1, 0, 1000), (2, 0, 1000)]);
        assert!(reports.iter().all(|r| r.unit == (0..3)));

        assert_eq!(std::fs::metadata(&path).unwrap().len(), 1000);
    }

    #[test]
    fn many_workers_run_every_pass_once() {
        let tmp = TempDir::new().unwrap();
        let (path, file) = scratch_file(&tmp, 4096);

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let progress: Arc<ProgressFn> =
            Arc::new(move |r: &PassReport| sink.lock().unwrap().push(r.pass));

        let passes = Scheduler::new(4)
            .with_progress(Some(progress))
            .run(&file, 4096, 193, 25)
            .unwrap();
        drop(file);
        assert_eq!(passes, 25);

        let mut seen = seen.lock().unwrap().clone();
        seen.sort_unstable();
        assert_eq!(seen, (0..25).collect::<Vec<_>>());

        let data = std::fs::read(&path).unwrap();
        assert_eq!(data.len(), 4096);
        assert!(data.iter().any(|&b| b != b'a'));
    }

    #[test]
    fn seeded_single_worker_is_reproducible() {
        let run = || {
            let tmp = TempDir::new().unwrap();
            let (path, file) = scratch_file(&tmp, 2048);
            Scheduler::new(1).with_seed(Some(42)).run(&file, 2048, 0, 2).unwrap();
            drop(file);
            std::fs::read(path).unwrap()
        };
        assert_eq!(run(), run());
    }
}
