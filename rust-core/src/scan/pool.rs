//! Fixed-size worker pool computing band powers in parallel
//!
//! One scoped thread per worker. Each worker owns a disjoint slice of the band
//! power table, so writes need no locking; the scope join is the only
//! synchronization point before the table is read.

use std::ops::Range;
use std::thread::{self, ScopedJoinHandle};
use thiserror::Error;

use super::affinity::{AffinityError, AffinityPolicy};
use super::partition::partition_slices;
use super::BandPlan;
use crate::filters::KernelSettings;

/// A worker that could not be spawned
#[derive(Error, Debug)]
#[error("Failed to start worker {worker_id}: {source}")]
pub struct StartError {
    pub worker_id: usize,
    #[source]
    pub source: std::io::Error,
}

/// A worker that was spawned and must be joined
pub struct Started<'scope> {
    pub worker_id: usize,
    handle: ScopedJoinHandle<'scope, Result<WorkerSummary, AffinityError>>,
}

/// Start record for one worker
pub type WorkerStart<'scope> = Result<Started<'scope>, StartError>;

/// What a finished worker did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerSummary {
    pub worker_id: usize,
    pub bands: Range<usize>,
    pub processor: Option<usize>,
}

/// How each worker ended after the join barrier
#[derive(Debug)]
pub enum WorkerOutcome {
    Completed(WorkerSummary),
    NotStarted(StartError),
    AffinityFailed { worker_id: usize, source: AffinityError },
    Panicked { worker_id: usize },
}

/// Outcomes of all workers, in worker order
#[derive(Debug)]
pub struct PoolReport {
    pub outcomes: Vec<WorkerOutcome>,
}

impl PoolReport {
    /// Number of workers that were spawned
    pub fn started(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| !matches!(o, WorkerOutcome::NotStarted(_)))
            .count()
    }

    /// True when every worker filled its whole range
    pub fn all_completed(&self) -> bool {
        self.outcomes
            .iter()
            .all(|o| matches!(o, WorkerOutcome::Completed(_)))
    }
}

/// Worker pool with a fixed thread count and an injectable affinity policy
pub struct WorkerPool<'p> {
    num_threads: usize,
    policy: &'p dyn AffinityPolicy,
}

impl<'p> WorkerPool<'p> {
    pub fn new(num_threads: usize, policy: &'p dyn AffinityPolicy) -> Self {
        Self { num_threads, policy }
    }

    pub fn num_threads(&self) -> usize {
        self.num_threads
    }

    /// Fill `powers[band]` for every band of `plan`
    ///
    /// Blocks until every started worker has finished. Start failures are
    /// recorded, not retried; the affected ranges keep their prior contents.
    pub fn run(
        &self,
        signal: &[f64],
        plan: &BandPlan,
        kernel: &KernelSettings,
        powers: &mut [f64],
    ) -> PoolReport {
        debug_assert_eq!(powers.len(), plan.num_bands());
        let policy = self.policy;
        let parts = partition_slices(powers, self.num_threads);

        let outcomes = thread::scope(|scope| {
            let starts: Vec<WorkerStart<'_>> = parts
                .into_iter()
                .enumerate()
                .map(|(worker_id, (bands, slice))| {
                    thread::Builder::new()
                        .name(format!("band-worker-{}", worker_id))
                        .spawn_scoped(scope, move || {
                            run_worker(worker_id, bands, slice, signal, plan, kernel, policy)
                        })
                        .map(|handle| Started { worker_id, handle })
                        .map_err(|source| StartError { worker_id, source })
                })
                .collect();

            let started = starts.iter().filter(|s| s.is_ok()).count();
            log::info!("Finished starting threads ({} started)", started);

            starts.into_iter().map(join_worker).collect::<Vec<_>>()
        });

        PoolReport { outcomes }
    }
}

fn join_worker(start: WorkerStart<'_>) -> WorkerOutcome {
    match start {
        Ok(Started { worker_id, handle }) => match handle.join() {
            Ok(Ok(summary)) => {
                log::debug!("Done joining with {}", worker_id);
                WorkerOutcome::Completed(summary)
            }
            Ok(Err(source)) => {
                log::error!("Worker {} failed to set affinity: {}", worker_id, source);
                WorkerOutcome::AffinityFailed { worker_id, source }
            }
            Err(_) => {
                log::error!("Worker {} panicked", worker_id);
                WorkerOutcome::Panicked { worker_id }
            }
        },
        Err(error) => {
            log::error!("Skipping {} (wasn't started successfully): {}", error.worker_id, error);
            WorkerOutcome::NotStarted(error)
        }
    }
}

fn run_worker(
    worker_id: usize,
    bands: Range<usize>,
    out: &mut [f64],
    signal: &[f64],
    plan: &BandPlan,
    kernel: &KernelSettings,
    policy: &dyn AffinityPolicy,
) -> Result<WorkerSummary, AffinityError> {
    let processor = policy.apply(worker_id)?;
    log::debug!(
        "Worker {} on processor {:?} takes bands {}..{}",
        worker_id,
        processor,
        bands.start,
        bands.end
    );

    for (slot, band) in out.iter_mut().zip(bands.clone()) {
        *slot = kernel.band_power(signal, plan.edges(band));
    }

    Ok(WorkerSummary {
        worker_id,
        bands,
        processor,
    })
}
