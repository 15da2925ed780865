//! At-most-one running job per key, and the worker pool that runs them.
//!
//! [`JobDeduplicator`] is a set of in-flight keys behind one mutex: admitting
//! a key is a single check-and-insert, so two racing submissions with the
//! same key can't both get in. A duplicate is dropped, never queued, and
//! never disturbs the running job. The key is released when the job reaches
//! a terminal state, after which the same key is admitted again.
//!
//! [`Compressor`] ties a [`Pipeline`] to a rayon thread pool. Every admitted
//! submission produces exactly one [`JobReport`] on the caller's channel;
//! rejected submissions produce none, and a job that panics reports a
//! failure. Jobs cannot be cancelled and have no timeout.

use crate::imaging::ImageBackend;
use crate::job::{JobOutcome, Pipeline};
use crate::request::{CompressionRequest, JobInput, JobPayload};
use crate::source::MediaSource;
use crate::store::ContentStore;
use log::{debug, error};
use parking_lot::Mutex;
use rayon::{ThreadPool, ThreadPoolBuildError};
use serde::Serialize;
use std::collections::HashSet;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::mpsc::Sender;

/// Keys of the jobs currently running.
#[derive(Debug, Default)]
pub struct JobDeduplicator {
    in_flight: Mutex<HashSet<String>>,
}

impl JobDeduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `key`. `None` if a job with this key is already running.
    pub fn try_acquire(self: &Arc<Self>, key: &str) -> Option<KeyGuard> {
        if self.in_flight.lock().insert(key.to_string()) {
            Some(KeyGuard {
                owner: Arc::clone(self),
                key: key.to_string(),
            })
        } else {
            None
        }
    }

    /// Run `job` under `key` unless that key is already running.
    ///
    /// Returns whether the job was admitted. The key stays claimed for as
    /// long as the job keeps the guard.
    pub fn submit(self: &Arc<Self>, key: &str, job: impl FnOnce(KeyGuard)) -> bool {
        match self.try_acquire(key) {
            Some(guard) => {
                job(guard);
                true
            }
            None => {
                debug!("{key}: already running, submission dropped");
                false
            }
        }
    }

    pub fn is_running(&self, key: &str) -> bool {
        self.in_flight.lock().contains(key)
    }

    pub fn running(&self) -> usize {
        self.in_flight.lock().len()
    }
}

/// Claim on a key; releases it on drop.
#[derive(Debug)]
pub struct KeyGuard {
    owner: Arc<JobDeduplicator>,
    key: String,
}

impl KeyGuard {
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl Drop for KeyGuard {
    fn drop(&mut self) {
        self.owner.in_flight.lock().remove(&self.key);
    }
}

/// Outcome of one admitted job, as delivered to the submitter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobReport {
    pub key: String,
    #[serde(flatten)]
    pub outcome: JobOutcome,
}

/// Runs compression jobs on a worker pool with per-key deduplication.
pub struct Compressor<B, M, S> {
    pipeline: Arc<Pipeline<B, M, S>>,
    dedup: Arc<JobDeduplicator>,
    pool: ThreadPool,
    reports: Sender<JobReport>,
}

impl<B, M, S> Compressor<B, M, S>
where
    B: ImageBackend + 'static,
    M: MediaSource + 'static,
    S: ContentStore + 'static,
{
    /// `workers` is the pool size; reports for finished jobs go to `reports`.
    pub fn new(
        pipeline: Pipeline<B, M, S>,
        workers: usize,
        reports: Sender<JobReport>,
    ) -> Result<Self, ThreadPoolBuildError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers.max(1))
            .thread_name(|i| format!("squishpic-worker-{i}"))
            .build()?;
        Ok(Self {
            pipeline: Arc::new(pipeline),
            dedup: Arc::new(JobDeduplicator::new()),
            pool,
            reports,
        })
    }

    /// Queue `request`. `false` when a job with the same key is still running.
    pub fn submit(&self, request: &CompressionRequest) -> bool {
        let input = request.to_input();
        self.submit_input(&request.dedup_key(), Ok(input))
    }

    /// Queue a serialized payload. A payload that doesn't decode is still
    /// admitted and reports a failure.
    pub fn submit_payload(&self, key: &str, payload: &JobPayload) -> bool {
        self.submit_input(key, JobInput::from_payload(payload).map_err(JobOutcome::from))
    }

    fn submit_input(&self, key: &str, input: Result<JobInput, JobOutcome>) -> bool {
        self.dedup.submit(key, |guard| {
            let pipeline = Arc::clone(&self.pipeline);
            let reports = self.reports.clone();
            self.pool.spawn(move || {
                let outcome = match input {
                    Ok(input) => run_caught(&pipeline, &input),
                    Err(outcome) => outcome,
                };
                let key = guard.key().to_string();
                // Release before reporting so a resubmission triggered by
                // the report is admitted.
                drop(guard);
                if reports.send(JobReport { key, outcome }).is_err() {
                    debug!("report receiver gone");
                }
            });
        })
    }

    pub fn is_running(&self, key: &str) -> bool {
        self.dedup.is_running(key)
    }

    pub fn pipeline(&self) -> &Pipeline<B, M, S> {
        &self.pipeline
    }
}

/// Run one job, turning a panic anywhere in the pipeline into a failure so
/// the job still reports and the worker survives.
fn run_caught<B, M, S>(pipeline: &Pipeline<B, M, S>, input: &JobInput) -> JobOutcome
where
    B: ImageBackend,
    M: MediaSource,
    S: ContentStore,
{
    panic::catch_unwind(AssertUnwindSafe(|| pipeline.run(input))).unwrap_or_else(|payload| {
        let reason = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown cause".to_string());
        error!("{}: job panicked: {reason}", input.source);
        JobOutcome::Failure {
            failure_message: format!("job panicked: {reason}"),
        }
    })
}
