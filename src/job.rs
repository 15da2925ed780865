//! The compression job.
//!
//! One job takes one image from its source to the content store:
//!
//! ```text
//! Pending → Decoding → Planning → Resizing → NamingOutput → Encoding → Persisting → Succeeded
//!              │                     │                         │            │
//!              └─────────────────────┴──────── Failed ─────────┴────────────┘
//! ```
//!
//! Any stage error goes straight to `Failed`; nothing is retried and a new
//! run always starts again from `Pending`. Two lookups are allowed to fail
//! without failing the job: the EXIF orientation (treated as no rotation)
//! and the original file name (treated as unknown).
//!
//! Errors never leave a job. [`Pipeline::run`] always returns a
//! [`JobOutcome`], carrying either the stored location or a message.

use crate::config::ConfigError;
use crate::imaging::{
    ImageBackend, PlanError, plan_resolution, resize_and_rotate, resolve_overrides,
    rotation_for_tag,
};
use crate::naming::resolve_output_name;
use crate::request::JobInput;
use crate::source::MediaSource;
use crate::store::{ContentStore, JPEG_MIME, Location, StoreItem};
use chrono::Local;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum JobError {
    #[error("invalid input: {0}")]
    Input(String),
    #[error("invalid configuration: {0}")]
    Configuration(#[from] ConfigError),
    #[error("decode failed: {0}")]
    Decode(String),
    #[error("resize failed: {0}")]
    Resize(String),
    #[error("encode failed: {0}")]
    Encode(String),
    #[error("persist failed: {0}")]
    Persist(String),
}

impl From<PlanError> for JobError {
    fn from(e: PlanError) -> Self {
        JobError::Resize(e.to_string())
    }
}

/// Where a job is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Pending,
    Decoding,
    Planning,
    Resizing,
    NamingOutput,
    Encoding,
    Persisting,
    Succeeded,
    Failed,
}

impl JobState {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobState::Succeeded | JobState::Failed)
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            JobState::Pending => "pending",
            JobState::Decoding => "decoding",
            JobState::Planning => "planning",
            JobState::Resizing => "resizing",
            JobState::NamingOutput => "naming output",
            JobState::Encoding => "encoding",
            JobState::Persisting => "persisting",
            JobState::Succeeded => "succeeded",
            JobState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Terminal result of a job. Serializes to the queue's output payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JobOutcome {
    Success { saved_location: Location },
    Failure { failure_message: String },
}

impl JobOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, JobOutcome::Success { .. })
    }

    fn from_result(result: Result<Location, JobError>) -> Self {
        match result {
            Ok(saved_location) => JobOutcome::Success { saved_location },
            Err(e) => JobOutcome::Failure {
                failure_message: e.to_string(),
            },
        }
    }
}

impl From<JobError> for JobOutcome {
    fn from(e: JobError) -> Self {
        JobOutcome::from_result(Err(e))
    }
}

/// The collaborators a job runs against.
///
/// Generic over the codec, the media source and the store, so tests can run
/// the whole state machine against doubles.
pub struct Pipeline<B, M, S> {
    backend: B,
    media: M,
    store: S,
    collection: String,
}

impl<B, M, S> Pipeline<B, M, S>
where
    B: ImageBackend,
    M: MediaSource,
    S: ContentStore,
{
    pub fn new(backend: B, media: M, store: S, collection: impl Into<String>) -> Self {
        Self {
            backend,
            media,
            store,
            collection: collection.into(),
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Run one job to completion.
    pub fn run(&self, input: &JobInput) -> JobOutcome {
        self.run_with(input, |_| {})
    }

    /// Run one job, reporting every state it enters, terminal state included.
    pub fn run_with(&self, input: &JobInput, mut on_state: impl FnMut(JobState)) -> JobOutcome {
        let mut enter = |state: JobState| {
            debug!("{}: {state}", input.source);
            on_state(state);
        };
        enter(JobState::Pending);

        let outcome = JobOutcome::from_result(self.execute(input, &mut enter));
        match &outcome {
            JobOutcome::Success { saved_location } => {
                info!("{} → {saved_location}", input.source);
                enter(JobState::Succeeded);
            }
            JobOutcome::Failure { failure_message } => {
                warn!("{}: {failure_message}", input.source);
                enter(JobState::Failed);
            }
        }
        outcome
    }

    fn execute(
        &self,
        input: &JobInput,
        enter: &mut impl FnMut(JobState),
    ) -> Result<Location, JobError> {
        enter(JobState::Decoding);
        let bytes = self
            .media
            .open(&input.source)
            .map_err(|e| JobError::Input(format!("source unreadable: {e}")))?;
        let original = self
            .backend
            .decode(&bytes)
            .map_err(|e| JobError::Decode(e.to_string()))?;

        enter(JobState::Planning);
        let resolved = resolve_overrides(input.tier, &input.overrides);
        let (width, height) =
            plan_resolution(original.dimensions(), resolved.target, resolved.multiplier)?;
        debug!(
            "{}: {}x{} → {width}x{height} at q{}",
            input.source,
            original.width(),
            original.height(),
            resolved.quality.value()
        );

        enter(JobState::Resizing);
        let rotation = rotation_for_tag(self.backend.read_orientation(&bytes));
        drop(bytes);
        let resized = resize_and_rotate(original, width, height, rotation)
            .map_err(|e| JobError::Resize(e.to_string()))?;

        enter(JobState::NamingOutput);
        let original_name = match self.media.display_name(&input.source) {
            Ok(name) => name,
            Err(e) => {
                warn!("{}: original name lookup failed: {e}", input.source);
                None
            }
        };
        let display_name = resolve_output_name(
            input.file_name.as_deref(),
            original_name.as_deref(),
            &Local::now(),
        );

        enter(JobState::Encoding);
        let encoded = self
            .backend
            .encode_jpeg(&resized, resolved.quality)
            .map_err(|e| JobError::Encode(e.to_string()))?;

        enter(JobState::Persisting);
        let item = StoreItem {
            collection: &self.collection,
            display_name: &display_name,
            mime_type: JPEG_MIME,
            width: resized.width(),
            height: resized.height(),
            quality: resolved.quality.value(),
            bytes: &encoded,
        };
        self.store
            .insert(&item)
            .map_err(|e| JobError::Persist(e.to_string()))?
            .ok_or_else(|| JobError::Persist("store returned no location".into()))
    }
}
