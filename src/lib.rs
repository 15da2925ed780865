//! # squishpic
//!
//! Shrinks photos by resizing and re-encoding them as JPEG. Output keeps the
//! visual orientation of the original and follows either a preset quality
//! tier or caller-supplied resolution and quality.
//!
//! # Architecture: One Job per Image
//!
//! Every image is compressed by an independent job:
//!
//! ```text
//! CompressionRequest ─▶ JobDeduplicator ─▶ Pipeline (decode → plan → resize → name → encode → persist) ─▶ JobOutcome
//!                          │
//!                          └─ duplicate key while running: dropped
//! ```
//!
//! The job talks to three collaborators through traits, each with one
//! production implementation:
//!
//! | Trait | Role | Implementation |
//! |-------|------|----------------|
//! | [`imaging::ImageBackend`] | decode, JPEG encode, EXIF orientation | [`imaging::RustBackend`] |
//! | [`source::MediaSource`] | bytes and display name of a selected image | [`source::FileSource`] |
//! | [`store::ContentStore`] | final write, returns a location | [`store::DirectoryStore`] |
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | Quality tiers, resolution planning, orientation, resize, codec backend |
//! | [`request`] | Immutable validated requests and the serialized job payload |
//! | [`job`] | The per-image state machine and its typed errors |
//! | [`dedup`] | At-most-one running job per key; the worker pool |
//! | [`naming`] | Output file names |
//! | [`source`] | Media source trait and local-file implementation |
//! | [`store`] | Content store trait and directory implementation |
//! | [`config`] | `config.toml` loading and validation |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Tiers Bound, Never Upscale
//!
//! A tier caps the output's longer edge at a fraction of the original's
//! longer edge. Explicit custom resolutions are taken literally, aspect
//! ratio included.
//!
//! ## JPEG Only
//!
//! Output is always baseline JPEG. Alpha and high bit depth are flattened
//! away. A caller-named output keeps the original's extension, so a PNG
//! source can produce a `.png` file with JPEG content.
//!
//! ## Failures Stay Inside the Job
//!
//! Every stage error becomes a [`job::JobOutcome::Failure`] with a message;
//! nothing propagates past the job. Missing EXIF data and a failed name
//! lookup degrade to defaults instead of failing.

pub mod config;
pub mod dedup;
pub mod imaging;
pub mod job;
pub mod naming;
pub mod output;
pub mod request;
pub mod source;
pub mod store;

#[cfg(test)]
pub(crate) mod test_helpers;
