//! Compression requests and the job payload they travel as.
//!
//! A [`CompressionRequest`] is what a caller builds. It is validated while
//! being built, so a request that exists is a request that can run. Before
//! running it is flattened into a [`JobInput`]; queue-style callers can also
//! produce a `JobInput` from a serialized [`JobPayload`].

use crate::config::ConfigError;
use crate::imaging::{CustomSettings, Overrides, Quality, QualityTier, resolve_quality};
use crate::job::JobError;
use crate::source::SourceId;
use serde::{Deserialize, Serialize};

/// Encoder quality assumed when a payload carries none.
pub const DEFAULT_TARGET_QUALITY: u8 = 80;

/// An immutable request to compress one image.
#[derive(Debug, Clone, PartialEq)]
pub struct CompressionRequest {
    source: SourceId,
    file_name: Option<String>,
    dedup_key: Option<String>,
    tier: QualityTier,
    custom: Option<CustomSettings>,
}

impl CompressionRequest {
    /// Request for `source` at the default tier.
    pub fn new(source: SourceId) -> Result<Self, JobError> {
        if source.as_str().trim().is_empty() {
            return Err(JobError::Input("source identifier is empty".into()));
        }
        Ok(Self {
            source,
            file_name: None,
            dedup_key: None,
            tier: QualityTier::default(),
            custom: None,
        })
    }

    /// Output name without extension.
    pub fn with_name(mut self, name: impl Into<String>) -> Result<Self, ConfigError> {
        let name = name.into();
        if name.is_empty() || name.contains(['/', '\\']) {
            return Err(ConfigError::Validation(format!(
                "output name '{name}' must be non-empty and contain no path separators"
            )));
        }
        self.file_name = Some(name);
        Ok(self)
    }

    /// Key used to reject duplicates while a job is running.
    pub fn with_dedup_key(mut self, key: impl Into<String>) -> Self {
        self.dedup_key = Some(key.into());
        self
    }

    pub fn with_tier(mut self, tier: QualityTier) -> Self {
        self.tier = tier;
        self
    }

    pub fn with_custom(mut self, custom: CustomSettings) -> Self {
        self.custom = Some(custom);
        self
    }

    pub fn source(&self) -> &SourceId {
        &self.source
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    pub fn tier(&self) -> QualityTier {
        self.tier
    }

    pub fn custom(&self) -> Option<&CustomSettings> {
        self.custom.as_ref()
    }

    /// The explicit key, or the source identifier's string form.
    pub fn dedup_key(&self) -> String {
        self.dedup_key
            .clone()
            .unwrap_or_else(|| self.source.to_string())
    }

    /// Flatten into what a job runs on.
    pub fn to_input(&self) -> JobInput {
        JobInput {
            source: self.source.clone(),
            file_name: self.file_name.clone(),
            tier: self.tier,
            overrides: self.custom.map(Overrides::from).unwrap_or_default(),
        }
    }

    /// Serialize for a task queue. Quality is resolved here, so the payload
    /// always carries it.
    pub fn to_payload(&self) -> JobPayload {
        let resolved = resolve_quality(self.tier, self.custom.as_ref());
        JobPayload {
            source: self.source.to_string(),
            file_name: self.file_name.clone(),
            target_width: resolved.target.map(|(w, _)| w),
            target_height: resolved.target.map(|(_, h)| h),
            target_quality: Some(u32::from(resolved.quality.value())),
            compress_quality: self.tier.id(),
        }
    }
}

/// Key-value input of a queued job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobPayload {
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_quality: Option<u32>,
    /// Tier id: 1 = low, 2 = medium, 3 = high. Anything else means medium.
    #[serde(default)]
    pub compress_quality: u8,
}

/// Everything a single job needs, independent of how it was submitted.
#[derive(Debug, Clone, PartialEq)]
pub struct JobInput {
    pub source: SourceId,
    pub file_name: Option<String>,
    pub tier: QualityTier,
    pub overrides: Overrides,
}

impl JobInput {
    /// Decode a queued payload.
    ///
    /// A target resolution applies only when both edges are present.
    pub fn from_payload(payload: &JobPayload) -> Result<Self, JobError> {
        if payload.source.trim().is_empty() {
            return Err(JobError::Input("source identifier is empty".into()));
        }
        let quality = Quality::new(
            payload
                .target_quality
                .unwrap_or(u32::from(DEFAULT_TARGET_QUALITY)),
        )?;
        let target = match (payload.target_width, payload.target_height) {
            (Some(w), Some(h)) => Some((w, h)),
            _ => None,
        };
        Ok(Self {
            source: SourceId::new(payload.source.clone()),
            file_name: payload.file_name.clone(),
            tier: QualityTier::from_id(payload.compress_quality),
            overrides: Overrides {
                target,
                quality: Some(quality),
            },
        })
    }
}
