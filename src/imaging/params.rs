//! Parameter types for compression.
//!
//! These structs describe *what* to produce, not *how*. A request carries a
//! [`QualityTier`] and optionally [`CustomSettings`]; [`resolve_quality`]
//! folds the two into a [`ResolvedQuality`] that the planner and the encoder
//! consume.
//!
//! ## Types
//!
//! - [`Quality`]: JPEG encoder quality (0–100). Rejected, not clamped, when out of range.
//! - [`QualityTier`]: LOW / MEDIUM / HIGH presets: encoder quality + max-dimension multiplier.
//! - [`CustomSettings`]: explicit target resolution and quality, validated on construction.
//! - [`Overrides`]: the partial form of custom settings carried by job payloads.

use crate::config::ConfigError;
use serde::{Deserialize, Serialize};

/// Quality setting for JPEG encoding (0-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u8")]
pub struct Quality(u8);

impl Quality {
    pub fn new(value: u32) -> Result<Self, ConfigError> {
        if value > 100 {
            return Err(ConfigError::Validation(format!(
                "quality must be 0-100, got {value}"
            )));
        }
        Ok(Self(value as u8))
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<u32> for Quality {
    type Error = ConfigError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Quality> for u8 {
    fn from(q: Quality) -> u8 {
        q.0
    }
}

/// Predefined compression strategy.
///
/// | Tier | Id | Quality | Multiplier |
/// |---|---|---|---|
/// | `Low` | 1 | 60 | 0.4 |
/// | `Medium` | 2 | 70 | 0.5 |
/// | `High` | 3 | 80 | 0.75 |
///
/// The multiplier bounds the output's longer edge as a fraction of the
/// original longer edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum QualityTier {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityTier {
    /// Numeric identifier used in job payloads.
    pub fn id(self) -> u8 {
        match self {
            QualityTier::Low => 1,
            QualityTier::Medium => 2,
            QualityTier::High => 3,
        }
    }

    /// Unknown ids fall back to `Medium`.
    pub fn from_id(id: u8) -> Self {
        match id {
            1 => QualityTier::Low,
            3 => QualityTier::High,
            _ => QualityTier::Medium,
        }
    }

    pub fn encoder_quality(self) -> Quality {
        match self {
            QualityTier::Low => Quality(60),
            QualityTier::Medium => Quality(70),
            QualityTier::High => Quality(80),
        }
    }

    pub fn max_dimension_multiplier(self) -> f64 {
        match self {
            QualityTier::Low => 0.4,
            QualityTier::Medium => 0.5,
            QualityTier::High => 0.75,
        }
    }
}

/// Caller-chosen output resolution and quality.
///
/// Overrides the tier completely: the tier contributes neither quality nor
/// dimensions once custom settings are present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomSettings {
    target_width: u32,
    target_height: u32,
    target_quality: Quality,
}

impl CustomSettings {
    pub fn new(
        target_width: u32,
        target_height: u32,
        target_quality: u32,
    ) -> Result<Self, ConfigError> {
        if target_width == 0 || target_height == 0 {
            return Err(ConfigError::Validation(format!(
                "target resolution must be at least 1x1, got {target_width}x{target_height}"
            )));
        }
        Ok(Self {
            target_width,
            target_height,
            target_quality: Quality::new(target_quality)?,
        })
    }

    pub fn target_width(&self) -> u32 {
        self.target_width
    }

    pub fn target_height(&self) -> u32 {
        self.target_height
    }

    pub fn target_quality(&self) -> Quality {
        self.target_quality
    }
}

/// Partial overrides as they travel through a job payload.
///
/// `target` applies only when both edges were supplied; `quality` applies
/// whenever present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Overrides {
    pub target: Option<(u32, u32)>,
    pub quality: Option<Quality>,
}

impl From<CustomSettings> for Overrides {
    fn from(custom: CustomSettings) -> Self {
        Self {
            target: Some((custom.target_width, custom.target_height)),
            quality: Some(custom.target_quality),
        }
    }
}

/// Encoder and planner inputs after folding a tier with its overrides.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedQuality {
    pub quality: Quality,
    /// Explicit output resolution, bypassing the multiplier.
    pub target: Option<(u32, u32)>,
    pub multiplier: f64,
}

/// Resolve a tier and optional custom settings into encoder parameters.
pub fn resolve_quality(tier: QualityTier, custom: Option<&CustomSettings>) -> ResolvedQuality {
    let overrides = custom.copied().map(Overrides::from).unwrap_or_default();
    resolve_overrides(tier, &overrides)
}

/// Same as [`resolve_quality`] for the partial payload form.
pub fn resolve_overrides(tier: QualityTier, overrides: &Overrides) -> ResolvedQuality {
    ResolvedQuality {
        quality: overrides.quality.unwrap_or_else(|| tier.encoder_quality()),
        target: overrides.target,
        multiplier: tier.max_dimension_multiplier(),
    }
}
