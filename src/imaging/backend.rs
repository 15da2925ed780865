//! Codec backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the three operations the compression
//! pipeline needs from a codec: decode, encode to JPEG, and read the EXIF
//! orientation tag.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate. Tests use the recording `MockBackend` below.

use super::params::Quality;
use image::DynamicImage;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
    #[error("Invalid dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
}

/// Decoded, uncompressed pixel buffer.
///
/// Owned by exactly one pipeline stage at a time. Stages that transform it
/// take it by value, so a released buffer can't be read again.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterImage(DynamicImage);

impl RasterImage {
    pub fn new(image: DynamicImage) -> Self {
        Self(image)
    }

    pub fn width(&self) -> u32 {
        self.0.width()
    }

    pub fn height(&self) -> u32 {
        self.0.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width(), self.height())
    }

    pub fn as_dynamic(&self) -> &DynamicImage {
        &self.0
    }

    pub fn into_dynamic(self) -> DynamicImage {
        self.0
    }
}

impl From<DynamicImage> for RasterImage {
    fn from(image: DynamicImage) -> Self {
        Self(image)
    }
}

/// Trait for codec backends.
pub trait ImageBackend: Send + Sync {
    /// Decode an encoded image into a raster buffer.
    fn decode(&self, bytes: &[u8]) -> Result<RasterImage, BackendError>;

    /// Encode a raster buffer as baseline JPEG.
    fn encode_jpeg(&self, image: &RasterImage, quality: Quality) -> Result<Vec<u8>, BackendError>;

    /// Raw EXIF Orientation value, `None` when absent or unreadable.
    fn read_orientation(&self, bytes: &[u8]) -> Option<u32>;
}
