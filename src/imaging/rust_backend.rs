//! Pure Rust codec backend.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, TIFF, WebP) | `image::ImageReader` with content sniffing |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` (baseline) |
//! | EXIF Orientation | `kamadak-exif` via [`read_orientation_tag`] |
//!
//! JPEG has no alpha channel and only 8-bit samples. Anything else is
//! flattened to RGB8 before encoding, so transparency in a PNG source is lost.

use super::backend::{BackendError, ImageBackend, RasterImage};
use super::orientation::read_orientation_tag;
use super::params::Quality;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat, ImageReader};
use std::io::Cursor;
use std::sync::LazyLock;

/// Extensions whose decoders are compiled in.
const PHOTO_CANDIDATES: &[(&str, ImageFormat)] = &[
    ("jpg", ImageFormat::Jpeg),
    ("jpeg", ImageFormat::Jpeg),
    ("png", ImageFormat::Png),
    ("tif", ImageFormat::Tiff),
    ("tiff", ImageFormat::Tiff),
    ("webp", ImageFormat::WebP),
];

static SUPPORTED_EXTENSIONS: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    PHOTO_CANDIDATES
        .iter()
        .filter(|(_, fmt)| fmt.reading_enabled())
        .map(|(ext, _)| *ext)
        .collect()
});

/// Returns the set of image file extensions that have working decoders compiled in.
pub fn supported_input_extensions() -> &'static [&'static str] {
    &SUPPORTED_EXTENSIONS
}

/// Codec backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageBackend for RustBackend {
    fn decode(&self, bytes: &[u8]) -> Result<RasterImage, BackendError> {
        let image = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(BackendError::Io)?
            .decode()
            .map_err(|e| BackendError::ProcessingFailed(format!("Failed to decode: {e}")))?;
        if image.width() == 0 || image.height() == 0 {
            return Err(BackendError::InvalidDimensions {
                width: image.width(),
                height: image.height(),
            });
        }
        Ok(RasterImage::new(image))
    }

    fn encode_jpeg(&self, image: &RasterImage, quality: Quality) -> Result<Vec<u8>, BackendError> {
        let mut bytes = Vec::new();
        let encoder = JpegEncoder::new_with_quality(&mut bytes, quality.value());
        let dynamic = image.as_dynamic();
        let result = match dynamic {
            DynamicImage::ImageRgb8(_) | DynamicImage::ImageLuma8(_) => {
                dynamic.write_with_encoder(encoder)
            }
            other => DynamicImage::ImageRgb8(other.to_rgb8()).write_with_encoder(encoder),
        };
        result.map_err(|e| BackendError::ProcessingFailed(format!("JPEG encode failed: {e}")))?;
        Ok(bytes)
    }

    fn read_orientation(&self, bytes: &[u8]) -> Option<u32> {
        read_orientation_tag(bytes)
    }
}
