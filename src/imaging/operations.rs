//! High-level image operations.
//!
//! [`resize_and_rotate`] is the one transform the compression pipeline
//! applies: scale to the planned resolution, then turn to the EXIF
//! orientation.

use super::backend::{BackendError, RasterImage};
use super::orientation::Rotation;
use image::imageops::FilterType;

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Largest accepted output edge, in pixels.
pub const MAX_DIMENSION: u32 = 32768;

/// Largest accepted output area (100 megapixels).
pub const MAX_PIXELS: u64 = 100_000_000;

/// Reject output sizes that are empty or too large to allocate.
pub fn check_dimensions(width: u32, height: u32) -> Result<()> {
    let pixels = u64::from(width) * u64::from(height);
    if pixels == 0 || width > MAX_DIMENSION || height > MAX_DIMENSION || pixels > MAX_PIXELS {
        return Err(BackendError::InvalidDimensions { width, height });
    }
    Ok(())
}

/// Scale `image` to `width`×`height`, then rotate clockwise by `rotation`.
///
/// The rotation is a lossless quarter-turn, so pixels are resampled exactly
/// once. For 90° and 270° the returned image has its edges swapped.
///
/// The source buffer is consumed. When there is nothing to do (same size, no
/// rotation) the same buffer comes back without a copy; otherwise it is
/// dropped as soon as the new one exists.
///
/// Targets outside [`check_dimensions`] fail before any buffer is allocated.
pub fn resize_and_rotate(
    image: RasterImage,
    width: u32,
    height: u32,
    rotation: Rotation,
) -> Result<RasterImage> {
    check_dimensions(width, height)?;

    let same_size = image.dimensions() == (width, height);
    if same_size && rotation == Rotation::None {
        return Ok(image);
    }

    let scaled = if same_size {
        image.into_dynamic()
    } else {
        image
            .into_dynamic()
            .resize_exact(width, height, FilterType::Lanczos3)
    };

    let turned = match rotation {
        Rotation::None => scaled,
        Rotation::Cw90 => scaled.rotate90(),
        Rotation::Cw180 => scaled.rotate180(),
        Rotation::Cw270 => scaled.rotate270(),
    };
    Ok(RasterImage::new(turned))
}
