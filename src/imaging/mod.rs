//! Image processing in pure Rust, no system libraries.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode** | `image::ImageReader` (JPEG, PNG, TIFF, WebP) |
//! | **EXIF orientation** | `kamadak-exif` |
//! | **Resize + rotate** | Lanczos3 `resize_exact` + quarter-turn |
//! | **Encode** | `image` JPEG encoder |
//!
//! The module is split into:
//! - **Parameters**: quality tiers, custom settings and their resolution
//! - **Calculations**: pure output-resolution planning (unit testable)
//! - **Orientation**: EXIF tag → rotation
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: the resize/rotate transform applied to decoded rasters

pub mod backend;
mod calculations;
pub mod operations;
pub mod orientation;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, ImageBackend, RasterImage};
pub use calculations::{PlanError, plan_resolution};
pub use operations::resize_and_rotate;
pub use orientation::{Rotation, rotation_for_tag};
pub use params::{
    CustomSettings, Overrides, Quality, QualityTier, ResolvedQuality, resolve_overrides,
    resolve_quality,
};
pub use rust_backend::{RustBackend, supported_input_extensions};
