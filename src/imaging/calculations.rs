//! Pure calculation functions for output dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum PlanError {
    #[error("invalid target resolution {width}x{height}: both edges must be at least 1")]
    InvalidTarget { width: u32, height: u32 },
}

/// Calculate the output resolution for a compression job.
///
/// # Arguments
/// * `original` - Decoded image dimensions (width, height)
/// * `target` - Explicit resolution from custom settings; returned as-is
/// * `multiplier` - Fraction of the original longer edge allowed on output
///
/// # Returns
/// * `(width, height)` - Final output dimensions
///
/// Without an explicit target the longer edge (width on ties) is capped at
/// `longer * multiplier` and the shorter edge follows the original aspect
/// ratio. Both edges truncate toward zero. Images already within the cap are
/// left alone; this never upscales.
///
/// # Examples
/// ```
/// # use squishpic::imaging::plan_resolution;
/// // 4000x3000 at the HIGH multiplier → 3000x2250
/// assert_eq!(plan_resolution((4000, 3000), None, 0.75).unwrap(), (3000, 2250));
///
/// // Explicit targets ignore the aspect ratio
/// assert_eq!(plan_resolution((4000, 3000), Some((500, 500)), 0.75).unwrap(), (500, 500));
/// ```
pub fn plan_resolution(
    original: (u32, u32),
    target: Option<(u32, u32)>,
    multiplier: f64,
) -> Result<(u32, u32), PlanError> {
    if let Some((width, height)) = target {
        if width == 0 || height == 0 {
            return Err(PlanError::InvalidTarget { width, height });
        }
        return Ok((width, height));
    }

    let (orig_w, orig_h) = original;
    let width_is_longer = orig_w >= orig_h;
    let (longer, shorter) = if width_is_longer {
        (orig_w, orig_h)
    } else {
        (orig_h, orig_w)
    };

    let max_edge = longer as f64 * multiplier;
    if longer as f64 <= max_edge {
        return Ok(original);
    }

    let new_longer = (max_edge as u32).max(1);
    // floor(new_longer / longer * shorter), exact in integers
    let new_shorter = ((new_longer as u64 * shorter as u64) / longer as u64) as u32;
    let new_shorter = new_shorter.max(1);

    if width_is_longer {
        Ok((new_longer, new_shorter))
    } else {
        Ok((new_shorter, new_longer))
    }
}
