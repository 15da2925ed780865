//! Output file naming.
//!
//! A compressed image is saved under one of two names:
//!
//! - `"{requested}.{ext}"` when the caller asked for a name. `ext` is taken
//!   from the original file name and falls back to `jpg`.
//! - `IMG-yyyyMMdd-HHmmssSSS.jpg` from the local clock otherwise.
//!
//! The extension is kept even though the bytes are always JPEG, so
//! `holiday.png` compressed under the name `small` is written as `small.png`
//! with JPEG content. Viewers sniff content and cope; tools that trust the
//! extension may not.

use chrono::{DateTime, TimeZone};
use std::path::Path;

/// Extension used when the original has none we can trust.
pub const DEFAULT_EXTENSION: &str = "jpg";

/// Resolve the display name the compressed image is stored under.
///
/// `original` is the best-effort display name of the source; `None` when the
/// lookup failed or the source has no name.
pub fn resolve_output_name<Tz: TimeZone>(
    requested: Option<&str>,
    original: Option<&str>,
    now: &DateTime<Tz>,
) -> String
where
    Tz::Offset: std::fmt::Display,
{
    match requested {
        Some(name) => {
            let ext = original
                .and_then(extension_of)
                .unwrap_or(DEFAULT_EXTENSION);
            format!("{name}.{ext}")
        }
        None => timestamp_name(now),
    }
}

/// `IMG-20240131-235959123.jpg`
pub fn timestamp_name<Tz: TimeZone>(now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("IMG-{}.{DEFAULT_EXTENSION}", now.format("%Y%m%d-%H%M%S%3f"))
}

/// File extension of `name`, if it has a plain alphanumeric one.
fn extension_of(name: &str) -> Option<&str> {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty() && e.chars().all(|c| c.is_ascii_alphanumeric()))
}

/// `n`-th alternative for a name that is already taken: `photo.jpg` → `photo (n).jpg`.
pub fn numbered_variant(name: &str, n: u32) -> String {
    let path = Path::new(name);
    match (
        path.file_stem().and_then(|s| s.to_str()),
        path.extension().and_then(|e| e.to_str()),
    ) {
        (Some(stem), Some(ext)) => format!("{stem} ({n}).{ext}"),
        _ => format!("{name} ({n})"),
    }
}
