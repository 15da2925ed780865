//! Content stores: where compressed images end up.
//!
//! A store receives the encoded bytes together with the metadata a gallery
//! would index (name, MIME type, dimensions, quality) and hands back a
//! [`Location`]. [`DirectoryStore`] files everything under
//! `<root>/<collection>/` and never overwrites an existing file.

use crate::naming::numbered_variant;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// MIME type of everything the pipeline writes.
pub const JPEG_MIME: &str = "image/jpeg";

/// Give up renaming after this many clashes.
const MAX_RENAME_ATTEMPTS: u32 = 10_000;

/// Handle to a stored image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Location(String);

impl Location {
    pub fn new(location: impl Into<String>) -> Self {
        Self(location.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One image to store.
#[derive(Debug, Clone)]
pub struct StoreItem<'a> {
    /// Destination collection, e.g. `Pictures/squishpic`.
    pub collection: &'a str,
    pub display_name: &'a str,
    pub mime_type: &'a str,
    pub width: u32,
    pub height: u32,
    pub quality: u8,
    pub bytes: &'a [u8],
}

pub trait ContentStore: Send + Sync {
    /// Store the item. `Ok(None)` means the store accepted the call but
    /// produced no handle, which callers treat as a failure.
    fn insert(&self, item: &StoreItem<'_>) -> io::Result<Option<Location>>;
}

/// Stores images as plain files below a root directory.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn collection_dir(&self, collection: &str) -> io::Result<PathBuf> {
        let relative = Path::new(collection);
        if relative.is_absolute()
            || relative
                .components()
                .any(|c| matches!(c, std::path::Component::ParentDir))
        {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("collection '{collection}' must be a relative path inside the store"),
            ));
        }
        Ok(self.root.join(relative))
    }
}

impl ContentStore for DirectoryStore {
    fn insert(&self, item: &StoreItem<'_>) -> io::Result<Option<Location>> {
        if item.display_name.is_empty() || item.display_name.contains(['/', '\\']) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid display name '{}'", item.display_name),
            ));
        }
        let dir = self.collection_dir(item.collection)?;
        std::fs::create_dir_all(&dir)?;

        let mut name = item.display_name.to_string();
        for attempt in 1..=MAX_RENAME_ATTEMPTS {
            let path = dir.join(&name);
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(mut file) => {
                    file.write_all(item.bytes)?;
                    file.flush()?;
                    debug!(
                        "stored {} ({}x{}, {}, q{}, {} bytes)",
                        path.display(),
                        item.width,
                        item.height,
                        item.mime_type,
                        item.quality,
                        item.bytes.len()
                    );
                    return Ok(Some(Location::new(path.to_string_lossy())));
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    name = numbered_variant(item.display_name, attempt);
                }
                Err(e) => return Err(e),
            }
        }
        Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("no free name for '{}'", item.display_name),
        ))
    }
}
