//! Media sources: where the images to compress come from.
//!
//! A [`SourceId`] is opaque to the pipeline. Only a [`MediaSource`] knows how
//! to turn it into bytes and, best-effort, into a display name.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use url::Url;

/// Opaque identifier of a selected image.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceId(String);

impl SourceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&Path> for SourceId {
    fn from(path: &Path) -> Self {
        Self(path.to_string_lossy().into_owned())
    }
}

/// Something that can re-open a selected image by identifier.
pub trait MediaSource: Send + Sync {
    /// Read the whole encoded image.
    fn open(&self, id: &SourceId) -> io::Result<Vec<u8>>;

    /// Human-facing file name, e.g. `IMG_0042.HEIC`.
    fn display_name(&self, id: &SourceId) -> io::Result<Option<String>>;
}

/// Local files, addressed by path or `file://` URI. URIs are percent-decoded
/// and may name `localhost` as their host.
#[derive(Debug, Clone, Default)]
pub struct FileSource;

impl FileSource {
    pub fn new() -> Self {
        Self
    }

    fn resolve(id: &SourceId) -> io::Result<PathBuf> {
        let raw = id.as_str();
        if !raw.contains("://") {
            return Ok(PathBuf::from(raw));
        }
        let uri = Url::parse(raw).map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("malformed source URI '{raw}': {e}"),
            )
        })?;
        if uri.scheme() != "file" {
            return Err(io::Error::new(
                io::ErrorKind::Unsupported,
                format!("unsupported source scheme '{}'", uri.scheme()),
            ));
        }
        uri.to_file_path().map_err(|()| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("'{raw}' does not name a local file"),
            )
        })
    }
}

impl MediaSource for FileSource {
    fn open(&self, id: &SourceId) -> io::Result<Vec<u8>> {
        std::fs::read(Self::resolve(id)?)
    }

    fn display_name(&self, id: &SourceId) -> io::Result<Option<String>> {
        let path = Self::resolve(id)?;
        Ok(path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned()))
    }
}
