//! File loader — local path → bytes ready for upload.
//!
//! A path that doesn't exist locally is handed back as `MediaSource::Remote`:
//! it may already be a remote file identifier or a URL.

use std::path::Path;

use async_trait::async_trait;
use tracing::debug;

use crate::error::WindowError;
use crate::utils::expand_home;

/// Something the transport can attach to a message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MediaSource {
    /// File contents plus the original file name.
    Bytes { data: Vec<u8>, filename: String },
    /// Remote identifier or URL, passed through untouched.
    Remote(String),
}

impl MediaSource {
    /// Whether sending this source uploads bytes.
    pub fn is_upload(&self) -> bool {
        matches!(self, MediaSource::Bytes { .. })
    }
}

/// Loads a media path for upload.
#[async_trait]
pub trait FileLoader: Send + Sync {
    async fn load(&self, path: &str) -> Result<MediaSource, WindowError>;
}

/// Reads files from the local filesystem with `tokio::fs`.
#[derive(Clone, Debug, Default)]
pub struct FsLoader;

#[async_trait]
impl FileLoader for FsLoader {
    async fn load(&self, path: &str) -> Result<MediaSource, WindowError> {
        match tokio::fs::read(expand_home(path)).await {
            Ok(data) => {
                let filename = Path::new(path)
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.to_string());
                debug!(path = %path, bytes = data.len(), "media loaded from disk");
                Ok(MediaSource::Bytes { data, filename })
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path, "no local file, treating path as remote reference");
                Ok(MediaSource::Remote(path.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}
