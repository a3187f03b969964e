//! Media handling — the remote identifier cache and the local file loader.

pub mod cache;
pub mod loader;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use cache::{MediaCache, UploadGuard};
pub use loader::{FileLoader, FsLoader, MediaSource};

/// Kind of attachment a window can carry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Photo,
    Document,
    Video,
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MediaKind::Photo => "photo",
            MediaKind::Document => "document",
            MediaKind::Video => "video",
        })
    }
}
