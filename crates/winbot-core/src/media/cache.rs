//! Media identifier cache — local path → remote file identifier.
//!
//! Once a file has been uploaded, the transport reports an identifier that
//! can be sent instead of the bytes. Entries live for the lifetime of the
//! cache; the only way out is `evict`, which the sender calls when the remote
//! side rejects a cached identifier.
//!
//! The cache is meant to be shared (`Arc<MediaCache>`) and injected into the
//! `Sender`, so tests can use an isolated instance.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use tokio::sync::OwnedMutexGuard;
use tracing::debug;

/// Shared path → remote id map.
///
/// Reads and writes go through an `RwLock`. Uploads of the same path can be
/// serialized with `upload_guard`, so two concurrent misses don't both push
/// the bytes.
#[derive(Debug, Default)]
pub struct MediaCache {
    entries: RwLock<HashMap<String, String>>,
    uploads: UploadLocks,
}

impl MediaCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remote identifier for `path`, if one was stored.
    pub fn get(&self, path: &str) -> Option<String> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.get(path).cloned()
    }

    /// Store the identifier reported for `path`. Last writer wins.
    pub fn put(&self, path: impl Into<String>, remote_id: impl Into<String>) {
        let path = path.into();
        let remote_id = remote_id.into();
        debug!(path = %path, remote_id = %remote_id, "media id cached");
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.insert(path, remote_id);
    }

    /// Forget `path`. Returns the identifier that was stored.
    pub fn evict(&self, path: &str) -> Option<String> {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.remove(path)
    }

    pub fn clear(&self) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.clear();
    }

    pub fn len(&self) -> usize {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Wait for exclusive upload rights on `path`.
    ///
    /// Callers should re-check `get` after acquiring the guard: another task
    /// may have finished the upload in the meantime. The per-path lock is
    /// dropped from the cache once the last guard for it is released.
    pub async fn upload_guard(&self, path: &str) -> UploadGuard<'_> {
        let lock = {
            let mut uploads = lock_uploads(&self.uploads);
            uploads
                .entry(path.to_string())
                .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
                .clone()
        };
        UploadGuard {
            guard: Some(lock.lock_owned().await),
            path: path.to_string(),
            uploads: &self.uploads,
        }
    }

    /// Number of paths with a live upload lock.
    pub fn pending_uploads(&self) -> usize {
        lock_uploads(&self.uploads).len()
    }
}

type UploadLockMap = HashMap<String, Arc<tokio::sync::Mutex<()>>>;
type UploadLocks = Mutex<UploadLockMap>;

fn lock_uploads(uploads: &UploadLocks) -> MutexGuard<'_, UploadLockMap> {
    uploads.lock().unwrap_or_else(|e| e.into_inner())
}

/// Exclusive upload rights on one path, from `MediaCache::upload_guard`.
#[derive(Debug)]
pub struct UploadGuard<'a> {
    guard: Option<OwnedMutexGuard<()>>,
    path: String,
    uploads: &'a UploadLocks,
}

impl Drop for UploadGuard<'_> {
    fn drop(&mut self) {
        // Release the async lock first so its Arc count reflects waiters only.
        drop(self.guard.take());

        let mut uploads = lock_uploads(self.uploads);
        let idle = uploads
            .get(&self.path)
            .is_some_and(|lock| Arc::strong_count(lock) == 1);
        if idle {
            uploads.remove(&self.path);
        }
    }
}
