//! File-backed content store.
//!
//! SYSTEM CONTEXT
//! ==============
//! The site's content lives in one JSON array per kind under the configured
//! content directory (`products.json`, `research.json`, `blogs.json`). The
//! admin API reads and replaces whole arrays; the page builder saves through
//! the same files via [`ContentStore`].
//!
//! DESIGN
//! ======
//! Reads are lenient: a missing, unreadable or malformed file reads as an
//! empty array and is logged. Writes are serialized by a per-process async
//! mutex, go to a temp file in the same directory, and are renamed over the
//! target so a reader never sees a partial array.
//!
//! [`FileStore::save_page`] holds the same mutex across its read, merge and
//! write, so two page saves against one file cannot drop each other's edit.
//! The generic [`ContentStore`] path only locks the write.

use std::path::{Path, PathBuf};

use canvas::content::{ContentKind, ContentStore, PageSnapshot, SaveError, merge_page};
use serde_json::Value;
use tokio::sync::Mutex;

use crate::error::StoreError;

pub struct FileStore {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into(), write_lock: Mutex::new(()) }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    #[must_use]
    pub fn path(&self, kind: ContentKind) -> PathBuf {
        self.dir.join(kind.file_name())
    }

    /// Current array for `kind`; empty when the file cannot be used.
    pub async fn read(&self, kind: ContentKind) -> Vec<Value> {
        let path = self.path(kind);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "content file missing");
                return Vec::new();
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "content file unreadable");
                return Vec::new();
            }
        };
        match serde_json::from_slice::<Value>(&bytes) {
            Ok(Value::Array(items)) => items,
            Ok(_) => {
                tracing::warn!(path = %path.display(), "content file is not a JSON array");
                Vec::new()
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "content file is not valid JSON");
                Vec::new()
            }
        }
    }

    /// Replace the array for `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the directory or file cannot be written.
    pub async fn write(&self, kind: ContentKind, items: &[Value]) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        self.write_locked(kind, items).await
    }

    /// Write one record's page back into the array for `kind` under the
    /// write lock.
    ///
    /// # Errors
    ///
    /// [`SaveError::Content`] if no record has `id`, [`SaveError::Store`] if
    /// the file cannot be written.
    pub async fn save_page(
        &self,
        kind: ContentKind,
        id: &str,
        snapshot: &PageSnapshot,
    ) -> Result<(), SaveError<StoreError>> {
        let _guard = self.write_lock.lock().await;

        let mut items = self.read(kind).await;
        merge_page(&mut items, id, snapshot)?;
        self.write_locked(kind, &items).await.map_err(SaveError::Store)?;

        tracing::info!(%kind, id, blocks = snapshot.blocks.len(), "page saved");
        Ok(())
    }

    async fn write_locked(&self, kind: ContentKind, items: &[Value]) -> Result<(), StoreError> {
        tokio::fs::create_dir_all(&self.dir).await.map_err(io_error(&self.dir))?;
        let bytes = serde_json::to_vec_pretty(items)?;
        let path = self.path(kind);
        let tmp = self.dir.join(format!(".{}.tmp", kind.file_name()));
        tokio::fs::write(&tmp, &bytes).await.map_err(io_error(&tmp))?;
        tokio::fs::rename(&tmp, &path).await.map_err(io_error(&path))?;

        tracing::info!(%kind, items = items.len(), "content saved");
        Ok(())
    }
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> StoreError + '_ {
    move |source| StoreError::Io { path: path.to_path_buf(), source }
}

impl ContentStore for FileStore {
    type Error = StoreError;

    async fn fetch(&self, kind: ContentKind) -> Result<Vec<Value>, StoreError> {
        Ok(self.read(kind).await)
    }

    async fn store(&self, kind: ContentKind, items: &[Value]) -> Result<(), StoreError> {
        self.write(kind, items).await
    }
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
