//! File-system backend: one JSON file per record under a root directory.

use crate::errors::StoreError;
use crate::models::{NormalizedArticle, StorageKey};
use crate::store::ArticleStore;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, instrument};

/// Writes each record to `{root}/{published_date}/{topic}/{title}`.
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File path for a key. Segments are joined individually so a key never
    /// escapes the root.
    pub fn path_for(&self, key: &StorageKey) -> PathBuf {
        key.segments()
            .fold(self.root.clone(), |path, segment| path.join(segment))
    }
}

impl ArticleStore for LocalStore {
    #[instrument(level = "debug", skip_all, fields(%key))]
    async fn put(&self, key: &StorageKey, record: &NormalizedArticle) -> Result<(), StoreError> {
        let json = serde_json::to_vec(record)?;
        let path = self.path_for(key);
        let io_error = |source: std::io::Error| StoreError::Io {
            key: key.to_string(),
            source,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(io_error)?;
        }
        fs::write(&path, json).await.map_err(io_error)?;
        debug!(path = %path.display(), "Wrote record");
        Ok(())
    }
}
