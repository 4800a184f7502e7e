//! Storage backends for normalized articles.
//!
//! Every backend writes whole records under a [`StorageKey`] and overwrites
//! whatever was there before, so re-running a date range is safe.
//!
//! # Output Structure
//!
//! ```text
//! root/
//! └── 2023-06-01/
//!     ├── TECHNOLOGY/
//!     │   ├── A-B Test
//!     │   └── Chips shortage eases
//!     └── HEALTH/
//!         └── ...
//! ```

pub mod local;
pub mod object;

use crate::errors::StoreError;
use crate::models::{NormalizedArticle, StorageKey};

pub use local::LocalStore;
pub use object::ObjectStore;

/// Persists one record per key, last write wins.
pub trait ArticleStore {
    async fn put(&self, key: &StorageKey, record: &NormalizedArticle) -> Result<(), StoreError>;
}

/// Backend chosen at startup.
#[derive(Debug, Clone)]
pub enum AnyStore {
    Local(LocalStore),
    Object(ObjectStore),
}

impl ArticleStore for AnyStore {
    async fn put(&self, key: &StorageKey, record: &NormalizedArticle) -> Result<(), StoreError> {
        match self {
            AnyStore::Local(inner) => inner.put(key, record).await,
            AnyStore::Object(inner) => inner.put(key, record).await,
        }
    }
}
