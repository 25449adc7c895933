//! Feature Store Module
//!
//! Loads the feature file once and shares the parsed collection read-only.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::OnceCell;
use tracing::{info, warn};

use crate::error::{QueryError, Result};
use crate::geo::FeatureCollection;

// == Reader ==
/// Parses a GeoJSON feature collection from raw bytes.
pub fn read_feature_collection(bytes: &[u8]) -> Result<FeatureCollection> {
    serde_json::from_slice(bytes).map_err(|e| {
        warn!("Feature file cannot be parsed: {}", e);
        QueryError::MalformedData("file cannot be parsed".to_string())
    })
}

// == Feature Store ==
/// Immutable feature collection, loaded at most once per process.
///
/// A store built from a path reads the file on first use. Failed loads are not
/// remembered, so a later request tries again.
#[derive(Debug)]
pub struct FeatureStore {
    source: Option<PathBuf>,
    load_timeout: Duration,
    collection: OnceCell<Arc<FeatureCollection>>,
}

impl FeatureStore {
    // == Constructors ==
    /// Creates a store that lazily reads `path` on first access.
    pub fn from_path(path: impl Into<PathBuf>, load_timeout: Duration) -> Self {
        Self {
            source: Some(path.into()),
            load_timeout,
            collection: OnceCell::new(),
        }
    }

    /// Creates a store around an already-parsed collection.
    pub fn from_collection(collection: FeatureCollection) -> Self {
        Self {
            source: None,
            load_timeout: Duration::ZERO,
            collection: OnceCell::new_with(Some(Arc::new(collection))),
        }
    }

    /// Reads and parses `path` immediately.
    pub async fn load(path: impl Into<PathBuf>, load_timeout: Duration) -> Result<Self> {
        let store = Self::from_path(path, load_timeout);
        store.collection().await?;
        Ok(store)
    }

    // == Collection ==
    /// Returns the shared collection, loading it first if needed.
    pub async fn collection(&self) -> Result<Arc<FeatureCollection>> {
        self.collection
            .get_or_try_init(|| async {
                let path = self.source.as_deref().ok_or_else(|| {
                    QueryError::Internal("feature store has no source".to_string())
                })?;
                let collection = read_file(path, self.load_timeout).await?;
                info!(
                    "Loaded {} features from {}",
                    collection.len(),
                    path.display()
                );
                Ok::<_, QueryError>(Arc::new(collection))
            })
            .await
            .cloned()
    }

    /// Returns true once the collection has been loaded.
    pub fn is_loaded(&self) -> bool {
        self.collection.initialized()
    }
}

async fn read_file(path: &Path, load_timeout: Duration) -> Result<FeatureCollection> {
    let bytes = match tokio::time::timeout(load_timeout, tokio::fs::read(path)).await {
        Ok(Ok(bytes)) => bytes,
        Ok(Err(e)) => {
            warn!("Cannot read feature file {}: {}", path.display(), e);
            return Err(QueryError::DataSource(format!(
                "File not found or unreadable: {}",
                path.display()
            )));
        }
        Err(_) => {
            warn!(
                "Reading feature file {} exceeded {:?}",
                path.display(),
                load_timeout
            );
            return Err(QueryError::DataSource(format!(
                "Timed out reading: {}",
                path.display()
            )));
        }
    };
    read_feature_collection(&bytes)
}
