//! Storage abstractions for snapshot persistence.
//!
//! A store holds exactly one snapshot: the last observation. Loading never
//! fails; a missing, unreadable or corrupt record means "no prior snapshot".
//!
//! ## Backends
//!
//! ```text
//! LocalSnapshotStore   ./last_stock.json            (default)
//! S3SnapshotStore      s3://{bucket}/{key}          (feature "s3")
//! ```

pub mod local;
#[cfg(feature = "s3")]
pub mod s3;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::StockSnapshot;

// Re-export for convenience
pub use local::LocalSnapshotStore;
#[cfg(feature = "s3")]
pub use s3::S3SnapshotStore;

/// Trait for snapshot storage backends.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Load the last recorded snapshot, `None` if there is none usable.
    async fn load(&self) -> Option<StockSnapshot>;

    /// Replace the recorded snapshot.
    async fn save(&self, snapshot: &StockSnapshot) -> Result<()>;

    /// Human-readable location for logs.
    fn location(&self) -> String;
}

/// Store wrapper that reads through but never writes.
pub struct ReadOnlyStore<S> {
    inner: S,
}

impl<S: SnapshotStore> ReadOnlyStore<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<S: SnapshotStore> SnapshotStore for ReadOnlyStore<S> {
    async fn load(&self) -> Option<StockSnapshot> {
        self.inner.load().await
    }

    async fn save(&self, snapshot: &StockSnapshot) -> Result<()> {
        log::info!(
            "Dry run: not writing {} items to {}",
            snapshot.len(),
            self.inner.location()
        );
        Ok(())
    }

    fn location(&self) -> String {
        format!("{} (read-only)", self.inner.location())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_read_only_store_skips_writes() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("last_stock.json");
        let inner = LocalSnapshotStore::new(&path);
        let before: StockSnapshot = [("CA", 1)].into_iter().collect();
        inner.save(&before).await.unwrap();

        let store = ReadOnlyStore::new(LocalSnapshotStore::new(&path));
        let after: StockSnapshot = [("CA", 2)].into_iter().collect();
        store.save(&after).await.unwrap();

        assert_eq!(store.load().await, Some(before));
    }
}
