//! Local filesystem storage implementation.
//!
//! Keeps the last snapshot as a pretty-printed JSON object in a single
//! file. Writes go to a temporary sibling first and are renamed into place.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::error::Result;
use crate::models::StockSnapshot;
use crate::storage::SnapshotStore;

/// Local filesystem storage backend.
#[derive(Debug, Clone)]
pub struct LocalSnapshotStore {
    path: PathBuf,
}

impl LocalSnapshotStore {
    /// Create a store backed by the given JSON file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Ensure parent directory exists.
    async fn ensure_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        Ok(())
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, bytes: &[u8]) -> Result<()> {
        self.ensure_dir().await?;

        let tmp = self.path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl SnapshotStore for LocalSnapshotStore {
    async fn load(&self) -> Option<StockSnapshot> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No previous snapshot at {}", self.path.display());
                return None;
            }
            Err(e) => {
                log::warn!(
                    "Cannot read snapshot {}: {}. Treating as first run.",
                    self.path.display(),
                    e
                );
                return None;
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                log::warn!(
                    "Snapshot {} is corrupt: {}. Treating as first run.",
                    self.path.display(),
                    e
                );
                None
            }
        }
    }

    async fn save(&self, snapshot: &StockSnapshot) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(snapshot)?;
        self.write_bytes(&bytes).await?;
        log::info!(
            "Saved {} items to {}",
            snapshot.len(),
            self.path.display()
        );
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample() -> StockSnapshot {
        [("HK-①", 7), ("CA", 0)].into_iter().collect()
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let tmp = TempDir::new().unwrap();
        let store = LocalSnapshotStore::new(tmp.path().join("last_stock.json"));

        store.save(&sample()).await.unwrap();
        assert_eq!(store.load().await, Some(sample()));
        assert!(!tmp.path().join("last_stock.tmp").exists());
    }

    #[tokio::test]
    async fn test_save_overwrites() {
        let tmp = TempDir::new().unwrap();
        let store = LocalSnapshotStore::new(tmp.path().join("last_stock.json"));

        store.save(&sample()).await.unwrap();
        let next: StockSnapshot = [("DE", 2)].into_iter().collect();
        store.save(&next).await.unwrap();

        assert_eq!(store.load().await, Some(next));
    }

    #[tokio::test]
    async fn test_file_keeps_unicode_names() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("last_stock.json");
        let store = LocalSnapshotStore::new(&path);

        store.save(&sample()).await.unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"HK-①\": 7"));
    }

    #[tokio::test]
    async fn test_creates_parent_directories() {
        let tmp = TempDir::new().unwrap();
        let store = LocalSnapshotStore::new(tmp.path().join("state/nested/stock.json"));

        store.save(&sample()).await.unwrap();
        assert_eq!(store.load().await, Some(sample()));
    }

    #[tokio::test]
    async fn test_missing_file_is_none() {
        let tmp = TempDir::new().unwrap();
        let store = LocalSnapshotStore::new(tmp.path().join("nope.json"));
        assert!(store.load().await.is_none());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_none() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("last_stock.json");
        std::fs::write(&path, "{ not json").unwrap();

        let store = LocalSnapshotStore::new(&path);
        assert!(store.load().await.is_none());
    }

    #[tokio::test]
    async fn test_reads_file_written_by_hand() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("last_stock.json");
        std::fs::write(&path, "{\n  \"HK-①\": 7,\n  \"CA\": 0\n}").unwrap();

        let store = LocalSnapshotStore::new(&path);
        assert_eq!(store.load().await, Some(sample()));
    }
}
