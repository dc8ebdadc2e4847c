//! AWS S3 storage implementation.
//!
//! Keeps the last snapshot as a single JSON object at `s3://{bucket}/{key}`,
//! for deployments without a persistent filesystem.

use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::primitives::ByteStream;
use log::{info, warn};

use crate::error::{AppError, Result};
use crate::models::StockSnapshot;
use crate::storage::SnapshotStore;

/// S3-based snapshot storage.
#[derive(Clone)]
pub struct S3SnapshotStore {
    client: Client,
    bucket: String,
    key: String,
}

impl S3SnapshotStore {
    /// Create a new S3 snapshot store.
    pub fn new(client: Client, bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    /// Create S3 storage from environment configuration.
    ///
    /// - `S3_BUCKET`: bucket name (default: `stock-monitor`)
    /// - `SNAPSHOT_S3_KEY`: object key (default: `state/last_stock.json`)
    pub async fn from_env() -> Result<Self> {
        let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        let client = Client::new(&config);

        let bucket = std::env::var("S3_BUCKET").unwrap_or_else(|_| "stock-monitor".to_string());
        let key = std::env::var("SNAPSHOT_S3_KEY")
            .unwrap_or_else(|_| "state/last_stock.json".to_string());

        Ok(Self::new(client, bucket, key))
    }

    /// Read an object, returning None if it doesn't exist.
    pub async fn read_bytes_optional(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let result = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await;

        match result {
            Ok(output) => {
                let bytes = output
                    .body
                    .collect()
                    .await
                    .map_err(|e| AppError::S3(e.to_string()))?;
                Ok(Some(bytes.into_bytes().to_vec()))
            }
            Err(err) => {
                let service_err = err.into_service_error();
                if service_err.is_no_such_key() {
                    info!("No object at s3://{}/{}", self.bucket, key);
                    Ok(None)
                } else {
                    Err(AppError::S3(service_err.to_string()))
                }
            }
        }
    }
}

#[async_trait]
impl SnapshotStore for S3SnapshotStore {
    async fn load(&self) -> Option<StockSnapshot> {
        let bytes = match self.read_bytes_optional(&self.key).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return None,
            Err(e) => {
                warn!("Cannot read snapshot {}: {}. Treating as first run.", self.location(), e);
                return None;
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                warn!("Snapshot {} is corrupt: {}. Treating as first run.", self.location(), e);
                None
            }
        }
    }

    async fn save(&self, snapshot: &StockSnapshot) -> Result<()> {
        let json = serde_json::to_string_pretty(snapshot)?;
        let bytes = ByteStream::from(json.into_bytes());

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&self.key)
            .body(bytes)
            .content_type("application/json")
            .send()
            .await
            .map_err(|e| AppError::S3(e.to_string()))?;

        info!("Wrote {} items to {}", snapshot.len(), self.location());
        Ok(())
    }

    fn location(&self) -> String {
        format!("s3://{}/{}", self.bucket, self.key)
    }
}
