use std::path::{Path, PathBuf};

use async_trait::async_trait;
use redis::AsyncCommands;
use thiserror::Error;
use tracing::debug;

/// Fixed key of the single persistence slot.
pub const STORAGE_KEY: &str = "career_hud_data_v1";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),
}

/// One slot holding the serialized document. Read at startup, overwritten on every change.
///
/// Last write wins; there is no versioning or locking.
#[async_trait]
pub trait PersistenceSlot: Send + Sync {
    /// `Ok(None)` when nothing has been stored yet.
    async fn read(&self) -> Result<Option<String>, StorageError>;

    async fn write(&self, contents: &str) -> Result<(), StorageError>;

    /// Human-readable location, for logs.
    fn describe(&self) -> String;
}

/// JSON file named after the storage key, inside a data directory.
pub struct FileSlot {
    path: PathBuf,
}

impl FileSlot {
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(format!("{STORAGE_KEY}.json")),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl PersistenceSlot for FileSlot {
    async fn read(&self) -> Result<Option<String>, StorageError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write(&self, contents: &str) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, contents).await?;
        debug!("Wrote {} bytes to {}", contents.len(), self.path.display());
        Ok(())
    }

    fn describe(&self) -> String {
        format!("file {}", self.path().display())
    }
}

/// A single Redis string key.
pub struct RedisSlot {
    client: redis::Client,
}

impl RedisSlot {
    pub fn new(client: redis::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PersistenceSlot for RedisSlot {
    async fn read(&self) -> Result<Option<String>, StorageError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let value: Option<String> = conn.get(STORAGE_KEY).await?;
        Ok(value)
    }

    async fn write(&self, contents: &str) -> Result<(), StorageError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        conn.set::<_, _, ()>(STORAGE_KEY, contents).await?;
        debug!("Wrote {} bytes to redis key {STORAGE_KEY}", contents.len());
        Ok(())
    }

    fn describe(&self) -> String {
        format!("redis key {STORAGE_KEY}")
    }
}
