//! Durable local key/value stores backing the curation working sets.
//!
//! These are session-recovery caches, never the system of record. Callers
//! await each write before the mutation that triggered it returns. Remote
//! backends are bounded by a timeout so an unreachable host costs at most
//! that long.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use thiserror::Error;

pub const DEFAULT_REDIS_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Redis did not answer within {0:?}")]
    Timeout(Duration),
}

#[async_trait]
pub trait DurableStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    async fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// One `<key>.json` file per key under `dir`.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

#[async_trait]
impl DurableStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match tokio::fs::read_to_string(self.path(key)).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        // Write-then-rename so a crash never leaves a half-written value.
        let tmp = self.dir.join(format!(".{key}.json.tmp"));
        tokio::fs::write(&tmp, value).await?;
        tokio::fs::rename(&tmp, self.path(key)).await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        match tokio::fs::remove_file(self.path(key)).await {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

/// Keys live on a Redis host, for consoles that share a cache. Every
/// command, connect included, must finish within `timeout`.
pub struct RedisStore {
    client: redis::Client,
    timeout: Duration,
}

impl RedisStore {
    pub fn new(client: redis::Client) -> Self {
        Self::with_timeout(client, DEFAULT_REDIS_TIMEOUT)
    }

    pub fn with_timeout(client: redis::Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    async fn connection(&self) -> redis::RedisResult<MultiplexedConnection> {
        self.client.get_multiplexed_async_connection().await
    }

    async fn bounded<T>(
        &self,
        op: impl std::future::Future<Output = redis::RedisResult<T>>,
    ) -> Result<T, StoreError> {
        match tokio::time::timeout(self.timeout, op).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(StoreError::Timeout(self.timeout)),
        }
    }
}

#[async_trait]
impl DurableStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.bounded(async {
            let mut conn = self.connection().await?;
            conn.get(key).await
        })
        .await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.bounded(async {
            let mut conn = self.connection().await?;
            conn.set::<_, _, ()>(key, value).await
        })
        .await
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.bounded(async {
            let mut conn = self.connection().await?;
            conn.del::<_, ()>(key).await
        })
        .await
    }
}

/// Process-local store; nothing survives a restart.
#[derive(Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    fn values(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.values.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl DurableStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.values().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values().insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.values().remove(key);
        Ok(())
    }
}
