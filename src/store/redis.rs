//! Redis-backed key-value store.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client, ErrorKind, RedisError};
use tokio::sync::OnceCell;

use super::{FieldMap, KeyValueStore, StoreError};
use crate::config::RedisConfig;

// A failed connect is reported straight away; the next request tries again.
const CONNECT_RETRIES: usize = 0;
const CONNECT_BACKOFF_BASE: u64 = 2;
const CONNECT_BACKOFF_FACTOR_MS: u64 = 100;

impl From<RedisError> for StoreError {
    fn from(err: RedisError) -> Self {
        match err.kind() {
            ErrorKind::TypeError => StoreError::Malformed(err.to_string()),
            _ => StoreError::Unavailable(err.to_string()),
        }
    }
}

/// Redis store sharing one connection manager across requests.
///
/// The connection is established on first use; until then the process runs
/// and the readiness probe reports Redis as down.
pub struct RedisStore {
    client: Client,
    manager: OnceCell<ConnectionManager>,
}

impl RedisStore {
    pub fn new(config: &RedisConfig) -> Result<Self, StoreError> {
        let url = config.url();
        tracing::info!(url = %url, "Configuring Redis client");
        let client = Client::open(url)?;

        Ok(Self {
            client,
            manager: OnceCell::new(),
        })
    }

    /// Get a handle on the shared connection, connecting if necessary.
    async fn connection(&self) -> Result<ConnectionManager, StoreError> {
        let manager = self
            .manager
            .get_or_try_init(|| async {
                let manager = self
                    .client
                    .get_connection_manager_with_backoff(
                        CONNECT_BACKOFF_BASE,
                        CONNECT_BACKOFF_FACTOR_MS,
                        CONNECT_RETRIES,
                    )
                    .await
                    .map_err(|e| {
                        tracing::warn!(error = %e, "Failed to connect to Redis");
                        e
                    })?;
                tracing::info!("Connected to Redis");
                Ok::<_, RedisError>(manager)
            })
            .await?;
        Ok(manager.clone())
    }
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn field_exists(&self, map: &str, field: &str) -> Result<bool, StoreError> {
        let mut conn = self.connection().await?;
        let exists: bool = conn.hexists(map, field).await?;
        Ok(exists)
    }

    async fn increment_field(
        &self,
        map: &str,
        field: &str,
        amount: i64,
    ) -> Result<i64, StoreError> {
        let mut conn = self.connection().await?;
        let value: i64 = conn.hincr(map, field, amount).await?;
        Ok(value)
    }

    async fn set_field(&self, map: &str, field: &str, value: i64) -> Result<(), StoreError> {
        let mut conn = self.connection().await?;
        let _: () = conn.hset(map, field, value).await?;
        Ok(())
    }

    async fn get_all_fields(&self, map: &str) -> Result<FieldMap, StoreError> {
        let mut conn = self.connection().await?;
        let fields: FieldMap = conn.hgetall(map).await?;
        Ok(fields)
    }

    async fn delete_field(&self, map: &str, field: &str) -> Result<(), StoreError> {
        let mut conn = self.connection().await?;
        let _: () = conn.hdel(map, field).await?;
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let mut conn = self.connection().await?;
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "redis"
    }
}
