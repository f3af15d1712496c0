//! Redis-backed durable tier.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Client};

use crate::error::CacheError;

use super::DurableStore;

/// Durable tier stored in Redis.
///
/// Values are written with `SET key value NX EX ttl`, so an existing key is
/// never overwritten and Redis expires it on its own.
///
/// # Example
///
/// ```ignore
/// use palette_server::cache::RedisDurableStore;
///
/// let store = RedisDurableStore::connect("redis://127.0.0.1/").await?;
/// ```
#[derive(Clone)]
pub struct RedisDurableStore {
    conn: MultiplexedConnection,
    prefix: String,
}

impl RedisDurableStore {
    /// Connect to Redis. Keys are stored under the `palette:` prefix.
    pub async fn connect(redis_url: &str) -> Result<Self, CacheError> {
        Self::connect_with_prefix(redis_url, "palette:").await
    }

    pub async fn connect_with_prefix(
        redis_url: &str,
        prefix: impl Into<String>,
    ) -> Result<Self, CacheError> {
        let client = Client::open(redis_url)
            .map_err(|e| CacheError::Connection(format!("Invalid Redis URL: {}", e)))?;

        let conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| CacheError::Connection(format!("Redis connection failed: {}", e)))?;

        Ok(Self {
            conn,
            prefix: prefix.into(),
        })
    }

    fn full_key(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }
}

#[async_trait]
impl DurableStore for RedisDurableStore {
    async fn get(&self, key: &str) -> Result<Option<Bytes>, CacheError> {
        let mut conn = self.conn.clone();

        let value: Option<Vec<u8>> = conn
            .get(self.full_key(key))
            .await
            .map_err(|e| CacheError::Backend(format!("Redis GET failed: {}", e)))?;

        Ok(value.map(Bytes::from))
    }

    async fn put(&self, key: &str, value: Bytes, ttl: Duration) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();

        // Redis rejects EX 0.
        let seconds = ttl.as_secs().max(1);

        // Nil reply means the key already existed, which is fine.
        let _: Option<String> = redis::cmd("SET")
            .arg(self.full_key(key))
            .arg(value.as_ref())
            .arg("NX")
            .arg("EX")
            .arg(seconds)
            .query_async(&mut conn)
            .await
            .map_err(|e| CacheError::Backend(format!("Redis SET failed: {}", e)))?;

        Ok(())
    }
}
