//! Blog cache layer
//!
//! Redis-backed storage for the post cache-aside protocol:
//! - Plain string values with per-key expiry
//! - Fixed key schema shared with existing deployments
//! - SCAN-based pattern invalidation (no blocking KEYS)
//! - Starts without Redis and reports it unavailable until connected
//! - Metrics integration

mod error;
mod keys;
mod metrics;

pub use error::{CacheError, CacheResult};
pub use keys::{CacheKey, POSTS_SENTINEL};
pub use metrics::{CacheMetrics, Outcome};

use redis::AsyncCommands;
use redis::Pipeline;
use redis_utils::{LazyConnection, SharedConnectionManager};
use tracing::debug;

/// Default TTL values (seconds)
pub mod ttl {
    pub const POST: u64 = 3600; // 1 hour
}

/// Core cache operations.
///
/// Values are opaque strings; callers own serialization. Every method
/// reports failures as `CacheError` and never panics on connectivity loss.
#[async_trait::async_trait]
pub trait CacheOperations: Send + Sync {
    /// Get a raw value, `None` when the key is absent or expired
    async fn get(&self, key: &str) -> CacheResult<Option<String>>;

    /// Set a value that expires after `ttl_secs`
    async fn set(&self, key: &str, value: &str, ttl_secs: u64) -> CacheResult<()>;

    /// Delete a key
    async fn del(&self, key: &str) -> CacheResult<()>;

    /// Delete every key matching `pattern`, returning how many were removed
    async fn scan_del(&self, pattern: &str) -> CacheResult<usize>;
}

/// Redis cache client
///
/// Every operation fails with `CacheError::Unavailable` while the underlying
/// connection is still being established.
#[derive(Clone)]
pub struct BlogCache {
    redis: LazyConnection,
    metrics: CacheMetrics,
}

impl BlogCache {
    pub fn new(redis: LazyConnection) -> Self {
        Self::with_metrics(redis, CacheMetrics::new())
    }

    pub fn with_metrics(redis: LazyConnection, metrics: CacheMetrics) -> Self {
        Self { redis, metrics }
    }

    fn connection(&self, key: &str, operation: &str) -> CacheResult<SharedConnectionManager> {
        self.redis.get().ok_or_else(|| {
            self.metrics.record(key, operation, Outcome::Error);
            CacheError::Unavailable("Redis connection not established".to_string())
        })
    }

    fn failed(&self, key: &str, operation: &str, err: redis::RedisError) -> CacheError {
        self.metrics.record(key, operation, Outcome::Error);
        CacheError::Redis(err)
    }
}

#[async_trait::async_trait]
impl CacheOperations for BlogCache {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let redis = self.connection(key, "get")?;
        let mut conn = redis.lock().await;

        match conn.get::<_, Option<String>>(key).await {
            Ok(Some(data)) => {
                debug!(key = %key, "Cache hit");
                self.metrics.record(key, "get", Outcome::Hit);
                Ok(Some(data))
            }
            Ok(None) => {
                debug!(key = %key, "Cache miss");
                self.metrics.record(key, "get", Outcome::Miss);
                Ok(None)
            }
            Err(e) => Err(self.failed(key, "get", e)),
        }
    }

    async fn set(&self, key: &str, value: &str, ttl_secs: u64) -> CacheResult<()> {
        let redis = self.connection(key, "set")?;
        let mut conn = redis.lock().await;
        conn.set_ex::<_, _, ()>(key, value, ttl_secs)
            .await
            .map_err(|e| self.failed(key, "set", e))?;

        debug!(key = %key, ttl = ttl_secs, "Cache set");
        self.metrics.record(key, "set", Outcome::Stored);
        Ok(())
    }

    async fn del(&self, key: &str) -> CacheResult<()> {
        let redis = self.connection(key, "del")?;
        let mut conn = redis.lock().await;
        conn.del::<_, ()>(key)
            .await
            .map_err(|e| self.failed(key, "del", e))?;

        debug!(key = %key, "Cache delete");
        self.metrics.record(key, "del", Outcome::Deleted);
        Ok(())
    }

    async fn scan_del(&self, pattern: &str) -> CacheResult<usize> {
        let redis = self.connection(pattern, "del")?;
        let mut cursor: u64 = 0;
        let mut total_deleted = 0;

        loop {
            // Locked per SCAN page; other callers may run between pages.
            let keys = {
                let mut conn = redis.lock().await;
                let (next_cursor, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                    .arg(cursor)
                    .arg("MATCH")
                    .arg(pattern)
                    .arg("COUNT")
                    .arg(100)
                    .query_async(&mut *conn)
                    .await
                    .map_err(|e| self.failed(pattern, "del", e))?;

                if !keys.is_empty() {
                    let mut pipe = Pipeline::new();
                    for key in &keys {
                        pipe.del(key);
                    }
                    pipe.query_async::<_, ()>(&mut *conn)
                        .await
                        .map_err(|e| self.failed(pattern, "del", e))?;
                }

                cursor = next_cursor;
                keys
            };

            for key in &keys {
                self.metrics.record(key, "del", Outcome::Deleted);
            }
            total_deleted += keys.len();

            if cursor == 0 {
                break;
            }
        }

        debug!(pattern = %pattern, deleted = total_deleted, "Cache scan delete");
        Ok(total_deleted)
    }
}
