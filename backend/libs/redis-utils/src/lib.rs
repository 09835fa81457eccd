use anyhow::{Context, Result};
use redis::aio::ConnectionManager;
use redis::{Client, IntoConnectionInfo, RedisError};
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::sleep;
use tracing::{info, warn};

/// Shared Redis connection manager guarded by a Tokio mutex.
pub type SharedConnectionManager = Arc<Mutex<ConnectionManager>>;

/// Build a `redis://` URL from host and port parts.
pub fn redis_url(host: &str, port: u16) -> String {
    format!("redis://{}:{}", host, port)
}

/// Process-wide Redis connection, created once at startup.
pub struct RedisPool {
    manager: SharedConnectionManager,
}

impl RedisPool {
    pub async fn connect(redis_url: &str) -> Result<Self> {
        let info = redis_url
            .into_connection_info()
            .context("failed to parse REDIS_URL connection string")?;

        let client = Client::open(info).context("failed to construct Redis client")?;
        let connection_manager = ConnectionManager::new(client)
            .await
            .context("failed to initialize Redis connection manager")?;

        info!("Redis connection manager initialized");

        Ok(Self {
            manager: Arc::new(Mutex::new(connection_manager)),
        })
    }

    pub fn manager(&self) -> SharedConnectionManager {
        self.manager.clone()
    }
}

/// Longest pause between background reconnect attempts
const MAX_BACKOFF_SECS: u64 = 30;

/// A Redis connection that may not be established yet.
///
/// Clones share one slot. The slot is filled at most once, either up front
/// with [`LazyConnection::ready`] or later by the task started in
/// [`LazyConnection::connect_in_background`]. Until then [`get`] returns
/// `None` and callers treat Redis as unavailable.
///
/// [`get`]: LazyConnection::get
#[derive(Clone, Default)]
pub struct LazyConnection {
    slot: Arc<OnceLock<SharedConnectionManager>>,
}

impl LazyConnection {
    pub fn ready(manager: SharedConnectionManager) -> Self {
        let slot = OnceLock::new();
        let _ = slot.set(manager);
        Self {
            slot: Arc::new(slot),
        }
    }

    pub fn pending() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<SharedConnectionManager> {
        self.slot.get().cloned()
    }

    pub fn is_ready(&self) -> bool {
        self.slot.get().is_some()
    }

    /// Keep retrying `RedisPool::connect` on a Tokio task with exponential
    /// backoff until it succeeds. Fails immediately only for a malformed URL.
    pub fn connect_in_background(redis_url: &str) -> Result<Self> {
        redis_url
            .into_connection_info()
            .context("failed to parse REDIS_URL connection string")?;

        let connection = Self::pending();
        let slot = connection.slot.clone();
        let url = redis_url.to_string();

        tokio::spawn(async move {
            let mut attempt = 0u32;
            loop {
                sleep(calculate_backoff(attempt)).await;
                match RedisPool::connect(&url).await {
                    Ok(pool) => {
                        let _ = slot.set(pool.manager());
                        info!(attempt, "Redis connection established in background");
                        break;
                    }
                    Err(e) => {
                        warn!(attempt, error = %format!("{:#}", e), "Redis reconnect failed");
                        attempt = attempt.saturating_add(1);
                    }
                }
            }
        });

        Ok(connection)
    }
}

/// 1s, 2s, 4s ... capped at `MAX_BACKOFF_SECS`
fn calculate_backoff(attempt: u32) -> Duration {
    let secs = 2u64
        .checked_pow(attempt)
        .unwrap_or(MAX_BACKOFF_SECS)
        .min(MAX_BACKOFF_SECS);
    Duration::from_secs(secs)
}

/// Round-trip a `PING` through the shared manager.
pub async fn ping(manager: &SharedConnectionManager) -> Result<(), RedisError> {
    let mut conn = manager.lock().await;
    let pong: String = redis::cmd("PING").query_async(&mut *conn).await?;
    if pong == "PONG" {
        Ok(())
    } else {
        Err(RedisError::from((
            redis::ErrorKind::ResponseError,
            "unexpected PING response",
        )))
    }
}
