/// Configuration management for Blog Service
///
/// All settings come from environment variables (optionally seeded from a
/// `.env` file by `main`). Numeric values that are present but unparsable
/// are configuration errors rather than silent fallbacks.
use db_pool::{parse_env_with_default, postgres_url};
use redis_utils::redis_url;
use serde::{Deserialize, Serialize};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application settings
    pub app: AppConfig,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Cache (Redis) configuration
    pub cache: CacheConfig,
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment (development, staging, production)
    pub env: String,
    /// Server host to bind to
    pub host: String,
    /// Server port to bind to
    pub port: u16,
    /// Emit JSON log lines instead of human-readable ones
    pub json_logs: bool,
}

/// Database configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database URL; pool sizing is read by `db_pool::DbConfig`
    pub url: String,
}

impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("url", &"[REDACTED]")
            .finish()
    }
}

/// Cache (Redis) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Redis URL
    pub url: String,
    /// Expiry applied to every cached post and page
    pub ttl_secs: u64,
    /// Also drop every cached page on writes, not only the `posts` key
    pub invalidate_pages: bool,
}

pub const DEFAULT_CACHE_TTL_SECS: u64 = blog_cache::ttl::POST;

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        let app_env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        let database_url = match std::env::var("DATABASE_URL") {
            Ok(url) => url,
            Err(_) => postgres_url(
                &env_or("DATABASE_HOST", "localhost"),
                parse_env_with_default("DATABASE_PORT", 5432)?,
                &env_or("DATABASE_USER", "postgres"),
                &env_or("DATABASE_PASSWORD", "postgres"),
                &env_or("DATABASE_NAME", "blog"),
            ),
        };

        let cache_url = match std::env::var("REDIS_URL") {
            Ok(url) => url,
            Err(_) => redis_url(
                &env_or("REDIS_HOST", "localhost"),
                parse_env_with_default("REDIS_PORT", 6379)?,
            ),
        };

        let ttl_secs = parse_env_with_default("CACHE_TTL", DEFAULT_CACHE_TTL_SECS)?;
        if ttl_secs == 0 {
            return Err("CACHE_TTL must be a positive number of seconds".to_string());
        }

        Ok(Config {
            app: AppConfig {
                env: app_env,
                host: env_or("BLOG_SERVICE_HOST", "0.0.0.0"),
                port: parse_env_with_default("BLOG_SERVICE_PORT", 3000)?,
                json_logs: std::env::var("LOG_FORMAT")
                    .map(|v| v.eq_ignore_ascii_case("json"))
                    .unwrap_or(false),
            },
            database: DatabaseConfig { url: database_url },
            cache: CacheConfig {
                url: cache_url,
                ttl_secs,
                invalidate_pages: parse_env_with_default("CACHE_INVALIDATE_PAGES", false)?,
            },
        })
    }

    pub fn is_production(&self) -> bool {
        self.app.env.eq_ignore_ascii_case("production")
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
