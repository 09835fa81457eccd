/// Blog Service Library
///
/// CRUD HTTP backend for blog posts with PostgreSQL as the source of truth
/// and Redis as a cache-aside layer in front of it.
///
/// # Modules
///
/// - `handlers`: HTTP request handlers and route wiring
/// - `models`: Post entity and creation input
/// - `services`: Cache-aside post service
/// - `db`: Post repository trait and PostgreSQL implementation
/// - `error`: Error types and HTTP mapping
/// - `config`: Configuration management
/// - `metrics`: Prometheus exposition
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod models;
pub mod services;

pub use config::Config;
pub use error::{AppError, Result};
