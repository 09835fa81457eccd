//! Cache metrics for observability
//!
//! One counter, `blog_cache_operations_total`, labelled by key entity
//! (`post`, `posts`), operation (`get`, `set`, `del`) and outcome.

use crate::keys::CacheKey;
use prometheus::{IntCounterVec, Opts, Registry};
use std::sync::OnceLock;

static OPERATIONS: OnceLock<IntCounterVec> = OnceLock::new();

fn operations() -> &'static IntCounterVec {
    OPERATIONS.get_or_init(|| {
        IntCounterVec::new(
            Opts::new(
                "blog_cache_operations_total",
                "Cache operations by entity, operation and outcome",
            ),
            &["entity", "operation", "outcome"],
        )
        .expect("valid metric definition")
    })
}

/// Result of a single cache operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Hit,
    Miss,
    Stored,
    Deleted,
    Error,
}

impl Outcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Hit => "hit",
            Outcome::Miss => "miss",
            Outcome::Stored => "stored",
            Outcome::Deleted => "deleted",
            Outcome::Error => "error",
        }
    }
}

/// Handle for recording cache outcomes
#[derive(Clone, Default)]
pub struct CacheMetrics;

impl CacheMetrics {
    pub fn new() -> Self {
        Self
    }

    /// Register the counter with a Prometheus registry
    pub fn register(registry: &Registry) -> Result<(), prometheus::Error> {
        registry.register(Box::new(operations().clone()))
    }

    pub fn record(&self, key: &str, operation: &str, outcome: Outcome) {
        let entity = CacheKey::entity_type(key).unwrap_or("unknown");
        operations()
            .with_label_values(&[entity, operation, outcome.as_str()])
            .inc();
    }

    /// Current count for one label set
    pub fn count(entity: &str, operation: &str, outcome: Outcome) -> u64 {
        operations()
            .with_label_values(&[entity, operation, outcome.as_str()])
            .get()
    }
}
