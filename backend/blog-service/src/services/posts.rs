//! Post service - cache-aside reads and invalidating writes
//!
//! PostgreSQL is the source of truth. Reads try Redis first and repopulate
//! it on a miss; writes go to the store and then drop the `posts` key.
//! Every cache failure is logged and absorbed: a cache outage only costs
//! latency, while store failures reach the caller unchanged.
//!
//! Writes only delete the `posts` sentinel, which no read ever uses, so
//! cached pages (`posts_{page}_{limit}`) stay until their TTL runs out.
//! `CachePolicy::invalidate_pages` opts into dropping them as well.

use crate::config::{CacheConfig, DEFAULT_CACHE_TTL_SECS};
use crate::db::PostRepository;
use crate::error::{AppError, Result};
use crate::models::{NewPost, Post};
use blog_cache::{CacheKey, CacheOperations};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

/// How the post service uses the cache
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    /// Expiry for every cached post and page
    pub ttl_secs: u64,
    /// Delete all `posts_*` page keys on writes, in addition to `posts`
    pub invalidate_pages: bool,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            ttl_secs: DEFAULT_CACHE_TTL_SECS,
            invalidate_pages: false,
        }
    }
}

impl From<&CacheConfig> for CachePolicy {
    fn from(config: &CacheConfig) -> Self {
        Self {
            ttl_secs: config.ttl_secs,
            invalidate_pages: config.invalidate_pages,
        }
    }
}

pub struct PostService {
    repo: Arc<dyn PostRepository>,
    cache: Arc<dyn CacheOperations>,
    policy: CachePolicy,
}

impl PostService {
    pub fn new(
        repo: Arc<dyn PostRepository>,
        cache: Arc<dyn CacheOperations>,
        policy: CachePolicy,
    ) -> Self {
        Self {
            repo,
            cache,
            policy,
        }
    }

    /// Create a single post
    pub async fn create_post(&self, input: &NewPost) -> Result<Post> {
        let post = self.repo.insert(input).await?;
        self.invalidate_collection().await;
        Ok(post)
    }

    /// Create a batch of posts in one store round trip, preserving order
    pub async fn create_posts(&self, inputs: &[NewPost]) -> Result<Vec<Post>> {
        let posts = self.repo.insert_many(inputs).await?;
        self.invalidate_collection().await;
        Ok(posts)
    }

    /// One page of posts, 1-based. Bounds are checked by the HTTP layer.
    pub async fn find_page(&self, page: u32, limit: u32) -> Result<Vec<Post>> {
        let key = CacheKey::posts_page(page, limit);

        if let Some(posts) = self.read_cached::<Vec<Post>>(&key).await {
            return Ok(posts);
        }

        let offset = (i64::from(page) - 1) * i64::from(limit);
        let posts = self.repo.find_slice(offset, i64::from(limit)).await?;

        self.write_cached(&key, &posts).await;
        Ok(posts)
    }

    /// A single post by id; absent posts are `NotFound` and never cached
    pub async fn find_one(&self, id: i32) -> Result<Post> {
        let key = CacheKey::post(id);

        if let Some(post) = self.read_cached::<Post>(&key).await {
            return Ok(post);
        }

        let post = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Post with ID {} not found", id)))?;

        self.write_cached(&key, &post).await;
        Ok(post)
    }

    async fn read_cached<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.cache.get(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!(key = %key, "Cache MISS");
                return None;
            }
            Err(e) => {
                warn!(key = %key, error = %e, "Error fetching from cache");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => {
                debug!(key = %key, "Cache HIT");
                Some(value)
            }
            Err(e) => {
                warn!(key = %key, error = %e, "Discarding undecodable cache entry");
                None
            }
        }
    }

    async fn write_cached<T: Serialize>(&self, key: &str, value: &T) {
        let data = match serde_json::to_string(value) {
            Ok(data) => data,
            Err(e) => {
                warn!(key = %key, error = %e, "Cache serialization failed");
                return;
            }
        };

        if let Err(e) = self.cache.set(key, &data, self.policy.ttl_secs).await {
            warn!(key = %key, error = %e, "Error setting cache");
        }
    }

    async fn invalidate_collection(&self) {
        let sentinel = CacheKey::posts_sentinel();
        if let Err(e) = self.cache.del(sentinel).await {
            warn!(key = %sentinel, error = %e, "Error invalidating cache");
        }

        if self.policy.invalidate_pages {
            let pattern = CacheKey::posts_page_pattern();
            match self.cache.scan_del(pattern).await {
                Ok(deleted) => debug!(pattern = %pattern, deleted, "Cached pages invalidated"),
                Err(e) => warn!(pattern = %pattern, error = %e, "Error invalidating cached pages"),
            }
        }
    }
}
