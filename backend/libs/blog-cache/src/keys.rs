//! Cache key schema for blog posts
//!
//! Keys are plain strings shared with existing deployments, so the formats
//! below must not change:
//! - single post: `post_{id}`
//! - page of posts: `posts_{page}_{limit}`
//! - collection sentinel: `posts`

/// Sentinel key deleted whenever posts are created.
pub const POSTS_SENTINEL: &str = "posts";

/// Cache key builder
pub struct CacheKey;

impl CacheKey {
    /// Single post cache
    /// Format: post_{id}
    pub fn post(id: i32) -> String {
        format!("post_{}", id)
    }

    /// One page of the post listing
    /// Format: posts_{page}_{limit}
    pub fn posts_page(page: u32, limit: u32) -> String {
        format!("posts_{}_{}", page, limit)
    }

    /// Collection invalidation key written against on create
    pub fn posts_sentinel() -> &'static str {
        POSTS_SENTINEL
    }

    /// SCAN pattern matching every cached page
    pub fn posts_page_pattern() -> &'static str {
        "posts_*"
    }

    /// Extract entity type from key (`post`, `posts`)
    pub fn entity_type(key: &str) -> Option<&str> {
        match key.split('_').next() {
            Some(entity) if !entity.is_empty() => Some(entity),
            _ => None,
        }
    }
}
