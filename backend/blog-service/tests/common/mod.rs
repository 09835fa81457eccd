//! In-memory store and cache doubles for post service tests
//!
//! Both mocks record every call so tests can assert on exactly what the
//! service asked of its collaborators, and both can be switched into a
//! failing mode to simulate outages.

#![allow(dead_code)]

use blog_cache::{CacheError, CacheOperations, CacheResult};
use blog_service::db::PostRepository;
use blog_service::models::{NewPost, Post};
use blog_service::services::{CachePolicy, PostService};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Simulated `blog_post` table
#[derive(Default)]
pub struct MockPostRepository {
    rows: Mutex<Vec<Post>>,
    next_id: Mutex<i32>,
    /// Every (offset, limit) passed to find_slice
    slice_calls: Mutex<Vec<(i64, i64)>>,
    /// Every id passed to find_by_id
    find_calls: Mutex<Vec<i32>>,
    insert_calls: Mutex<usize>,
    fail: AtomicBool,
}

impl MockPostRepository {
    pub fn new() -> Self {
        Self {
            next_id: Mutex::new(1),
            ..Default::default()
        }
    }

    /// Repository pre-filled with posts titled "Post 1".."Post n"
    pub fn with_posts(n: usize) -> Self {
        let repo = Self::new();
        for i in 1..=n {
            repo.push(NewPost::new(format!("Post {}", i), format!("Content {}", i)));
        }
        repo
    }

    fn push(&self, input: NewPost) -> Post {
        let mut next_id = self.next_id.lock().unwrap();
        let now = Utc::now();
        let post = Post {
            id: *next_id,
            title: input.title,
            body: input.body,
            created_at: now,
            updated_at: now,
        };
        *next_id += 1;
        self.rows.lock().unwrap().push(post.clone());
        post
    }

    fn check(&self) -> Result<(), sqlx::Error> {
        if self.fail.load(Ordering::SeqCst) {
            Err(sqlx::Error::PoolTimedOut)
        } else {
            Ok(())
        }
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn rows(&self) -> Vec<Post> {
        self.rows.lock().unwrap().clone()
    }

    pub fn slice_calls(&self) -> Vec<(i64, i64)> {
        self.slice_calls.lock().unwrap().clone()
    }

    pub fn find_calls(&self) -> Vec<i32> {
        self.find_calls.lock().unwrap().clone()
    }

    pub fn insert_calls(&self) -> usize {
        *self.insert_calls.lock().unwrap()
    }

    /// Total number of store reads
    pub fn read_count(&self) -> usize {
        self.slice_calls().len() + self.find_calls().len()
    }
}

#[async_trait::async_trait]
impl PostRepository for MockPostRepository {
    async fn insert(&self, post: &NewPost) -> Result<Post, sqlx::Error> {
        *self.insert_calls.lock().unwrap() += 1;
        self.check()?;
        Ok(self.push(post.clone()))
    }

    async fn insert_many(&self, posts: &[NewPost]) -> Result<Vec<Post>, sqlx::Error> {
        *self.insert_calls.lock().unwrap() += 1;
        self.check()?;
        Ok(posts.iter().cloned().map(|p| self.push(p)).collect())
    }

    async fn find_slice(&self, offset: i64, limit: i64) -> Result<Vec<Post>, sqlx::Error> {
        self.slice_calls.lock().unwrap().push((offset, limit));
        self.check()?;
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Post>, sqlx::Error> {
        self.find_calls.lock().unwrap().push(id);
        self.check()?;
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == id)
            .cloned())
    }
}

/// Simulated Redis; TTLs are recorded, not enforced
#[derive(Default)]
pub struct MockCache {
    entries: Mutex<HashMap<String, String>>,
    gets: Mutex<Vec<String>>,
    /// Every (key, value, ttl) passed to set
    sets: Mutex<Vec<(String, String, u64)>>,
    dels: Mutex<Vec<String>>,
    scan_dels: Mutex<Vec<String>>,
    fail_get: AtomicBool,
    fail_set: AtomicBool,
    fail_del: AtomicBool,
}

impl MockCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache where every operation fails, as during a Redis outage
    pub fn unavailable() -> Self {
        let cache = Self::new();
        cache.fail_get.store(true, Ordering::SeqCst);
        cache.fail_set.store(true, Ordering::SeqCst);
        cache.fail_del.store(true, Ordering::SeqCst);
        cache
    }

    pub fn fail_get(&self, fail: bool) {
        self.fail_get.store(fail, Ordering::SeqCst);
    }

    pub fn fail_set(&self, fail: bool) {
        self.fail_set.store(fail, Ordering::SeqCst);
    }

    pub fn fail_del(&self, fail: bool) {
        self.fail_del.store(fail, Ordering::SeqCst);
    }

    /// Seed an entry without recording a set call
    pub fn seed(&self, key: &str, value: &str) {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
    }

    pub fn entry(&self, key: &str) -> Option<String> {
        self.entries.lock().unwrap().get(key).cloned()
    }

    pub fn gets(&self) -> Vec<String> {
        self.gets.lock().unwrap().clone()
    }

    pub fn sets(&self) -> Vec<(String, String, u64)> {
        self.sets.lock().unwrap().clone()
    }

    pub fn dels(&self) -> Vec<String> {
        self.dels.lock().unwrap().clone()
    }

    pub fn scan_dels(&self) -> Vec<String> {
        self.scan_dels.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.gets.lock().unwrap().clear();
        self.sets.lock().unwrap().clear();
        self.dels.lock().unwrap().clear();
        self.scan_dels.lock().unwrap().clear();
    }

    fn outage(flag: &AtomicBool) -> CacheResult<()> {
        if flag.load(Ordering::SeqCst) {
            Err(CacheError::Unavailable("connection refused".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait::async_trait]
impl CacheOperations for MockCache {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        self.gets.lock().unwrap().push(key.to_string());
        Self::outage(&self.fail_get)?;
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str, ttl_secs: u64) -> CacheResult<()> {
        self.sets
            .lock()
            .unwrap()
            .push((key.to_string(), value.to_string(), ttl_secs));
        Self::outage(&self.fail_set)?;
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn del(&self, key: &str) -> CacheResult<()> {
        self.dels.lock().unwrap().push(key.to_string());
        Self::outage(&self.fail_del)?;
        self.entries.lock().unwrap().remove(key);
        Ok(())
    }

    async fn scan_del(&self, pattern: &str) -> CacheResult<usize> {
        self.scan_dels.lock().unwrap().push(pattern.to_string());
        Self::outage(&self.fail_del)?;
        let prefix = pattern.trim_end_matches('*');
        let mut entries = self.entries.lock().unwrap();
        let before = entries.len();
        entries.retain(|key, _| !key.starts_with(prefix));
        Ok(before - entries.len())
    }
}

/// Wire a service over the given doubles
pub fn service_with(
    repo: Arc<MockPostRepository>,
    cache: Arc<MockCache>,
    policy: CachePolicy,
) -> PostService {
    PostService::new(repo, cache, policy)
}
