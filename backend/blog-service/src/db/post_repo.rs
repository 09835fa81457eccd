use crate::models::{NewPost, Post};
use sqlx::PgPool;

/// Persistent store for posts.
///
/// Implementations return driver errors untouched; callers decide how to
/// surface them.
#[async_trait::async_trait]
pub trait PostRepository: Send + Sync {
    /// Insert one post, returning it with its generated id and timestamps
    async fn insert(&self, post: &NewPost) -> Result<Post, sqlx::Error>;

    /// Insert a batch in one statement; the result follows input order
    async fn insert_many(&self, posts: &[NewPost]) -> Result<Vec<Post>, sqlx::Error>;

    /// Posts ordered by id, skipping `offset` rows and returning at most `limit`
    async fn find_slice(&self, offset: i64, limit: i64) -> Result<Vec<Post>, sqlx::Error>;

    /// Look up a post by id
    async fn find_by_id(&self, id: i32) -> Result<Option<Post>, sqlx::Error>;
}

/// PostgreSQL-backed post repository
#[derive(Clone)]
pub struct PgPostRepository {
    pool: PgPool,
}

impl PgPostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl PostRepository for PgPostRepository {
    async fn insert(&self, post: &NewPost) -> Result<Post, sqlx::Error> {
        sqlx::query_as::<_, Post>(
            r#"
            INSERT INTO blog_post (title, body)
            VALUES ($1, $2)
            RETURNING id, title, body, created_at, updated_at
            "#,
        )
        .bind(&post.title)
        .bind(&post.body)
        .fetch_one(&self.pool)
        .await
    }

    async fn insert_many(&self, posts: &[NewPost]) -> Result<Vec<Post>, sqlx::Error> {
        if posts.is_empty() {
            return Ok(Vec::new());
        }

        let titles: Vec<&str> = posts.iter().map(|p| p.title.as_str()).collect();
        let bodies: Vec<&str> = posts.iter().map(|p| p.body.as_str()).collect();

        // Ids come from the sequence in ORDER BY ord order, so sorting the
        // returned rows by id restores input order.
        let mut created = sqlx::query_as::<_, Post>(
            r#"
            INSERT INTO blog_post (title, body)
            SELECT t.title, t.body
            FROM UNNEST($1::text[], $2::text[]) WITH ORDINALITY AS t(title, body, ord)
            ORDER BY t.ord
            RETURNING id, title, body, created_at, updated_at
            "#,
        )
        .bind(&titles)
        .bind(&bodies)
        .fetch_all(&self.pool)
        .await?;

        created.sort_by_key(|p| p.id);
        Ok(created)
    }

    async fn find_slice(&self, offset: i64, limit: i64) -> Result<Vec<Post>, sqlx::Error> {
        sqlx::query_as::<_, Post>(
            r#"
            SELECT id, title, body, created_at, updated_at
            FROM blog_post
            ORDER BY id ASC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Post>, sqlx::Error> {
        sqlx::query_as::<_, Post>(
            r#"
            SELECT id, title, body, created_at, updated_at
            FROM blog_post
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }
}
