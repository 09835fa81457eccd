/// Database access layer
///
/// The `blog_post` table is owned by the deployment (see `sql/blog_post.sql`);
/// this layer only reads and inserts rows.
pub mod post_repo;

pub use post_repo::{PgPostRepository, PostRepository};
