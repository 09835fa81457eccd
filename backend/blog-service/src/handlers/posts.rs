/// Post handlers - HTTP endpoints for post operations
use crate::error::{AppError, Result};
use crate::models::NewPost;
use crate::services::PostService;
use actix_web::{web, HttpResponse};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct ListPostsQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    10
}

/// Posts need a non-empty title, mirroring the `blog_post` check constraint
fn validate_new_post(post: &NewPost) -> std::result::Result<(), &'static str> {
    if post.title.is_empty() {
        return Err("title must not be empty");
    }
    Ok(())
}

/// Create a new post
pub async fn create_post(
    service: web::Data<PostService>,
    req: web::Json<NewPost>,
) -> Result<HttpResponse> {
    validate_new_post(&req).map_err(|msg| AppError::BadRequest(msg.to_string()))?;

    let post = service.create_post(&req).await?;
    Ok(HttpResponse::Created().json(post))
}

/// Create several posts at once
pub async fn create_posts(
    service: web::Data<PostService>,
    req: web::Json<Vec<NewPost>>,
) -> Result<HttpResponse> {
    for (index, post) in req.iter().enumerate() {
        validate_new_post(post)
            .map_err(|msg| AppError::BadRequest(format!("posts[{}]: {}", index, msg)))?;
    }

    let posts = service.create_posts(&req).await?;
    Ok(HttpResponse::Created().json(posts))
}

/// List posts page by page
pub async fn list_posts(
    service: web::Data<PostService>,
    query: web::Query<ListPostsQuery>,
) -> Result<HttpResponse> {
    if query.page < 1 || query.limit < 1 {
        return Err(AppError::BadRequest(
            "page and limit must be at least 1".to_string(),
        ));
    }

    let posts = service.find_page(query.page, query.limit).await?;
    Ok(HttpResponse::Ok().json(posts))
}

/// Get a post by ID
pub async fn get_post(
    service: web::Data<PostService>,
    post_id: web::Path<i32>,
) -> Result<HttpResponse> {
    let post = service.find_one(post_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(post))
}
