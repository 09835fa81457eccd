/// HTTP handlers for blog-service
///
/// - Posts: create (single and bulk), paginated list, get by id
/// - Health: banner, liveness and readiness checks
pub mod health;
pub mod posts;

use crate::error::AppError;
use actix_web::web;

pub use health::{health_check, index, readiness_check, HealthState};
pub use posts::{create_post, create_posts, get_post, list_posts, ListPostsQuery};

/// Post routes under `/v1/blog-posts`, with extractor failures rendered as
/// JSON 400 responses.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::PathConfig::default()
            .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into()),
    )
    .app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into()),
    )
    .service(
        web::scope("/v1/blog-posts")
            .service(
                web::resource("")
                    .route(web::post().to(create_post))
                    .route(web::get().to(list_posts)),
            )
            .service(web::resource("/bulk").route(web::post().to(create_posts)))
            .service(web::resource("/{id}").route(web::get().to(get_post))),
    );
}
