use actix_web::{web, App, HttpServer};
use blog_cache::BlogCache;
use blog_service::db::PgPostRepository;
use blog_service::handlers::{self, HealthState};
use blog_service::services::{CachePolicy, PostService};
use blog_service::{metrics, Config};
use db_pool::{create_pool, DbConfig};
use redis_utils::{LazyConnection, RedisPool};
use std::io;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const SERVICE_NAME: &str = "blog-service";

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = terminate.recv() => {},
                }
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {}", e);
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

fn init_tracing(json_logs: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,actix_web=info,sqlx=warn".into());

    if json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

async fn run_healthcheck(port: u16) -> io::Result<()> {
    let url = format!("http://127.0.0.1:{}/health", port);
    match reqwest::Client::new().get(&url).send().await {
        Ok(resp) if resp.status().is_success() => Ok(()),
        Ok(resp) => {
            eprintln!("healthcheck HTTP status: {}", resp.status());
            Err(io::Error::new(io::ErrorKind::Other, "healthcheck failed"))
        }
        Err(e) => {
            eprintln!("healthcheck HTTP error: {}", e);
            Err(io::Error::new(io::ErrorKind::Other, "healthcheck error"))
        }
    }
}

/// Blog Service
///
/// # Routes
///
/// - `POST /v1/blog-posts` - Create a post
/// - `POST /v1/blog-posts/bulk` - Create a batch of posts
/// - `GET /v1/blog-posts?page=&limit=` - List posts (defaults 1 / 10)
/// - `GET /v1/blog-posts/{id}` - Get one post
/// - `GET /`, `/health`, `/health/ready`, `/metrics`
#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenvy::dotenv().ok();

    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("ERROR: Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    // Container healthcheck: `blog-service healthcheck`
    if std::env::args().nth(1).as_deref() == Some("healthcheck") {
        return run_healthcheck(config.app.port).await;
    }

    init_tracing(config.app.json_logs);

    tracing::info!("Starting {} v{}", SERVICE_NAME, env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "Environment: {} (production={})",
        config.app.env,
        config.is_production()
    );

    if let Err(e) = metrics::init() {
        tracing::warn!("Cache metrics registration failed: {}", e);
    }

    let db_cfg = match DbConfig::new(SERVICE_NAME, config.database.url.clone()) {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!("Invalid database pool configuration: {}", e);
            eprintln!("ERROR: Invalid database pool configuration: {}", e);
            std::process::exit(1);
        }
    };
    db_cfg.log_config();
    let db_pool = match create_pool(db_cfg).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("Database pool creation failed: {:#}", e);
            eprintln!("ERROR: Failed to create database pool: {}", e);
            std::process::exit(1);
        }
    };

    // Without Redis every request is served from PostgreSQL
    let redis = match RedisPool::connect(&config.cache.url).await {
        Ok(pool) => LazyConnection::ready(pool.manager()),
        Err(e) => {
            tracing::warn!(
                "Redis unavailable at startup, retrying in background: {:#}",
                e
            );
            LazyConnection::connect_in_background(&config.cache.url).map_err(|e| {
                io::Error::new(io::ErrorKind::InvalidInput, format!("{e:#}"))
            })?
        }
    };

    let policy = CachePolicy::from(&config.cache);
    tracing::info!(
        ttl_secs = policy.ttl_secs,
        invalidate_pages = policy.invalidate_pages,
        "Post cache policy"
    );

    let post_service = web::Data::new(PostService::new(
        Arc::new(PgPostRepository::new(db_pool.clone())),
        Arc::new(BlogCache::new(redis.clone())),
        policy,
    ));
    let health_state = web::Data::new(HealthState::new(db_pool.clone(), redis));

    let bind_address = format!("{}:{}", config.app.host, config.app.port);
    tracing::info!("Starting HTTP server at {}", bind_address);

    let server = HttpServer::new(move || {
        App::new()
            .app_data(post_service.clone())
            .app_data(health_state.clone())
            .wrap(tracing_actix_web::TracingLogger::default())
            .route("/", web::get().to(handlers::index))
            .route("/health", web::get().to(handlers::health_check))
            .route("/health/ready", web::get().to(handlers::readiness_check))
            .route("/metrics", web::get().to(metrics::serve_metrics))
            .configure(handlers::configure)
    })
    .bind(&bind_address)?
    .disable_signals()
    .run();

    let server_handle = server.handle();
    let mut server_task = actix_web::rt::spawn(server);

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    let finished = tokio::select! {
        joined = &mut server_task => Some(joined),
        _ = &mut shutdown => None,
    };

    let result = match finished {
        Some(joined) => joined,
        None => {
            tracing::info!("Shutdown signal received");
            server_handle.stop(true).await;
            server_task.await
        }
    };

    let result = result
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))
        .and_then(|served| served);

    db_pool.close().await;
    tracing::info!("{} stopped", SERVICE_NAME);
    result
}
