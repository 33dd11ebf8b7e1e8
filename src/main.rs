use std::sync::Arc;

use axum::{
    http::{HeaderValue, Method},
    middleware,
    routing::{get, Router},
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod error;
mod models;
mod routes;
mod services;
mod state;
mod utils;

use crate::{
    config::Config,
    services::{
        AuthService, BlogService, CommentService, Database, FavoritesService, NotificationService,
        UserService,
    },
    state::AppState,
    utils::rate_limit::RateLimits,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("LOG_LEVEL").unwrap_or_else(|_| "byteblog=debug,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting byteblog service...");

    dotenv::dotenv().ok();
    let config = Config::from_env()?;

    let db = Arc::new(match Database::new(&config).await {
        Ok(db) => {
            db.verify_connection().await?;
            info!("Database connection established successfully");
            db
        }
        Err(e) => {
            error!("Failed to create database connection: {}", e);
            return Err(anyhow::anyhow!("Database initialization failed"));
        }
    });

    let auth_service = AuthService::new(&config);
    let notification_service = NotificationService::new(db.clone()).await?;
    let comment_service = CommentService::new(db.clone(), notification_service.clone()).await?;
    let favorites_service = FavoritesService::new(db.clone()).await?;
    let blog_service = BlogService::new(db.clone(), notification_service.clone()).await?;
    let user_service = UserService::new(db.clone(), notification_service.clone()).await?;
    let rate_limits = RateLimits::new(&config);

    let app_state = Arc::new(AppState {
        config: config.clone(),
        db: (*db).clone(),
        auth_service,
        blog_service,
        comment_service,
        favorites_service,
        notification_service,
        user_service,
        rate_limits,
    });

    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any)
        .allow_origin(
            config
                .cors_allowed_origins
                .split(',')
                .filter_map(|origin| origin.trim().parse::<HeaderValue>().ok())
                .collect::<Vec<_>>(),
        );

    let app = Router::new()
        .route("/", get(health_check))
        .route("/health", get(health_check))
        .nest("/api/blog", routes::blogs::router())
        .nest("/api/comment", routes::comments::router())
        .nest("/api/favorites", routes::favorites::router())
        .nest("/api/notification", routes::notifications::router())
        .nest("/api/users", routes::users::router())
        .layer(middleware::from_fn_with_state(
            app_state.clone(),
            utils::middleware::auth_middleware,
        ))
        .layer(cors)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(app_state);

    let addr = format!("{}:{}", config.server_host, config.server_port);
    info!("Starting server on http://{}", addr);

    axum::Server::bind(&addr.parse()?)
        .serve(app.into_make_service())
        .await?;

    Ok(())
}

async fn health_check() -> &'static str {
    "byteblog is running!"
}
