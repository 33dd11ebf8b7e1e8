use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // Server configuration
    pub server_host: String,
    pub server_port: u16,
    pub environment: String,
    pub log_level: String,

    // Database configuration
    pub database_url: String,
    pub database_namespace: String,
    pub database_name: String,
    pub database_username: String,
    pub database_password: String,

    // Authentication configuration
    pub jwt_secret: String,

    // Content settings
    pub comments_per_page: usize,
    pub blogs_per_page: usize,
    pub notifications_per_page: usize,
    pub max_comment_depth: usize,
    pub trending_blogs_limit: usize,

    // Rate limiting (mutating blog endpoints)
    pub rate_limit_admin_requests: u32,
    pub rate_limit_user_requests: u32,
    pub rate_limit_window_secs: u64,

    // CORS configuration
    pub cors_allowed_origins: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Config {
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()?,
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),

            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "localhost:8000".to_string()),
            database_namespace: env::var("DATABASE_NAMESPACE")
                .unwrap_or_else(|_| "byteblog".to_string()),
            database_name: env::var("DATABASE_NAME").unwrap_or_else(|_| "blog".to_string()),
            database_username: env::var("DATABASE_USERNAME")
                .unwrap_or_else(|_| "root".to_string()),
            database_password: env::var("DATABASE_PASSWORD")
                .unwrap_or_else(|_| "root".to_string()),

            jwt_secret: env::var("SECRET_KEY").expect("SECRET_KEY must be set"),

            comments_per_page: env::var("COMMENTS_PER_PAGE")
                .unwrap_or_else(|_| "4".to_string())
                .parse()?,
            blogs_per_page: env::var("BLOGS_PER_PAGE")
                .unwrap_or_else(|_| "4".to_string())
                .parse()?,
            notifications_per_page: env::var("NOTIFICATIONS_PER_PAGE")
                .unwrap_or_else(|_| "10".to_string())
                .parse()?,
            max_comment_depth: env::var("MAX_COMMENT_DEPTH")
                .unwrap_or_else(|_| "128".to_string())
                .parse()?,
            trending_blogs_limit: env::var("TRENDING_BLOGS_LIMIT")
                .unwrap_or_else(|_| "10".to_string())
                .parse()?,

            rate_limit_admin_requests: env::var("RATE_LIMIT_ADMIN_REQUESTS")
                .unwrap_or_else(|_| "100".to_string())
                .parse()?,
            rate_limit_user_requests: env::var("RATE_LIMIT_USER_REQUESTS")
                .unwrap_or_else(|_| "4".to_string())
                .parse()?,
            rate_limit_window_secs: env::var("RATE_LIMIT_WINDOW_SECS")
                .unwrap_or_else(|_| "900".to_string())
                .parse()?,

            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}
