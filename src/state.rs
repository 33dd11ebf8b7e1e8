use crate::{
    config::Config,
    services::{
        auth::AuthService, blog::BlogService, comment::CommentService, database::Database,
        favorites::FavoritesService, notification::NotificationService, user::UserService,
    },
    utils::rate_limit::RateLimits,
};

/// Shared application state, handed to every handler behind an `Arc`.
pub struct AppState {
    pub config: Config,

    pub db: Database,

    pub auth_service: AuthService,

    pub blog_service: BlogService,

    pub comment_service: CommentService,

    pub favorites_service: FavoritesService,

    pub notification_service: NotificationService,

    pub user_service: UserService,

    /// Per-user limiter for mutating blog endpoints.
    pub rate_limits: RateLimits,
}
