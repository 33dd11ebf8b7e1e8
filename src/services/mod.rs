pub mod auth;
pub mod blog;
pub mod comment;
pub mod database;
pub mod favorites;
pub mod notification;
pub mod user;

pub use auth::AuthService;
pub use blog::BlogService;
pub use comment::CommentService;
pub use database::Database;
pub use favorites::FavoritesService;
pub use notification::NotificationService;
pub use user::UserService;
