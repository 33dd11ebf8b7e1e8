pub mod blogs;
pub mod comments;
pub mod favorites;
pub mod notifications;
pub mod users;
