pub mod middleware;
pub mod pagination;
pub mod rate_limit;
pub mod serde_helpers;
