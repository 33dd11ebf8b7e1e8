use crate::utils::serde_helpers::thing_id;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Denormalized activity counters carried on every blog. Each field is
/// only ever changed through an atomic single-field increment in storage.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Activity {
    #[serde(default)]
    pub total_likes: i64,
    #[serde(default)]
    pub total_comments: i64,
    /// Counts top-level comments only; `total_comments` counts all.
    #[serde(default)]
    pub total_parent_comments: i64,
    #[serde(default)]
    pub total_reads: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Blog {
    #[serde(with = "thing_id")]
    pub id: String,
    pub title: String,
    pub banner: String,
    #[serde(default)]
    pub des: String,
    #[serde(default)]
    pub content: serde_json::Value,
    #[serde(default)]
    pub tags: Vec<String>,
    pub author: String,
    #[serde(default)]
    pub draft: bool,
    #[serde(default)]
    pub activity: Activity,
    /// Ids of every comment (top-level and reply) attached to this blog.
    #[serde(default)]
    pub comments: Vec<String>,
    #[serde(rename = "publishedAt")]
    pub published_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateBlogRequest {
    #[validate(length(min = 1, message = "You must provide a title to publish the blog"))]
    pub title: String,
    #[validate(length(min = 1, message = "You must provide a banner image to publish the blog"))]
    #[serde(default)]
    pub banner: String,
    #[validate(length(
        min = 1,
        max = 200,
        message = "You must provide a blog description under 200 characters"
    ))]
    #[serde(default)]
    pub des: String,
    #[serde(default)]
    pub content: serde_json::Value,
    #[validate(length(min = 1, max = 10, message = "Provide 1 to 10 tags to publish the blog"))]
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub draft: bool,
    /// Present on update, absent on create.
    #[serde(rename = "blogId", default)]
    pub blog_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LikeBlogRequest {
    #[serde(rename = "blogId")]
    pub blog_id: String,
    #[serde(rename = "isLikedByUser")]
    pub is_liked_by_user: bool,
}

/// Listing row with the author attributes populated.
#[derive(Debug, Clone, Serialize)]
pub struct BlogWithAuthor {
    #[serde(flatten)]
    pub blog: Blog,
    pub author_info: Option<crate::models::user::UserPreview>,
}

/// The blog attributes populated into notification listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlogPreview {
    #[serde(with = "thing_id")]
    pub id: String,
    pub title: String,
    pub author: String,
}
