use crate::models::user::UserPreview;
use crate::utils::serde_helpers::thing_id;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    #[serde(with = "thing_id")]
    pub id: String,
    pub blog_id: String,
    /// The blog's author at comment-creation time, denormalized so
    /// notification routing never needs a join. Does not track later
    /// author changes.
    pub blog_author: String,
    pub comment: String,
    pub commented_by: String,
    #[serde(rename = "isReply", default)]
    pub is_reply: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    /// Invariant: exactly the ids of comments whose `parent` is this id.
    #[serde(default)]
    pub children: Vec<String>,
    #[serde(rename = "commentedAt")]
    pub commented_at: DateTime<Utc>,
}

/// A comment with its commenter attributes populated and its full
/// descendant subtree resolved.
#[derive(Debug, Clone, Serialize)]
pub struct CommentWithReplies {
    #[serde(flatten)]
    pub comment: Comment,
    pub commented_by_info: Option<UserPreview>,
    pub replies: Vec<CommentWithReplies>,
}

/// The comment body populated into notification listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentPreview {
    #[serde(with = "thing_id")]
    pub id: String,
    pub comment: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AddCommentRequest {
    pub comment: String,
    #[serde(rename = "blogId")]
    pub blog_id: String,
    pub blog_author: String,
    /// Id of the comment being replied to, when this is a reply.
    #[serde(default)]
    pub replying_to: Option<String>,
    /// When replying from a notification, that notification gains a
    /// back-link to the new reply.
    #[serde(rename = "notificationId", default)]
    pub notification_id: Option<String>,
}
