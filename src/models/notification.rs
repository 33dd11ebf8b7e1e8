use crate::utils::serde_helpers::thing_id;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationType {
    Like,
    Comment,
    Reply,
    Editor,
    Admin,
}

impl NotificationType {
    pub fn parse_filter(filter: &str) -> Option<Self> {
        match filter {
            "like" => Some(Self::Like),
            "comment" => Some(Self::Comment),
            "reply" => Some(Self::Reply),
            "editor" => Some(Self::Editor),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Like => "like",
            Self::Comment => "comment",
            Self::Reply => "reply",
            Self::Editor => "editor",
            Self::Admin => "admin",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    #[serde(with = "thing_id")]
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub blog: String,
    /// Recipient.
    pub notification_for: String,
    /// Actor who triggered the notification.
    pub user: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replied_on_comment: Option<String>,
    #[serde(default)]
    pub seen: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl Notification {
    fn new(kind: NotificationType, blog: &str, recipient: &str, actor: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            kind,
            blog: blog.to_string(),
            notification_for: recipient.to_string(),
            user: actor.to_string(),
            comment: None,
            reply: None,
            replied_on_comment: None,
            seen: false,
            message: None,
            created_at: Utc::now(),
        }
    }

    /// Someone liked a blog: routed to the blog's author.
    pub fn like(blog_id: &str, blog_author: &str, liker: &str) -> Self {
        Self::new(NotificationType::Like, blog_id, blog_author, liker)
    }

    /// Top-level comment: routed to the blog's author.
    pub fn comment(blog_id: &str, blog_author: &str, commenter: &str, comment_id: &str) -> Self {
        let mut n = Self::new(NotificationType::Comment, blog_id, blog_author, commenter);
        n.comment = Some(comment_id.to_string());
        n
    }

    /// Reply: routed to the parent comment's author, not the blog's.
    pub fn reply(
        blog_id: &str,
        parent_author: &str,
        replier: &str,
        comment_id: &str,
        replied_on: &str,
    ) -> Self {
        let mut n = Self::new(NotificationType::Reply, blog_id, parent_author, replier);
        n.comment = Some(comment_id.to_string());
        n.replied_on_comment = Some(replied_on.to_string());
        n
    }

    /// Admin acted on someone's blog: routed to the blog's author.
    pub fn admin(blog_id: &str, blog_author: &str, admin_id: &str, message: String) -> Self {
        let mut n = Self::new(NotificationType::Admin, blog_id, blog_author, admin_id);
        n.message = Some(message);
        n
    }

    /// An editor acted on their own content: routed to the admin.
    pub fn editor(blog_id: &str, admin_id: &str, editor_id: &str, message: String) -> Self {
        let mut n = Self::new(NotificationType::Editor, blog_id, admin_id, editor_id);
        n.message = Some(message);
        n
    }

    /// Self-actions never notify self for ordinary content notifications.
    /// Role/admin notifications route through the administrative identity
    /// and are exempt.
    pub fn is_self_directed(&self) -> bool {
        matches!(
            self.kind,
            NotificationType::Like | NotificationType::Comment | NotificationType::Reply
        ) && self.notification_for == self.user
    }
}

/// Notification with its referenced blog, actor, and comments populated
/// for the listing endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct NotificationWithRefs {
    #[serde(flatten)]
    pub notification: Notification,
    pub blog_info: Option<crate::models::blog::BlogPreview>,
    pub user_info: Option<crate::models::user::UserPreview>,
    pub comment_info: Option<crate::models::comment::CommentPreview>,
    pub replied_on_comment_info: Option<crate::models::comment::CommentPreview>,
    pub reply_info: Option<crate::models::comment::CommentPreview>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_routes_to_blog_author() {
        let n = Notification::like("b1", "author", "liker");
        assert_eq!(n.kind, NotificationType::Like);
        assert_eq!(n.notification_for, "author");
        assert_eq!(n.user, "liker");
        assert_eq!(n.blog, "b1");
        assert!(!n.seen);
        assert!(!n.is_self_directed());
    }

    #[test]
    fn comment_routes_to_blog_author_with_comment_ref() {
        let n = Notification::comment("b1", "author", "commenter", "c1");
        assert_eq!(n.kind, NotificationType::Comment);
        assert_eq!(n.notification_for, "author");
        assert_eq!(n.user, "commenter");
        assert_eq!(n.comment.as_deref(), Some("c1"));
        assert!(n.replied_on_comment.is_none());
    }

    #[test]
    fn reply_routes_to_parent_comment_author() {
        let n = Notification::reply("b1", "parent_author", "replier", "c2", "c1");
        assert_eq!(n.kind, NotificationType::Reply);
        assert_eq!(n.notification_for, "parent_author");
        assert_eq!(n.user, "replier");
        assert_eq!(n.comment.as_deref(), Some("c2"));
        assert_eq!(n.replied_on_comment.as_deref(), Some("c1"));
    }

    #[test]
    fn editor_actions_route_to_admin() {
        let n = Notification::editor("b1", "admin", "editor", "Blog \"x\" is edited by its author".into());
        assert_eq!(n.kind, NotificationType::Editor);
        assert_eq!(n.notification_for, "admin");
        assert_eq!(n.user, "editor");
        assert!(n.message.is_some());
    }

    #[test]
    fn admin_actions_route_to_blog_author() {
        let n = Notification::admin("b1", "author", "admin", "deleted".into());
        assert_eq!(n.kind, NotificationType::Admin);
        assert_eq!(n.notification_for, "author");
        assert_eq!(n.user, "admin");
    }

    #[test]
    fn self_actions_are_flagged_for_content_notifications_only() {
        assert!(Notification::like("b1", "u1", "u1").is_self_directed());
        assert!(Notification::comment("b1", "u1", "u1", "c1").is_self_directed());
        assert!(Notification::reply("b1", "u1", "u1", "c2", "c1").is_self_directed());
        // Role notifications are exempt even when actor and recipient match.
        assert!(!Notification::editor("u1", "u1", "u1", "msg".into()).is_self_directed());
    }

    #[test]
    fn type_filter_parsing() {
        assert_eq!(NotificationType::parse_filter("reply"), Some(NotificationType::Reply));
        assert_eq!(NotificationType::parse_filter("all"), None);
        assert_eq!(NotificationType::parse_filter("bogus"), None);
    }
}
