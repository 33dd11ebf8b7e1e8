use crate::{
    error::{AppError, Result},
    models::blog::BlogPreview,
    models::comment::CommentPreview,
    models::notification::{Notification, NotificationType, NotificationWithRefs},
    models::user::{User, UserPreview},
    services::auth::AuthUser,
    services::database::update_existing,
    services::Database,
    utils::pagination::next_page,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Clone)]
pub struct NotificationService {
    db: Arc<Database>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessageNotificationRequest {
    pub message: String,
    #[serde(default)]
    pub username: Option<String>,
}

impl NotificationService {
    pub async fn new(db: Arc<Database>) -> Result<Self> {
        Ok(Self { db })
    }

    /// Resolves the administrative routing identity used by the fan-out
    /// rules. The system assumes exactly one admin account; anything
    /// else is a deployment error rather than something to tie-break.
    pub async fn admin_identity(&self) -> Result<User> {
        let admins: Vec<User> = self
            .db
            .select_with_params("SELECT * FROM user WHERE isAdmin = true LIMIT 2", json!({}))
            .await?;

        if admins.len() > 1 {
            return Err(AppError::internal(
                "Multiple admin accounts found; notification routing is ambiguous",
            ));
        }

        admins
            .into_iter()
            .next()
            .ok_or_else(|| AppError::internal("No admin account is configured"))
    }

    /// Persists a notification, unless it would notify the actor about
    /// their own action.
    pub async fn dispatch(&self, notification: Notification) -> Result<Option<Notification>> {
        if notification.is_self_directed() {
            debug!(
                "Skipping self-directed {} notification for user {}",
                notification.kind.as_str(),
                notification.user
            );
            return Ok(None);
        }

        let id = notification.id.clone();
        let created = self.db.create("notification", &id, notification).await?;
        Ok(Some(created))
    }

    /// Unlike removes the prior like notification outright.
    pub async fn remove_like_notification(&self, user_id: &str, blog_id: &str) -> Result<()> {
        self.db
            .query_with_params(
                "DELETE notification WHERE user = $user AND blog = $blog AND type = 'like'",
                json!({ "user": user_id, "blog": blog_id }),
            )
            .await?;
        Ok(())
    }

    /// Back-links a freshly created reply onto the notification the
    /// replier was viewing. A stale or bogus notification id is a no-op.
    pub async fn attach_reply(&self, notification_id: &str, reply_comment_id: &str) -> Result<()> {
        self.db
            .query_with_params(
                &update_existing("notification", "reply = $reply"),
                json!({ "id": notification_id, "reply": reply_comment_id }),
            )
            .await?;
        Ok(())
    }

    /// Cleanup when a comment is deleted: notifications about the
    /// comment are removed; notifications merely back-linking it as a
    /// reply survive with the link cleared.
    pub async fn scrub_comment(&self, comment_id: &str) -> Result<()> {
        self.db
            .query_with_params(
                "DELETE notification WHERE comment = $comment",
                json!({ "comment": comment_id }),
            )
            .await?;
        self.db
            .query_with_params(
                "UPDATE notification SET reply = NONE WHERE reply = $comment",
                json!({ "comment": comment_id }),
            )
            .await?;
        Ok(())
    }

    pub async fn scrub_blog(&self, blog_id: &str) -> Result<()> {
        self.db
            .query_with_params(
                "DELETE notification WHERE blog = $blog",
                json!({ "blog": blog_id }),
            )
            .await?;
        Ok(())
    }

    pub async fn has_unseen(&self, user_id: &str) -> Result<bool> {
        let count = self
            .db
            .count(
                "SELECT count() AS count FROM notification \
                 WHERE notification_for = $user AND seen = false AND user != $user GROUP ALL",
                json!({ "user": user_id }),
            )
            .await?;
        Ok(count > 0)
    }

    /// Paginated listing for the recipient, self-actions excluded, with
    /// the returned page marked as seen.
    pub async fn list(
        &self,
        user_id: &str,
        offset: usize,
        filter: &str,
    ) -> Result<(Vec<NotificationWithRefs>, Option<usize>)> {
        let per_page = self.db.config.notifications_per_page;
        let kind = NotificationType::parse_filter(filter);

        let mut where_clause =
            String::from("WHERE notification_for = $user AND user != $user");
        if kind.is_some() {
            where_clause.push_str(" AND type = $kind");
        }

        let params = json!({
            "user": user_id,
            "kind": kind.map(|k| k.as_str()),
        });

        let total = self
            .db
            .count(
                &format!("SELECT count() AS count FROM notification {} GROUP ALL", where_clause),
                params.clone(),
            )
            .await?;

        let notifications: Vec<Notification> = self
            .db
            .select_with_params(
                &format!(
                    "SELECT * FROM notification {} ORDER BY createdAt DESC LIMIT {} START {}",
                    where_clause, per_page, offset
                ),
                params,
            )
            .await?;

        for notification in &notifications {
            if !notification.seen {
                self.db
                    .query_with_params(
                        &update_existing("notification", "seen = true"),
                        json!({ "id": notification.id }),
                    )
                    .await?;
            }
        }

        let next = next_page(total, offset, notifications.len());

        let mut populated = Vec::with_capacity(notifications.len());
        for notification in notifications {
            populated.push(self.populate(notification).await?);
        }

        Ok((populated, next))
    }

    /// Hard delete, restricted to the notification's recipient.
    pub async fn delete_notification(&self, notification_id: &str, user_id: &str) -> Result<()> {
        let notification: Notification = self
            .db
            .get_by_id("notification", notification_id)
            .await?
            .ok_or_else(|| AppError::not_found("Notification"))?;

        if notification.notification_for != user_id {
            return Err(AppError::forbidden("You cannot delete this notification."));
        }

        self.db.delete_by_id("notification", notification_id).await?;
        info!("Notification {} deleted by its recipient", notification_id);
        Ok(())
    }

    /// Free-text messages: editors message the admin; the admin messages
    /// a named user through the administrative identity.
    pub async fn add_message(
        &self,
        caller: &AuthUser,
        request: MessageNotificationRequest,
    ) -> Result<()> {
        if request.message.trim().is_empty() {
            return Err(AppError::validation("Please write a message."));
        }

        let admin = self.admin_identity().await?;

        let notification = match message_route(caller, request.username)? {
            MessageRoute::EditorToAdmin => {
                Notification::editor(&caller.id, &admin.id, &caller.id, request.message)
            }
            MessageRoute::ToNamedUser(username) => {
                let target: User = self
                    .db
                    .select_with_params(
                        "SELECT * FROM user WHERE personal_info.username = $username LIMIT 1",
                        json!({ "username": username }),
                    )
                    .await?
                    .into_iter()
                    .next()
                    .ok_or_else(|| AppError::not_found("User"))?;

                Notification::admin(&caller.id, &target.id, &admin.id, request.message)
            }
        };

        self.dispatch(notification).await?;
        Ok(())
    }

    async fn populate(&self, notification: Notification) -> Result<NotificationWithRefs> {
        let blog_info: Option<BlogPreview> = self
            .db
            .select_with_params(
                "SELECT id, title, author FROM type::thing('blog', $id)",
                json!({ "id": notification.blog }),
            )
            .await?
            .into_iter()
            .next();

        let user_info = self
            .db
            .get_by_id::<User>("user", &notification.user)
            .await?
            .as_ref()
            .map(UserPreview::from);

        let comment_info = self.comment_preview(notification.comment.as_deref()).await?;
        let replied_on_comment_info = self
            .comment_preview(notification.replied_on_comment.as_deref())
            .await?;
        let reply_info = self.comment_preview(notification.reply.as_deref()).await?;

        Ok(NotificationWithRefs {
            notification,
            blog_info,
            user_info,
            comment_info,
            replied_on_comment_info,
            reply_info,
        })
    }

    async fn comment_preview(&self, comment_id: Option<&str>) -> Result<Option<CommentPreview>> {
        let Some(id) = comment_id else {
            return Ok(None);
        };

        let preview: Option<CommentPreview> = self
            .db
            .select_with_params(
                "SELECT id, comment FROM type::thing('comment', $id)",
                json!({ "id": id }),
            )
            .await?
            .into_iter()
            .next();

        Ok(preview)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum MessageRoute {
    /// Editor without a named target: message goes to the admin.
    EditorToAdmin,
    /// Named target: message goes to that user via the admin identity.
    ToNamedUser(String),
}

pub(crate) fn message_route(caller: &AuthUser, username: Option<String>) -> Result<MessageRoute> {
    match username {
        Some(username) => Ok(MessageRoute::ToNamedUser(username)),
        None if !caller.is_admin => Ok(MessageRoute::EditorToAdmin),
        None => Err(AppError::validation(
            "A username is required to send an admin message.",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caller(is_admin: bool) -> AuthUser {
        AuthUser {
            id: "caller".to_string(),
            is_admin,
            is_editor: true,
        }
    }

    #[test]
    fn editor_without_target_messages_the_admin() {
        let route = message_route(&caller(false), None).unwrap();
        assert_eq!(route, MessageRoute::EditorToAdmin);
    }

    #[test]
    fn named_target_routes_to_that_user() {
        let route = message_route(&caller(true), Some("reader".to_string())).unwrap();
        assert_eq!(route, MessageRoute::ToNamedUser("reader".to_string()));

        // Editors may also address a named user directly.
        let route = message_route(&caller(false), Some("reader".to_string())).unwrap();
        assert_eq!(route, MessageRoute::ToNamedUser("reader".to_string()));
    }

    #[test]
    fn admin_without_target_is_rejected() {
        match message_route(&caller(true), None).unwrap_err() {
            AppError::Validation(msg) => {
                assert_eq!(msg, "A username is required to send an admin message.")
            }
            other => panic!("unexpected error variant: {other:?}"),
        }
    }
}
