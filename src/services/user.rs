use crate::{
    error::{AppError, Result},
    models::notification::Notification,
    models::user::{UpdateEditorRequest, User},
    services::auth::AuthUser,
    services::{Database, NotificationService},
};
use serde_json::json;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub struct UserService {
    db: Arc<Database>,
    notifications: NotificationService,
}

impl UserService {
    pub async fn new(db: Arc<Database>, notifications: NotificationService) -> Result<Self> {
        Ok(Self { db, notifications })
    }

    /// Toggles the editor role on a user. The role grant is announced to
    /// the admin, attributed to the affected user.
    pub async fn update_editor(
        &self,
        caller: &AuthUser,
        request: UpdateEditorRequest,
    ) -> Result<User> {
        let admin = self.notifications.admin_identity().await?;

        // Merge on a missing id would upsert a phantom user record.
        self.db
            .get_by_id::<User>("user", &request.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User"))?;

        let user: User = self
            .db
            .merge_by_id(
                "user",
                &request.user_id,
                json!({ "isEditor": request.is_editor }),
            )
            .await?
            .ok_or_else(|| AppError::not_found("User"))?;

        if !caller.is_admin {
            self.notifications
                .dispatch(Notification::editor(
                    // No blog is involved in a role grant; the slot
                    // carries the affected user's id instead.
                    &user.id,
                    &admin.id,
                    &user.id,
                    format!(
                        "A user {} has become a new editor",
                        user.personal_info.full_name
                    ),
                ))
                .await?;
        }

        info!(
            "User {} editor role set to {} by {}",
            user.id, user.is_editor, caller.id
        );
        Ok(user)
    }
}
