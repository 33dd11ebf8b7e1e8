use crate::{
    error::Result,
    services::notification::MessageNotificationRequest,
    state::AppState,
    utils::middleware::RequiredAuth,
};
use axum::{
    extract::{Query, State},
    response::Json,
    routing::{delete, get, post},
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/isNotification", get(is_notification))
        .route("/get-notifications", get(get_notifications))
        .route("/add-message-notification", post(add_message_notification))
        .route("/delete-notification", delete(delete_notification))
}

async fn is_notification(
    State(state): State<Arc<AppState>>,
    RequiredAuth(user): RequiredAuth,
) -> Result<Json<Value>> {
    let available = state.notification_service.has_unseen(&user.id).await?;

    Ok(Json(json!({ "new_notification_available": available })))
}

#[derive(Deserialize)]
struct GetNotificationsQuery {
    #[serde(default)]
    page: Option<usize>,
    #[serde(default)]
    filter: Option<String>,
}

async fn get_notifications(
    State(state): State<Arc<AppState>>,
    RequiredAuth(user): RequiredAuth,
    Query(query): Query<GetNotificationsQuery>,
) -> Result<Json<Value>> {
    let offset = query.page.unwrap_or(0);
    let filter = query.filter.as_deref().unwrap_or("all");

    let (notifications, next_page) = state
        .notification_service
        .list(&user.id, offset, filter)
        .await?;

    Ok(Json(json!({
        "notifications": notifications,
        "nextPage": next_page
    })))
}

async fn add_message_notification(
    State(state): State<Arc<AppState>>,
    RequiredAuth(user): RequiredAuth,
    Json(request): Json<MessageNotificationRequest>,
) -> Result<Json<Value>> {
    state.notification_service.add_message(&user, request).await?;

    Ok(Json(json!("Notification sent successfully")))
}

#[derive(Deserialize)]
struct DeleteNotificationQuery {
    #[serde(rename = "notificationId")]
    notification_id: String,
}

async fn delete_notification(
    State(state): State<Arc<AppState>>,
    RequiredAuth(user): RequiredAuth,
    Query(query): Query<DeleteNotificationQuery>,
) -> Result<Json<Value>> {
    state
        .notification_service
        .delete_notification(&query.notification_id, &user.id)
        .await?;

    Ok(Json(json!("Notification deleted successfully.")))
}
