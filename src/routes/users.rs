use crate::{
    error::Result,
    models::user::UpdateEditorRequest,
    state::AppState,
    utils::middleware::RequiredAuth,
};
use axum::{
    extract::State,
    response::Json,
    routing::put,
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/update-editor", put(update_editor))
}

async fn update_editor(
    State(state): State<Arc<AppState>>,
    RequiredAuth(caller): RequiredAuth,
    Json(request): Json<UpdateEditorRequest>,
) -> Result<Json<Value>> {
    let user = state.user_service.update_editor(&caller, request).await?;

    Ok(Json(json!({
        "userId": user.id,
        "fullName": user.personal_info.full_name,
        "username": user.personal_info.username,
        "isAdmin": user.is_admin,
        "isEditor": user.is_editor,
    })))
}
