use crate::{
    error::Result,
    models::comment::AddCommentRequest,
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
        .route("/get-comments", get(get_comments))
        .route("/add-comment", post(add_comment))
        .route("/delete-comment", delete(delete_comment))
}

#[derive(Deserialize)]
struct GetCommentsQuery {
    #[serde(rename = "blogId")]
    blog_id: String,
    #[serde(default)]
    skip: Option<usize>,
}

async fn get_comments(
    State(state): State<Arc<AppState>>,
    Query(query): Query<GetCommentsQuery>,
) -> Result<Json<Value>> {
    let offset = query.skip.unwrap_or(0);
    let (comments, next_page) = state
        .comment_service
        .get_blog_comments(&query.blog_id, offset)
        .await?;

    Ok(Json(json!({
        "comments": comments,
        "nextPage": next_page
    })))
}

async fn add_comment(
    State(state): State<Arc<AppState>>,
    RequiredAuth(user): RequiredAuth,
    Json(request): Json<AddCommentRequest>,
) -> Result<Json<Value>> {
    let comment = state.comment_service.add_comment(&user.id, request).await?;

    Ok(Json(json!({
        "comment": comment.comment,
        "commentedAt": comment.commented_at,
        "userId": user.id,
        "commentId": comment.id,
        "children": comment.children,
    })))
}

#[derive(Deserialize)]
struct DeleteCommentQuery {
    #[serde(rename = "commentId")]
    comment_id: String,
}

async fn delete_comment(
    State(state): State<Arc<AppState>>,
    RequiredAuth(user): RequiredAuth,
    Query(query): Query<DeleteCommentQuery>,
) -> Result<Json<Value>> {
    state
        .comment_service
        .delete_comment(&query.comment_id, &user.id)
        .await?;

    Ok(Json(json!({ "status": "deleted" })))
}
