use crate::{
    error::Result,
    services::favorites::ReadLaterRequest,
    state::AppState,
    utils::middleware::RequiredAuth,
};
use axum::{
    extract::{Query, State},
    response::Json,
    routing::get,
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/read-later", get(get_read_later).put(put_read_later))
        .route("/liked-blogs", get(get_liked_blogs))
}

#[derive(Deserialize)]
struct FavoritesQuery {
    #[serde(default)]
    page: Option<usize>,
    #[serde(default)]
    search: Option<String>,
}

async fn get_read_later(
    State(state): State<Arc<AppState>>,
    RequiredAuth(user): RequiredAuth,
    Query(query): Query<FavoritesQuery>,
) -> Result<Json<Value>> {
    let (blogs, next_page) = state
        .favorites_service
        .read_later_blogs(&user.id, query.page.unwrap_or(0), query.search.as_deref())
        .await?;

    Ok(Json(json!({
        "readLaterBlogs": blogs,
        "nextPage": next_page
    })))
}

async fn put_read_later(
    State(state): State<Arc<AppState>>,
    RequiredAuth(user): RequiredAuth,
    Json(request): Json<ReadLaterRequest>,
) -> Result<Json<Value>> {
    let added = state
        .favorites_service
        .toggle_read_later(&user.id, request)
        .await?;

    Ok(Json(json!(if added {
        "added to read later blog"
    } else {
        "removed from read later blog"
    })))
}

async fn get_liked_blogs(
    State(state): State<Arc<AppState>>,
    RequiredAuth(user): RequiredAuth,
    Query(query): Query<FavoritesQuery>,
) -> Result<Json<Value>> {
    let (blogs, next_page) = state
        .favorites_service
        .liked_blogs(&user.id, query.page.unwrap_or(0), query.search.as_deref())
        .await?;

    Ok(Json(json!({
        "likedBlogs": blogs,
        "nextPage": next_page
    })))
}
