use crate::{
    error::Result,
    models::blog::{CreateBlogRequest, LikeBlogRequest},
    services::blog::BlogListQuery,
    state::AppState,
    utils::middleware::RequiredAuth,
};
use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::{delete, get, post, put},
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/get-blogs", get(get_blogs))
        .route("/get-trending-blogs", get(get_trending_blogs))
        .route("/get-blog/:blog_id", get(get_blog))
        .route("/create-blog", post(create_blog))
        .route("/like-blog", put(like_blog))
        .route("/delete-blog", delete(delete_blog))
}

async fn get_blogs(
    State(state): State<Arc<AppState>>,
    Query(query): Query<BlogListQuery>,
) -> Result<Json<Value>> {
    let (blogs, next_page) = state.blog_service.list_blogs(query).await?;

    Ok(Json(json!({
        "blogs": blogs,
        "nextPage": next_page
    })))
}

async fn get_trending_blogs(State(state): State<Arc<AppState>>) -> Result<Json<Value>> {
    let blogs = state.blog_service.trending_blogs().await?;

    let rows: Vec<Value> = blogs
        .iter()
        .map(|row| {
            json!({
                "id": row.blog.id,
                "title": row.blog.title,
                "banner": row.blog.banner,
                "publishedAt": row.blog.published_at,
                "author_info": row.author_info,
            })
        })
        .collect();

    Ok(Json(json!(rows)))
}

#[derive(Deserialize)]
struct GetBlogQuery {
    #[serde(default)]
    mode: Option<String>,
    #[serde(default)]
    draft: Option<bool>,
}

async fn get_blog(
    State(state): State<Arc<AppState>>,
    Path(blog_id): Path<String>,
    Query(query): Query<GetBlogQuery>,
) -> Result<Json<Value>> {
    let edit_mode = query.mode.as_deref() == Some("edit");
    let include_draft = query.draft.unwrap_or(false);

    let blog = state
        .blog_service
        .get_blog(&blog_id, edit_mode, include_draft)
        .await?;

    Ok(Json(json!(blog)))
}

async fn create_blog(
    State(state): State<Arc<AppState>>,
    RequiredAuth(user): RequiredAuth,
    Json(request): Json<CreateBlogRequest>,
) -> Result<Json<Value>> {
    state.rate_limits.check(&user)?;

    let blog = state.blog_service.create_or_update(&user, request).await?;

    Ok(Json(json!({ "blogId": blog.id })))
}

async fn like_blog(
    State(state): State<Arc<AppState>>,
    RequiredAuth(user): RequiredAuth,
    Json(request): Json<LikeBlogRequest>,
) -> Result<Json<Value>> {
    let liked = state.blog_service.like_blog(&user.id, request).await?;

    Ok(Json(json!(if liked { "liked blog" } else { "disliked blog" })))
}

#[derive(Deserialize)]
struct DeleteBlogQuery {
    #[serde(rename = "blogId")]
    blog_id: String,
}

async fn delete_blog(
    State(state): State<Arc<AppState>>,
    RequiredAuth(user): RequiredAuth,
    Query(query): Query<DeleteBlogQuery>,
) -> Result<Json<Value>> {
    state.rate_limits.check(&user)?;

    state.blog_service.delete_blog(&user, &query.blog_id).await?;

    Ok(Json(json!("Blog deleted successfully.")))
}
