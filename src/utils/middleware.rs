use crate::{error::AppError, services::auth::AuthUser, state::AppState};
use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::debug;

/// Decodes the Authorization bearer token and attaches the caller to the
/// request. Invalid or missing tokens let the request continue
/// unauthenticated; protected handlers reject via [`RequiredAuth`].
pub async fn auth_middleware(
    State(app_state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut request: Request<Body>,
    next: Next<Body>,
) -> Result<Response, AppError> {
    if let Some(auth_header) = headers.get("authorization") {
        if let Ok(auth_str) = auth_header.to_str() {
            if let Some(token) = auth_str.strip_prefix("Bearer ") {
                match app_state.auth_service.verify_token(token) {
                    Ok(user) => {
                        debug!("Authenticated user: {}", user.id);
                        request.extensions_mut().insert(user);
                    }
                    Err(e) => {
                        debug!("Token verification failed: {}", e);
                    }
                }
            }
        }
    }

    Ok(next.run(request).await)
}

/// Extractor for routes that require an authenticated caller.
pub struct RequiredAuth(pub AuthUser);

#[async_trait::async_trait]
impl<S> axum::extract::FromRequestParts<S> for RequiredAuth
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .map(RequiredAuth)
            .ok_or_else(|| AppError::unauthorized("Unauthorized action."))
    }
}
