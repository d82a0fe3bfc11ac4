use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::Response,
};
use crate::http::server::AppState;

/// Require `Authorization: Bearer <admin api key>`.
pub async fn admin_auth_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    if state.admin.api_key.is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    if let Some(token) = auth_header.and_then(|v| v.strip_prefix("Bearer ")) {
        if token == state.admin.api_key {
            return Ok(next.run(request).await);
        }
    }

    tracing::warn!("Rejected admin request with missing or wrong credentials");
    Err(StatusCode::UNAUTHORIZED)
}
