//! Operator endpoints: service status and live circuit snapshots.

pub mod handlers;
pub mod auth;

use axum::{
    routing::get,
    Router,
    middleware,
};
use crate::http::server::AppState;
use self::handlers::*;
use self::auth::admin_auth_middleware;

pub fn setup_admin_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/admin/status", get(get_status))
        .route("/admin/circuits", get(get_circuits))
        .layer(middleware::from_fn_with_state(state, admin_auth_middleware))
}
