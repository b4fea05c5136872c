use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};

use crate::state::AppState;

/// Domain routing lives in the surrounding application; this crate only
/// exposes a health check.
pub fn main_router(ctx_state: &Arc<AppState>) -> Router {
    Router::new()
        .route("/hc", get(get_hc))
        .with_state(ctx_state.clone())
}

async fn get_hc() -> Response {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    (StatusCode::OK, format!("v{}", VERSION)).into_response()
}
