use axum::{Extension, Json, Router, http::StatusCode, response::IntoResponse, routing::get};

use crate::context::CallerContext;

pub fn health_router() -> Router {
    Router::new().route("/healthz", get(healthz))
}

pub fn whoami_router() -> Router {
    Router::new().route("/whoami", get(whoami))
}

async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, Json(serde_json::json!({ "status": "ok" })))
}

/// Echo the authenticated caller; useful for token debugging.
async fn whoami(Extension(caller): Extension<CallerContext>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(serde_json::json!({ "user_id": caller.user_id() })),
    )
}
