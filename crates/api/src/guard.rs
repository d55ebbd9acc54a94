//! Per-route policy enforcement point.
//!
//! Routes attach a statically constructed [`AccessRequirement`] at
//! registration time via [`require`]; no runtime metadata lookup. A route
//! without a guard layer is simply not restricted.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;

use gatekeep_authz::AccessRequirement;

use crate::app::AppServices;
use crate::context::CallerContext;
use crate::errors;

#[derive(Clone)]
pub struct GuardState {
    pub services: Arc<AppServices>,
    pub requirement: Arc<AccessRequirement>,
}

/// Build the guard state for `route_layer(from_fn_with_state(..., enforce))`.
pub fn require(services: Arc<AppServices>, requirement: AccessRequirement) -> GuardState {
    GuardState {
        services,
        requirement: Arc::new(requirement),
    }
}

pub async fn enforce(
    State(state): State<GuardState>,
    req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    // An empty requirement restricts nothing; skip the store entirely.
    if state.requirement.is_empty() {
        return next.run(req).await;
    }

    let Some(caller) = req.extensions().get::<CallerContext>().copied() else {
        return errors::json_error(
            StatusCode::UNAUTHORIZED,
            "unauthenticated",
            "missing caller identity",
        );
    };

    match state
        .services
        .identity
        .authorize(caller.user_id(), &state.requirement)
        .await
    {
        Ok(true) => next.run(req).await,
        Ok(false) => forbidden(&state.requirement),
        Err(err) => {
            // Fail closed: an unanswerable check is a server error, never an
            // allow and never a clean 403.
            errors::engine_error_to_response(&err)
        }
    }
}

fn forbidden(requirement: &AccessRequirement) -> Response {
    (
        StatusCode::FORBIDDEN,
        axum::Json(json!({
            "error": "forbidden",
            "message": "caller does not satisfy the route requirement",
            "required_roles": requirement.roles,
            "required_permissions": requirement.permissions,
            "match_all": requirement.match_all,
        })),
    )
        .into_response()
}
