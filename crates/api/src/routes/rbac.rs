//! Administrative RBAC endpoints: role assignment, overrides, inspection.
//!
//! All routes here are mounted behind the `rbac:manage` guard. Mutations go
//! through [`gatekeep_store::RbacAdmin`], so each leaves an audit event.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
};
use serde::Deserialize;

use gatekeep_authz::{AccessRequirement, PermissionName, PermissionOverride, RoleName};
use gatekeep_core::{PermissionId, RoleId, UserId};

use crate::app::AppServices;
use crate::context::CallerContext;
use crate::errors;

// ─────────────────────────────────────────────────────────────────────────────
// Payloads
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AssignRoleBody {
    pub role: String,
}

#[derive(Debug, Deserialize)]
pub struct OverrideBody {
    pub permission: String,
    pub is_allowed: bool,
}

#[derive(Debug, Deserialize)]
pub struct ReplaceOverridesBody {
    pub overrides: Vec<OverrideBody>,
}

#[derive(Debug, Deserialize)]
pub struct AccessQuery {
    /// Comma-separated permission names.
    pub permissions: Option<String>,
    /// Comma-separated role names.
    pub roles: Option<String>,
    /// "all" for all-of permission matching; anything else means any-of.
    #[serde(rename = "match")]
    pub mode: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Router
// ─────────────────────────────────────────────────────────────────────────────

pub fn router() -> Router {
    Router::new()
        .route("/users/:user_id/roles", post(assign_role))
        .route("/users/:user_id/roles/:role", delete(remove_role))
        .route("/users/:user_id/overrides", put(put_override))
        .route(
            "/users/:user_id/overrides/replace",
            post(replace_overrides),
        )
        .route(
            "/users/:user_id/overrides/:permission",
            delete(delete_override),
        )
        .route("/users/:user_id/permissions", get(effective_permissions))
        .route("/users/:user_id/access", get(access_probe))
}

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

fn parse_user_id(raw: &str) -> Result<UserId, axum::response::Response> {
    raw.parse::<UserId>()
        .map_err(|e| errors::domain_error_to_response(&e))
}

async fn resolve_role(
    services: &AppServices,
    name: &str,
) -> Result<RoleId, axum::response::Response> {
    match services
        .identity
        .find_role_id(&RoleName::new(name.to_string()))
        .await
    {
        Ok(Some(id)) => Ok(id),
        Ok(None) => Err(errors::json_error(
            StatusCode::NOT_FOUND,
            "not_found",
            format!("no role named '{name}'"),
        )),
        Err(e) => Err(errors::engine_error_to_response(&e)),
    }
}

async fn resolve_permission(
    services: &AppServices,
    name: &str,
) -> Result<PermissionId, axum::response::Response> {
    match services
        .identity
        .find_permission_id(&PermissionName::new(name.to_string()))
        .await
    {
        Ok(Some(id)) => Ok(id),
        Ok(None) => Err(errors::json_error(
            StatusCode::NOT_FOUND,
            "not_found",
            format!("no permission named '{name}'"),
        )),
        Err(e) => Err(errors::engine_error_to_response(&e)),
    }
}

fn split_csv(raw: &Option<String>) -> Vec<String> {
    raw.as_deref()
        .unwrap_or("")
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// POST /admin/users/:user_id/roles — assign a role by name.
pub async fn assign_role(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Path(user_id): Path<String>,
    Json(body): Json<AssignRoleBody>,
) -> axum::response::Response {
    let user = match parse_user_id(&user_id) {
        Ok(u) => u,
        Err(res) => return res,
    };
    let role = match resolve_role(&services, &body.role).await {
        Ok(r) => r,
        Err(res) => return res,
    };

    match services.admin.assign_role(caller.user_id(), user, role).await {
        Ok(assigned) => (
            StatusCode::OK,
            Json(serde_json::json!({ "assigned": assigned })),
        )
            .into_response(),
        Err(e) => errors::domain_error_to_response(&e),
    }
}

/// DELETE /admin/users/:user_id/roles/:role — remove a role assignment.
pub async fn remove_role(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Path((user_id, role_name)): Path<(String, String)>,
) -> axum::response::Response {
    let user = match parse_user_id(&user_id) {
        Ok(u) => u,
        Err(res) => return res,
    };
    let role = match resolve_role(&services, &role_name).await {
        Ok(r) => r,
        Err(res) => return res,
    };

    match services.admin.remove_role(caller.user_id(), user, role).await {
        Ok(removed) => (
            StatusCode::OK,
            Json(serde_json::json!({ "removed": removed })),
        )
            .into_response(),
        Err(e) => errors::domain_error_to_response(&e),
    }
}

/// PUT /admin/users/:user_id/overrides — grant or deny one permission
/// (upsert: a repeated write replaces the stored polarity).
pub async fn put_override(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Path(user_id): Path<String>,
    Json(body): Json<OverrideBody>,
) -> axum::response::Response {
    let user = match parse_user_id(&user_id) {
        Ok(u) => u,
        Err(res) => return res,
    };
    let permission = match resolve_permission(&services, &body.permission).await {
        Ok(p) => p,
        Err(res) => return res,
    };

    match services
        .admin
        .set_override(caller.user_id(), user, permission, body.is_allowed)
        .await
    {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::domain_error_to_response(&e),
    }
}

/// DELETE /admin/users/:user_id/overrides/:permission — drop one override.
pub async fn delete_override(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Path((user_id, permission_name)): Path<(String, String)>,
) -> axum::response::Response {
    let user = match parse_user_id(&user_id) {
        Ok(u) => u,
        Err(res) => return res,
    };
    let permission = match resolve_permission(&services, &permission_name).await {
        Ok(p) => p,
        Err(res) => return res,
    };

    match services
        .admin
        .remove_override(caller.user_id(), user, permission)
        .await
    {
        Ok(removed) => (
            StatusCode::OK,
            Json(serde_json::json!({ "removed": removed })),
        )
            .into_response(),
        Err(e) => errors::domain_error_to_response(&e),
    }
}

/// POST /admin/users/:user_id/overrides/replace — replace the user's
/// overrides wholesale. This wipes *all* existing overrides for the user
/// first, including pairs not mentioned in the payload.
pub async fn replace_overrides(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Path(user_id): Path<String>,
    Json(body): Json<ReplaceOverridesBody>,
) -> axum::response::Response {
    let user = match parse_user_id(&user_id) {
        Ok(u) => u,
        Err(res) => return res,
    };

    let mut rows = Vec::with_capacity(body.overrides.len());
    for entry in &body.overrides {
        let permission = match resolve_permission(&services, &entry.permission).await {
            Ok(p) => p,
            Err(res) => return res,
        };
        rows.push(PermissionOverride {
            permission_id: permission,
            is_allowed: entry.is_allowed,
        });
    }

    match services
        .admin
        .replace_overrides(caller.user_id(), user, rows)
        .await
    {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::domain_error_to_response(&e),
    }
}

/// GET /admin/users/:user_id/permissions — effective set breakdown.
pub async fn effective_permissions(
    Extension(services): Extension<Arc<AppServices>>,
    Path(user_id): Path<String>,
) -> axum::response::Response {
    let user = match parse_user_id(&user_id) {
        Ok(u) => u,
        Err(res) => return res,
    };

    match services.identity.effective_permissions(user).await {
        Ok(set) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "effective": set.effective(),
                "breakdown": set,
            })),
        )
            .into_response(),
        Err(e) => errors::engine_error_to_response(&e),
    }
}

/// GET /admin/users/:user_id/access?permissions=a,b&roles=r&match=all —
/// probe a would-be decision for a user.
pub async fn access_probe(
    Extension(services): Extension<Arc<AppServices>>,
    Path(user_id): Path<String>,
    Query(query): Query<AccessQuery>,
) -> axum::response::Response {
    let user = match parse_user_id(&user_id) {
        Ok(u) => u,
        Err(res) => return res,
    };

    let requirement = AccessRequirement {
        roles: split_csv(&query.roles).into_iter().map(RoleName::from).collect(),
        permissions: split_csv(&query.permissions)
            .into_iter()
            .map(PermissionName::from)
            .collect(),
        match_all: query.mode.as_deref() == Some("all"),
    };

    if requirement.is_empty() {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            "at least one role or permission is required",
        );
    }

    match services.identity.authorize(user, &requirement).await {
        Ok(allowed) => (
            StatusCode::OK,
            Json(serde_json::json!({ "allowed": allowed })),
        )
            .into_response(),
        Err(e) => errors::engine_error_to_response(&e),
    }
}
