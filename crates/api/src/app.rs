//! Application wiring: identity backend selection, services, router.

use std::sync::Arc;

use axum::{Extension, Router, middleware};

use gatekeep_authz::{
    AccessRequirement, AuthorizationDecision, EffectivePermissionSet, EngineError, PermissionName,
    PermissionStore, RoleName, RoleStore,
};
use gatekeep_core::{PermissionId, RoleId, UserId};
use gatekeep_store::{InMemoryIdentityStore, RbacAdmin};
#[cfg(feature = "postgres")]
use gatekeep_store::PgIdentityStore;

use crate::guard;
use crate::middleware::{AuthState, TokenVerifier, auth_middleware};
use crate::routes;

/// Identity store backend behind the decision API.
///
/// Each call builds a fresh connection-scoped decision: the in-memory
/// backend borrows the shared store, the Postgres backend checks one pooled
/// connection out for the duration of the decision.
#[derive(Clone)]
pub enum IdentityBackend {
    InMemory(Arc<InMemoryIdentityStore>),
    #[cfg(feature = "postgres")]
    Postgres(Arc<PgIdentityStore>),
}

impl IdentityBackend {
    pub async fn authorize(
        &self,
        user: UserId,
        requirement: &AccessRequirement,
    ) -> Result<bool, EngineError> {
        match self {
            Self::InMemory(store) => {
                AuthorizationDecision::new(store.as_ref())
                    .evaluate(user, requirement)
                    .await
            }
            #[cfg(feature = "postgres")]
            Self::Postgres(store) => {
                let reader = store.reader().await?;
                AuthorizationDecision::new(reader)
                    .evaluate(user, requirement)
                    .await
            }
        }
    }

    pub async fn effective_permissions(
        &self,
        user: UserId,
    ) -> Result<EffectivePermissionSet, EngineError> {
        match self {
            Self::InMemory(store) => {
                AuthorizationDecision::new(store.as_ref())
                    .effective_permissions(user)
                    .await
            }
            #[cfg(feature = "postgres")]
            Self::Postgres(store) => {
                let reader = store.reader().await?;
                AuthorizationDecision::new(reader)
                    .effective_permissions(user)
                    .await
            }
        }
    }

    pub async fn find_role_id(&self, name: &RoleName) -> Result<Option<RoleId>, EngineError> {
        match self {
            Self::InMemory(store) => {
                let mut reader = store.as_ref();
                reader.find_role_id_by_name(name).await
            }
            #[cfg(feature = "postgres")]
            Self::Postgres(store) => {
                let mut reader = store.reader().await?;
                reader.find_role_id_by_name(name).await
            }
        }
    }

    pub async fn find_permission_id(
        &self,
        name: &PermissionName,
    ) -> Result<Option<PermissionId>, EngineError> {
        match self {
            Self::InMemory(store) => {
                let mut reader = store.as_ref();
                reader.find_permission_id_by_name(name).await
            }
            #[cfg(feature = "postgres")]
            Self::Postgres(store) => {
                let mut reader = store.reader().await?;
                reader.find_permission_id_by_name(name).await
            }
        }
    }
}

#[derive(Clone)]
pub struct AppServices {
    pub identity: IdentityBackend,
    pub admin: RbacAdmin,
}

/// Build the full router.
///
/// `/healthz` is open; everything else sits behind the identity middleware,
/// and the admin surface is additionally guarded by the `rbac:manage`
/// permission.
pub fn build_app(services: Arc<AppServices>, verifier: Arc<dyn TokenVerifier>) -> Router {
    let auth_state = AuthState { verifier };

    let manage_rbac = guard::require(
        services.clone(),
        AccessRequirement::any_permission([PermissionName::new("rbac:manage")]),
    );

    let admin = routes::rbac::router()
        .route_layer(middleware::from_fn_with_state(manage_rbac, guard::enforce));

    let protected = Router::new()
        .nest("/admin", admin)
        .merge(routes::system::whoami_router())
        .layer(Extension(services))
        .layer(middleware::from_fn_with_state(auth_state, auth_middleware));

    Router::new()
        .merge(routes::system::health_router())
        .merge(protected)
}
