use std::sync::Arc;

use gatekeep_api::{StaticTokenVerifier, TokenVerifier, app};
use gatekeep_core::UserId;
use gatekeep_store::{IdentityAdmin, InMemoryIdentityStore, RbacAdmin, TracingAuditSink};

#[tokio::main]
async fn main() {
    gatekeep_observability::init();

    let (services, verifier) = build_services().await;
    let router = app::build_app(services, verifier);

    let listener = tokio::net::TcpListener::bind("0.0.0.0:8080")
        .await
        .expect("failed to bind 0.0.0.0:8080");

    tracing::info!("listening on {}", listener.local_addr().unwrap());

    axum::serve(listener, router).await.unwrap();
}

async fn build_services() -> (Arc<app::AppServices>, Arc<dyn TokenVerifier>) {
    #[cfg(feature = "postgres")]
    if let Ok(url) = std::env::var("DATABASE_URL") {
        return build_postgres_services(&url).await;
    }

    build_in_memory_services().await
}

#[cfg(feature = "postgres")]
async fn build_postgres_services(url: &str) -> (Arc<app::AppServices>, Arc<dyn TokenVerifier>) {
    use gatekeep_store::PgIdentityStore;

    let pool = sqlx::PgPool::connect(url)
        .await
        .expect("failed to connect to DATABASE_URL");
    let store = Arc::new(PgIdentityStore::new(pool));

    let services = Arc::new(app::AppServices {
        identity: app::IdentityBackend::Postgres(store.clone()),
        admin: RbacAdmin::new(store, Arc::new(TracingAuditSink)),
    });

    (services, Arc::new(verifier_from_env()))
}

/// Dev wiring: in-memory store seeded with reference data and one admin user
/// reachable through a bearer token.
async fn build_in_memory_services() -> (Arc<app::AppServices>, Arc<dyn TokenVerifier>) {
    let store = Arc::new(InMemoryIdentityStore::new());

    let admin_role = store.seed_role("Admin");
    let editor = store.seed_role("Editor");
    let viewer = store.seed_role("Viewer");

    let rbac_manage = store.seed_permission("rbac:manage");
    let users_read = store.seed_permission("users:read");
    let users_update = store.seed_permission("users:update");
    let holidays_read = store.seed_permission("holidays:read");
    let holidays_create = store.seed_permission("holidays:create");

    for perm in [
        rbac_manage,
        users_read,
        users_update,
        holidays_read,
        holidays_create,
    ] {
        store.link_role_permission(admin_role, perm);
    }
    for perm in [users_read, holidays_read, holidays_create] {
        store.link_role_permission(editor, perm);
    }
    for perm in [users_read, holidays_read] {
        store.link_role_permission(viewer, perm);
    }

    let admin_user = UserId::new();
    store
        .assign_role(admin_user, admin_role)
        .await
        .expect("seeded role must exist");

    let admin_token = std::env::var("GATEKEEP_ADMIN_TOKEN").unwrap_or_else(|_| {
        tracing::warn!("GATEKEEP_ADMIN_TOKEN not set; using insecure dev default");
        "dev-admin".to_string()
    });
    tracing::info!(%admin_user, "in-memory dev wiring: admin token maps to this user");

    let mut verifier = verifier_from_env();
    verifier = verifier.with_token(admin_token, admin_user);

    let services = Arc::new(app::AppServices {
        identity: app::IdentityBackend::InMemory(store.clone()),
        admin: RbacAdmin::new(store, Arc::new(TracingAuditSink)),
    });

    (services, Arc::new(verifier))
}

/// Extra bearer tokens from `GATEKEEP_TOKENS` ("token=user-uuid,token=...").
fn verifier_from_env() -> StaticTokenVerifier {
    let mut verifier = StaticTokenVerifier::default();
    let Ok(raw) = std::env::var("GATEKEEP_TOKENS") else {
        return verifier;
    };

    for pair in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        match pair.split_once('=') {
            Some((token, user)) => match user.parse::<UserId>() {
                Ok(user_id) => {
                    verifier = verifier.with_token(token.to_string(), user_id);
                }
                Err(e) => tracing::warn!(token, error = %e, "skipping malformed GATEKEEP_TOKENS entry"),
            },
            None => tracing::warn!(entry = pair, "skipping malformed GATEKEEP_TOKENS entry"),
        }
    }

    verifier
}
