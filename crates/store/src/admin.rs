//! Runtime mutation of RBAC state: role assignments and overrides.
//!
//! Roles, permissions and their links are reference data and have no write
//! path here. Every mutation that goes through [`RbacAdmin`] leaves an audit
//! event behind.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use gatekeep_authz::PermissionOverride;
use gatekeep_core::{DomainResult, PermissionId, RoleId, UserId};

use crate::audit::{AuditEvent, AuditSink};

/// Mutation port implemented by each identity store backend.
///
/// `assign_role`/`remove_role` return whether anything changed (the unique
/// (user, role) pair makes duplicates no-ops). `set_override` is an upsert:
/// writing an existing (user, permission) pair replaces `is_allowed`.
/// `replace_overrides` wipes all of the user's overrides before inserting.
#[async_trait]
pub trait IdentityAdmin: Send + Sync {
    async fn assign_role(&self, user: UserId, role: RoleId) -> DomainResult<bool>;

    async fn remove_role(&self, user: UserId, role: RoleId) -> DomainResult<bool>;

    async fn set_override(
        &self,
        user: UserId,
        permission: PermissionId,
        is_allowed: bool,
    ) -> DomainResult<()>;

    async fn remove_override(&self, user: UserId, permission: PermissionId) -> DomainResult<bool>;

    async fn replace_overrides(
        &self,
        user: UserId,
        overrides: Vec<PermissionOverride>,
    ) -> DomainResult<()>;
}

/// Administrative service: store mutation plus audit recording.
///
/// `actor` is the authenticated administrator performing the change, recorded
/// as `who` on the audit event.
#[derive(Clone)]
pub struct RbacAdmin {
    store: Arc<dyn IdentityAdmin>,
    audit: Arc<dyn AuditSink>,
}

impl RbacAdmin {
    pub fn new(store: Arc<dyn IdentityAdmin>, audit: Arc<dyn AuditSink>) -> Self {
        Self { store, audit }
    }

    pub async fn assign_role(
        &self,
        actor: UserId,
        user: UserId,
        role: RoleId,
    ) -> DomainResult<bool> {
        let changed = self.store.assign_role(user, role).await?;
        if changed {
            self.audit.record(AuditEvent::new(
                "role.assign",
                "role_assignment",
                actor,
                json!({ "user_id": user, "role_id": role }),
            ));
        }
        Ok(changed)
    }

    pub async fn remove_role(
        &self,
        actor: UserId,
        user: UserId,
        role: RoleId,
    ) -> DomainResult<bool> {
        let changed = self.store.remove_role(user, role).await?;
        if changed {
            self.audit.record(AuditEvent::new(
                "role.remove",
                "role_assignment",
                actor,
                json!({ "user_id": user, "role_id": role }),
            ));
        }
        Ok(changed)
    }

    /// Grant or deny a single permission (upsert).
    pub async fn set_override(
        &self,
        actor: UserId,
        user: UserId,
        permission: PermissionId,
        is_allowed: bool,
    ) -> DomainResult<()> {
        self.store.set_override(user, permission, is_allowed).await?;
        self.audit.record(AuditEvent::new(
            if is_allowed {
                "override.grant"
            } else {
                "override.deny"
            },
            "permission_override",
            actor,
            json!({ "user_id": user, "permission_id": permission, "is_allowed": is_allowed }),
        ));
        Ok(())
    }

    pub async fn remove_override(
        &self,
        actor: UserId,
        user: UserId,
        permission: PermissionId,
    ) -> DomainResult<bool> {
        let changed = self.store.remove_override(user, permission).await?;
        if changed {
            self.audit.record(AuditEvent::new(
                "override.remove",
                "permission_override",
                actor,
                json!({ "user_id": user, "permission_id": permission }),
            ));
        }
        Ok(changed)
    }

    /// Replace the user's overrides wholesale (full wipe, then insert).
    pub async fn replace_overrides(
        &self,
        actor: UserId,
        user: UserId,
        overrides: Vec<PermissionOverride>,
    ) -> DomainResult<()> {
        self.store.replace_overrides(user, overrides.clone()).await?;
        self.audit.record(AuditEvent::new(
            "override.replace",
            "permission_override",
            actor,
            json!({ "user_id": user, "overrides": overrides }),
        ));
        Ok(())
    }
}
