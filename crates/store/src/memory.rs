//! In-memory identity store for dev and tests.
//!
//! Mirrors the five relational tables (roles, permissions, role_permissions,
//! user_roles, user_permission_overrides) including their uniqueness rules:
//! link tables are sets keyed by the pair, overrides a map keyed by
//! (user, permission) whose value is `is_allowed`.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use gatekeep_authz::{
    EngineError, OverrideStore, PermissionName, PermissionOverride, PermissionRecord,
    PermissionStore, RoleAssignmentStore, RoleName, RolePermissionStore, RoleRecord, RoleStore,
};
use gatekeep_core::{DomainError, DomainResult, PermissionId, RoleId, UserId};

use crate::admin::IdentityAdmin;

#[derive(Debug, Default)]
struct Tables {
    roles: HashMap<RoleId, RoleRecord>,
    permissions: HashMap<PermissionId, PermissionRecord>,
    role_permissions: HashSet<(RoleId, PermissionId)>,
    assignments: HashSet<(UserId, RoleId)>,
    overrides: HashMap<(UserId, PermissionId), bool>,
}

#[derive(Debug, Default)]
pub struct InMemoryIdentityStore {
    inner: RwLock<Tables>,
}

impl InMemoryIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Tables>, EngineError> {
        self.inner
            .read()
            .map_err(|_| EngineError::store(anyhow::anyhow!("identity store lock poisoned")))
    }

    fn write(&self) -> DomainResult<std::sync::RwLockWriteGuard<'_, Tables>> {
        self.inner
            .write()
            .map_err(|_| DomainError::store_failure("identity_store", "lock poisoned"))
    }

    // Seed helpers: model the external seed/migration mechanism. Reference
    // data only; the engine never calls these.

    pub fn seed_role(&self, name: impl Into<String>) -> RoleId {
        let record = RoleRecord::new(RoleId::new(), name);
        let id = record.id;
        self.upsert_role(record);
        id
    }

    pub fn seed_permission(&self, name: impl Into<String>) -> PermissionId {
        let record = PermissionRecord::new(PermissionId::new(), name);
        let id = record.id;
        self.upsert_permission(record);
        id
    }

    pub fn upsert_role(&self, record: RoleRecord) {
        if let Ok(mut tables) = self.inner.write() {
            tables.roles.insert(record.id, record);
        }
    }

    pub fn upsert_permission(&self, record: PermissionRecord) {
        if let Ok(mut tables) = self.inner.write() {
            tables.permissions.insert(record.id, record);
        }
    }

    pub fn link_role_permission(&self, role: RoleId, permission: PermissionId) {
        if let Ok(mut tables) = self.inner.write() {
            tables.role_permissions.insert((role, permission));
        }
    }

    /// Soft-delete a role. Returns false if the role does not exist.
    pub fn archive_role(&self, role: RoleId, at: DateTime<Utc>) -> bool {
        match self.inner.write() {
            Ok(mut tables) => match tables.roles.get_mut(&role) {
                Some(record) => {
                    record.deleted_at = Some(at);
                    true
                }
                None => false,
            },
            Err(_) => false,
        }
    }

    /// Soft-delete a permission. Returns false if the permission does not exist.
    pub fn archive_permission(&self, permission: PermissionId, at: DateTime<Utc>) -> bool {
        match self.inner.write() {
            Ok(mut tables) => match tables.permissions.get_mut(&permission) {
                Some(record) => {
                    record.deleted_at = Some(at);
                    true
                }
                None => false,
            },
            Err(_) => false,
        }
    }
}

// Read ports are implemented for `&InMemoryIdentityStore` so one shared store
// can hand out any number of concurrent reader handles.

#[async_trait]
impl RoleStore for &InMemoryIdentityStore {
    async fn find_role_id_by_name(
        &mut self,
        name: &RoleName,
    ) -> Result<Option<RoleId>, EngineError> {
        let tables = self.read()?;
        Ok(tables
            .roles
            .values()
            .find(|r| r.is_active() && r.name == name.as_str())
            .map(|r| r.id))
    }
}

#[async_trait]
impl PermissionStore for &InMemoryIdentityStore {
    async fn find_permission_id_by_name(
        &mut self,
        name: &PermissionName,
    ) -> Result<Option<PermissionId>, EngineError> {
        let tables = self.read()?;
        Ok(tables
            .permissions
            .values()
            .find(|p| p.is_active() && p.name == name.as_str())
            .map(|p| p.id))
    }
}

#[async_trait]
impl RoleAssignmentStore for &InMemoryIdentityStore {
    async fn role_ids_for_user(&mut self, user: UserId) -> Result<Vec<RoleId>, EngineError> {
        let tables = self.read()?;
        Ok(tables
            .assignments
            .iter()
            .filter(|(u, _)| *u == user)
            .map(|(_, r)| *r)
            .collect())
    }
}

#[async_trait]
impl RolePermissionStore for &InMemoryIdentityStore {
    async fn permission_ids_for_role(
        &mut self,
        role: RoleId,
    ) -> Result<Vec<PermissionId>, EngineError> {
        let tables = self.read()?;

        // Archival is enforced transitively at this boundary: an archived
        // role contributes nothing, archived permissions are excluded.
        if !tables.roles.get(&role).is_some_and(RoleRecord::is_active) {
            return Ok(Vec::new());
        }

        Ok(tables
            .role_permissions
            .iter()
            .filter(|(r, p)| {
                *r == role
                    && tables
                        .permissions
                        .get(p)
                        .is_some_and(PermissionRecord::is_active)
            })
            .map(|(_, p)| *p)
            .collect())
    }
}

#[async_trait]
impl OverrideStore for &InMemoryIdentityStore {
    async fn overrides_for_user(
        &mut self,
        user: UserId,
    ) -> Result<Vec<PermissionOverride>, EngineError> {
        let tables = self.read()?;
        Ok(tables
            .overrides
            .iter()
            .filter(|((u, _), _)| *u == user)
            .map(|((_, p), is_allowed)| PermissionOverride {
                permission_id: *p,
                is_allowed: *is_allowed,
            })
            .collect())
    }
}

#[async_trait]
impl IdentityAdmin for InMemoryIdentityStore {
    async fn assign_role(&self, user: UserId, role: RoleId) -> DomainResult<bool> {
        let mut tables = self.write()?;
        if !tables.roles.contains_key(&role) {
            return Err(DomainError::not_found("role", format!("no role {role}")));
        }
        Ok(tables.assignments.insert((user, role)))
    }

    async fn remove_role(&self, user: UserId, role: RoleId) -> DomainResult<bool> {
        let mut tables = self.write()?;
        Ok(tables.assignments.remove(&(user, role)))
    }

    async fn set_override(
        &self,
        user: UserId,
        permission: PermissionId,
        is_allowed: bool,
    ) -> DomainResult<()> {
        let mut tables = self.write()?;
        if !tables.permissions.contains_key(&permission) {
            return Err(DomainError::not_found(
                "permission",
                format!("no permission {permission}"),
            ));
        }
        // Upsert: a second write for the same pair replaces is_allowed, so
        // grant and deny can never coexist.
        tables.overrides.insert((user, permission), is_allowed);
        Ok(())
    }

    async fn remove_override(&self, user: UserId, permission: PermissionId) -> DomainResult<bool> {
        let mut tables = self.write()?;
        Ok(tables.overrides.remove(&(user, permission)).is_some())
    }

    async fn replace_overrides(
        &self,
        user: UserId,
        overrides: Vec<PermissionOverride>,
    ) -> DomainResult<()> {
        let mut tables = self.write()?;
        for row in &overrides {
            if !tables.permissions.contains_key(&row.permission_id) {
                return Err(DomainError::not_found(
                    "permission",
                    format!("no permission {}", row.permission_id),
                ));
            }
        }
        // Full wipe, then reinsert: replace clears *all* of the user's
        // overrides, not just the pairs being written.
        tables.overrides.retain(|(u, _), _| *u != user);
        for row in overrides {
            tables.overrides.insert((user, row.permission_id), row.is_allowed);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gatekeep_authz::AuthorizationDecision;

    #[tokio::test]
    async fn archived_rows_do_not_resolve_by_name() {
        let store = InMemoryIdentityStore::new();
        let role = store.seed_role("Admin");
        let perm = store.seed_permission("roles:create");

        let mut reader = &store;
        assert!(
            reader
                .find_role_id_by_name(&RoleName::new("Admin"))
                .await
                .unwrap()
                .is_some()
        );

        store.archive_role(role, Utc::now());
        store.archive_permission(perm, Utc::now());

        assert!(
            reader
                .find_role_id_by_name(&RoleName::new("Admin"))
                .await
                .unwrap()
                .is_none()
        );
        assert!(
            reader
                .find_permission_id_by_name(&PermissionName::new("roles:create"))
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn archived_role_stops_contributing_permissions() {
        let store = InMemoryIdentityStore::new();
        let role = store.seed_role("Editor");
        let perm = store.seed_permission("holidays:read");
        store.link_role_permission(role, perm);

        let mut reader = &store;
        assert_eq!(
            reader.permission_ids_for_role(role).await.unwrap(),
            vec![perm]
        );

        store.archive_role(role, Utc::now());
        assert!(reader.permission_ids_for_role(role).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn archived_permission_is_excluded_from_expansion() {
        let store = InMemoryIdentityStore::new();
        let role = store.seed_role("Editor");
        let keep = store.seed_permission("holidays:read");
        let gone = store.seed_permission("holidays:archive");
        store.link_role_permission(role, keep);
        store.link_role_permission(role, gone);

        store.archive_permission(gone, Utc::now());

        let mut reader = &store;
        assert_eq!(
            reader.permission_ids_for_role(role).await.unwrap(),
            vec![keep]
        );
    }

    #[tokio::test]
    async fn override_upsert_replaces_polarity() {
        let store = InMemoryIdentityStore::new();
        let perm = store.seed_permission("users:read");
        let user = UserId::new();

        store.set_override(user, perm, true).await.unwrap();
        store.set_override(user, perm, false).await.unwrap();

        let mut reader = &store;
        let rows = reader.overrides_for_user(user).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert!(!rows[0].is_allowed);
    }

    #[tokio::test]
    async fn replace_wipes_unrelated_overrides() {
        let store = InMemoryIdentityStore::new();
        let a = store.seed_permission("users:read");
        let b = store.seed_permission("users:update");
        let c = store.seed_permission("users:delete");
        let user = UserId::new();

        store.set_override(user, a, true).await.unwrap();
        store.set_override(user, b, false).await.unwrap();

        store
            .replace_overrides(user, vec![PermissionOverride::grant(c)])
            .await
            .unwrap();

        let mut reader = &store;
        let rows = reader.overrides_for_user(user).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].permission_id, c);
    }

    #[tokio::test]
    async fn assigning_an_unknown_role_is_not_found() {
        let store = InMemoryIdentityStore::new();
        let err = store
            .assign_role(UserId::new(), RoleId::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), gatekeep_core::ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn duplicate_assignment_is_a_no_op() {
        let store = InMemoryIdentityStore::new();
        let role = store.seed_role("Viewer");
        let user = UserId::new();

        assert!(store.assign_role(user, role).await.unwrap());
        assert!(!store.assign_role(user, role).await.unwrap());

        let mut decision = AuthorizationDecision::new(&store);
        let roles = decision
            .effective_permissions(user)
            .await
            .unwrap()
            .role_ids;
        assert_eq!(roles.len(), 1);
    }
}
