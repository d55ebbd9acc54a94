//! Postgres-backed identity store.
//!
//! Read side: [`PgIdentityStore::reader`] acquires **one** pooled connection
//! and wraps it in a [`PgIdentityReader`]; every read of a single
//! authorization decision goes through that handle, and the connection
//! returns to the pool when the handle drops — success or error. Soft-delete
//! filtering (`deleted_at IS NULL`) happens in SQL, at this boundary.
//!
//! Write side: the [`IdentityAdmin`] mutations rely on the schema's unique
//! indexes — `user_roles(user_id, role_id)` and
//! `user_permission_overrides(user_id, permission_id)` — for upsert and
//! duplicate suppression. Schema/DDL ownership stays with migration tooling.

use async_trait::async_trait;
use sqlx::pool::PoolConnection;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use gatekeep_authz::{
    EngineError, OverrideStore, PermissionName, PermissionOverride, PermissionStore,
    RoleAssignmentStore, RoleName, RolePermissionStore, RoleStore,
};
use gatekeep_core::{DomainError, DomainResult, PermissionId, RoleId, UserId};

use crate::admin::IdentityAdmin;

#[derive(Debug, Clone)]
pub struct PgIdentityStore {
    pool: PgPool,
}

impl PgIdentityStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Acquire a connection-scoped reader for one decision.
    pub async fn reader(&self) -> Result<PgIdentityReader, EngineError> {
        let conn = self.pool.acquire().await.map_err(EngineError::store)?;
        Ok(PgIdentityReader { conn })
    }
}

/// One pooled connection serving all reads of a single decision.
pub struct PgIdentityReader {
    conn: PoolConnection<Postgres>,
}

#[async_trait]
impl RoleStore for PgIdentityReader {
    async fn find_role_id_by_name(
        &mut self,
        name: &RoleName,
    ) -> Result<Option<RoleId>, EngineError> {
        let id: Option<Uuid> =
            sqlx::query_scalar("SELECT id FROM roles WHERE name = $1 AND deleted_at IS NULL")
                .bind(name.as_str())
                .fetch_optional(&mut *self.conn)
                .await
                .map_err(EngineError::store)?;
        Ok(id.map(RoleId::from_uuid))
    }
}

#[async_trait]
impl PermissionStore for PgIdentityReader {
    async fn find_permission_id_by_name(
        &mut self,
        name: &PermissionName,
    ) -> Result<Option<PermissionId>, EngineError> {
        let id: Option<Uuid> =
            sqlx::query_scalar("SELECT id FROM permissions WHERE name = $1 AND deleted_at IS NULL")
                .bind(name.as_str())
                .fetch_optional(&mut *self.conn)
                .await
                .map_err(EngineError::store)?;
        Ok(id.map(PermissionId::from_uuid))
    }
}

#[async_trait]
impl RoleAssignmentStore for PgIdentityReader {
    async fn role_ids_for_user(&mut self, user: UserId) -> Result<Vec<RoleId>, EngineError> {
        let ids: Vec<Uuid> =
            sqlx::query_scalar("SELECT role_id FROM user_roles WHERE user_id = $1")
                .bind(user.as_uuid())
                .fetch_all(&mut *self.conn)
                .await
                .map_err(EngineError::store)?;
        Ok(ids.into_iter().map(RoleId::from_uuid).collect())
    }
}

#[async_trait]
impl RolePermissionStore for PgIdentityReader {
    async fn permission_ids_for_role(
        &mut self,
        role: RoleId,
    ) -> Result<Vec<PermissionId>, EngineError> {
        // Archival is enforced transitively here: an archived role yields
        // nothing, archived permissions are joined out.
        let ids: Vec<Uuid> = sqlx::query_scalar(
            "SELECT rp.permission_id \
             FROM role_permissions rp \
             JOIN roles r ON r.id = rp.role_id AND r.deleted_at IS NULL \
             JOIN permissions p ON p.id = rp.permission_id AND p.deleted_at IS NULL \
             WHERE rp.role_id = $1",
        )
        .bind(role.as_uuid())
        .fetch_all(&mut *self.conn)
        .await
        .map_err(EngineError::store)?;
        Ok(ids.into_iter().map(PermissionId::from_uuid).collect())
    }
}

#[async_trait]
impl OverrideStore for PgIdentityReader {
    async fn overrides_for_user(
        &mut self,
        user: UserId,
    ) -> Result<Vec<PermissionOverride>, EngineError> {
        let rows: Vec<(Uuid, bool)> = sqlx::query_as(
            "SELECT permission_id, is_allowed \
             FROM user_permission_overrides WHERE user_id = $1",
        )
        .bind(user.as_uuid())
        .fetch_all(&mut *self.conn)
        .await
        .map_err(EngineError::store)?;

        Ok(rows
            .into_iter()
            .map(|(permission_id, is_allowed)| PermissionOverride {
                permission_id: PermissionId::from_uuid(permission_id),
                is_allowed,
            })
            .collect())
    }
}

/// Map a write-path sqlx error: foreign-key violations become not-found
/// (the referenced role/permission row does not exist), everything else is a
/// store failure.
fn map_write_err(entity: &'static str, err: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db) = &err {
        if db.code().as_deref() == Some("23503") {
            return DomainError::not_found(entity, "referenced row does not exist");
        }
    }
    DomainError::store_failure(entity, err.to_string())
}

#[async_trait]
impl IdentityAdmin for PgIdentityStore {
    async fn assign_role(&self, user: UserId, role: RoleId) -> DomainResult<bool> {
        let result = sqlx::query(
            "INSERT INTO user_roles (user_id, role_id) VALUES ($1, $2) \
             ON CONFLICT (user_id, role_id) DO NOTHING",
        )
        .bind(user.as_uuid())
        .bind(role.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_err("role_assignment", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn remove_role(&self, user: UserId, role: RoleId) -> DomainResult<bool> {
        let result = sqlx::query("DELETE FROM user_roles WHERE user_id = $1 AND role_id = $2")
            .bind(user.as_uuid())
            .bind(role.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| map_write_err("role_assignment", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn set_override(
        &self,
        user: UserId,
        permission: PermissionId,
        is_allowed: bool,
    ) -> DomainResult<()> {
        sqlx::query(
            "INSERT INTO user_permission_overrides (user_id, permission_id, is_allowed) \
             VALUES ($1, $2, $3) \
             ON CONFLICT (user_id, permission_id) DO UPDATE SET is_allowed = EXCLUDED.is_allowed",
        )
        .bind(user.as_uuid())
        .bind(permission.as_uuid())
        .bind(is_allowed)
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_err("permission_override", e))?;
        Ok(())
    }

    async fn remove_override(&self, user: UserId, permission: PermissionId) -> DomainResult<bool> {
        let result = sqlx::query(
            "DELETE FROM user_permission_overrides WHERE user_id = $1 AND permission_id = $2",
        )
        .bind(user.as_uuid())
        .bind(permission.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_err("permission_override", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn replace_overrides(
        &self,
        user: UserId,
        overrides: Vec<PermissionOverride>,
    ) -> DomainResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_write_err("permission_override", e))?;

        // Full wipe, then reinsert, atomically.
        sqlx::query("DELETE FROM user_permission_overrides WHERE user_id = $1")
            .bind(user.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_write_err("permission_override", e))?;

        for row in &overrides {
            sqlx::query(
                "INSERT INTO user_permission_overrides (user_id, permission_id, is_allowed) \
                 VALUES ($1, $2, $3)",
            )
            .bind(user.as_uuid())
            .bind(row.permission_id.as_uuid())
            .bind(row.is_allowed)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_write_err("permission_override", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| map_write_err("permission_override", e))?;
        Ok(())
    }
}
