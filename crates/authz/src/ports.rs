//! Read ports through which the engine reaches identity data.
//!
//! A port handle represents **one scoped store connection**: methods take
//! `&mut self` so a single handle (e.g. a pooled database connection) serves
//! all reads of one decision and is released when the handle drops, on every
//! exit path. The engine never writes.

use async_trait::async_trait;

use gatekeep_core::{PermissionId, RoleId, UserId};

use crate::error::EngineError;
use crate::overrides::PermissionOverride;
use crate::permissions::PermissionName;
use crate::roles::RoleName;

/// Role lookup by unique name, excluding soft-deleted rows.
#[async_trait]
pub trait RoleStore: Send {
    async fn find_role_id_by_name(
        &mut self,
        name: &RoleName,
    ) -> Result<Option<RoleId>, EngineError>;
}

/// Permission lookup by unique name, excluding soft-deleted rows.
#[async_trait]
pub trait PermissionStore: Send {
    async fn find_permission_id_by_name(
        &mut self,
        name: &PermissionName,
    ) -> Result<Option<PermissionId>, EngineError>;
}

/// User → assigned role ids. No soft-delete filter: assignment rows carry no
/// deleted state, and archived roles are filtered where they matter (name
/// resolution and permission expansion).
#[async_trait]
pub trait RoleAssignmentStore: Send {
    async fn role_ids_for_user(&mut self, user: UserId) -> Result<Vec<RoleId>, EngineError>;
}

/// Role → granted permission ids.
///
/// Adapters enforce archival transitively here: a soft-deleted role yields
/// nothing, and soft-deleted permissions are excluded from the expansion.
#[async_trait]
pub trait RolePermissionStore: Send {
    async fn permission_ids_for_role(
        &mut self,
        role: RoleId,
    ) -> Result<Vec<PermissionId>, EngineError>;
}

/// User → override rows (both grants and denials; callers partition them).
#[async_trait]
pub trait OverrideStore: Send {
    async fn overrides_for_user(
        &mut self,
        user: UserId,
    ) -> Result<Vec<PermissionOverride>, EngineError>;
}

/// Everything a full authorization decision needs, behind one handle.
pub trait IdentityReader:
    RoleStore + PermissionStore + RoleAssignmentStore + RolePermissionStore + OverrideStore
{
}

impl<T> IdentityReader for T where
    T: RoleStore + PermissionStore + RoleAssignmentStore + RolePermissionStore + OverrideStore
{
}
