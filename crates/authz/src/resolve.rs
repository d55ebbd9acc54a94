//! Resolvers: the individual read steps a decision is composed of.

use std::collections::HashSet;

use gatekeep_core::{PermissionId, RoleId, UserId};

use crate::error::EngineError;
use crate::overrides::{OverridePartition, partition_overrides};
use crate::permissions::PermissionName;
use crate::ports::{
    OverrideStore, PermissionStore, RoleAssignmentStore, RolePermissionStore, RoleStore,
};
use crate::roles::RoleName;

/// Ids of all roles currently assigned to the user.
pub async fn assigned_role_ids<R>(
    reader: &mut R,
    user: UserId,
) -> Result<HashSet<RoleId>, EngineError>
where
    R: RoleAssignmentStore + ?Sized,
{
    let ids = reader.role_ids_for_user(user).await?;
    Ok(ids.into_iter().collect())
}

/// Union of the permission ids granted by a set of roles.
pub async fn role_permission_ids<R>(
    reader: &mut R,
    role_ids: &HashSet<RoleId>,
) -> Result<HashSet<PermissionId>, EngineError>
where
    R: RolePermissionStore + ?Sized,
{
    let mut union = HashSet::new();
    for role in role_ids {
        union.extend(reader.permission_ids_for_role(*role).await?);
    }
    Ok(union)
}

/// A user's overrides, partitioned into grant/deny sets.
pub async fn user_override_partition<R>(
    reader: &mut R,
    user: UserId,
) -> Result<OverridePartition, EngineError>
where
    R: OverrideStore + ?Sized,
{
    let rows = reader.overrides_for_user(user).await?;
    partition_overrides(user, &rows)
}

/// Resolve role names to ids. Unresolvable names (unknown or archived) are
/// dropped, not errors: a requirement naming a removed role is simply
/// unsatisfiable through that name.
pub async fn resolve_role_names<R>(
    reader: &mut R,
    names: &[RoleName],
) -> Result<HashSet<RoleId>, EngineError>
where
    R: RoleStore + ?Sized,
{
    let mut ids = HashSet::with_capacity(names.len());
    for name in names {
        match reader.find_role_id_by_name(name).await? {
            Some(id) => {
                ids.insert(id);
            }
            None => {
                tracing::debug!(role = %name, "required role does not resolve; dropped");
            }
        }
    }
    Ok(ids)
}

/// Resolve permission names to ids, dropping unresolvable names (same policy
/// as [`resolve_role_names`]).
pub async fn resolve_permission_names<R>(
    reader: &mut R,
    names: &[PermissionName],
) -> Result<HashSet<PermissionId>, EngineError>
where
    R: PermissionStore + ?Sized,
{
    let mut ids = HashSet::with_capacity(names.len());
    for name in names {
        match reader.find_permission_id_by_name(name).await? {
            Some(id) => {
                ids.insert(id);
            }
            None => {
                tracing::debug!(permission = %name, "required permission does not resolve; dropped");
            }
        }
    }
    Ok(ids)
}
