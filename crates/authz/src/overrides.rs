use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use gatekeep_core::{PermissionId, UserId};

use crate::error::EngineError;

/// A per-user permission override row: grant (`is_allowed = true`) or deny.
///
/// At most one row exists per (user, permission); writing a new override for
/// an existing pair replaces `is_allowed`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionOverride {
    pub permission_id: PermissionId,
    pub is_allowed: bool,
}

impl PermissionOverride {
    pub fn grant(permission_id: PermissionId) -> Self {
        Self {
            permission_id,
            is_allowed: true,
        }
    }

    pub fn deny(permission_id: PermissionId) -> Self {
        Self {
            permission_id,
            is_allowed: false,
        }
    }
}

/// A user's overrides split by polarity. Disjoint by construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverridePartition {
    pub granted: HashSet<PermissionId>,
    pub denied: HashSet<PermissionId>,
}

/// Partition override rows into grant and deny sets.
///
/// The unique (user, permission) index guarantees at most one row per pair;
/// seeing both polarities for one permission indicates a storage bug and is
/// reported as an error instead of silently resolved (see [`EngineError`]).
pub fn partition_overrides(
    user: UserId,
    rows: &[PermissionOverride],
) -> Result<OverridePartition, EngineError> {
    let mut partition = OverridePartition::default();

    for row in rows {
        let (into, other) = if row.is_allowed {
            (&mut partition.granted, &partition.denied)
        } else {
            (&mut partition.denied, &partition.granted)
        };

        if other.contains(&row.permission_id) {
            return Err(EngineError::ConflictingOverride {
                user,
                permission: row.permission_id,
            });
        }
        into.insert(row.permission_id);
    }

    Ok(partition)
}
