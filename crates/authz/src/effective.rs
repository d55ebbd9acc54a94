//! Effective permission calculation.
//!
//! `effective = (role_derived ∪ granted) \ denied` — union first, then
//! subtract, so a denial always beats a simultaneous role grant. No other
//! precedence rule exists.

use std::collections::HashSet;

use serde::Serialize;

use gatekeep_core::{PermissionId, RoleId, UserId};

use crate::error::EngineError;
use crate::overrides::OverridePartition;
use crate::ports::IdentityReader;
use crate::resolve;

/// Breakdown of a user's permission sources, plus the combined result.
///
/// Kept as sets rather than a single boolean so callers (admin inspection
/// endpoints, tests) can show *why* a permission is or is not effective.
#[derive(Debug, Clone, Serialize)]
pub struct EffectivePermissionSet {
    pub role_ids: HashSet<RoleId>,
    pub role_derived: HashSet<PermissionId>,
    pub granted: HashSet<PermissionId>,
    pub denied: HashSet<PermissionId>,
}

impl EffectivePermissionSet {
    /// The combined effective set.
    pub fn effective(&self) -> HashSet<PermissionId> {
        combine(
            &self.role_derived,
            &OverridePartition {
                granted: self.granted.clone(),
                denied: self.denied.clone(),
            },
        )
    }

    /// Membership test without materializing the combined set.
    pub fn is_effective(&self, permission: PermissionId) -> bool {
        !self.denied.contains(&permission)
            && (self.role_derived.contains(&permission) || self.granted.contains(&permission))
    }
}

/// Pure combination step: `(role_derived ∪ granted) \ denied`.
pub fn combine(
    role_derived: &HashSet<PermissionId>,
    overrides: &OverridePartition,
) -> HashSet<PermissionId> {
    role_derived
        .union(&overrides.granted)
        .filter(|id| !overrides.denied.contains(id))
        .copied()
        .collect()
}

/// Compute the effective permission set for a user.
///
/// Pure function of the current role assignments, role-permission links and
/// override rows: no hidden state, no caching across calls.
pub async fn effective_permissions<R>(
    reader: &mut R,
    user: UserId,
) -> Result<EffectivePermissionSet, EngineError>
where
    R: IdentityReader + ?Sized,
{
    let role_ids = resolve::assigned_role_ids(reader, user).await?;
    let role_derived = resolve::role_permission_ids(reader, &role_ids).await?;
    let overrides = resolve::user_override_partition(reader, user).await?;

    tracing::debug!(
        %user,
        roles = role_ids.len(),
        role_derived = role_derived.len(),
        granted = overrides.granted.len(),
        denied = overrides.denied.len(),
        "effective permission set resolved"
    );

    Ok(EffectivePermissionSet {
        role_ids,
        role_derived,
        granted: overrides.granted,
        denied: overrides.denied,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn set_of(ids: &[PermissionId]) -> HashSet<PermissionId> {
        ids.iter().copied().collect()
    }

    #[test]
    fn deny_beats_simultaneous_role_grant() {
        let p = PermissionId::new();
        let overrides = OverridePartition {
            granted: HashSet::new(),
            denied: set_of(&[p]),
        };

        assert!(!combine(&set_of(&[p]), &overrides).contains(&p));
    }

    #[test]
    fn grant_is_additive_without_role_backing() {
        let p = PermissionId::new();
        let overrides = OverridePartition {
            granted: set_of(&[p]),
            denied: HashSet::new(),
        };

        assert!(combine(&HashSet::new(), &overrides).contains(&p));
    }

    fn id_pool() -> Vec<PermissionId> {
        (0..8).map(|_| PermissionId::new()).collect()
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: a denied permission is never effective, and every
        /// effective permission traces back to a role grant or an override
        /// grant.
        #[test]
        fn combine_respects_sources_and_denials(
            role_picks in prop::collection::vec(0usize..8, 0..8),
            grant_picks in prop::collection::vec(0usize..8, 0..8),
            deny_picks in prop::collection::vec(0usize..8, 0..8),
        ) {
            let pool = id_pool();
            let role_derived: HashSet<_> = role_picks.iter().map(|i| pool[*i]).collect();
            let granted: HashSet<_> = grant_picks.iter().map(|i| pool[*i]).collect();
            // Grant and deny cannot coexist per pair; mirror the store invariant.
            let denied: HashSet<_> = deny_picks
                .iter()
                .map(|i| pool[*i])
                .filter(|id| !granted.contains(id))
                .collect();

            let overrides = OverridePartition { granted: granted.clone(), denied: denied.clone() };
            let effective = combine(&role_derived, &overrides);

            for id in &denied {
                prop_assert!(!effective.contains(id));
            }
            for id in &effective {
                prop_assert!(role_derived.contains(id) || granted.contains(id));
            }
            for id in role_derived.union(&granted) {
                prop_assert_eq!(effective.contains(id), !denied.contains(id));
            }
        }
    }
}
