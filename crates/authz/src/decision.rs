//! The decision API: "has role(s)" and "has permission(s)" queries.

use gatekeep_core::UserId;

use crate::effective::{self, EffectivePermissionSet};
use crate::error::EngineError;
use crate::permissions::PermissionName;
use crate::ports::IdentityReader;
use crate::requirement::AccessRequirement;
use crate::resolve;
use crate::roles::RoleName;

/// Answers authorization queries over one identity reader handle.
///
/// The handle is held for the lifetime of the decision object and released
/// when it drops (success or error), so one pooled connection serves all
/// reads of a decision. Every query recomputes from current store state;
/// nothing is cached across calls.
pub struct AuthorizationDecision<R> {
    reader: R,
}

impl<R> AuthorizationDecision<R>
where
    R: IdentityReader,
{
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    pub fn into_inner(self) -> R {
        self.reader
    }

    /// True iff the user holds at least one of the required roles.
    ///
    /// An empty `required` list means access is not restricted by role and
    /// is answered `true` without touching the store. Unresolvable names are
    /// dropped; if nothing resolves, the requirement is unsatisfiable.
    pub async fn has_any_role(
        &mut self,
        user: UserId,
        required: &[RoleName],
    ) -> Result<bool, EngineError> {
        if required.is_empty() {
            return Ok(true);
        }

        let required_ids = resolve::resolve_role_names(&mut self.reader, required).await?;
        if required_ids.is_empty() {
            return Ok(false);
        }

        let assigned = resolve::assigned_role_ids(&mut self.reader, user).await?;
        let granted = required_ids.iter().any(|id| assigned.contains(id));

        tracing::debug!(%user, granted, required = required.len(), "role check");
        Ok(granted)
    }

    /// True iff the user's effective permission set satisfies the required
    /// names: any-of when `match_all` is false, all-of otherwise.
    ///
    /// Names that do not resolve (unknown or archived) are dropped; if the
    /// resolved set ends up empty the check fails closed in **both** modes —
    /// a route that only ever tests for now-nonexistent permissions must not
    /// open up.
    pub async fn has_permission(
        &mut self,
        user: UserId,
        required: &[PermissionName],
        match_all: bool,
    ) -> Result<bool, EngineError> {
        let required_ids = resolve::resolve_permission_names(&mut self.reader, required).await?;
        if required_ids.is_empty() {
            tracing::debug!(%user, "no required permission resolves; denying");
            return Ok(false);
        }

        let effective = effective::effective_permissions(&mut self.reader, user).await?;
        let granted = if match_all {
            required_ids.iter().all(|id| effective.is_effective(*id))
        } else {
            required_ids.iter().any(|id| effective.is_effective(*id))
        };

        tracing::debug!(%user, granted, match_all, required = required.len(), "permission check");
        Ok(granted)
    }

    /// All-of convenience wrapper over [`Self::has_permission`].
    pub async fn has_all_permissions(
        &mut self,
        user: UserId,
        required: &[PermissionName],
    ) -> Result<bool, EngineError> {
        self.has_permission(user, required, true).await
    }

    /// The user's full effective permission breakdown.
    pub async fn effective_permissions(
        &mut self,
        user: UserId,
    ) -> Result<EffectivePermissionSet, EngineError> {
        effective::effective_permissions(&mut self.reader, user).await
    }

    /// Evaluate a per-route requirement: the guard contract.
    ///
    /// Empty requirement ⇒ allowed with no store reads. Otherwise the role
    /// block and the permission block must both pass; an empty block is
    /// skipped rather than failing closed, since absence of a block means
    /// "not restricted by that dimension".
    pub async fn evaluate(
        &mut self,
        user: UserId,
        requirement: &AccessRequirement,
    ) -> Result<bool, EngineError> {
        if requirement.is_empty() {
            return Ok(true);
        }

        if !requirement.roles.is_empty() && !self.has_any_role(user, &requirement.roles).await? {
            return Ok(false);
        }

        if !requirement.permissions.is_empty()
            && !self
                .has_permission(user, &requirement.permissions, requirement.match_all)
                .await?
        {
            return Ok(false);
        }

        Ok(true)
    }
}
