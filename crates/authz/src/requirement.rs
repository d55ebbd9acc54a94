use serde::{Deserialize, Serialize};

use crate::permissions::PermissionName;
use crate::roles::RoleName;

/// Statically constructed per-route authorization requirement.
///
/// Built at route-registration time and handed to the guard; no runtime
/// metadata lookup. An empty requirement means the route is not restricted
/// and the guard performs no store reads at all.
///
/// When both blocks are present, both must pass: the user needs any of the
/// listed roles **and** the listed permissions (any-of or all-of per
/// `match_all`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessRequirement {
    pub roles: Vec<RoleName>,
    pub permissions: Vec<PermissionName>,
    pub match_all: bool,
}

impl AccessRequirement {
    /// No restriction.
    pub fn none() -> Self {
        Self::default()
    }

    /// Require any one of the listed roles.
    pub fn any_role<I, R>(roles: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<RoleName>,
    {
        Self {
            roles: roles.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Require any one of the listed permissions.
    pub fn any_permission<I, P>(permissions: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PermissionName>,
    {
        Self {
            permissions: permissions.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Require every one of the listed permissions.
    pub fn all_permissions<I, P>(permissions: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PermissionName>,
    {
        Self {
            permissions: permissions.into_iter().map(Into::into).collect(),
            match_all: true,
            ..Self::default()
        }
    }

    /// Additionally require any one of the listed roles.
    pub fn with_any_role<I, R>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<RoleName>,
    {
        self.roles.extend(roles.into_iter().map(Into::into));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty() && self.permissions.is_empty()
    }
}
