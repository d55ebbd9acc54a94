use std::borrow::Cow;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use gatekeep_core::RoleId;

/// Role name used for RBAC requirements.
///
/// Names are opaque strings at this layer (e.g. "Admin", "Editor"); the
/// identity store maps them to role ids, excluding archived rows.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleName(Cow<'static, str>);

impl RoleName {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for RoleName {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for RoleName {
    fn from(value: String) -> Self {
        Self(Cow::Owned(value))
    }
}

impl From<&'static str> for RoleName {
    fn from(value: &'static str) -> Self {
        Self(Cow::Borrowed(value))
    }
}

/// A role row as the identity store sees it.
///
/// Roles are reference data: seeded once, soft-deleted via `deleted_at`,
/// never created through the authorization path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRecord {
    pub id: RoleId,
    pub name: String,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl RoleRecord {
    pub fn new(id: RoleId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            deleted_at: None,
        }
    }

    /// An archived role no longer resolves by name and contributes nothing.
    pub fn is_active(&self) -> bool {
        self.deleted_at.is_none()
    }
}
