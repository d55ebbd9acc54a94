use std::borrow::Cow;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use gatekeep_core::PermissionId;

/// Permission name, by convention `resource:action` (e.g. "holidays:read").
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionName(Cow<'static, str>);

impl PermissionName {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `resource` half of the `resource:action` convention.
    ///
    /// A name without a separator is treated as a bare resource.
    pub fn resource(&self) -> &str {
        self.0.split(':').next().unwrap_or(&self.0)
    }

    /// `action` half of the `resource:action` convention (empty if absent).
    pub fn action(&self) -> &str {
        self.0.split_once(':').map(|(_, a)| a).unwrap_or("")
    }
}

impl core::fmt::Display for PermissionName {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for PermissionName {
    fn from(value: String) -> Self {
        Self(Cow::Owned(value))
    }
}

impl From<&'static str> for PermissionName {
    fn from(value: &'static str) -> Self {
        Self(Cow::Borrowed(value))
    }
}

/// A permission row as the identity store sees it.
///
/// Like roles, permissions are seeded reference data with a soft-delete
/// marker; an archived permission no longer resolves by name, so it can never
/// enter a required set (intended exclusion, not an error).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionRecord {
    pub id: PermissionId,
    pub name: String,
    pub resource: String,
    pub action: String,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl PermissionRecord {
    pub fn new(id: PermissionId, name: impl Into<String>) -> Self {
        let name = name.into();
        let (resource, action) = match name.split_once(':') {
            Some((r, a)) => (r.to_string(), a.to_string()),
            None => (name.clone(), String::new()),
        };
        Self {
            id,
            name,
            resource,
            action,
            deleted_at: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.deleted_at.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_splits_on_resource_action_convention() {
        let name = PermissionName::new("holidays:create");
        assert_eq!(name.resource(), "holidays");
        assert_eq!(name.action(), "create");
    }

    #[test]
    fn bare_resource_has_empty_action() {
        let name = PermissionName::new("dashboard");
        assert_eq!(name.resource(), "dashboard");
        assert_eq!(name.action(), "");
    }

    #[test]
    fn record_derives_resource_and_action_from_name() {
        let record = PermissionRecord::new(PermissionId::new(), "users:read");
        assert_eq!(record.resource, "users");
        assert_eq!(record.action, "read");
        assert!(record.is_active());
    }
}
