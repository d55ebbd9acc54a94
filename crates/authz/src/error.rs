use thiserror::Error;

use gatekeep_core::{PermissionId, UserId};

/// Failures an authorization decision can surface.
///
/// A decision never degrades a failure into a clean "no access": callers get
/// `Err` and are expected to fail closed (forbid). Only `Ok(false)` means the
/// store was consulted successfully and access is not granted.
#[derive(Debug, Error)]
pub enum EngineError {
    /// I/O failure from a read port (connection, timeout, row shape).
    /// Not retried here; propagated as-is.
    #[error("identity store failure: {0}")]
    Store(#[from] anyhow::Error),

    /// The store returned both a grant and a deny override for the same
    /// (user, permission) pair. The unique index makes this impossible in a
    /// healthy store, so it is treated as a storage fault rather than
    /// silently picking a winner.
    #[error("conflicting overrides for permission {permission} of user {user}")]
    ConflictingOverride {
        user: UserId,
        permission: PermissionId,
    },
}

impl EngineError {
    pub fn store(err: impl Into<anyhow::Error>) -> Self {
        Self::Store(err.into())
    }
}
