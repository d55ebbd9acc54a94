//! `gatekeep-authz` — authorization resolution engine.
//!
//! Given a user identity and a set of required role or permission names, this
//! crate decides whether access is granted. It owns the combination rule
//! (role-derived permissions merged with per-user grant/deny overrides) and
//! nothing else: storage is reached only through the narrow read ports in
//! [`ports`], and HTTP/transport concerns live elsewhere.
//!
//! The engine is stateless per call; every decision recomputes the effective
//! permission set from the current store contents.

pub mod decision;
pub mod effective;
pub mod error;
pub mod overrides;
pub mod permissions;
pub mod ports;
pub mod requirement;
pub mod resolve;
pub mod roles;

pub use decision::AuthorizationDecision;
pub use effective::{EffectivePermissionSet, combine, effective_permissions};
pub use error::EngineError;
pub use overrides::{OverridePartition, PermissionOverride, partition_overrides};
pub use permissions::{PermissionName, PermissionRecord};
pub use ports::{
    IdentityReader, OverrideStore, PermissionStore, RoleAssignmentStore, RolePermissionStore,
    RoleStore,
};
pub use requirement::AccessRequirement;
pub use roles::{RoleName, RoleRecord};
