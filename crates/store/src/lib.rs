//! `gatekeep-store` — identity store adapters and administrative mutation.
//!
//! Read side: the [`gatekeep_authz`] port traits implemented over an
//! in-memory twin (dev/tests) and Postgres (sqlx). Write side: the
//! [`admin::IdentityAdmin`] mutation port plus the audit-recording
//! [`admin::RbacAdmin`] service. Roles, permissions and role-permission
//! links are reference data owned by seed/migration tooling; only role
//! assignments and overrides mutate at runtime.

pub mod admin;
pub mod audit;
pub mod memory;
pub mod postgres;

pub use admin::{IdentityAdmin, RbacAdmin};
pub use audit::{AuditEvent, AuditSink, InMemoryAuditSink, TracingAuditSink};
pub use memory::InMemoryIdentityStore;
pub use postgres::{PgIdentityReader, PgIdentityStore};
