//! `gatekeep-api` — HTTP surface for the authorization engine.
//!
//! Request flow: bearer-token identity middleware → per-route guard
//! (policy enforcement point) → handler. The guard fails closed: a store
//! failure is a 5xx rejection, never a silent allow.

pub mod app;
pub mod context;
pub mod errors;
pub mod guard;
pub mod middleware;
pub mod routes;

pub use app::{AppServices, IdentityBackend, build_app};
pub use context::CallerContext;
pub use middleware::{StaticTokenVerifier, TokenVerifier};
