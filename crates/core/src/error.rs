//! Domain error model.
//!
//! One tagged error type replaces per-entity exception hierarchies: every
//! domain failure is a `(kind, entity, message)` triple, and the transport
//! status is derived from the kind alone.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Classification of a domain failure.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// A requested entity does not exist (or is soft-deleted).
    NotFound,
    /// Input failed validation (malformed id, bad payload shape).
    Validation,
    /// A uniqueness or state conflict.
    Conflict,
    /// The backing store failed; callers must fail closed.
    StoreFailure,
}

impl ErrorKind {
    /// Pure mapping from error kind to an HTTP-class status code.
    ///
    /// Lives here (transport-agnostic) so every surface maps identically.
    pub fn http_status(self) -> u16 {
        match self {
            ErrorKind::NotFound => 404,
            ErrorKind::Validation => 400,
            ErrorKind::Conflict => 409,
            ErrorKind::StoreFailure => 500,
        }
    }
}

/// Domain-level error: a kind, the entity it concerns, and a message.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{entity}: {message}")]
pub struct DomainError {
    kind: ErrorKind,
    entity: &'static str,
    message: String,
}

impl DomainError {
    pub fn new(kind: ErrorKind, entity: &'static str, message: impl Into<String>) -> Self {
        Self {
            kind,
            entity,
            message: message.into(),
        }
    }

    pub fn not_found(entity: &'static str, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, entity, message)
    }

    pub fn validation(entity: &'static str, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, entity, message)
    }

    pub fn conflict(entity: &'static str, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, entity, message)
    }

    pub fn store_failure(entity: &'static str, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::StoreFailure, entity, message)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn entity(&self) -> &'static str {
        self.entity
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping_is_stable() {
        assert_eq!(ErrorKind::NotFound.http_status(), 404);
        assert_eq!(ErrorKind::Validation.http_status(), 400);
        assert_eq!(ErrorKind::Conflict.http_status(), 409);
        assert_eq!(ErrorKind::StoreFailure.http_status(), 500);
    }

    #[test]
    fn display_includes_entity_and_message() {
        let err = DomainError::not_found("role", "no role named 'auditor'");
        assert_eq!(err.to_string(), "role: no role named 'auditor'");
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
