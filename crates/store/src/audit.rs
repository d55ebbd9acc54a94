//! Audit trail for mutating RBAC actions.
//!
//! The engine never reads or writes audit entries; the admin service emits a
//! structured event per mutation and a sink persists it elsewhere.

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::Serialize;

use gatekeep_core::UserId;

/// Immutable record of one mutating RBAC action.
#[derive(Debug, Clone, Serialize)]
pub struct AuditEvent {
    pub action: String,
    pub entity: String,
    pub who: UserId,
    pub at: DateTime<Utc>,
    pub details: serde_json::Value,
}

impl AuditEvent {
    pub fn new(
        action: impl Into<String>,
        entity: impl Into<String>,
        who: UserId,
        details: serde_json::Value,
    ) -> Self {
        Self {
            action: action.into(),
            entity: entity.into(),
            who,
            at: Utc::now(),
            details,
        }
    }
}

/// Destination for audit events. Fire-and-forget from the caller's view;
/// a sink that needs I/O buffers internally.
pub trait AuditSink: Send + Sync {
    fn record(&self, event: AuditEvent);
}

/// In-memory sink for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryAuditSink {
    inner: Mutex<Vec<AuditEvent>>,
}

impl InMemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> Vec<AuditEvent> {
        self.inner.lock().map(|v| v.clone()).unwrap_or_default()
    }
}

impl AuditSink for InMemoryAuditSink {
    fn record(&self, event: AuditEvent) {
        if let Ok(mut events) = self.inner.lock() {
            events.push(event);
        }
    }
}

/// Sink that emits each event as a structured log record.
#[derive(Debug, Default)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, event: AuditEvent) {
        tracing::info!(
            action = %event.action,
            entity = %event.entity,
            who = %event.who,
            at = %event.at,
            details = %event.details,
            "rbac audit"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_memory_sink_accumulates_events() {
        let sink = InMemoryAuditSink::new();
        let who = UserId::new();

        sink.record(AuditEvent::new(
            "role.assign",
            "role_assignment",
            who,
            serde_json::json!({"role": "Editor"}),
        ));

        let events = sink.all();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].action, "role.assign");
        assert_eq!(events[0].who, who);
    }
}
