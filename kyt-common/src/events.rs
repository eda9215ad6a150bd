//! Event types for the KYT event system
//!
//! Workflow mutations broadcast a `KytEvent` after commit. The bus is a
//! notification side-channel layered on the audit-append path; timeline
//! and progress values are derived on read and never depend on a
//! subscriber having seen an event.

use crate::db::models::{FormKind, SubmissionStatus};
use crate::ids::SubmissionId;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// KYT event types
///
/// Events are broadcast via EventBus and can be serialized for SSE
/// transmission.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum KytEvent {
    /// A marketer submitted (or re-submitted) one of the intake forms
    FormSubmitted {
        submission_id: SubmissionId,
        form: FormKind,
        /// How many of the three forms are now submitted
        forms_submitted: usize,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A workflow transition committed
    StatusChanged {
        submission_id: SubmissionId,
        old_status: SubmissionStatus,
        new_status: SubmissionStatus,
        action: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// An admin rewound a submission for re-review
    SubmissionReset {
        submission_id: SubmissionId,
        actor_guid: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// An external collaborator appended an audit note
    AuditAppended {
        submission_id: SubmissionId,
        action: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

/// Broadcast bus for KytEvents.
///
/// Slow subscribers lag and drop old events rather than blocking emitters.
pub struct EventBus {
    tx: broadcast::Sender<KytEvent>,
}

impl EventBus {
    /// Creates a new EventBus with specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<KytEvent> {
        self.tx.subscribe()
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit(&self, event: KytEvent) {
        let _ = self.tx.send(event);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1000)
    }
}
