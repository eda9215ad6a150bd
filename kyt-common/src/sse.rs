//! Server-Sent Events (SSE) utilities
//!
//! Streams workflow events to connected clients with a heartbeat, so the
//! excluded presentation layer can refresh without polling.

use crate::events::{EventBus, KytEvent};
use axum::response::sse::{Event, Sse};
use futures::stream::Stream;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info};

/// Create an SSE stream that forwards bus events and emits a heartbeat
/// every 15 seconds while the bus is quiet.
pub fn create_event_sse_stream(
    bus: Arc<EventBus>,
    service_name: &'static str,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    info!("New SSE client connected to {} events", service_name);

    let mut rx = bus.subscribe();

    let stream = async_stream::stream! {
        // Send initial connected status
        yield Ok(Event::default()
            .event("ConnectionStatus")
            .data("connected"));

        loop {
            let next = tokio::select! {
                received = rx.recv() => match received {
                    Ok(event) => serialize_event(&event),
                    // Slow consumer: skip the dropped backlog and continue
                    Err(RecvError::Lagged(skipped)) => {
                        debug!("SSE: client lagged, skipped {} events", skipped);
                        None
                    }
                    Err(RecvError::Closed) => break,
                },
                _ = tokio::time::sleep(Duration::from_secs(15)) => {
                    debug!("SSE: Sending heartbeat");
                    Some(Event::default().comment("heartbeat"))
                }
            };

            if let Some(event) = next {
                yield Ok(event);
            }
        }
    };

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("heartbeat"),
    )
}

fn serialize_event(event: &KytEvent) -> Option<Event> {
    let name = match event {
        KytEvent::FormSubmitted { .. } => "FormSubmitted",
        KytEvent::StatusChanged { .. } => "StatusChanged",
        KytEvent::SubmissionReset { .. } => "SubmissionReset",
        KytEvent::AuditAppended { .. } => "AuditAppended",
    };
    let data = serde_json::to_string(event).ok()?;
    Some(Event::default().event(name).data(data))
}
