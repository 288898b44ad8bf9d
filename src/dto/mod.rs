use std::time::SystemTime;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

/// Admin request and response bodies.
pub mod admin;
/// Draft snapshot and results export.
pub mod draft;
/// Health check payload.
pub mod health;
/// Client-facing draft phase.
pub mod phase;
/// Public query parameters and responses.
pub mod public;
/// Server-sent event frames.
pub mod sse;
/// Shared field validators.
pub mod validation;
/// WebSocket message envelopes.
pub mod ws;

fn format_system_time(time: SystemTime) -> String {
    OffsetDateTime::from(time)
        .format(&Rfc3339)
        .unwrap_or_else(|_| "invalid-timestamp".into())
}
