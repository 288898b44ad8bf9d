use std::time::SystemTime;

use serde::Serialize;
use utoipa::ToSchema;

use crate::dto::{format_system_time, phase::VisibleDraftPhase};

/// Simple health response returned by the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Health status ("ok" while the draft coordinator answers).
    pub status: String,
    /// Current draft phase.
    pub phase: VisibleDraftPhase,
    /// Open WebSocket connections.
    pub connected_clients: usize,
    /// RFC 3339 time of the check.
    pub checked_at: String,
}

impl HealthResponse {
    /// Create a health response indicating the system is operational.
    pub fn ok(phase: VisibleDraftPhase, connected_clients: usize) -> Self {
        Self {
            status: "ok".to_string(),
            phase,
            connected_clients,
            checked_at: format_system_time(SystemTime::now()),
        }
    }
}
