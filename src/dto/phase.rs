use serde::Serialize;
use utoipa::ToSchema;

use crate::state::state_machine::{ClockState, DraftPhase};

/// Publicly visible draft phase exposed to clients (WebSocket/REST/SSE).
#[derive(Debug, Serialize, ToSchema, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VisibleDraftPhase {
    /// Schedule not built yet.
    NotStarted,
    /// Clock stopped; only admins can pick.
    Paused,
    /// Clock counting down for the team on the clock.
    Running,
    /// Every pick has been made.
    Completed,
}

impl From<DraftPhase> for VisibleDraftPhase {
    fn from(value: DraftPhase) -> Self {
        match value {
            DraftPhase::NotStarted => VisibleDraftPhase::NotStarted,
            DraftPhase::InProgress(ClockState::Paused) => VisibleDraftPhase::Paused,
            DraftPhase::InProgress(ClockState::Running) => VisibleDraftPhase::Running,
            DraftPhase::Completed => VisibleDraftPhase::Completed,
        }
    }
}
