use thiserror::Error;

/// High-level phases the draft can be in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftPhase {
    /// The schedule has not been built yet.
    NotStarted,
    /// Picks are being made; the clock is either stopped or counting down.
    InProgress(ClockState),
    /// The cursor reached the end of the schedule. Terminal.
    Completed,
}

/// Whether the pick countdown is active while the draft is in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockState {
    /// Countdown stopped; only admins may pick.
    Paused,
    /// Countdown running; the team on the clock may pick.
    Running,
}

/// Events that can be applied to the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftEvent {
    /// Schedule built; the draft waits paused for an admin to resume.
    Initialize,
    /// Admin stops the clock.
    Pause,
    /// Admin starts the clock.
    Resume,
    /// The last pick of the schedule was made (or skipped).
    Finish,
}

/// Error returned when attempting to apply an invalid transition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid transition: {event:?} cannot be applied while in {from:?}")]
pub struct InvalidTransition {
    /// The phase the state machine was in when the invalid event was received.
    pub from: DraftPhase,
    /// The event that cannot be applied from this phase.
    pub event: DraftEvent,
}

/// State machine for the draft lifecycle.
#[derive(Debug, Clone)]
pub struct DraftStateMachine {
    phase: DraftPhase,
    version: usize,
}

impl Default for DraftStateMachine {
    fn default() -> Self {
        Self {
            phase: DraftPhase::NotStarted,
            version: 0,
        }
    }
}

impl DraftStateMachine {
    /// Create a new state machine in the not-started phase.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inspect the current phase.
    pub fn phase(&self) -> DraftPhase {
        self.phase
    }

    /// True while the countdown is running.
    pub fn is_running(&self) -> bool {
        self.phase == DraftPhase::InProgress(ClockState::Running)
    }

    /// Number of transitions applied so far.
    pub fn version(&self) -> usize {
        self.version
    }

    /// Apply `event`, returning the new phase.
    pub fn apply(&mut self, event: DraftEvent) -> Result<DraftPhase, InvalidTransition> {
        let next = self.compute_transition(event)?;
        self.phase = next;
        self.version += 1;
        Ok(next)
    }

    /// Compute a transition from an event if the transition is valid.
    fn compute_transition(&self, event: DraftEvent) -> Result<DraftPhase, InvalidTransition> {
        let next = match (self.phase, event) {
            (DraftPhase::NotStarted, DraftEvent::Initialize) => {
                DraftPhase::InProgress(ClockState::Paused)
            }
            (DraftPhase::InProgress(ClockState::Running), DraftEvent::Pause) => {
                DraftPhase::InProgress(ClockState::Paused)
            }
            (DraftPhase::InProgress(ClockState::Paused), DraftEvent::Resume) => {
                DraftPhase::InProgress(ClockState::Running)
            }
            (DraftPhase::InProgress(_), DraftEvent::Finish) => DraftPhase::Completed,
            (from, event) => return Err(InvalidTransition { from, event }),
        };

        Ok(next)
    }
}
