/// Notification fan-out.
pub mod broadcast;
/// Draft engine.
pub mod coordinator;
/// Player pool.
pub mod pool;
/// Roster counts and caps.
pub mod roster;
/// Snake pick schedule.
pub mod schedule;
/// Connection sessions.
pub mod session;
/// Draft lifecycle phases.
pub mod state_machine;
/// Pick countdown task.
pub mod timer;
/// Team watchlists.
pub mod watchlist;

use std::sync::Arc;

use crate::{config::AppConfig, services::draft_actor::DraftHandle};

pub use self::broadcast::{Broadcaster, SseHub};

/// Cheaply cloneable handle on [`AppState`].
pub type SharedState = Arc<AppState>;

/// Central application state: configuration, the draft queue and the fan-out of
/// notifications to connected clients.
pub struct AppState {
    config: AppConfig,
    draft: DraftHandle,
    broadcaster: Arc<Broadcaster>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    pub fn new(
        config: AppConfig,
        draft: DraftHandle,
        broadcaster: Arc<Broadcaster>,
    ) -> SharedState {
        Arc::new(Self {
            config,
            draft,
            broadcaster,
        })
    }

    /// Runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Sender side of the draft actor queue.
    pub fn draft(&self) -> &DraftHandle {
        &self.draft
    }

    /// Fan-out to WebSocket clients and the public SSE hub.
    pub fn broadcaster(&self) -> &Broadcaster {
        &self.broadcaster
    }

    /// Broadcast hub used for the public SSE stream.
    pub fn public_sse(&self) -> &SseHub {
        self.broadcaster.public_sse()
    }
}
