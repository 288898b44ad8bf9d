use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationErrors};

use crate::{
    dto::{
        admin::PlayerInput,
        draft::{DraftExport, DraftSnapshot},
        validation::validate_player_name,
    },
    error::{DraftError, ServiceError},
    state::coordinator::TurnStatus,
};

#[derive(Debug, Deserialize, Serialize, ToSchema)]
/// Messages accepted from draft room WebSocket clients.
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Bind this connection to a team.
    SelectTeam { team: String, secret: String },
    /// Grant this connection admin rights.
    AdminLogin { secret: String },
    /// Draft a player for the team on the clock.
    SubmitPick { player: String },
    /// Admin override of any pick; `player: null` clears it.
    ForceSetPick {
        index: usize,
        #[serde(default)]
        player: Option<String>,
    },
    /// Stop the pick clock (admin).
    Pause,
    /// Restart the pick clock (admin).
    Resume,
    /// Change the per-pick duration (admin).
    SetTimer { seconds: i64 },
    /// Replace a team's watchlist.
    UpdateWatchlist { team: String, players: Vec<String> },
    /// Replace the undrafted pool (admin).
    UploadPlayerPool { players: Vec<PlayerInput> },
    /// Any unrecognised `type`.
    #[serde(other)]
    Unknown,
}

impl ClientMessage {
    /// Parse and validate a text frame.
    pub fn from_json_str(text: &str) -> Result<Self, ServiceError> {
        let message: Self = serde_json::from_str(text)
            .map_err(|err| ServiceError::InvalidInput(format!("malformed message: {err}")))?;
        message
            .validate()
            .map_err(|err| ServiceError::InvalidInput(format!("validation failed: {err}")))?;
        Ok(message)
    }
}

impl Validate for ClientMessage {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        match self {
            ClientMessage::SubmitPick { player }
            | ClientMessage::ForceSetPick {
                player: Some(player),
                ..
            } => {
                if let Err(e) = validate_player_name(player) {
                    errors.add("player", e);
                }
            }
            ClientMessage::UploadPlayerPool { players } => {
                for player in players {
                    if let Err(e) = validate_player_name(&player.name) {
                        errors.add("players", e);
                    }
                }
            }
            _ => {}
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Notifications pushed to WebSocket clients and mirrored on the public SSE stream.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Sent once to every new connection.
    InitialSnapshot(DraftSnapshot),
    /// Full state after any change.
    StateChanged(DraftSnapshot),
    /// One countdown second elapsed.
    TimerTick(TimerTickPayload),
    /// Final results, sent once.
    DraftCompleted(DraftExport),
    /// Answer to `select_team`.
    TeamSelectionOutcome(TeamSelectionOutcome),
    /// Answer to `admin_login`.
    AdminLoginOutcome(AdminLoginOutcome),
    /// Some team's watchlist changed.
    WatchlistsChanged(WatchlistsPayload),
    /// Where the connection's team stands now.
    TurnStatus(TurnStatusPayload),
    /// The connection's last intent was refused.
    OperationRejected(RejectionPayload),
}

impl ServerMessage {
    /// Wire name of the message, also used as the SSE event name.
    pub fn kind(&self) -> &'static str {
        match self {
            ServerMessage::InitialSnapshot(_) => "initial_snapshot",
            ServerMessage::StateChanged(_) => "state_changed",
            ServerMessage::TimerTick(_) => "timer_tick",
            ServerMessage::DraftCompleted(_) => "draft_completed",
            ServerMessage::TeamSelectionOutcome(_) => "team_selection_outcome",
            ServerMessage::AdminLoginOutcome(_) => "admin_login_outcome",
            ServerMessage::WatchlistsChanged(_) => "watchlists_changed",
            ServerMessage::TurnStatus(_) => "turn_status",
            ServerMessage::OperationRejected(_) => "operation_rejected",
        }
    }

    /// Rejection carrying the error's reason code.
    pub fn rejected(err: &DraftError) -> Self {
        ServerMessage::OperationRejected(RejectionPayload {
            code: err.code().into(),
            message: err.to_string(),
        })
    }
}

/// Payload of a `timer_tick` notification.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TimerTickPayload {
    /// Seconds left for the current pick.
    pub remaining_seconds: u32,
    /// Index of the pick on the clock.
    pub current_pick_index: usize,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
/// Result of a `select_team` request, sent only to the requesting connection.
pub struct TeamSelectionOutcome {
    /// Whether the binding was accepted.
    pub success: bool,
    /// Team the request named.
    pub team: String,
    /// Reason when the binding was refused or lost.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Result of an `admin_login` request.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AdminLoginOutcome {
    /// Whether the secret was accepted.
    pub success: bool,
}

/// Payload of a `watchlists_changed` notification.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct WatchlistsPayload {
    /// Team -> ordered watchlist.
    #[schema(value_type = Object)]
    pub watchlists: IndexMap<String, Vec<String>>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
/// Where the connection's team stands relative to the clock.
pub struct TurnStatusPayload {
    /// Position of the team relative to the clock.
    pub status: TurnStatus,
    /// Team bound to the connection, if any.
    pub team: Option<String>,
}

/// Payload of an `operation_rejected` notification.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RejectionPayload {
    /// Stable reason code.
    pub code: String,
    /// Human-readable reason.
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::pool::Position;

    #[test]
    fn parses_snake_case_intents() {
        let message =
            ClientMessage::from_json_str(r#"{"type":"force_set_pick","index":4}"#).unwrap();
        assert!(matches!(
            message,
            ClientMessage::ForceSetPick {
                index: 4,
                player: None
            }
        ));

        let message =
            ClientMessage::from_json_str(r#"{"type":"select_team","team":"Lions","secret":"7"}"#)
                .unwrap();
        assert!(matches!(message, ClientMessage::SelectTeam { .. }));
    }

    #[test]
    fn pool_upload_accepts_mixed_case_positions() {
        let message = ClientMessage::from_json_str(
            r#"{"type":"upload_player_pool","players":[{"position":"Gk","name":"Mike Maignan"},{"position":"fWd","name":"Rafael Leão","team":"Milan"}]}"#,
        )
        .unwrap();
        let ClientMessage::UploadPlayerPool { players } = message else {
            panic!("expected a pool upload");
        };
        assert_eq!(players[0].position, Position::Goalkeeper);
        assert_eq!(players[1].position, Position::Forward);
    }

    #[test]
    fn unknown_types_are_tolerated_and_blank_picks_rejected() {
        assert!(matches!(
            ClientMessage::from_json_str(r#"{"type":"dance"}"#),
            Ok(ClientMessage::Unknown)
        ));
        assert!(matches!(
            ClientMessage::from_json_str(r#"{"type":"submit_pick","player":"  "}"#),
            Err(ServiceError::InvalidInput(_))
        ));
        assert!(matches!(
            ClientMessage::from_json_str("not json"),
            Err(ServiceError::InvalidInput(_))
        ));
    }

    #[test]
    fn outbound_messages_are_type_and_payload() {
        let message = ServerMessage::rejected(&DraftError::DraftPaused);
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["type"], message.kind());
        assert_eq!(json["payload"]["code"], "draft_paused");

        let json = serde_json::to_value(ServerMessage::TurnStatus(TurnStatusPayload {
            status: TurnStatus::OnDeck,
            team: Some("Lions".into()),
        }))
        .unwrap();
        assert_eq!(json["payload"]["status"], "on_deck");
    }
}
