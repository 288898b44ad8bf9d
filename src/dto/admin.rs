//! DTO definitions used by the admin REST API and the admin WebSocket intents.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationErrors};

use crate::{
    dto::validation::validate_player_name,
    state::pool::{PlayerRecord, Position},
};

/// Player row supplied when uploading a new pool.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct PlayerInput {
    /// `GK`, `DEF`, `MID` or `FWD` (case-insensitive).
    pub position: Position,
    /// Unique player name.
    pub name: String,
    /// Real-world club of the player.
    #[serde(default)]
    pub team: String,
}

impl Validate for PlayerInput {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Err(e) = validate_player_name(&self.name) {
            errors.add("name", e);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl From<PlayerInput> for PlayerRecord {
    fn from(value: PlayerInput) -> Self {
        PlayerRecord::new(value.position, value.name, value.team)
    }
}

/// Replace the undrafted pool.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct UploadPlayersRequest {
    /// Replacement pool in pick-preference order.
    #[validate(nested)]
    pub players: Vec<PlayerInput>,
}

/// Change the per-pick countdown.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SetTimerRequest {
    /// New duration in seconds. Must be positive.
    pub seconds: i64,
}

/// Draft a player for the team on the clock, regardless of the clock state.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AdminPickRequest {
    /// Name of the player to draft.
    pub player: String,
}

impl Validate for AdminPickRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Err(e) = validate_player_name(&self.player) {
            errors.add("player", e);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Override the content of one pick. `null` clears it.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ForceSetPickRequest {
    /// Player to put in the slot; `null` clears it.
    #[serde(default)]
    pub player: Option<String>,
}

impl Validate for ForceSetPickRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Some(ref player) = self.player {
            if let Err(e) = validate_player_name(player) {
                errors.add("player", e);
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Generic acknowledgement returned by admin actions.
#[derive(Debug, Serialize, ToSchema)]
pub struct ActionResponse {
    /// Human-readable summary of what was applied.
    pub message: String,
}

impl ActionResponse {
    /// Wrap a summary message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_rejects_blank_names() {
        let request: UploadPlayersRequest = serde_json::from_str(
            r#"{"players":[{"position":"gk","name":"Mike Maignan","team":"Milan"},{"position":"FWD","name":"  "}]}"#,
        )
        .unwrap();
        assert!(request.validate().is_err());
    }

    #[test]
    fn upload_converts_to_records() {
        let request: UploadPlayersRequest = serde_json::from_str(
            r#"{"players":[{"position":"mid","name":" Nicolò Barella ","team":"Inter"}]}"#,
        )
        .unwrap();
        assert!(request.validate().is_ok());

        let records: Vec<PlayerRecord> = request.players.into_iter().map(Into::into).collect();
        assert_eq!(records[0].name, "Nicolò Barella");
        assert_eq!(records[0].position, Position::Midfielder);
    }

    #[test]
    fn clearing_a_pick_needs_no_name() {
        let request: ForceSetPickRequest = serde_json::from_str(r#"{"player":null}"#).unwrap();
        assert!(request.validate().is_ok());
        let request: ForceSetPickRequest = serde_json::from_str(r#"{"player":""}"#).unwrap();
        assert!(request.validate().is_err());
    }
}
