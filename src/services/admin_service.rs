//! Admin operations exposed over REST. Every call goes through the draft queue with admin
//! rights, exactly like an admin WebSocket session.

use tracing::info;

use crate::{
    dto::admin::{
        ActionResponse, AdminPickRequest, ForceSetPickRequest, SetTimerRequest,
        UploadPlayersRequest,
    },
    error::ServiceError,
    services::draft_actor::{DraftIntent, Requester},
    state::SharedState,
};

async fn run(state: &SharedState, intent: DraftIntent) -> Result<(), ServiceError> {
    state.draft().submit(Requester::Admin, intent).await
}

/// Stop the pick clock.
pub async fn pause_draft(state: &SharedState) -> Result<ActionResponse, ServiceError> {
    run(state, DraftIntent::Pause).await?;
    Ok(ActionResponse::new("paused"))
}

/// Restart the pick clock from where it stopped.
pub async fn resume_draft(state: &SharedState) -> Result<ActionResponse, ServiceError> {
    run(state, DraftIntent::Resume).await?;
    Ok(ActionResponse::new("resumed"))
}

/// Change the per-pick duration.
pub async fn set_timer(
    state: &SharedState,
    request: SetTimerRequest,
) -> Result<ActionResponse, ServiceError> {
    run(
        state,
        DraftIntent::SetTimer {
            seconds: request.seconds,
        },
    )
    .await?;
    Ok(ActionResponse::new(format!(
        "pick timer set to {} seconds",
        request.seconds
    )))
}

/// Draft a player for the team on the clock.
pub async fn submit_pick(
    state: &SharedState,
    request: AdminPickRequest,
) -> Result<ActionResponse, ServiceError> {
    let player = request.player.trim().to_string();
    run(
        state,
        DraftIntent::SubmitPick {
            player: player.clone(),
        },
    )
    .await?;
    Ok(ActionResponse::new(format!("{player} drafted")))
}

/// Overwrite or clear the pick at `index`.
pub async fn force_set_pick(
    state: &SharedState,
    index: usize,
    request: ForceSetPickRequest,
) -> Result<ActionResponse, ServiceError> {
    let player = request.player.map(|name| name.trim().to_string());
    run(
        state,
        DraftIntent::ForceSetPick {
            index,
            player: player.clone(),
        },
    )
    .await?;
    Ok(ActionResponse::new(match player {
        Some(name) => format!("pick {index} set to {name}"),
        None => format!("pick {index} cleared"),
    }))
}

/// Replace the undrafted pool.
pub async fn upload_players(
    state: &SharedState,
    request: UploadPlayersRequest,
) -> Result<ActionResponse, ServiceError> {
    let players: Vec<_> = request.players.into_iter().map(Into::into).collect();
    let offered = players.len();
    run(state, DraftIntent::UploadPlayerPool { players }).await?;
    info!(offered, "player pool uploaded over REST");
    Ok(ActionResponse::new(format!("{offered} players uploaded")))
}
