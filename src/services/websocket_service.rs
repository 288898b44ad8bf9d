use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    dto::ws::{ClientMessage, RejectionPayload, ServerMessage},
    error::ServiceError,
    services::draft_actor::{DraftIntent, Requester},
    state::{SharedState, session::ConnectionId},
};

/// Handle the full lifecycle of one draft room WebSocket connection.
pub async fn handle_socket(state: SharedState, socket: WebSocket) {
    let (mut sender, mut receiver) = socket.split();
    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<Message>();

    // Dedicated writer task keeps outbound messages flowing even while we await inbound frames.
    let writer_task = tokio::spawn(async move {
        while let Some(message) = outbound_rx.recv().await {
            if sender.send(message).await.is_err() {
                break;
            }
        }
    });

    let connection: ConnectionId = Uuid::new_v4();
    state.broadcaster().register(connection, outbound_tx.clone());
    if let Err(err) = state.draft().connect(connection).await {
        warn!(%connection, error = %err, "draft queue unavailable, closing connection");
        state.broadcaster().unregister(connection);
        let _ = outbound_tx.send(Message::Close(None));
        finalize(writer_task, outbound_tx).await;
        return;
    }
    info!(%connection, "client connected");

    while let Some(message) = receiver.next().await {
        match message {
            Ok(Message::Text(text)) => {
                debug!(%connection, payload = %text, "received client message");
                if let Err(err) = handle_text(&state, connection, text.as_str()).await {
                    match err {
                        ServiceError::Unavailable => {
                            warn!(%connection, "draft queue closed, terminating connection");
                            break;
                        }
                        other => reject_input(&state, connection, &other),
                    }
                }
            }
            Ok(Message::Ping(payload)) => {
                let _ = outbound_tx.send(Message::Pong(payload));
            }
            Ok(Message::Close(frame)) => {
                info!(%connection, "client closed");
                let _ = outbound_tx.send(Message::Close(frame));
                break;
            }
            Ok(Message::Binary(_)) => {}
            Ok(Message::Pong(_)) => {}
            Err(err) => {
                warn!(%connection, error = %err, "websocket error");
                break;
            }
        }
    }

    state.broadcaster().unregister(connection);
    if let Err(err) = state.draft().disconnect(connection).await {
        debug!(%connection, error = %err, "draft queue gone before disconnect");
    }
    info!(%connection, "client disconnected");

    finalize(writer_task, outbound_tx).await;
}

/// Parse one text frame and queue the intent it carries.
async fn handle_text(
    state: &SharedState,
    connection: ConnectionId,
    text: &str,
) -> Result<(), ServiceError> {
    let message = ClientMessage::from_json_str(text)?;
    let intent = into_intent(message).ok_or_else(|| {
        ServiceError::InvalidInput("unsupported message type".into())
    })?;
    state
        .draft()
        .post(Requester::Connection(connection), intent)
        .await
}

fn into_intent(message: ClientMessage) -> Option<DraftIntent> {
    let intent = match message {
        ClientMessage::SelectTeam { team, secret } => DraftIntent::SelectTeam { team, secret },
        ClientMessage::AdminLogin { secret } => DraftIntent::AdminLogin { secret },
        ClientMessage::SubmitPick { player } => DraftIntent::SubmitPick {
            player: player.trim().to_string(),
        },
        ClientMessage::ForceSetPick { index, player } => DraftIntent::ForceSetPick {
            index,
            player: player.map(|name| name.trim().to_string()),
        },
        ClientMessage::Pause => DraftIntent::Pause,
        ClientMessage::Resume => DraftIntent::Resume,
        ClientMessage::SetTimer { seconds } => DraftIntent::SetTimer { seconds },
        ClientMessage::UpdateWatchlist { team, players } => {
            DraftIntent::UpdateWatchlist { team, players }
        }
        ClientMessage::UploadPlayerPool { players } => DraftIntent::UploadPlayerPool {
            players: players.into_iter().map(Into::into).collect(),
        },
        ClientMessage::Unknown => return None,
    };
    Some(intent)
}

/// Tell the sender its frame could not be turned into an intent.
fn reject_input(state: &SharedState, connection: ConnectionId, err: &ServiceError) {
    warn!(%connection, error = %err, "rejecting client message");
    let message = ServerMessage::OperationRejected(RejectionPayload {
        code: "invalid_input".into(),
        message: err.to_string(),
    });
    state.broadcaster().send_to(connection, &message);
}

/// Ensure the writer task winds down before we return from the socket handler.
async fn finalize(writer_task: JoinHandle<()>, outbound_tx: mpsc::UnboundedSender<Message>) {
    drop(outbound_tx);
    let _ = writer_task.await;
}
