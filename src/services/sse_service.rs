use std::{convert::Infallible, time::Duration};

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::Stream;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{info, warn};

use crate::{
    dto::{sse::ServerEvent, ws::ServerMessage},
    error::ServiceError,
    state::SharedState,
};

/// Subscribe to the public stream and build the snapshot that opens it.
///
/// The subscription is taken before the snapshot is requested so no update that lands in
/// between is lost; a client may see the same state twice but never misses one.
pub async fn subscribe_public(
    state: &SharedState,
) -> Result<(broadcast::Receiver<ServerEvent>, ServerEvent), ServiceError> {
    let receiver = state.public_sse().subscribe();
    let snapshot = state.draft().snapshot().await?;
    let opening = ServerEvent::from_message(&ServerMessage::InitialSnapshot(snapshot))
        .map_err(|err| ServiceError::Internal(format!("failed to encode snapshot: {err}")))?;
    Ok((receiver, opening))
}

fn to_event(payload: ServerEvent) -> Event {
    Event::default().event(payload.event).data(payload.data)
}

/// Convert a broadcast receiver into an SSE response, sending `opening` first.
pub fn to_sse_stream(
    mut receiver: broadcast::Receiver<ServerEvent>,
    opening: ServerEvent,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    // small bounded channel between forwarder and response
    let (tx, rx) = mpsc::channel::<Result<Event, Infallible>>(8);

    tokio::spawn(async move {
        if tx.send(Ok(to_event(opening))).await.is_err() {
            return;
        }
        loop {
            tokio::select! {
                _ = tx.closed() => break,
                recv_result = receiver.recv() => {
                    match recv_result {
                        Ok(payload) => {
                            if tx.send(Ok(to_event(payload))).await.is_err() {
                                break;
                            }
                        }
                        Err(RecvError::Closed) => break,
                        Err(RecvError::Lagged(skipped)) => {
                            // Keep the stream alive; the next state_changed carries the full state.
                            warn!(skipped, "public SSE subscriber lagged");
                            continue;
                        }
                    }
                }
            }
        }
        info!("Public SSE stream disconnected");
    });

    let stream = ReceiverStream::new(rx);
    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}
