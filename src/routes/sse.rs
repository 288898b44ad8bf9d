use std::convert::Infallible;

use axum::{Router, extract::State, response::sse::Sse, routing::get};
use futures::Stream;
use tracing::info;

use crate::{error::AppError, services::sse_service, state::SharedState};

#[utoipa::path(
    get,
    path = "/sse/public",
    tag = "sse",
    responses(
        (status = 200, description = "Read-only draft notifications, opening with `initial_snapshot`", content_type = "text/event-stream", body = String),
        (status = 503, description = "Draft engine unavailable")
    )
)]
/// Stream every draft notification to spectators.
pub async fn public_stream(
    State(state): State<SharedState>,
) -> Result<Sse<impl Stream<Item = Result<axum::response::sse::Event, Infallible>>>, AppError> {
    let (receiver, opening) = sse_service::subscribe_public(&state).await?;
    info!("New public SSE connection");
    Ok(sse_service::to_sse_stream(receiver, opening))
}

/// Configure the SSE endpoints.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new().route("/sse/public", get(public_stream))
}
