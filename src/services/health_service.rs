use tracing::warn;

use crate::{dto::health::HealthResponse, error::ServiceError, state::SharedState};

/// Report the draft phase and connection count, failing when the draft actor is gone.
pub async fn health_status(state: &SharedState) -> Result<HealthResponse, ServiceError> {
    let phase = state.draft().phase().await.inspect_err(|err| {
        warn!(error = %err, "draft coordinator did not answer the health check");
    })?;

    Ok(HealthResponse::ok(
        phase.into(),
        state.broadcaster().client_count(),
    ))
}
