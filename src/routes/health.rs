use axum::{Json, Router, extract::State, routing::get};

use crate::{
    dto::health::HealthResponse, error::AppError, services::health_service, state::SharedState,
};

#[utoipa::path(
    get,
    path = "/healthcheck",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
        (status = 503, description = "Draft coordinator stopped")
    )
)]
/// Return the current health status of the backend and the draft phase.
pub async fn healthcheck(
    State(state): State<SharedState>,
) -> Result<Json<HealthResponse>, AppError> {
    let status = health_service::health_status(&state).await?;
    Ok(Json(status))
}

/// Configure the health routes subtree.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new().route("/healthcheck", get(healthcheck))
}
