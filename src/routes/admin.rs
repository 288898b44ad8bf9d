use axum::{
    Json, Router,
    body::Body,
    extract::{Path, State},
    http::Request,
    middleware::{self, Next},
    response::Response,
    routing::{post, put},
};
use validator::Validate;

use crate::{
    dto::admin::{
        ActionResponse, AdminPickRequest, ForceSetPickRequest, SetTimerRequest,
        UploadPlayersRequest,
    },
    error::AppError,
    services::admin_service,
    state::SharedState,
};

const ADMIN_SECRET_HEADER: &str = "x-admin-secret";

/// Admin-only endpoints for driving the draft.
pub fn router(state: SharedState) -> Router<SharedState> {
    Router::new()
        .route("/admin/draft/pause", post(pause_draft))
        .route("/admin/draft/resume", post(resume_draft))
        .route("/admin/draft/timer", put(set_timer))
        .route("/admin/draft/pick", post(submit_pick))
        .route("/admin/picks/{index}", put(force_set_pick))
        .route("/admin/players", put(upload_players))
        .route_layer(middleware::from_fn_with_state(state, require_admin_secret))
}

/// Stop the pick clock; the seconds left are kept.
#[utoipa::path(
    post,
    path = "/admin/draft/pause",
    tag = "admin",
    params(("X-Admin-Secret" = String, Header, description = "Configured admin secret")),
    responses(
        (status = 200, description = "Draft paused", body = ActionResponse),
        (status = 409, description = "Draft not in progress")
    )
)]
pub async fn pause_draft(
    State(state): State<SharedState>,
) -> Result<Json<ActionResponse>, AppError> {
    Ok(Json(admin_service::pause_draft(&state).await?))
}

/// Restart the pick clock.
#[utoipa::path(
    post,
    path = "/admin/draft/resume",
    tag = "admin",
    params(("X-Admin-Secret" = String, Header, description = "Configured admin secret")),
    responses(
        (status = 200, description = "Draft resumed", body = ActionResponse),
        (status = 409, description = "Draft not in progress")
    )
)]
pub async fn resume_draft(
    State(state): State<SharedState>,
) -> Result<Json<ActionResponse>, AppError> {
    Ok(Json(admin_service::resume_draft(&state).await?))
}

/// Change the per-pick duration; a running clock restarts from the new duration.
#[utoipa::path(
    put,
    path = "/admin/draft/timer",
    tag = "admin",
    params(("X-Admin-Secret" = String, Header, description = "Configured admin secret")),
    request_body = SetTimerRequest,
    responses(
        (status = 200, description = "Timer updated", body = ActionResponse),
        (status = 400, description = "Duration not positive")
    )
)]
pub async fn set_timer(
    State(state): State<SharedState>,
    Json(payload): Json<SetTimerRequest>,
) -> Result<Json<ActionResponse>, AppError> {
    Ok(Json(admin_service::set_timer(&state, payload).await?))
}

/// Draft a player for the team on the clock, even while paused.
#[utoipa::path(
    post,
    path = "/admin/draft/pick",
    tag = "admin",
    params(("X-Admin-Secret" = String, Header, description = "Configured admin secret")),
    request_body = AdminPickRequest,
    responses(
        (status = 200, description = "Pick made", body = ActionResponse),
        (status = 404, description = "Player not available"),
        (status = 409, description = "Roster cap reached or draft completed")
    )
)]
pub async fn submit_pick(
    State(state): State<SharedState>,
    Json(payload): Json<AdminPickRequest>,
) -> Result<Json<ActionResponse>, AppError> {
    payload.validate()?;
    Ok(Json(admin_service::submit_pick(&state, payload).await?))
}

/// Overwrite or clear any pick without moving the clock.
#[utoipa::path(
    put,
    path = "/admin/picks/{index}",
    tag = "admin",
    params(
        ("X-Admin-Secret" = String, Header, description = "Configured admin secret"),
        ("index" = usize, Path, description = "Zero-based pick index")
    ),
    request_body = ForceSetPickRequest,
    responses(
        (status = 200, description = "Pick updated", body = ActionResponse),
        (status = 400, description = "Index out of range"),
        (status = 404, description = "Player not available"),
        (status = 409, description = "Roster cap reached")
    )
)]
pub async fn force_set_pick(
    State(state): State<SharedState>,
    Path(index): Path<usize>,
    Json(payload): Json<ForceSetPickRequest>,
) -> Result<Json<ActionResponse>, AppError> {
    payload.validate()?;
    Ok(Json(
        admin_service::force_set_pick(&state, index, payload).await?,
    ))
}

/// Replace the undrafted pool. Players already drafted are ignored.
#[utoipa::path(
    put,
    path = "/admin/players",
    tag = "admin",
    params(("X-Admin-Secret" = String, Header, description = "Configured admin secret")),
    request_body = UploadPlayersRequest,
    responses(
        (status = 200, description = "Pool replaced", body = ActionResponse),
        (status = 400, description = "Invalid player rows")
    )
)]
pub async fn upload_players(
    State(state): State<SharedState>,
    Json(payload): Json<UploadPlayersRequest>,
) -> Result<Json<ActionResponse>, AppError> {
    payload.validate()?;
    Ok(Json(admin_service::upload_players(&state, payload).await?))
}

async fn require_admin_secret(
    State(state): State<SharedState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let provided = req
        .headers()
        .get(ADMIN_SECRET_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| {
            AppError::Unauthorized("missing admin secret header `X-Admin-Secret`".into())
        })?;

    if provided != state.config().admin_secret {
        return Err(AppError::Unauthorized("invalid admin secret".into()));
    }
    Ok(next.run(req).await)
}
