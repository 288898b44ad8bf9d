use axum::{
    Json, Router,
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    routing::get,
};

use crate::{
    dto::{
        draft::{DraftExport, DraftSnapshot},
        public::{PlayersQuery, PlayersResponse},
        ws::WatchlistsPayload,
    },
    error::AppError,
    services::public_service,
    state::SharedState,
};

/// Public read-only endpoints that expose the current draft state.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/public/state", get(get_state))
        .route("/public/players", get(get_players))
        .route("/public/watchlists", get(get_watchlists))
        .route("/public/export", get(get_export))
        .route("/public/export/csv", get(get_export_csv))
}

#[utoipa::path(
    get,
    path = "/public/state",
    tag = "public",
    responses((status = 200, description = "Current draft state", body = DraftSnapshot))
)]
/// Return the schedule, cursor, timer, pool and roster counts.
pub async fn get_state(State(state): State<SharedState>) -> Result<Json<DraftSnapshot>, AppError> {
    let payload = public_service::get_state(&state).await?;
    Ok(Json(payload))
}

#[utoipa::path(
    get,
    path = "/public/players",
    tag = "public",
    params(PlayersQuery),
    responses(
        (status = 200, description = "Undrafted players matching the filter", body = PlayersResponse),
        (status = 400, description = "Unknown position")
    )
)]
/// Search the undrafted pool by name, position and club.
pub async fn get_players(
    State(state): State<SharedState>,
    Query(query): Query<PlayersQuery>,
) -> Result<Json<PlayersResponse>, AppError> {
    let payload = public_service::get_players(&state, query).await?;
    Ok(Json(payload))
}

#[utoipa::path(
    get,
    path = "/public/watchlists",
    tag = "public",
    responses((status = 200, description = "Watchlists of every team", body = WatchlistsPayload))
)]
/// Return every team's ordered watchlist.
pub async fn get_watchlists(
    State(state): State<SharedState>,
) -> Result<Json<WatchlistsPayload>, AppError> {
    let payload = public_service::get_watchlists(&state).await?;
    Ok(Json(payload))
}

#[utoipa::path(
    get,
    path = "/public/export",
    tag = "public",
    responses((status = 200, description = "Draft results", body = DraftExport))
)]
/// Export every pick, including open and skipped slots.
pub async fn get_export(State(state): State<SharedState>) -> Result<Json<DraftExport>, AppError> {
    let payload = public_service::get_export(&state).await?;
    Ok(Json(payload))
}

#[utoipa::path(
    get,
    path = "/public/export/csv",
    tag = "public",
    responses((status = 200, description = "Draft results as CSV", content_type = "text/csv", body = String))
)]
/// Export every pick as a downloadable CSV file.
pub async fn get_export_csv(
    State(state): State<SharedState>,
) -> Result<impl IntoResponse, AppError> {
    let body = public_service::get_export_csv(&state).await?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"draft_results.csv\"",
            ),
        ],
        body,
    ))
}
