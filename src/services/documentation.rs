use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI document for the draft room backend.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::sse::public_stream,
        crate::routes::websocket::ws_handler,
        crate::routes::public::get_state,
        crate::routes::public::get_players,
        crate::routes::public::get_watchlists,
        crate::routes::public::get_export,
        crate::routes::public::get_export_csv,
        crate::routes::admin::pause_draft,
        crate::routes::admin::resume_draft,
        crate::routes::admin::set_timer,
        crate::routes::admin::submit_pick,
        crate::routes::admin::force_set_pick,
        crate::routes::admin::upload_players,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::phase::VisibleDraftPhase,
            crate::dto::draft::PickView,
            crate::dto::draft::DraftSnapshot,
            crate::dto::draft::ExportRow,
            crate::dto::draft::DraftExport,
            crate::dto::public::PlayersResponse,
            crate::dto::admin::PlayerInput,
            crate::dto::admin::UploadPlayersRequest,
            crate::dto::admin::SetTimerRequest,
            crate::dto::admin::AdminPickRequest,
            crate::dto::admin::ForceSetPickRequest,
            crate::dto::admin::ActionResponse,
            crate::dto::ws::ClientMessage,
            crate::dto::ws::TimerTickPayload,
            crate::dto::ws::TeamSelectionOutcome,
            crate::dto::ws::AdminLoginOutcome,
            crate::dto::ws::WatchlistsPayload,
            crate::dto::ws::TurnStatusPayload,
            crate::dto::ws::RejectionPayload,
            crate::state::coordinator::TimerState,
            crate::state::coordinator::TurnStatus,
            crate::state::pool::PlayerRecord,
            crate::state::pool::Position,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "sse", description = "Server-sent events streams"),
        (name = "draft", description = "WebSocket draft room sessions"),
        (name = "public", description = "Read-only draft state"),
        (name = "admin", description = "Draft administration, guarded by `X-Admin-Secret`"),
    )
)]
pub struct ApiDoc;
