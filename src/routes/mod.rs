use axum::Router;

use crate::state::SharedState;

/// Admin REST endpoints.
pub mod admin;
/// Swagger UI.
pub mod docs;
/// Health check.
pub mod health;
/// Read-only draft endpoints.
pub mod public;
/// Public SSE stream.
pub mod sse;
/// Draft room WebSocket.
pub mod websocket;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    let api_router = health::router()
        .merge(sse::router())
        .merge(websocket::router())
        .merge(public::router())
        .merge(admin::router(state.clone()));

    let docs_router = docs::router(state.clone());

    api_router.merge(docs_router).with_state(state)
}
