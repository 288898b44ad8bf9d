/// Admin operations driven over REST.
pub mod admin_service;
/// OpenAPI documentation generation.
pub mod documentation;
/// Single-writer task owning the draft state.
pub mod draft_actor;
/// Health check service.
pub mod health_service;
/// Player pool ingestion from CSV.
pub mod player_source;
/// Public service for read-only draft information.
pub mod public_service;
/// Server-Sent Events streaming service.
pub mod sse_service;
/// WebSocket connection and message handling service.
pub mod websocket_service;
