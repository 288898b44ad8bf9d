//! Library crate for draft-room-back, exposing modules for binaries and tests.

/// Runtime configuration.
pub mod config;
mod dto;
/// Error types and HTTP mapping.
pub mod error;
/// HTTP, WebSocket and SSE routes.
pub mod routes;
/// Service layer between routes and the draft actor.
pub mod services;
/// Draft state and shared application state.
pub mod state;
