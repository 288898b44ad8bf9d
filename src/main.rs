//! Draft room binary entrypoint wiring the draft engine, REST, WebSocket and SSE layers.

use std::{env, net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use draft_room_back::{
    config::AppConfig,
    routes,
    services::{draft_actor, player_source},
    state::{
        AppState, Broadcaster, SharedState, coordinator::DraftCoordinator,
        session::SessionAuthority,
    },
};

/// Backlog of the public SSE channel before slow subscribers start lagging.
const SSE_CAPACITY: usize = 64;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();
    config.validate().context("invalid draft configuration")?;

    let players = player_source::load_players(&config.players_path)
        .context("loading player pool")?;

    let mut coordinator = DraftCoordinator::new(config.draft_settings(), players);
    // Nobody is connected yet, so the opening notices have no audience.
    coordinator
        .initialize()
        .context("initializing draft schedule")?;
    info!(
        teams = config.teams.len(),
        rounds = config.rounds,
        picks = coordinator.schedule().len(),
        timer_seconds = config.timer_seconds,
        "draft ready, waiting for an admin to resume"
    );

    let sessions = SessionAuthority::new(config.admin_secret.clone(), config.team_secrets());
    let broadcaster = Arc::new(Broadcaster::new(SSE_CAPACITY));
    let (draft, draft_task) = draft_actor::spawn(coordinator, sessions, broadcaster.clone());

    let draft_control = draft.clone();
    let app_state = AppState::new(config, draft, broadcaster);
    let app = build_router(app_state);

    let port = env::var("PORT")
        .or_else(|_| env::var("SERVER_PORT"))
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    let service = app.into_make_service();
    axum::serve(listener, service)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    // Upgraded sockets outlive `serve` and keep their handles, so stop the actor explicitly.
    if let Err(err) = draft_control.shutdown().await {
        warn!(error = %err, "draft actor already stopped");
    }
    if let Err(err) = draft_task.await {
        warn!(error = %err, "draft task ended abnormally");
    }
    Ok(())
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: SharedState) -> Router<()> {
    routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut term = signal(SignalKind::terminate()).expect("install SIGTERM handler");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = term.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
