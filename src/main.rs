// src/main.rs

use anyhow::Context;
use tokio::{net::TcpListener, sync::broadcast::error::RecvError};
use tracing_subscriber::EnvFilter;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod routes;
mod services;
mod wizard;

use crate::{
    config::{AppConfig, AppState},
    db::SessionRepository,
    services::{SessionEvent, SessionNotifier},
};

// Audit trail for sign-in activity; lagging only drops log lines.
fn spawn_session_logger(notifier: &SessionNotifier) {
    let mut events = notifier.subscribe();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(SessionEvent::SignedIn { user_id, role }) => tracing::info!(%user_id, %role, "signed in"),
                Ok(SessionEvent::SignedOut { user_id }) => tracing::info!(%user_id, "signed out"),
                Ok(SessionEvent::CodeExchanged { user_id }) => tracing::info!(%user_id, "sign-in link used"),
                Err(RecvError::Lagged(skipped)) => tracing::warn!(skipped, "session events dropped"),
                Err(RecvError::Closed) => break,
            }
        }
    });
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    let config = AppConfig::from_env()?;
    let bind_addr = config.bind_addr.clone();
    let app_state = AppState::new(config).await?;

    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .context("running database migrations")?;
    tracing::info!("database migrations applied");

    let purged = SessionRepository::new(app_state.db_pool.clone()).delete_expired().await?;
    if purged > 0 {
        tracing::info!(purged, "expired sessions removed");
    }

    spawn_session_logger(&app_state.notifier);

    let app = routes::build_router(app_state);

    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding {bind_addr}"))?;
    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
