// =============================================================================
// Apex SMT Dashboard Backend — Main Entry Point
// =============================================================================
//
// Serves indicator charts, screener results and the ticker strip for the SMT
// share-market game. A background task keeps the market snapshot fresh; chart
// requests fetch share history on demand.
// =============================================================================

// ── Module declarations ──────────────────────────────────────────────────────
mod api;
mod app_state;
mod indicators;
mod market;
mod runtime_config;
mod smt;
mod types;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::app_state::AppState;
use crate::runtime_config::{RuntimeConfig, DEFAULT_CONFIG_PATH};
use crate::smt::SmtCredentials;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5000";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("╔══════════════════════════════════════════════════════════╗");
    info!("║        Apex SMT Dashboard — Starting Up                  ║");
    info!("╚══════════════════════════════════════════════════════════╝");

    let config_path =
        std::env::var("APEX_CONFIG_PATH").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

    let config = RuntimeConfig::load(&config_path).unwrap_or_else(|e| {
        warn!(path = %config_path, error = %e, "Failed to load config, using defaults");
        RuntimeConfig::default()
    });

    info!(
        base_url = %config.smt_base_url,
        refresh_secs = config.refresh_interval_secs,
        short = config.indicators.short_sma_period,
        long = config.indicators.long_sma_period,
        policy = %config.indicators.short_input_policy,
        "Configuration loaded"
    );

    let credentials = SmtCredentials::from_env();
    if !credentials.is_complete() {
        warn!("SMT_ACCOUNT_ID / SMT_SESSION_ID not set — game-server requests will be rejected until credentials are posted");
    }

    let admin_token = std::env::var("APEX_ADMIN_TOKEN").ok();
    if admin_token.as_deref().map_or(true, str::is_empty) {
        warn!("APEX_ADMIN_TOKEN not set — settings and credential endpoints are disabled");
    }

    // ── 2. Build shared state ────────────────────────────────────────────
    let state = Arc::new(
        AppState::new(config, config_path.clone(), credentials)?.with_admin_token(admin_token),
    );

    // ── 3. Market refresh loop ───────────────────────────────────────────
    let refresh_state = state.clone();
    tokio::spawn(async move {
        let secs = refresh_state.runtime_config.read().refresh_interval_secs.max(1);
        let mut interval = tokio::time::interval(Duration::from_secs(secs));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            interval.tick().await;
            match refresh_state.refresh_market().await {
                Ok(snapshot) => {
                    info!(shares = snapshot.summaries.len(), "Market snapshot refreshed");
                }
                Err(e) => {
                    warn!(error = %e, "Market refresh failed — retrying next tick");
                    refresh_state.push_error(format!("Market refresh failed: {e}"));
                }
            }
        }
    });

    // ── 4. Start the API server ──────────────────────────────────────────
    let bind_addr =
        std::env::var("APEX_BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
    let app = api::rest::router(state.clone());

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind API server on {bind_addr}"))?;
    info!(addr = %bind_addr, "API server listening. Press Ctrl+C to stop.");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("API server failed")?;

    // ── 5. Graceful shutdown ─────────────────────────────────────────────
    let config = state.runtime_config.read().clone();
    if let Err(e) = config.save(&config_path) {
        error!(error = %e, "Failed to save runtime config on shutdown");
    }

    info!("Apex SMT Dashboard shut down complete.");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for Ctrl+C");
        return;
    }
    warn!("Shutdown signal received — stopping gracefully");
}
