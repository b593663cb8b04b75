// =============================================================================
// REST API Endpoints — Axum 0.7
// =============================================================================
//
// All endpoints live under `/api/v1/`. Read endpoints are public. Endpoints
// that change server state (indicator settings, game credentials) require a
// valid Bearer token checked via the `AuthBearer` extractor.
//
// Errors are always `{ "error": "..." }`:
//   400  bad input (invalid settings, malformed symbol)
//   403  missing or invalid token
//   502  the game server failed or returned garbage
//   503  no market snapshot could be obtained
// =============================================================================

use std::sync::Arc;

use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

use crate::api::auth::AuthBearer;
use crate::app_state::AppState;
use crate::indicators::{build_chart, build_charts, IndicatorPoint, WindowChart};
use crate::market::{ticker, ScreenFilters, StockSummary, TickerEntry};
use crate::runtime_config::IndicatorSettings;
use crate::smt::SmtCredentials;

// =============================================================================
// Router construction
// =============================================================================

/// Build the full REST API router with CORS middleware and shared state.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // ── Public ──────────────────────────────────────────────────
        .route("/api/v1/health", get(health))
        .route("/api/v1/market/ticker", get(market_ticker))
        .route("/api/v1/stocks/screen", post(screen_stocks))
        .route("/api/v1/stocks/:symbol/charts", get(stock_charts))
        .route("/api/v1/indicators", post(compute_indicators))
        // ── Authenticated writes ────────────────────────────────────
        .route(
            "/api/v1/indicator-settings",
            get(get_indicator_settings).post(set_indicator_settings),
        )
        .route("/api/v1/smt/credentials", post(set_credentials))
        // ── Middleware & State ───────────────────────────────────────
        .layer(cors)
        .with_state(state)
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(serde_json::json!({ "error": message.into() }))).into_response()
}

/// RSI guide lines drawn next to every chart.
#[derive(Debug, Serialize)]
struct ReferenceLines {
    overbought: f64,
    oversold: f64,
}

impl From<&IndicatorSettings> for ReferenceLines {
    fn from(settings: &IndicatorSettings) -> Self {
        Self {
            overbought: settings.rsi_overbought,
            oversold: settings.rsi_oversold,
        }
    }
}

// =============================================================================
// Health (public)
// =============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    state_version: u64,
    server_time: i64,
    uptime_secs: u64,
}

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let resp = HealthResponse {
        status: "ok",
        state_version: state.current_state_version(),
        server_time: chrono::Utc::now().timestamp_millis(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    };
    Json(resp)
}

// =============================================================================
// Market listing
// =============================================================================

#[derive(Serialize)]
struct TickerResponse {
    fetched_at: String,
    entries: Vec<TickerEntry>,
}

async fn market_ticker(State(state): State<Arc<AppState>>) -> Response {
    match state.market_snapshot_or_refresh().await {
        Ok(snapshot) => Json(TickerResponse {
            fetched_at: snapshot.fetched_at.to_rfc3339(),
            entries: ticker(&snapshot.summaries),
        })
        .into_response(),
        Err(e) => snapshot_unavailable(&state, e),
    }
}

async fn screen_stocks(
    State(state): State<Arc<AppState>>,
    Json(filters): Json<ScreenFilters>,
) -> Response {
    match state.market_snapshot_or_refresh().await {
        Ok(snapshot) => {
            let matches: Vec<StockSummary> = filters.apply(&snapshot.summaries);
            Json(matches).into_response()
        }
        Err(e) => snapshot_unavailable(&state, e),
    }
}

fn snapshot_unavailable(state: &AppState, e: anyhow::Error) -> Response {
    warn!(error = %e, "Market snapshot unavailable");
    state.push_error(format!("Market refresh failed: {e}"));
    error_response(
        StatusCode::SERVICE_UNAVAILABLE,
        format!("Market data unavailable: {e}"),
    )
}

// =============================================================================
// Charts
// =============================================================================

#[derive(Serialize)]
struct ChartsResponse {
    symbol: String,
    charts: Vec<WindowChart>,
    reference_lines: ReferenceLines,
}

async fn stock_charts(
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
) -> Response {
    let symbol = symbol.trim().to_uppercase();
    if symbol.is_empty() || !symbol.chars().all(|c| c.is_ascii_alphanumeric()) {
        return error_response(
            StatusCode::BAD_REQUEST,
            format!("Invalid share symbol: {symbol:?}"),
        );
    }

    let client = state.client();
    let detail = match client.share_detail(&symbol).await {
        Ok(detail) => detail,
        Err(e) => {
            warn!(symbol = %symbol, error = %e, "Share detail request failed");
            state.push_error(format!("Share detail for {symbol} failed: {e}"));
            return error_response(StatusCode::BAD_GATEWAY, format!("Game server error: {e}"));
        }
    };

    let settings = state.indicator_settings();
    let charts = build_charts(&detail, &settings);
    Json(ChartsResponse {
        symbol,
        charts,
        reference_lines: ReferenceLines::from(&settings),
    })
    .into_response()
}

#[derive(Deserialize)]
struct IndicatorsRequest {
    /// Newest-first closing prices in cents, as the game server sends them.
    history: Vec<i64>,
    /// Overrides the server settings for this request only.
    #[serde(default)]
    settings: Option<IndicatorSettings>,
}

#[derive(Serialize)]
struct IndicatorsResponse {
    points: Vec<IndicatorPoint>,
    reference_lines: ReferenceLines,
}

async fn compute_indicators(
    State(state): State<Arc<AppState>>,
    Json(req): Json<IndicatorsRequest>,
) -> Response {
    let settings = match req.settings {
        Some(settings) => settings,
        None => state.indicator_settings(),
    };
    if let Err(e) = settings.validate() {
        return error_response(StatusCode::BAD_REQUEST, e.to_string());
    }

    Json(IndicatorsResponse {
        points: build_chart(&req.history, &settings),
        reference_lines: ReferenceLines::from(&settings),
    })
    .into_response()
}

// =============================================================================
// Indicator settings
// =============================================================================

async fn get_indicator_settings(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.indicator_settings())
}

async fn set_indicator_settings(
    _auth: AuthBearer,
    State(state): State<Arc<AppState>>,
    Json(settings): Json<IndicatorSettings>,
) -> Response {
    if let Err(e) = settings.validate() {
        return error_response(StatusCode::BAD_REQUEST, e.to_string());
    }

    info!(
        short = settings.short_sma_period,
        long = settings.long_sma_period,
        bollinger = settings.bollinger_period,
        rsi = settings.rsi_period,
        policy = %settings.short_input_policy,
        "Indicator settings updated via API"
    );
    state.set_indicator_settings(settings.clone());

    Json(serde_json::json!({
        "ok": true,
        "settings": settings,
        "state_version": state.current_state_version(),
    }))
    .into_response()
}

// =============================================================================
// Game credentials
// =============================================================================

#[derive(Deserialize)]
struct CredentialsRequest {
    account_id: String,
    session_id: String,
}

async fn set_credentials(
    _auth: AuthBearer,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CredentialsRequest>,
) -> Response {
    let credentials = SmtCredentials::new(req.account_id.trim(), req.session_id.trim());
    if !credentials.is_complete() {
        return error_response(
            StatusCode::BAD_REQUEST,
            "account_id and session_id are both required",
        );
    }

    info!(account_id = %credentials.account_id, "Game credentials replaced via API");
    state.set_credentials(credentials);

    Json(serde_json::json!({
        "ok": true,
        "account_id": state.client().account_id(),
        "state_version": state.current_state_version(),
    }))
    .into_response()
}

// =============================================================================
// Tests
// =============================================================================
