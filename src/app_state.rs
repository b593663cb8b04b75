// =============================================================================
// Central Application State — Apex SMT Dashboard Backend
// =============================================================================
//
// Shared by every HTTP handler and the market refresh task through
// `Arc<AppState>`.
//
// Thread safety:
//   - Atomic counter for lock-free version tracking.
//   - parking_lot::RwLock for all mutable shared values. Locks are never held
//     across an `.await`: handlers clone what they need and release.
// =============================================================================

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use anyhow::{bail, Result};
use chrono::Utc;
use parking_lot::RwLock;
use serde::Serialize;
use tracing::{debug, warn};

use crate::market::MarketSnapshot;
use crate::runtime_config::{IndicatorSettings, RuntimeConfig};
use crate::smt::{SmtClient, SmtCredentials};

// =============================================================================
// Error Record
// =============================================================================

/// A recorded error event for the dashboard error log.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorRecord {
    /// Human-readable error message.
    pub message: String,
    /// ISO 8601 timestamp.
    pub at: String,
}

// =============================================================================
// AppState
// =============================================================================

/// Maximum number of recent errors to retain.
const MAX_RECENT_ERRORS: usize = 50;

pub struct AppState {
    /// Monotonically increasing version counter. Incremented on every
    /// meaningful state mutation (snapshot refresh, settings change).
    pub state_version: AtomicU64,

    pub runtime_config: Arc<RwLock<RuntimeConfig>>,

    /// Where settings changes are persisted.
    pub config_path: PathBuf,

    /// Game-server client for the current account.
    pub smt_client: RwLock<SmtClient>,

    /// Bumped whenever `smt_client` changes account. A refresh started under
    /// an older generation must not publish its listing.
    credentials_generation: AtomicU64,

    /// Latest share listing, `None` until the first successful refresh.
    pub market: RwLock<Option<Arc<MarketSnapshot>>>,

    pub recent_errors: RwLock<Vec<ErrorRecord>>,

    /// Bearer token required by state-changing endpoints. `None` disables
    /// them entirely.
    pub admin_token: Option<String>,

    /// Instant when the server was started. Used for uptime calculations.
    pub start_time: std::time::Instant,
}

impl AppState {
    /// Build the state and the game-server client described by `config`.
    pub fn new(
        config: RuntimeConfig,
        config_path: impl Into<PathBuf>,
        credentials: SmtCredentials,
    ) -> Result<Self> {
        let client = SmtClient::new(config.smt_base_url.clone(), credentials)?;

        Ok(Self {
            state_version: AtomicU64::new(1),
            runtime_config: Arc::new(RwLock::new(config)),
            config_path: config_path.into(),
            smt_client: RwLock::new(client),
            credentials_generation: AtomicU64::new(0),
            market: RwLock::new(None),
            recent_errors: RwLock::new(Vec::new()),
            admin_token: None,
            start_time: std::time::Instant::now(),
        })
    }

    /// Require `token` on state-changing endpoints. Empty tokens are ignored.
    pub fn with_admin_token(mut self, token: Option<String>) -> Self {
        self.admin_token = token.filter(|t| !t.is_empty());
        self
    }

    // ── Version Management ──────────────────────────────────────────────

    pub fn increment_version(&self) -> u64 {
        self.state_version.fetch_add(1, Ordering::SeqCst)
    }

    pub fn current_state_version(&self) -> u64 {
        self.state_version.load(Ordering::SeqCst)
    }

    // ── Error Logging ───────────────────────────────────────────────────

    /// Record an error message. The log is capped at
    /// [`MAX_RECENT_ERRORS`]; oldest entries are evicted first.
    pub fn push_error(&self, msg: String) {
        let record = ErrorRecord {
            message: msg,
            at: Utc::now().to_rfc3339(),
        };

        let mut errors = self.recent_errors.write();
        errors.push(record);
        while errors.len() > MAX_RECENT_ERRORS {
            errors.remove(0);
        }
        drop(errors);

        self.increment_version();
    }

    // ── Accessors ───────────────────────────────────────────────────────

    /// A clone of the current client, safe to hold across `.await`.
    pub fn client(&self) -> SmtClient {
        self.smt_client.read().clone()
    }

    pub fn indicator_settings(&self) -> IndicatorSettings {
        self.runtime_config.read().indicators.clone()
    }

    pub fn market_snapshot(&self) -> Option<Arc<MarketSnapshot>> {
        self.market.read().clone()
    }

    // ── Mutations ───────────────────────────────────────────────────────

    /// Replace the indicator settings and persist the config (best-effort).
    pub fn set_indicator_settings(&self, settings: IndicatorSettings) {
        let config_clone = {
            let mut config = self.runtime_config.write();
            config.indicators = settings;
            config.clone()
        };

        if let Err(e) = config_clone.save(&self.config_path) {
            warn!(error = %e, "Failed to save indicator settings to disk");
        }

        self.increment_version();
    }

    /// Point the game-server client at another account.
    pub fn set_credentials(&self, credentials: SmtCredentials) {
        {
            let mut client = self.smt_client.write();
            let next = client.with_credentials(credentials);
            *client = next;
            self.credentials_generation.fetch_add(1, Ordering::SeqCst);
        }

        // The cached listing belongs to the previous account.
        *self.market.write() = None;
        self.increment_version();
    }

    /// Fetch the share listing and store it as the current snapshot.
    ///
    /// Fails without storing anything if the credentials were replaced while
    /// the request was in flight.
    pub async fn refresh_market(&self) -> Result<Arc<MarketSnapshot>> {
        let (client, generation) = {
            let client = self.smt_client.read();
            (
                client.clone(),
                self.credentials_generation.load(Ordering::SeqCst),
            )
        };
        let market = client.share_market().await?;

        let snapshot = MarketSnapshot::from_quotes(&market.sharemarket, Utc::now());
        self.publish_snapshot(snapshot, generation)
    }

    fn publish_snapshot(
        &self,
        snapshot: MarketSnapshot,
        generation: u64,
    ) -> Result<Arc<MarketSnapshot>> {
        let snapshot = Arc::new(snapshot);
        {
            let mut market = self.market.write();
            let current = self.credentials_generation.load(Ordering::SeqCst);
            if current != generation {
                bail!("credentials changed during market refresh; listing discarded");
            }
            *market = Some(snapshot.clone());
        }
        self.increment_version();

        debug!(shares = snapshot.summaries.len(), "market snapshot refreshed");
        Ok(snapshot)
    }

    /// The cached snapshot, fetching one first if none exists yet.
    pub async fn market_snapshot_or_refresh(&self) -> Result<Arc<MarketSnapshot>> {
        match self.market_snapshot() {
            Some(snapshot) => Ok(snapshot),
            None => self.refresh_market().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ShortInputPolicy;

    fn state_in(dir: &tempfile::TempDir) -> AppState {
        AppState::new(
            RuntimeConfig::default(),
            dir.path().join("runtime_config.json"),
            SmtCredentials::new("1", "s"),
        )
        .unwrap()
    }

    #[test]
    fn error_log_is_capped() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_in(&dir);
        for i in 0..(MAX_RECENT_ERRORS + 5) {
            state.push_error(format!("error {i}"));
        }
        let errors = state.recent_errors.read();
        assert_eq!(errors.len(), MAX_RECENT_ERRORS);
        assert_eq!(errors[0].message, "error 5");
    }

    #[test]
    fn settings_update_bumps_version_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_in(&dir);
        let before = state.current_state_version();

        let settings = IndicatorSettings {
            short_input_policy: ShortInputPolicy::Empty,
            ..IndicatorSettings::default()
        };
        state.set_indicator_settings(settings.clone());

        assert_eq!(state.indicator_settings(), settings);
        assert!(state.current_state_version() > before);
        let saved = RuntimeConfig::load(dir.path().join("runtime_config.json")).unwrap();
        assert_eq!(saved.indicators, settings);
    }

    #[test]
    fn credentials_swap_clears_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_in(&dir);
        *state.market.write() = Some(Arc::new(MarketSnapshot::from_quotes(&[], Utc::now())));

        state.set_credentials(SmtCredentials::new("77", "other"));

        assert_eq!(state.client().account_id(), "77");
        assert!(state.market_snapshot().is_none());
    }

    #[test]
    fn listing_from_replaced_account_is_discarded() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_in(&dir);
        let started_under = state.credentials_generation.load(Ordering::SeqCst);

        state.set_credentials(SmtCredentials::new("77", "other"));
        let stale = MarketSnapshot::from_quotes(&[], Utc::now());

        assert!(state.publish_snapshot(stale, started_under).is_err());
        assert!(state.market_snapshot().is_none());
    }

    #[test]
    fn listing_for_current_account_is_published() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_in(&dir);
        let generation = state.credentials_generation.load(Ordering::SeqCst);
        let before = state.current_state_version();

        let snapshot = MarketSnapshot::from_quotes(&[], Utc::now());
        state.publish_snapshot(snapshot, generation).unwrap();

        assert!(state.market_snapshot().is_some());
        assert!(state.current_state_version() > before);
    }
}
