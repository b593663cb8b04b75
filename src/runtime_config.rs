// =============================================================================
// Runtime Configuration — Hot-reloadable dashboard settings with atomic save
// =============================================================================
//
// Central configuration for the Apex SMT dashboard backend. Indicator windows,
// the market-data endpoint and the refresh cadence all live here so they can
// be changed through the API without a restart.
//
// Persistence uses an atomic tmp + rename pattern to prevent corruption on
// crash.  All fields carry `#[serde(default)]` so that adding new fields
// never breaks loading an older config file.
//
// =============================================================================

use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::indicators::rsi::DEFAULT_RSI_PERIOD;
use crate::types::ShortInputPolicy;

/// Largest window any indicator may use. Game histories are far shorter.
pub const MAX_INDICATOR_PERIOD: usize = 10_000;

/// Default path of the persisted config, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "runtime_config.json";

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_short_sma_period() -> usize {
    5
}

fn default_long_sma_period() -> usize {
    20
}

fn default_bollinger_multiplier() -> f64 {
    2.0
}

fn default_rsi_period() -> usize {
    DEFAULT_RSI_PERIOD
}

fn default_rsi_overbought() -> f64 {
    70.0
}

fn default_rsi_oversold() -> f64 {
    30.0
}

fn default_smt_base_url() -> String {
    "https://smt.aethernagames.com/unity.php".to_string()
}

fn default_refresh_interval_secs() -> u64 {
    30
}

// =============================================================================
// IndicatorSettings
// =============================================================================

/// Window lengths and constants for the chart indicator pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSettings {
    /// Fast SMA window used by the crossover detector.
    #[serde(default = "default_short_sma_period")]
    pub short_sma_period: usize,

    /// Slow SMA window used by the crossover detector.
    #[serde(default = "default_long_sma_period")]
    pub long_sma_period: usize,

    /// Bollinger window. Tied to the slow SMA window on the dashboard.
    #[serde(default = "default_long_sma_period")]
    pub bollinger_period: usize,

    /// Band distance in standard deviations.
    #[serde(default = "default_bollinger_multiplier")]
    pub bollinger_multiplier: f64,

    #[serde(default = "default_rsi_period")]
    pub rsi_period: usize,

    /// Reference line only; drawn by the dashboard.
    #[serde(default = "default_rsi_overbought")]
    pub rsi_overbought: f64,

    /// Reference line only; drawn by the dashboard.
    #[serde(default = "default_rsi_oversold")]
    pub rsi_oversold: f64,

    /// Behaviour when a history is shorter than a window.
    #[serde(default)]
    pub short_input_policy: ShortInputPolicy,
}

impl Default for IndicatorSettings {
    fn default() -> Self {
        Self {
            short_sma_period: default_short_sma_period(),
            long_sma_period: default_long_sma_period(),
            bollinger_period: default_long_sma_period(),
            bollinger_multiplier: default_bollinger_multiplier(),
            rsi_period: default_rsi_period(),
            rsi_overbought: default_rsi_overbought(),
            rsi_oversold: default_rsi_oversold(),
            short_input_policy: ShortInputPolicy::default(),
        }
    }
}

impl IndicatorSettings {
    /// Reject settings the pipeline cannot chart meaningfully.
    pub fn validate(&self) -> Result<()> {
        if self.short_sma_period == 0 || self.long_sma_period == 0 {
            bail!("SMA periods must be at least 1");
        }
        if self.short_sma_period >= self.long_sma_period {
            bail!(
                "short_sma_period ({}) must be less than long_sma_period ({})",
                self.short_sma_period,
                self.long_sma_period
            );
        }
        if self.bollinger_period == 0 {
            bail!("bollinger_period must be at least 1");
        }
        if !self.bollinger_multiplier.is_finite() || self.bollinger_multiplier <= 0.0 {
            bail!(
                "bollinger_multiplier must be a positive number, got {}",
                self.bollinger_multiplier
            );
        }
        if self.rsi_period == 0 {
            bail!("rsi_period must be at least 1");
        }
        for (name, period) in [
            ("short_sma_period", self.short_sma_period),
            ("long_sma_period", self.long_sma_period),
            ("bollinger_period", self.bollinger_period),
            ("rsi_period", self.rsi_period),
        ] {
            if period > MAX_INDICATOR_PERIOD {
                bail!("{name} ({period}) must not exceed {MAX_INDICATOR_PERIOD}");
            }
        }
        let in_range = |v: f64| (0.0..=100.0).contains(&v);
        if !in_range(self.rsi_oversold) || !in_range(self.rsi_overbought) {
            bail!("RSI reference lines must lie within [0, 100]");
        }
        if self.rsi_oversold >= self.rsi_overbought {
            bail!(
                "rsi_oversold ({}) must be below rsi_overbought ({})",
                self.rsi_oversold,
                self.rsi_overbought
            );
        }
        Ok(())
    }
}

// =============================================================================
// RuntimeConfig
// =============================================================================

/// Top-level runtime configuration.
///
/// Every field has a serde default so that older JSON files missing new fields
/// will still deserialise correctly. Game-server credentials are deliberately
/// not stored here; they come from the environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Game-server endpoint all market-data calls go to.
    #[serde(default = "default_smt_base_url")]
    pub smt_base_url: String,

    /// Seconds between market snapshot refreshes.
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,

    #[serde(default)]
    pub indicators: IndicatorSettings,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            smt_base_url: default_smt_base_url(),
            refresh_interval_secs: default_refresh_interval_secs(),
            indicators: IndicatorSettings::default(),
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// If the file does not exist, returns an error so the caller can fall
    /// back to defaults with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read runtime config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse runtime config from {}", path.display()))?;

        config
            .indicators
            .validate()
            .with_context(|| format!("invalid indicator settings in {}", path.display()))?;

        info!(
            path = %path.display(),
            refresh_interval_secs = config.refresh_interval_secs,
            short_input_policy = %config.indicators.short_input_policy,
            "runtime config loaded"
        );

        Ok(config)
    }

    /// Persist the current configuration to `path` using an atomic write
    /// (write to `.tmp`, then rename).
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let content = serde_json::to_string_pretty(self)
            .context("failed to serialise runtime config to JSON")?;

        let tmp_path = path.with_extension("json.tmp");

        std::fs::write(&tmp_path, &content)
            .with_context(|| format!("failed to write tmp config to {}", tmp_path.display()))?;

        std::fs::rename(&tmp_path, path)
            .with_context(|| format!("failed to rename tmp config to {}", path.display()))?;

        info!(path = %path.display(), "runtime config saved (atomic)");
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let cfg = RuntimeConfig::default();
        assert_eq!(cfg.refresh_interval_secs, 30);
        assert!(cfg.smt_base_url.starts_with("https://"));
        let ind = &cfg.indicators;
        assert_eq!(ind.short_sma_period, 5);
        assert_eq!(ind.long_sma_period, 20);
        assert_eq!(ind.bollinger_period, 20);
        assert_eq!(ind.rsi_period, 14);
        assert!((ind.bollinger_multiplier - 2.0).abs() < f64::EPSILON);
        assert!((ind.rsi_overbought - 70.0).abs() < f64::EPSILON);
        assert!((ind.rsi_oversold - 30.0).abs() < f64::EPSILON);
        assert_eq!(ind.short_input_policy, ShortInputPolicy::NullPad);
        assert!(ind.validate().is_ok());
    }

    #[test]
    fn deserialise_empty_json_uses_defaults() {
        let cfg: RuntimeConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg.refresh_interval_secs, 30);
        assert_eq!(cfg.indicators, IndicatorSettings::default());
    }

    #[test]
    fn deserialise_partial_json_fills_defaults() {
        let json = r#"{ "refresh_interval_secs": 10, "indicators": { "rsi_period": 9, "short_input_policy": "empty" } }"#;
        let cfg: RuntimeConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.refresh_interval_secs, 10);
        assert_eq!(cfg.indicators.rsi_period, 9);
        assert_eq!(cfg.indicators.short_input_policy, ShortInputPolicy::Empty);
        assert_eq!(cfg.indicators.long_sma_period, 20);
    }

    #[test]
    fn validate_rejects_bad_settings() {
        let base = IndicatorSettings::default();

        let mut s = base.clone();
        s.short_sma_period = 20;
        assert!(s.validate().is_err());

        let mut s = base.clone();
        s.bollinger_period = 0;
        assert!(s.validate().is_err());

        let mut s = base.clone();
        s.bollinger_multiplier = f64::NAN;
        assert!(s.validate().is_err());

        let mut s = base.clone();
        s.rsi_period = 0;
        assert!(s.validate().is_err());

        let mut s = base.clone();
        s.rsi_oversold = 80.0;
        assert!(s.validate().is_err());

        let mut s = base;
        s.rsi_overbought = 120.0;
        assert!(s.validate().is_err());
    }

    #[test]
    fn validate_caps_every_window() {
        let base = IndicatorSettings::default();

        let mut s = base.clone();
        s.rsi_period = MAX_INDICATOR_PERIOD;
        assert!(s.validate().is_ok());

        let mut s = base.clone();
        s.rsi_period = usize::MAX;
        let err = s.validate().unwrap_err().to_string();
        assert!(err.contains("rsi_period"), "got {err}");

        let mut s = base.clone();
        s.long_sma_period = MAX_INDICATOR_PERIOD + 1;
        assert!(s.validate().is_err());

        let mut s = base;
        s.bollinger_period = MAX_INDICATOR_PERIOD + 1;
        assert!(s.validate().is_err());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("runtime_config.json");

        let mut cfg = RuntimeConfig::default();
        cfg.indicators.rsi_period = 10;
        cfg.save(&path).unwrap();

        let loaded = RuntimeConfig::load(&path).unwrap();
        assert_eq!(loaded.indicators.rsi_period, 10);
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn load_missing_file_is_an_error() {
        assert!(RuntimeConfig::load("/definitely/not/here/runtime_config.json").is_err());
    }
}
