// =============================================================================
// Shared types used across the Apex SMT dashboard backend
// =============================================================================

use serde::{Deserialize, Serialize};

/// Crossover marker attached to a chart point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Signal {
    #[serde(rename = "B")]
    Buy,
    #[serde(rename = "S")]
    Sell,
}

impl std::fmt::Display for Signal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Buy => write!(f, "B"),
            Self::Sell => write!(f, "S"),
        }
    }
}

/// What a stage returns when the input is shorter than its window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShortInputPolicy {
    /// Same-length output with `null` derived fields.
    NullPad,
    /// Empty output for the whole stage (legacy dashboard behaviour).
    Empty,
}

impl Default for ShortInputPolicy {
    fn default() -> Self {
        Self::NullPad
    }
}

impl std::fmt::Display for ShortInputPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NullPad => write!(f, "null_pad"),
            Self::Empty => write!(f, "empty"),
        }
    }
}

/// Price-history windows published by the game server for each share.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HistoryWindow {
    #[serde(rename = "1m")]
    OneMonth,
    #[serde(rename = "5m")]
    FiveMonths,
    #[serde(rename = "15m")]
    FifteenMonths,
    #[serde(rename = "60m")]
    SixtyMonths,
}

impl HistoryWindow {
    pub const ALL: [HistoryWindow; 4] = [
        Self::OneMonth,
        Self::FiveMonths,
        Self::FifteenMonths,
        Self::SixtyMonths,
    ];

    /// Length of the window in months.
    pub fn months(self) -> u32 {
        match self {
            Self::OneMonth => 1,
            Self::FiveMonths => 5,
            Self::FifteenMonths => 15,
            Self::SixtyMonths => 60,
        }
    }
}

impl std::fmt::Display for HistoryWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}m", self.months())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signal_serialises_as_single_letter() {
        assert_eq!(serde_json::to_string(&Signal::Buy).unwrap(), "\"B\"");
        assert_eq!(serde_json::to_string(&Signal::Sell).unwrap(), "\"S\"");
        let parsed: Signal = serde_json::from_str("\"S\"").unwrap();
        assert_eq!(parsed, Signal::Sell);
    }

    #[test]
    fn policy_defaults_to_null_pad() {
        assert_eq!(ShortInputPolicy::default(), ShortInputPolicy::NullPad);
        let parsed: ShortInputPolicy = serde_json::from_str("\"empty\"").unwrap();
        assert_eq!(parsed, ShortInputPolicy::Empty);
    }

    #[test]
    fn history_window_labels() {
        let labels: Vec<String> = HistoryWindow::ALL.iter().map(|w| w.to_string()).collect();
        assert_eq!(labels, vec!["1m", "5m", "15m", "60m"]);
    }
}
