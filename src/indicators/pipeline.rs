// =============================================================================
// Chart Pipeline
// =============================================================================
//
//   raw cents (newest-first)
//     -> normalize          (oldest-first decimal, index 1..N)
//     -> SMA short          (sma5)
//     -> SMA long           (sma20)
//     -> Bollinger          (stdDev20, upperBand, lowerBand)
//     -> crossover signals  (signal)
//     -> RSI                (rsi)
//
// Same input, same output: nothing here reads clocks, randomness or shared
// state.

use serde::Serialize;
use tracing::debug;

use super::bollinger::compute_bollinger;
use super::crossover::detect_signals;
use super::normalize::normalize_history;
use super::point::{Field, IndicatorPoint};
use super::rsi::compute_rsi;
use super::sma::compute_sma;
use crate::runtime_config::IndicatorSettings;
use crate::smt::ShareDetail;
use crate::types::HistoryWindow;

/// One history window's indicator series.
#[derive(Debug, Clone, Serialize)]
pub struct WindowChart {
    pub window: HistoryWindow,
    pub points: Vec<IndicatorPoint>,
}

/// Run the full indicator pipeline over a newest-first cents history.
///
/// Under the default null-padding policy the result always has one point per
/// input price. Under the legacy empty policy, a history shorter than any
/// window yields an empty chart.
pub fn build_chart(raw: &[i64], settings: &IndicatorSettings) -> Vec<IndicatorPoint> {
    let policy = settings.short_input_policy;
    let short = settings.short_sma_period;
    let long = settings.long_sma_period;

    let base: Vec<IndicatorPoint> = normalize_history(raw)
        .into_iter()
        .map(IndicatorPoint::from)
        .collect();

    let with_short = compute_sma(&base, short, Field::Price, policy);
    let with_long = compute_sma(&with_short, long, Field::Price, policy);
    let with_bands = compute_bollinger(
        &with_long,
        settings.bollinger_period,
        Field::Price,
        settings.bollinger_multiplier,
        policy,
    );
    let with_signals = detect_signals(&with_bands, short, long);
    let chart = compute_rsi(&with_signals, settings.rsi_period, Field::Price, policy);

    debug!(
        input = raw.len(),
        points = chart.len(),
        signals = chart.iter().filter(|p| p.signal.is_some()).count(),
        "indicator chart built"
    );

    chart
}

/// Build a chart for every history window present in `detail`.
///
/// Windows the server did not send (or sent empty) are skipped.
pub fn build_charts(detail: &ShareDetail, settings: &IndicatorSettings) -> Vec<WindowChart> {
    HistoryWindow::ALL
        .iter()
        .filter_map(|&window| {
            let history = detail.history(window);
            if history.is_empty() {
                return None;
            }
            Some(WindowChart {
                window,
                points: build_chart(history, settings),
            })
        })
        .collect()
}
