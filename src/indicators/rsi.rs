// =============================================================================
// Relative Strength Index (RSI) — Wilder's Smoothing
// =============================================================================
//
// RSI measures the speed and magnitude of recent price changes to evaluate
// whether an asset is overbought or oversold.
//
// Step 1 — Compute price changes (deltas) from consecutive values.
// Step 2 — Seed average gain / average loss with the plain mean of the first
//          `period` deltas. A delta <= 0 counts entirely as loss.
// Step 3 — Apply Wilder's exponential smoothing for every later point:
//            avg_gain = (prev_avg_gain * (period - 1) + current_gain) / period
//            avg_loss = (prev_avg_loss * (period - 1) + current_loss) / period
// Step 4 — RS  = avg_gain / avg_loss
//          RSI = 100 - 100 / (1 + RS)
//
// Output is aligned with the input: the first `period` points only seed the
// averages and keep `rsi = null`; point `period` carries the seeded value.
//
// The 70 / 30 overbought / oversold lines are drawn by the dashboard, not
// computed here.
// =============================================================================

use super::point::{Field, IndicatorPoint};
use super::{finite, truncates};
use crate::types::ShortInputPolicy;

/// Default look-back used by the dashboard.
pub const DEFAULT_RSI_PERIOD: usize = 14;

/// Add `rsi` to every point.
///
/// # Edge cases
/// - `period == 0` or fewer than `period + 1` points => every `rsi` is `None`
///   (or an empty vec under [`ShortInputPolicy::Empty`]).
/// - Average loss of zero => 100 when there were gains, 0 otherwise
///   (a perfectly flat series reads 0).
/// - Non-finite results (e.g. a NaN price) are stored as `None`.
pub fn compute_rsi(
    points: &[IndicatorPoint],
    period: usize,
    field: Field,
    policy: ShortInputPolicy,
) -> Vec<IndicatorPoint> {
    // One more value than deltas.
    let required = period.saturating_add(1);
    if truncates(policy, period, required, points.len()) {
        return Vec::new();
    }

    let mut out: Vec<IndicatorPoint> = points
        .iter()
        .cloned()
        .map(|mut p| {
            p.rsi = None;
            p
        })
        .collect();

    if period == 0 || points.len() < required {
        return out;
    }

    // Missing values read as NaN so that they surface as `None` below.
    let values: Vec<f64> = points
        .iter()
        .map(|p| field.read(p).unwrap_or(f64::NAN))
        .collect();
    let deltas: Vec<f64> = values.windows(2).map(|w| w[1] - w[0]).collect();

    // --- Seed averages with the mean of the first `period` deltas ------------
    let (sum_gain, sum_loss) = deltas[..period].iter().fold((0.0_f64, 0.0_f64), |(g, l), &d| {
        let (gain, loss) = split_delta(d);
        (g + gain, l + loss)
    });

    let period_f = period as f64;
    let mut avg_gain = sum_gain / period_f;
    let mut avg_loss = sum_loss / period_f;

    out[period].rsi = rsi_from_averages(avg_gain, avg_loss);

    // --- Wilder's smoothing for subsequent values ----------------------------
    for (i, &delta) in deltas.iter().enumerate().skip(period) {
        let (gain, loss) = split_delta(delta);

        avg_gain = (avg_gain * (period_f - 1.0) + gain) / period_f;
        avg_loss = (avg_loss * (period_f - 1.0) + loss) / period_f;

        // deltas[i] ends at point i + 1.
        out[i + 1].rsi = rsi_from_averages(avg_gain, avg_loss);
    }

    out
}

// =============================================================================
// Internal helpers
// =============================================================================

/// Split a delta into (gain, loss). NaN propagates into the loss side.
fn split_delta(delta: f64) -> (f64, f64) {
    if delta > 0.0 {
        (delta, 0.0)
    } else {
        (0.0, delta.abs())
    }
}

/// Convert average gain / average loss into an RSI value in [0, 100].
///
/// - If average loss is zero, RSI is 100.0 with gains and 0.0 without.
/// - Returns `None` when the result is non-finite.
fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> Option<f64> {
    let rsi = if avg_loss == 0.0 {
        if avg_gain > 0.0 {
            100.0
        } else {
            0.0
        }
    } else {
        let rs = avg_gain / avg_loss;
        100.0 - 100.0 / (1.0 + rs)
    };

    finite(rsi)
}
