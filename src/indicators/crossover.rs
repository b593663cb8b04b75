// =============================================================================
// SMA Crossover Signal Detector
// =============================================================================
//
// Buy  ('B'): short SMA was <= long SMA at i-1 and is >  long SMA at i.
// Sell ('S'): short SMA was >= long SMA at i-1 and is <  long SMA at i.
//
// Both SMAs must exist at i and at i-1, so index 0 never carries a signal.
// A tie at i-1 resolves toward whichever side the series lands on at i.

use super::point::IndicatorPoint;
use crate::types::Signal;

/// Label every point with the crossover of `sma<short_period>` over
/// `sma<long_period>`, or `None`.
///
/// The input must already carry both SMA series; points where either is
/// missing get no signal. Any previous `signal` value is overwritten.
pub fn detect_signals(
    points: &[IndicatorPoint],
    short_period: usize,
    long_period: usize,
) -> Vec<IndicatorPoint> {
    points
        .iter()
        .enumerate()
        .map(|(i, point)| {
            let mut out = point.clone();
            out.signal = match i.checked_sub(1).map(|prev| &points[prev]) {
                Some(prev) => crossover(
                    pair(prev, short_period, long_period),
                    pair(point, short_period, long_period),
                ),
                None => None,
            };
            out
        })
        .collect()
}

fn pair(point: &IndicatorPoint, short_period: usize, long_period: usize) -> Option<(f64, f64)> {
    point.sma(short_period).zip(point.sma(long_period))
}

fn crossover(prev: Option<(f64, f64)>, current: Option<(f64, f64)>) -> Option<Signal> {
    let (prev_short, prev_long) = prev?;
    let (short, long) = current?;

    if prev_short <= prev_long && short > long {
        Some(Signal::Buy)
    } else if prev_short >= prev_long && short < long {
        Some(Signal::Sell)
    } else {
        None
    }
}
