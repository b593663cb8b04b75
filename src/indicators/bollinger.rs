// =============================================================================
// Bollinger Bands
// =============================================================================
//
// Bollinger Bands consist of a middle band (SMA), an upper band (SMA + k*σ),
// and a lower band (SMA - k*σ), where σ is the *population* standard
// deviation over the same trailing window:
//
//   σ = sqrt( Σ (x - SMA)² / N )
//
// The dashboard charts k = 2 over the 20-point window.

use super::point::{Field, IndicatorPoint};
use super::sma::compute_sma;
use super::{finite, truncates};
use crate::types::ShortInputPolicy;

/// Add `stdDev<period>` to every point, using the point's existing
/// `sma<period>` as the window mean.
///
/// A point whose `sma<period>` is missing gets `None`, as does any window
/// holding a missing or non-finite value.
pub fn compute_std_dev(
    points: &[IndicatorPoint],
    period: usize,
    field: Field,
    policy: ShortInputPolicy,
) -> Vec<IndicatorPoint> {
    if truncates(policy, period, period, points.len()) {
        return Vec::new();
    }

    points
        .iter()
        .enumerate()
        .map(|(i, point)| {
            let mut out = point.clone();
            out.std_dev
                .insert(period, population_std_dev(points, i, period, field));
            out
        })
        .collect()
}

/// Compute `sma<period>`, `stdDev<period>` and the upper/lower bands.
///
/// Bands are `None` unless both the SMA and the deviation exist at that point.
/// Because σ ≥ 0, `upper_band >= sma >= lower_band` whenever all three are set.
pub fn compute_bollinger(
    points: &[IndicatorPoint],
    period: usize,
    field: Field,
    multiplier: f64,
    policy: ShortInputPolicy,
) -> Vec<IndicatorPoint> {
    let with_sma = compute_sma(points, period, field, policy);
    let with_std = compute_std_dev(&with_sma, period, field, policy);

    with_std
        .into_iter()
        .map(|mut point| {
            // Both bands or neither.
            let bands = point
                .sma(period)
                .zip(point.std_dev(period))
                .and_then(|(middle, sigma)| {
                    finite(middle + multiplier * sigma).zip(finite(middle - multiplier * sigma))
                });
            point.upper_band = bands.map(|(upper, _)| upper);
            point.lower_band = bands.map(|(_, lower)| lower);
            point
        })
        .collect()
}

fn population_std_dev(
    points: &[IndicatorPoint],
    end: usize,
    period: usize,
    field: Field,
) -> Option<f64> {
    if period == 0 || end + 1 < period {
        return None;
    }
    let mean = points[end].sma(period)?;

    let sum_sq = points[end + 1 - period..=end]
        .iter()
        .map(|p| field.read(p).map(|x| (x - mean).powi(2)))
        .sum::<Option<f64>>()?;

    finite((sum_sq / period as f64).sqrt())
}
