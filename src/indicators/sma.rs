// =============================================================================
// Simple Moving Average (SMA)
// =============================================================================
//
// sma<N>[i] = mean(field[i-N+1 ..= i])   for i >= N - 1
//           = null                       otherwise
//
// A direct trailing-window mean; windows are short (5 and 20 on the
// dashboard) so no running-sum bookkeeping is kept.
// =============================================================================

use super::point::{Field, IndicatorPoint};
use super::{finite, truncates};
use crate::types::ShortInputPolicy;

/// Add `sma<period>` to every point.
///
/// # Edge cases
/// - Points with fewer than `period` values up to and including themselves
///   get `None`.
/// - A window containing a missing or non-finite value yields `None`.
/// - `period == 0` yields `None` everywhere.
/// - With [`ShortInputPolicy::Empty`], input shorter than `period` returns an
///   empty vec.
pub fn compute_sma(
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
            out.sma.insert(period, window_mean(points, i, period, field));
            out
        })
        .collect()
}

/// Mean of `field` over the `period` points ending at `end` (inclusive).
pub(crate) fn window_mean(
    points: &[IndicatorPoint],
    end: usize,
    period: usize,
    field: Field,
) -> Option<f64> {
    if period == 0 || end + 1 < period || end >= points.len() {
        return None;
    }

    let sum = points[end + 1 - period..=end]
        .iter()
        .map(|p| field.read(p))
        .sum::<Option<f64>>()?;

    finite(sum / period as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::normalize::normalize_history;

    fn series(raw_oldest_first: &[i64]) -> Vec<IndicatorPoint> {
        let newest_first: Vec<i64> = raw_oldest_first.iter().rev().copied().collect();
        normalize_history(&newest_first)
            .into_iter()
            .map(IndicatorPoint::from)
            .collect()
    }

    #[test]
    fn null_until_window_is_full() {
        let points = series(&[100, 200, 300, 400, 500, 600]);
        let out = compute_sma(&points, 3, Field::Price, ShortInputPolicy::NullPad);
        assert_eq!(out.len(), points.len());
        assert_eq!(out[0].sma(3), None);
        assert_eq!(out[1].sma(3), None);
        for p in &out[2..] {
            assert!(p.sma(3).is_some());
        }
    }

    #[test]
    fn known_values() {
        let points = series(&[100, 200, 300, 400, 500, 600]);
        let out = compute_sma(&points, 3, Field::Price, ShortInputPolicy::NullPad);
        let expected = [2.0, 3.0, 4.0, 5.0];
        for (p, want) in out[2..].iter().zip(expected) {
            assert!((p.sma(3).unwrap() - want).abs() < 1e-12);
        }
    }

    #[test]
    fn preserves_existing_fields() {
        let points = series(&[100, 200, 300, 400, 500]);
        let with_two = compute_sma(&points, 2, Field::Price, ShortInputPolicy::NullPad);
        let with_both = compute_sma(&with_two, 4, Field::Price, ShortInputPolicy::NullPad);
        assert!((with_both[4].sma(2).unwrap() - 4.5).abs() < 1e-12);
        assert!((with_both[4].sma(4).unwrap() - 3.5).abs() < 1e-12);
        assert_eq!(with_both[4].index, 5);
    }

    #[test]
    fn short_input_null_pad() {
        let points = series(&[100, 200, 300]);
        let out = compute_sma(&points, 5, Field::Price, ShortInputPolicy::NullPad);
        assert_eq!(out.len(), 3);
        assert!(out.iter().all(|p| p.sma(5).is_none()));
    }

    #[test]
    fn short_input_empty_policy() {
        let points = series(&[100, 200, 300]);
        assert!(compute_sma(&points, 5, Field::Price, ShortInputPolicy::Empty).is_empty());
        assert_eq!(
            compute_sma(&points, 3, Field::Price, ShortInputPolicy::Empty).len(),
            3
        );
    }

    #[test]
    fn period_zero_is_all_null() {
        let points = series(&[100, 200]);
        let out = compute_sma(&points, 0, Field::Price, ShortInputPolicy::NullPad);
        assert!(out.iter().all(|p| p.sma(0).is_none()));
    }

    #[test]
    fn smoothing_an_sma_skips_null_windows() {
        let points = series(&[100, 200, 300, 400, 500, 600]);
        let first = compute_sma(&points, 2, Field::Price, ShortInputPolicy::NullPad);
        let second = compute_sma(&first, 3, Field::Sma(2), ShortInputPolicy::NullPad);
        // sma2 is null at index 0, so sma3-of-sma2 first exists at index 3.
        assert_eq!(second[2].sma(3), None);
        // mean(1.5, 2.5, 3.5) = 2.5
        assert!((second[3].sma(3).unwrap() - 2.5).abs() < 1e-12);
    }

    #[test]
    fn nan_price_only_poisons_its_windows() {
        let mut points = series(&[100, 100, 100, 100, 100]);
        points[1].price = f64::NAN;
        let out = compute_sma(&points, 2, Field::Price, ShortInputPolicy::NullPad);
        assert_eq!(out[1].sma(2), None);
        assert_eq!(out[2].sma(2), None);
        assert_eq!(out[3].sma(2), Some(1.0));
    }
}
