// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free stages that turn a raw fixed-point price history into
// a chart-ready series. Every stage takes a slice of points and returns a new
// vector; nothing is mutated in place and nothing is cached between calls.
//
// Numeric edge cases never raise. A value that cannot be computed (too little
// history, a zero divisor, a non-finite intermediate) is stored as `None` and
// serialised as `null`.

pub mod bollinger;
pub mod crossover;
pub mod normalize;
pub mod pipeline;
pub mod point;
pub mod rsi;
pub mod sma;

pub use bollinger::{compute_bollinger, compute_std_dev};
pub use crossover::detect_signals;
pub use normalize::{normalize_history, PRICE_SCALE};
pub use pipeline::{build_chart, build_charts, WindowChart};
pub use point::{Field, IndicatorPoint, PricePoint};
pub use rsi::compute_rsi;
pub use sma::compute_sma;

use crate::types::ShortInputPolicy;

/// Replace a non-finite result with `None`.
pub(crate) fn finite(value: f64) -> Option<f64> {
    if value.is_finite() {
        Some(value)
    } else {
        None
    }
}

/// Whether a stage must return an empty vector instead of a null-padded one.
///
/// Only the legacy [`ShortInputPolicy::Empty`] policy truncates, and only when
/// the input holds fewer than `required` points (or the period is zero).
pub(crate) fn truncates(policy: ShortInputPolicy, period: usize, required: usize, len: usize) -> bool {
    policy == ShortInputPolicy::Empty && (period == 0 || len < required)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finite_filters_nan_and_infinity() {
        assert_eq!(finite(1.5), Some(1.5));
        assert_eq!(finite(f64::NAN), None);
        assert_eq!(finite(f64::INFINITY), None);
        assert_eq!(finite(f64::NEG_INFINITY), None);
    }

    #[test]
    fn null_pad_never_truncates() {
        assert!(!truncates(ShortInputPolicy::NullPad, 0, 0, 0));
        assert!(!truncates(ShortInputPolicy::NullPad, 20, 20, 3));
    }

    #[test]
    fn empty_policy_truncates_short_input_only() {
        assert!(truncates(ShortInputPolicy::Empty, 5, 5, 3));
        assert!(truncates(ShortInputPolicy::Empty, 0, 0, 10));
        assert!(!truncates(ShortInputPolicy::Empty, 5, 5, 5));
    }
}
