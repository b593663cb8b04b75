// =============================================================================
// Series Normalizer
// =============================================================================
//
// The game server publishes price history newest-first as integer cents.
// Charts need oldest-first decimal prices with a 1-based index.

use super::point::PricePoint;

/// Fixed-point scale of every price the game server publishes.
pub const PRICE_SCALE: f64 = 100.0;

/// Reverse a newest-first cents history into chronological [`PricePoint`]s.
///
/// An empty history yields an empty vector.
pub fn normalize_history(raw: &[i64]) -> Vec<PricePoint> {
    raw.iter()
        .rev()
        .enumerate()
        .map(|(i, &cents)| PricePoint {
            index: i + 1,
            price: cents as f64 / PRICE_SCALE,
        })
        .collect()
}
