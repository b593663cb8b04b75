// =============================================================================
// Chart points
// =============================================================================
//
// `PricePoint` is the normalised input; `IndicatorPoint` carries every derived
// series keyed by window length. The JSON form is flat so the dashboard can
// plot `sma5`, `sma20`, `upperBand`, ... directly against `index`.

use std::collections::BTreeMap;

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use crate::types::Signal;

/// A single price observation in chronological order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PricePoint {
    /// 1-based position after reordering oldest-first.
    pub index: usize,
    /// Decimal price (raw cents divided by [`super::PRICE_SCALE`]).
    pub price: f64,
}

/// A price point extended with derived indicator values.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct IndicatorPoint {
    pub index: usize,
    pub price: f64,
    /// `sma<N>` per window length `N`.
    pub sma: BTreeMap<usize, Option<f64>>,
    /// `stdDev<N>` per Bollinger window length `N`.
    pub std_dev: BTreeMap<usize, Option<f64>>,
    pub upper_band: Option<f64>,
    pub lower_band: Option<f64>,
    pub signal: Option<Signal>,
    pub rsi: Option<f64>,
}

impl IndicatorPoint {
    pub fn sma(&self, period: usize) -> Option<f64> {
        self.sma.get(&period).copied().flatten()
    }

    pub fn std_dev(&self, period: usize) -> Option<f64> {
        self.std_dev.get(&period).copied().flatten()
    }
}

impl From<PricePoint> for IndicatorPoint {
    fn from(point: PricePoint) -> Self {
        Self {
            index: point.index,
            price: point.price,
            ..Self::default()
        }
    }
}

impl Serialize for IndicatorPoint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = 7 + self.sma.len() + self.std_dev.len();
        let mut map = serializer.serialize_map(Some(len))?;
        map.serialize_entry("index", &self.index)?;
        map.serialize_entry("price", &self.price)?;
        for (period, value) in &self.sma {
            map.serialize_entry(&format!("sma{period}"), value)?;
        }
        for (period, value) in &self.std_dev {
            map.serialize_entry(&format!("stdDev{period}"), value)?;
        }
        map.serialize_entry("upperBand", &self.upper_band)?;
        map.serialize_entry("lowerBand", &self.lower_band)?;
        map.serialize_entry("signal", &self.signal)?;
        map.serialize_entry("rsi", &self.rsi)?;
        map.end()
    }
}

/// The value a stage reads from each point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Price,
    /// A previously computed `sma<N>`; missing or null reads as `None`.
    Sma(usize),
}

impl Field {
    pub fn read(self, point: &IndicatorPoint) -> Option<f64> {
        match self {
            Self::Price => Some(point.price),
            Self::Sma(period) => point.sma(period),
        }
    }
}
