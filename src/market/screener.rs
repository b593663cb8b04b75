// =============================================================================
// Stock Screener
// =============================================================================
//
// Every bound is optional and inclusive. A bound on a ratio (P/E, P/B,
// dividend yield) excludes shares for which that ratio is undefined.

use serde::Deserialize;

use super::summary::StockSummary;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenFilters {
    #[serde(default)]
    pub min_price: Option<f64>,
    #[serde(default)]
    pub max_price: Option<f64>,
    #[serde(default)]
    pub min_volume: Option<f64>,
    #[serde(default)]
    pub max_volume: Option<f64>,
    #[serde(default, rename = "minPE")]
    pub min_pe: Option<f64>,
    #[serde(default, rename = "maxPE")]
    pub max_pe: Option<f64>,
    #[serde(default, rename = "minPB")]
    pub min_pb: Option<f64>,
    #[serde(default, rename = "maxPB")]
    pub max_pb: Option<f64>,
    #[serde(default)]
    pub min_dividend_yield: Option<f64>,
    #[serde(default)]
    pub max_dividend_yield: Option<f64>,
    /// Case-insensitive substring of the industry name.
    #[serde(default)]
    pub sector: Option<String>,
}

impl ScreenFilters {
    pub fn matches(&self, stock: &StockSummary) -> bool {
        within(Some(stock.price), self.min_price, self.max_price)
            && within(Some(stock.volume), self.min_volume, self.max_volume)
            && within(stock.pe, self.min_pe, self.max_pe)
            && within(stock.pb, self.min_pb, self.max_pb)
            && within(
                stock.dividend_yield,
                self.min_dividend_yield,
                self.max_dividend_yield,
            )
            && self.sector_matches(&stock.industry)
    }

    /// Keep the matching shares, in listing order.
    pub fn apply(&self, stocks: &[StockSummary]) -> Vec<StockSummary> {
        stocks.iter().filter(|s| self.matches(s)).cloned().collect()
    }

    fn sector_matches(&self, industry: &str) -> bool {
        match self.sector.as_deref().map(str::trim) {
            Some(sector) if !sector.is_empty() => {
                industry.to_lowercase().contains(&sector.to_lowercase())
            }
            _ => true,
        }
    }
}

fn within(value: Option<f64>, min: Option<f64>, max: Option<f64>) -> bool {
    if min.is_none() && max.is_none() {
        return true;
    }
    let Some(value) = value else {
        return false;
    };
    min.map_or(true, |m| value >= m) && max.map_or(true, |m| value <= m)
}
