// =============================================================================
// Market Summaries — fundamentals and the ticker strip
// =============================================================================
//
// The game server quotes prices, moves, EPS, dividends and book value per
// share in integer cents; volume and share counts are plain integers. Every
// ratio here is `None` when its base is zero or negative.
// =============================================================================

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::indicators::{finite, PRICE_SCALE};
use crate::smt::ShareQuote;

/// Number of shares shown on the ticker strip.
pub const TICKER_LEN: usize = 15;

/// Decimal fundamentals for one share.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StockSummary {
    pub symbol: String,
    pub company_name: String,
    pub industry: String,
    pub price: f64,
    pub change: f64,
    pub change_percent: Option<f64>,
    pub volume: f64,
    pub market_cap: Option<f64>,
    pub pe: Option<f64>,
    pub pb: Option<f64>,
    pub dividend_yield: Option<f64>,
}

impl StockSummary {
    /// Convert a raw quote. Missing cents fields read as zero; every ratio
    /// with a zero or negative base is `None`.
    pub fn from_quote(quote: &ShareQuote) -> Self {
        let cents = |v: Option<f64>| v.unwrap_or(0.0) / PRICE_SCALE;

        let price = cents(quote.last_price);
        let change = cents(quote.last_move);
        let eps = cents(quote.last_eps);
        let dividend = cents(quote.last_dividend);
        let book_value = cents(quote.book_value);

        Self {
            symbol: quote.symbol.clone(),
            company_name: quote.name.clone(),
            industry: quote.industry.clone(),
            price,
            change,
            change_percent: ratio(change, price).map(|r| r * 100.0),
            volume: quote.volume.unwrap_or(0.0),
            market_cap: quote.total_shares.and_then(|ts| finite(price * ts)),
            pe: positive(eps).and_then(|eps| ratio(price, eps)),
            pb: positive(book_value).and_then(|bv| ratio(price, bv)),
            dividend_yield: positive(dividend)
                .and_then(|d| ratio(d, price))
                .map(|r| r * 100.0),
        }
    }
}

/// One entry on the ticker strip.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickerEntry {
    pub symbol: String,
    pub price: f64,
    pub change_percent: Option<f64>,
}

/// The first [`TICKER_LEN`] shares in listing order.
pub fn ticker(summaries: &[StockSummary]) -> Vec<TickerEntry> {
    summaries
        .iter()
        .take(TICKER_LEN)
        .map(|s| TickerEntry {
            symbol: s.symbol.clone(),
            price: s.price,
            change_percent: s.change_percent,
        })
        .collect()
}

/// Latest refreshed share listing.
#[derive(Debug, Clone, Serialize)]
pub struct MarketSnapshot {
    pub fetched_at: DateTime<Utc>,
    pub summaries: Vec<StockSummary>,
}

impl MarketSnapshot {
    pub fn from_quotes(quotes: &[ShareQuote], fetched_at: DateTime<Utc>) -> Self {
        Self {
            fetched_at,
            summaries: quotes.iter().map(StockSummary::from_quote).collect(),
        }
    }
}

fn positive(value: f64) -> Option<f64> {
    (value > 0.0).then_some(value)
}

/// `numerator / denominator`, or `None` for a zero divisor or a non-finite
/// result.
fn ratio(numerator: f64, denominator: f64) -> Option<f64> {
    if denominator == 0.0 {
        return None;
    }
    finite(numerator / denominator)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quote() -> ShareQuote {
        ShareQuote {
            symbol: "APX".into(),
            name: "Apex Corp".into(),
            industry: "Technology".into(),
            last_price: Some(2000.0),
            last_move: Some(-100.0),
            volume: Some(5000.0),
            last_eps: Some(400.0),
            book_value: Some(1000.0),
            total_shares: Some(10_000.0),
            last_dividend: Some(50.0),
        }
    }

    #[test]
    fn fundamentals_from_cents() {
        let s = StockSummary::from_quote(&quote());
        assert!((s.price - 20.0).abs() < 1e-12);
        assert!((s.change + 1.0).abs() < 1e-12);
        assert!((s.change_percent.unwrap() + 5.0).abs() < 1e-12);
        assert!((s.market_cap.unwrap() - 200_000.0).abs() < 1e-9);
        // 20 / 4
        assert!((s.pe.unwrap() - 5.0).abs() < 1e-12);
        // 20 / (1000 / 100)
        assert!((s.pb.unwrap() - 2.0).abs() < 1e-12);
        // 0.5 / 20 * 100
        assert!((s.dividend_yield.unwrap() - 2.5).abs() < 1e-12);
    }

    #[test]
    fn zero_bases_give_none() {
        let mut q = quote();
        q.last_price = Some(0.0);
        q.last_eps = Some(0.0);
        q.book_value = Some(0.0);
        q.last_dividend = None;
        let s = StockSummary::from_quote(&q);
        assert_eq!(s.change_percent, None);
        assert_eq!(s.pe, None);
        assert_eq!(s.pb, None);
        assert_eq!(s.dividend_yield, None);
        assert_eq!(s.market_cap, Some(0.0));
    }

    #[test]
    fn book_value_is_per_share_cents() {
        let mut q = quote();
        q.book_value = Some(500.0);
        q.total_shares = Some(10_000.0);
        // 20 / 5.00, independent of the share count
        assert!((StockSummary::from_quote(&q).pb.unwrap() - 4.0).abs() < 1e-12);

        q.total_shares = None;
        assert!((StockSummary::from_quote(&q).pb.unwrap() - 4.0).abs() < 1e-12);

        q.book_value = Some(-10.0);
        assert_eq!(StockSummary::from_quote(&q).pb, None);
    }

    #[test]
    fn negative_eps_has_no_pe() {
        let mut q = quote();
        q.last_eps = Some(-120.0);
        assert_eq!(StockSummary::from_quote(&q).pe, None);
    }

    #[test]
    fn empty_quote_is_all_zero_or_none() {
        let s = StockSummary::from_quote(&ShareQuote::default());
        assert_eq!(s.price, 0.0);
        assert_eq!(s.volume, 0.0);
        assert_eq!(s.market_cap, None);
        assert_eq!(s.pe, None);
    }

    #[test]
    fn ticker_is_capped() {
        let quotes: Vec<ShareQuote> = (0..20)
            .map(|i| ShareQuote {
                symbol: format!("S{i}"),
                last_price: Some(100.0 + i as f64),
                ..ShareQuote::default()
            })
            .collect();
        let snapshot = MarketSnapshot::from_quotes(&quotes, Utc::now());
        let strip = ticker(&snapshot.summaries);
        assert_eq!(strip.len(), TICKER_LEN);
        assert_eq!(strip[0].symbol, "S0");
        assert_eq!(strip[14].symbol, "S14");
    }
}
