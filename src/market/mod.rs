// =============================================================================
// Market Summaries
// =============================================================================
//
// Decimal views of the raw share listing: per-share fundamentals, the ticker
// strip and the screener filters. Ratios that cannot be computed are `None`.

pub mod screener;
pub mod summary;

pub use screener::ScreenFilters;
pub use summary::{ticker, MarketSnapshot, StockSummary, TickerEntry, TICKER_LEN};
