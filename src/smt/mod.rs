// =============================================================================
// SMT Game Server Integration
// =============================================================================
//
// Read-only access to the stock-market game server: the full share market
// listing and per-share detail (quote, order book summary, price histories).

pub mod client;
pub mod model;

pub use client::{SmtClient, SmtCredentials};
pub use model::{OrderSummary, ShareDetail, ShareMarket, ShareQuote};
