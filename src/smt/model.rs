// =============================================================================
// SMT wire model
// =============================================================================
//
// The game server sends prices as integer cents and is loose about number
// encoding: the same field may arrive as `1234` or `"1234"`. Every numeric
// field is parsed leniently and left `None` when it is absent or garbage.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::types::HistoryWindow;

/// One row of the share market listing (also the `sharedetail` block).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShareQuote {
    #[serde(rename = "sID", default)]
    pub symbol: String,

    #[serde(rename = "n", default)]
    pub name: String,

    #[serde(rename = "iID", default)]
    pub industry: String,

    /// Last price, cents.
    #[serde(rename = "lp", default, deserialize_with = "lenient_f64")]
    pub last_price: Option<f64>,

    /// Last movement (change from previous close), cents.
    #[serde(rename = "lm", default, deserialize_with = "lenient_f64")]
    pub last_move: Option<f64>,

    /// Shares traded.
    #[serde(rename = "v", default, deserialize_with = "lenient_f64")]
    pub volume: Option<f64>,

    /// Last earnings per share, cents.
    #[serde(rename = "leps", default, deserialize_with = "lenient_f64")]
    pub last_eps: Option<f64>,

    /// Book value per share, cents.
    #[serde(rename = "bv", default, deserialize_with = "lenient_f64")]
    pub book_value: Option<f64>,

    /// Total shares outstanding.
    #[serde(rename = "ts", default, deserialize_with = "lenient_f64")]
    pub total_shares: Option<f64>,

    /// Most recent dividend per share, cents.
    #[serde(rename = "ld", default, deserialize_with = "lenient_f64")]
    pub last_dividend: Option<f64>,
}

/// `f=getsharemarket` response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShareMarket {
    #[serde(default)]
    pub sharemarket: Vec<ShareQuote>,
}

/// Aggregate order book for one share.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderSummary {
    /// Total bid quantity.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub bq: Option<f64>,
    /// Number of buyers.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub bn: Option<f64>,
    /// Total sell quantity (the server reports it negative).
    #[serde(default, deserialize_with = "lenient_f64")]
    pub sq: Option<f64>,
    /// Number of sellers.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub sn: Option<f64>,
}

/// `f=getsharedetail` response. Histories are newest-first cents.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShareDetail {
    #[serde(default)]
    pub sharedetail: ShareQuote,

    #[serde(default)]
    pub ordersummary: Option<OrderSummary>,

    #[serde(default, deserialize_with = "lenient_history")]
    pub sharehistory1: Vec<i64>,

    #[serde(default, deserialize_with = "lenient_history")]
    pub sharehistory5: Vec<i64>,

    #[serde(default, deserialize_with = "lenient_history")]
    pub sharehistory15: Vec<i64>,

    #[serde(default, deserialize_with = "lenient_history")]
    pub sharehistory60: Vec<i64>,
}

impl ShareDetail {
    pub fn history(&self, window: HistoryWindow) -> &[i64] {
        match window {
            HistoryWindow::OneMonth => &self.sharehistory1,
            HistoryWindow::FiveMonths => &self.sharehistory5,
            HistoryWindow::FifteenMonths => &self.sharehistory15,
            HistoryWindow::SixtyMonths => &self.sharehistory60,
        }
    }
}

// =============================================================================
// Lenient number parsing
// =============================================================================

fn value_to_f64(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(value_to_f64))
}

/// Entries that are not numbers are dropped; a `null` history is empty.
fn lenient_history<'de, D>(deserializer: D) -> Result<Vec<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(values
        .iter()
        .filter_map(value_to_f64)
        .map(|v| v.round() as i64)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quote_accepts_numbers_and_strings() {
        let json = r#"{
            "sID": "APX", "n": "Apex Corp", "iID": "Technology",
            "lp": "1234", "lm": -56, "v": 1000, "leps": "80",
            "bv": 500000, "ts": "10000", "ld": null
        }"#;
        let quote: ShareQuote = serde_json::from_str(json).unwrap();
        assert_eq!(quote.symbol, "APX");
        assert_eq!(quote.last_price, Some(1234.0));
        assert_eq!(quote.last_move, Some(-56.0));
        assert_eq!(quote.last_eps, Some(80.0));
        assert_eq!(quote.total_shares, Some(10000.0));
        assert_eq!(quote.last_dividend, None);
    }

    #[test]
    fn quote_tolerates_missing_and_garbage_fields() {
        let quote: ShareQuote = serde_json::from_str(r#"{ "sID": "X", "lp": "n/a" }"#).unwrap();
        assert_eq!(quote.symbol, "X");
        assert_eq!(quote.last_price, None);
        assert_eq!(quote.volume, None);
        assert!(quote.name.is_empty());
    }

    #[test]
    fn detail_histories() {
        let json = r#"{
            "sharedetail": { "sID": "APX", "lp": 1200 },
            "ordersummary": { "bq": 500, "bn": 4, "sq": -300, "sn": 2 },
            "sharehistory1": [1200, "1190", 1180.0, "bad"],
            "sharehistory60": null
        }"#;
        let detail: ShareDetail = serde_json::from_str(json).unwrap();
        assert_eq!(detail.history(HistoryWindow::OneMonth), &[1200, 1190, 1180]);
        assert!(detail.history(HistoryWindow::FiveMonths).is_empty());
        assert!(detail.history(HistoryWindow::SixtyMonths).is_empty());
        assert_eq!(detail.ordersummary.unwrap().sq, Some(-300.0));
    }

    #[test]
    fn market_listing_defaults_to_empty() {
        let market: ShareMarket = serde_json::from_str("{}").unwrap();
        assert!(market.sharemarket.is_empty());
    }
}
