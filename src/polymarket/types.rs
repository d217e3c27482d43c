use serde::{Deserialize, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// Raw trade record (Data API / chain indexer)
// ---------------------------------------------------------------------------

/// One raw trade/transfer row, tolerant of the field-naming conventions seen
/// across upstream sources. Numeric fields arrive as numbers in some payloads
/// and strings in others, so they stay `serde_json::Value` until the
/// normalizer coerces them.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RawTrade {
    #[serde(alias = "takerAddress", alias = "taker")]
    pub taker_address: Option<String>,
    #[serde(alias = "makerAddress", alias = "maker")]
    pub maker_address: Option<String>,
    #[serde(alias = "userAddress", alias = "wallet")]
    pub user: Option<String>,

    #[serde(alias = "transactionHash", alias = "txHash", alias = "hash", alias = "tx_hash")]
    pub transaction_hash: Option<String>,
    #[serde(alias = "blockNumber")]
    pub block_number: Option<u64>,

    #[serde(alias = "createdAt")]
    pub created_at: Option<Value>,
    pub timestamp: Option<Value>,

    /// Cash at risk, under whichever name the source uses.
    #[serde(alias = "quoteAmount", alias = "value", alias = "quantityUsd", alias = "amount")]
    pub cash: Option<Value>,
    pub size: Option<Value>,
    pub price: Option<Value>,

    #[serde(alias = "conditionId", alias = "condition_id", alias = "market_id", alias = "marketId")]
    pub market: Option<String>,
    #[serde(alias = "question", alias = "marketName", alias = "market_name")]
    pub title: Option<String>,
    #[serde(alias = "eventCategory")]
    pub category: Option<String>,
    pub outcome: Option<String>,
}

// ---------------------------------------------------------------------------
// Market (Data API)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiMarket {
    #[serde(alias = "conditionId")]
    pub condition_id: String,
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

/// Market text handed to the risk classifier. `text` falls back to the
/// "unknown" placeholder when the lookup is inconclusive.
#[derive(Debug, Clone)]
pub struct MarketDescription {
    pub text: String,
    pub category: Option<String>,
}

impl MarketDescription {
    pub fn unknown() -> Self {
        Self {
            text: "unknown".into(),
            category: None,
        }
    }
}
