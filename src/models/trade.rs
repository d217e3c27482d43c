use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One normalized Polymarket trade. Built by the ingestion normalizer from a
/// raw API record and immutable afterwards.
///
/// Invariants: `wallet` and `tx_hash` are never empty, `amount >= 0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeEvent {
    /// Wallet address, lowercased.
    pub wallet: String,
    pub market_id: String,
    /// USD at risk in this trade.
    pub amount: Decimal,
    /// Execution price in [0, 1]; `None` when the source omitted it.
    pub price: Option<Decimal>,
    pub timestamp: DateTime<Utc>,
    /// Transaction hash, unique per event; dedup key within one fetch.
    pub tx_hash: String,
    /// Polygon block of the fill, when the source included it. Preferred
    /// historical reference for balance lookups.
    pub block_number: Option<u64>,
    pub market_name: String,
    pub category: Option<String>,
    pub outcome: Option<String>,
}

/// A wallet's trades inside the fetched window, ascending by timestamp.
///
/// Never empty: wallets with zero events never enter the pipeline. The first
/// element is the wallet's first *observed* action for this run, which is not
/// necessarily its first-ever action unless the window covers the wallet's
/// full lifetime.
#[derive(Debug, Clone)]
pub struct WalletHistory {
    pub wallet: String,
    pub events: Vec<TradeEvent>,
}

impl WalletHistory {
    pub fn first_action(&self) -> &TradeEvent {
        &self.events[0]
    }
}
