use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{RiskTier, SignalTier};

/// The first qualifying trade that pulled a wallet into the result set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FirstAction {
    pub amount: Decimal,
    pub market_id: String,
    pub market_name: String,
    pub category: Option<String>,
    pub insider_risk: RiskTier,
    pub outcome: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub tx_hash: String,
}

/// Terminal output of the screening engine: one qualified wallet with its
/// score and tier. Created once per wallet per run, immutable thereafter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredWallet {
    pub wallet: String,
    /// USDC balance at the first action's reference block.
    pub balance: Decimal,
    /// Bet amount / balance; 0 when the balance is below the minimum for a
    /// meaningful ratio.
    pub conviction_ratio: Decimal,
    /// Heuristic insider score in [0, 1].
    pub insider_score: Decimal,
    pub cluster_id: Option<String>,
    pub tier: SignalTier,
    /// On-chain transactions strictly before the first action.
    pub prior_tx_count: Option<u64>,
    /// Low prior on-chain activity: `prior_tx_count <= fresh_max_prior_tx`.
    pub fresh: bool,
    pub first_action: FirstAction,
}

impl ScoredWallet {
    /// polymarket.com event page for the first-action market, when known.
    pub fn market_url(&self) -> Option<String> {
        if self.first_action.market_id.is_empty() {
            None
        } else {
            Some(format!(
                "https://polymarket.com/markets/{}",
                self.first_action.market_id
            ))
        }
    }

    pub fn polygonscan_url(&self) -> String {
        format!("https://polygonscan.com/tx/{}", self.first_action.tx_hash)
    }
}

/// Run-level counters handed to the report alongside the ranked list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScreenSummary {
    pub events_fetched: usize,
    /// Raw records dropped at the normalizer boundary.
    pub events_dropped: usize,
    pub wallets_grouped: usize,
    /// Wallets skipped because an oracle lookup failed.
    pub wallets_skipped: usize,
    pub strong: usize,
    pub medium: usize,
    pub weak: usize,
}

impl ScreenSummary {
    pub fn qualified(&self) -> usize {
        self.strong + self.medium + self.weak
    }
}
