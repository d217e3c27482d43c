pub mod trade;
pub mod wallet;

pub use trade::{TradeEvent, WalletHistory};
pub use wallet::{FirstAction, ScoredWallet, ScreenSummary};

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// SignalTier
// ---------------------------------------------------------------------------

/// Final classification of how noteworthy a wallet's activity is.
/// Variant order gives `Weak < Medium < Strong` so the ranking sort can
/// compare tiers directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignalTier {
    Weak,
    Medium,
    Strong,
}

impl SignalTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalTier::Strong => "STRONG",
            SignalTier::Medium => "MEDIUM",
            SignalTier::Weak => "WEAK",
        }
    }
}

impl fmt::Display for SignalTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// RiskTier
// ---------------------------------------------------------------------------

/// Heuristic insider-risk tier for a market: how likely its outcome is
/// influenced by privileged, non-public information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskTier {
    Low,
    Medium,
    High,
}

impl RiskTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskTier::Low => "LOW",
            RiskTier::Medium => "MEDIUM",
            RiskTier::High => "HIGH",
        }
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_ordering() {
        assert!(SignalTier::Strong > SignalTier::Medium);
        assert!(SignalTier::Medium > SignalTier::Weak);
        assert!(RiskTier::High > RiskTier::Medium);
    }

    #[test]
    fn test_tier_serde_uppercase() {
        let json = serde_json::to_string(&SignalTier::Strong).unwrap();
        assert_eq!(json, "\"STRONG\"");
        let back: SignalTier = serde_json::from_str(&json).unwrap();
        assert_eq!(back, SignalTier::Strong);
    }
}
