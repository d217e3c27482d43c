use rust_decimal::Decimal;
use std::env;

const DEFAULT_DATA_API_BASE: &str = "https://data-api.polymarket.com";

/// Default keyword list for insider-risk-prone market types: token launches,
/// political appointments, awards, M&A, scheduled announcements.
const DEFAULT_RISK_KEYWORDS: &[&str] = &[
    "airdrop",
    "token launch",
    "tge",
    "mainnet",
    "government",
    "appointment",
    "cabinet",
    "secretary",
    "award",
    "nobel",
    "oscar",
    "grammy",
    "merger",
    "acquisition",
    "m&a",
    "ipo",
    "announcement",
    "release date",
    "launch date",
];

/// Immutable run configuration. All screening thresholds live here so tests
/// can vary them in isolation.
#[derive(Debug, Clone)]
pub struct ScreenConfig {
    // Endpoints
    pub polygon_rpc_url: String,
    pub data_api_base: String,

    // Fetch window
    pub lookback_days: i64,
    pub fetch_limit: usize,

    // Screening thresholds
    /// Absolute floor: first-action amounts below this never qualify.
    pub min_amount_floor: Decimal,
    /// Secondary floor, also the WEAK-tier bet-size requirement.
    pub min_bet_margin: Decimal,
    /// Absolute balance threshold for the WEAK path.
    pub min_wallet_balance: Decimal,
    pub min_conviction_ratio: Decimal,
    /// Below this balance the conviction ratio is forced to zero.
    pub min_balance_for_conviction: Decimal,
    /// Placeholder-balance multiplier for the cheap prefilter. Arbitrary but
    /// tunable; 10 matches the historical default.
    pub estimated_balance_multiplier: Decimal,
    pub fresh_max_prior_tx: u64,

    // Cluster detection
    pub min_cluster_size: usize,
    pub cluster_window_days: i64,

    // Market risk
    pub insider_risk_keywords: Vec<String>,

    // Export
    pub csv_path: Option<String>,
    pub json_path: Option<String>,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            polygon_rpc_url: String::new(),
            data_api_base: DEFAULT_DATA_API_BASE.into(),
            lookback_days: 7,
            fetch_limit: 500,
            min_amount_floor: Decimal::from(500),
            min_bet_margin: Decimal::from(5_000),
            min_wallet_balance: Decimal::from(50_000),
            min_conviction_ratio: Decimal::new(10, 2),
            min_balance_for_conviction: Decimal::from(1_000),
            estimated_balance_multiplier: Decimal::from(10),
            fresh_max_prior_tx: 3,
            min_cluster_size: 3,
            cluster_window_days: 7,
            insider_risk_keywords: DEFAULT_RISK_KEYWORDS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            csv_path: None,
            json_path: None,
        }
    }
}

impl ScreenConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();

        let keywords_raw = env::var("INSIDER_RISK_KEYWORDS").unwrap_or_default();
        let insider_risk_keywords: Vec<String> = if keywords_raw.trim().is_empty() {
            defaults.insider_risk_keywords
        } else {
            keywords_raw
                .split(',')
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect()
        };

        Ok(Self {
            polygon_rpc_url: env::var("POLYGON_RPC_URL")
                .map_err(|_| anyhow::anyhow!("POLYGON_RPC_URL must be set"))?,
            data_api_base: env::var("DATA_API_BASE").unwrap_or(defaults.data_api_base),

            lookback_days: parse_env("LOOKBACK_DAYS", defaults.lookback_days),
            fetch_limit: parse_env("FETCH_LIMIT", defaults.fetch_limit),

            min_amount_floor: parse_env("MIN_AMOUNT_FLOOR", defaults.min_amount_floor),
            min_bet_margin: parse_env("MIN_BET_MARGIN", defaults.min_bet_margin),
            min_wallet_balance: parse_env("MIN_WALLET_BALANCE", defaults.min_wallet_balance),
            min_conviction_ratio: parse_env(
                "MIN_CONVICTION_RATIO",
                defaults.min_conviction_ratio,
            ),
            min_balance_for_conviction: parse_env(
                "MIN_BALANCE_FOR_CONVICTION",
                defaults.min_balance_for_conviction,
            ),
            estimated_balance_multiplier: parse_env(
                "ESTIMATED_BALANCE_MULTIPLIER",
                defaults.estimated_balance_multiplier,
            ),
            fresh_max_prior_tx: parse_env("FRESH_MAX_PRIOR_TX", defaults.fresh_max_prior_tx),

            min_cluster_size: parse_env("MIN_CLUSTER_SIZE", defaults.min_cluster_size),
            cluster_window_days: parse_env("CLUSTER_WINDOW_DAYS", defaults.cluster_window_days),

            insider_risk_keywords,

            csv_path: env::var("CSV_EXPORT_PATH").ok().filter(|s| !s.is_empty()),
            json_path: env::var("JSON_EXPORT_PATH").ok().filter(|s| !s.is_empty()),
        })
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_keywords_nonempty() {
        let cfg = ScreenConfig::default();
        assert!(cfg.insider_risk_keywords.contains(&"airdrop".to_string()));
        assert!(cfg.insider_risk_keywords.len() > 10);
    }

    #[test]
    fn test_default_thresholds() {
        let cfg = ScreenConfig::default();
        assert_eq!(cfg.min_conviction_ratio, Decimal::new(10, 2));
        assert_eq!(cfg.min_cluster_size, 3);
        assert_eq!(cfg.cluster_window_days, 7);
    }
}
