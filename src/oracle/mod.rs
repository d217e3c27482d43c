pub mod cache;

pub use cache::MemoCache;

use async_trait::async_trait;
use rust_decimal::Decimal;
use thiserror::Error;

/// USDC on Polygon (6 decimals).
const POLYGON_USDC: &str = "0x2791bca1f2de4661ed88a30c99a7a9449aa84174";
const USDC_DECIMALS: u32 = 6;

/// Function selector for ERC-20 balanceOf(address).
const BALANCE_OF_SELECTOR: &str = "70a08231";

#[derive(Debug, Error)]
pub enum OracleError {
    #[error("RPC request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("RPC error response: {0}")]
    Rpc(String),

    #[error("malformed RPC payload: {0}")]
    Malformed(String),
}

/// Historical reference point for balance and activity lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockRef {
    Number(u64),
    Latest,
}

impl BlockRef {
    fn as_tag(&self) -> String {
        match self {
            BlockRef::Number(n) => format!("0x{n:x}"),
            BlockRef::Latest => "latest".into(),
        }
    }

    /// The block immediately before this reference; "strictly before" lookups
    /// use it so the reference trade itself does not count.
    fn previous(&self) -> BlockRef {
        match self {
            BlockRef::Number(n) => BlockRef::Number(n.saturating_sub(1)),
            BlockRef::Latest => BlockRef::Latest,
        }
    }
}

/// Composite memo key for oracle lookups.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OracleKey {
    pub wallet: String,
    pub block: BlockRef,
}

/// Answers the two costly historical questions about a wallet. Both calls are
/// one external round trip each, so the screening engine invokes them lazily,
/// only after the cheap in-memory prefilters have passed.
#[async_trait]
pub trait BalanceOracle: Send + Sync {
    /// USDC balance held by `wallet` at the reference block. Deterministic
    /// for a fixed reference.
    async fn balance(&self, wallet: &str, block: BlockRef) -> Result<Decimal, OracleError>;

    /// Count of the wallet's on-chain transactions strictly before the
    /// reference block. Low count means a fresh wallet.
    async fn prior_activity_count(
        &self,
        wallet: &str,
        block: BlockRef,
    ) -> Result<u64, OracleError>;
}

/// JSON-RPC oracle against a Polygon endpoint. Balances come from an
/// `eth_call` of USDC `balanceOf`, activity counts from
/// `eth_getTransactionCount`. Results are memoized for the run's lifetime.
pub struct PolygonOracle {
    http: reqwest::Client,
    rpc_url: String,
    balances: MemoCache<OracleKey, Decimal>,
    tx_counts: MemoCache<OracleKey, u64>,
}

impl PolygonOracle {
    pub fn new(http: reqwest::Client, rpc_url: String) -> Self {
        Self {
            http,
            rpc_url,
            balances: MemoCache::new(),
            tx_counts: MemoCache::new(),
        }
    }

    async fn rpc_call(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<String, OracleError> {
        let body = serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });

        let resp: serde_json::Value = self
            .http
            .post(&self.rpc_url)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if let Some(err) = resp.get("error") {
            return Err(OracleError::Rpc(err.to_string()));
        }

        resp.get("result")
            .and_then(|r| r.as_str())
            .map(str::to_string)
            .ok_or_else(|| OracleError::Malformed("missing result field".into()))
    }
}

#[async_trait]
impl BalanceOracle for PolygonOracle {
    async fn balance(&self, wallet: &str, block: BlockRef) -> Result<Decimal, OracleError> {
        let key = OracleKey {
            wallet: wallet.to_lowercase(),
            block,
        };
        if let Some(cached) = self.balances.get(&key) {
            return Ok(cached);
        }

        let data = encode_balance_of(&key.wallet)
            .ok_or_else(|| OracleError::Malformed(format!("bad wallet address: {wallet}")))?;
        let result = self
            .rpc_call(
                "eth_call",
                serde_json::json!([
                    { "to": POLYGON_USDC, "data": data },
                    block.as_tag(),
                ]),
            )
            .await?;

        let raw = parse_hex_u64(&result)
            .ok_or_else(|| OracleError::Malformed(format!("unparseable balance: {result}")))?;
        let balance = Decimal::from(raw) / Decimal::from(10u64.pow(USDC_DECIMALS));

        self.balances.insert(key, balance);
        Ok(balance)
    }

    async fn prior_activity_count(
        &self,
        wallet: &str,
        block: BlockRef,
    ) -> Result<u64, OracleError> {
        let key = OracleKey {
            wallet: wallet.to_lowercase(),
            block,
        };
        if let Some(cached) = self.tx_counts.get(&key) {
            return Ok(cached);
        }

        let result = self
            .rpc_call(
                "eth_getTransactionCount",
                serde_json::json!([key.wallet, block.previous().as_tag()]),
            )
            .await?;

        let count = parse_hex_u64(&result)
            .ok_or_else(|| OracleError::Malformed(format!("unparseable tx count: {result}")))?;

        self.tx_counts.insert(key, count);
        Ok(count)
    }
}

/// ABI-encode a balanceOf(address) call: 4-byte selector + 32-byte padded
/// address.
fn encode_balance_of(wallet: &str) -> Option<String> {
    let hex = wallet.strip_prefix("0x")?;
    if hex.len() != 40 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    Some(format!("0x{BALANCE_OF_SELECTOR}{:0>64}", hex.to_lowercase()))
}

/// Parse a 0x-prefixed hex quantity. Handles both padded 32-byte words and
/// short quantities like "0x0".
fn parse_hex_u64(hex: &str) -> Option<u64> {
    let trimmed = hex
        .strip_prefix("0x")
        .unwrap_or(hex)
        .trim_start_matches('0');
    if trimmed.is_empty() {
        return Some(0);
    }
    u64::from_str_radix(trimmed, 16).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_balance_of() {
        let data = encode_balance_of("0x4bfb41d5b3570defd03c39a9a4d8de6bd8b8982e").unwrap();
        assert_eq!(
            data,
            "0x70a082310000000000000000000000004bfb41d5b3570defd03c39a9a4d8de6bd8b8982e"
        );
    }

    #[test]
    fn test_encode_balance_of_rejects_bad_input() {
        assert!(encode_balance_of("not-an-address").is_none());
        assert!(encode_balance_of("0x1234").is_none());
    }

    #[test]
    fn test_parse_hex_u64() {
        assert_eq!(parse_hex_u64("0x0"), Some(0));
        assert_eq!(
            parse_hex_u64("0x000000000000000000000000000000000000000000000000000000000000000a"),
            Some(10)
        );
        // 50 USDC in 6-decimal units
        assert_eq!(parse_hex_u64("0x2faf080"), Some(50_000_000));
        assert_eq!(parse_hex_u64("0xzz"), None);
    }

    #[test]
    fn test_block_ref_tags() {
        assert_eq!(BlockRef::Number(255).as_tag(), "0xff");
        assert_eq!(BlockRef::Latest.as_tag(), "latest");
        assert_eq!(BlockRef::Number(100).previous(), BlockRef::Number(99));
        assert_eq!(BlockRef::Number(0).previous(), BlockRef::Number(0));
        assert_eq!(BlockRef::Latest.previous(), BlockRef::Latest);
    }
}
