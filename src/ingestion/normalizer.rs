use std::collections::HashSet;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde_json::Value;

use crate::models::TradeEvent;
use crate::polymarket::RawTrade;

/// Normalize one raw record into a [`TradeEvent`].
///
/// Returns `None` when the required fields (wallet, tx hash, timestamp,
/// amount) cannot be recovered; such records are dropped by the caller, never
/// fatal. Normalizing an already-normalized record yields the same event.
pub fn normalize(raw: &RawTrade) -> Option<TradeEvent> {
    let wallet = clean_wallet(
        raw.taker_address
            .as_deref()
            .or(raw.maker_address.as_deref())
            .or(raw.user.as_deref()),
    )?;

    let tx_hash = raw
        .transaction_hash
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())?
        .to_string();

    let timestamp = raw
        .timestamp
        .as_ref()
        .or(raw.created_at.as_ref())
        .and_then(parse_timestamp)?;

    let amount = match raw.cash.as_ref().and_then(coerce_decimal) {
        Some(cash) => cash,
        None => {
            // No explicit cash field: fall back to size * price.
            let size = raw.size.as_ref().and_then(coerce_decimal)?;
            let price = raw.price.as_ref().and_then(coerce_decimal)?;
            size * price
        }
    };
    if amount < Decimal::ZERO {
        return None;
    }

    // Price is informational; keep it only when it looks like a probability.
    let price = raw
        .price
        .as_ref()
        .and_then(coerce_decimal)
        .filter(|p| *p >= Decimal::ZERO && *p <= Decimal::ONE);

    Some(TradeEvent {
        wallet,
        market_id: raw.market.clone().unwrap_or_default(),
        amount,
        price,
        timestamp,
        tx_hash,
        block_number: raw.block_number,
        market_name: raw.title.clone().unwrap_or_default(),
        category: raw.category.clone().filter(|s| !s.trim().is_empty()),
        outcome: raw.outcome.clone().filter(|s| !s.trim().is_empty()),
    })
}

/// Normalize a fetched batch, deduplicating by transaction hash (first
/// occurrence wins). Returns the events plus the count of records dropped
/// because they could not be normalized.
pub fn normalize_batch(raws: &[RawTrade]) -> (Vec<TradeEvent>, usize) {
    let mut events: Vec<TradeEvent> = Vec::with_capacity(raws.len());
    let mut seen: HashSet<String> = HashSet::new();
    let mut dropped = 0usize;
    let mut duplicates = 0usize;

    for raw in raws {
        match normalize(raw) {
            Some(event) => {
                if seen.insert(event.tx_hash.clone()) {
                    events.push(event);
                } else {
                    duplicates += 1;
                }
            }
            None => dropped += 1,
        }
    }

    if dropped > 0 || duplicates > 0 {
        tracing::debug!(dropped, duplicates, "Normalizer dropped records");
    }
    (events, dropped)
}

fn clean_wallet(address: Option<&str>) -> Option<String> {
    let trimmed = address?.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.to_lowercase())
}

/// Best-effort timestamp parser for the encodings seen in trade payloads:
/// epoch seconds, epoch milliseconds (magnitude above 1e12), or ISO-8601
/// text. Always normalized to UTC.
pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(n) => {
            let secs = n.as_i64().or_else(|| n.as_f64().map(|f| f as i64))?;
            from_epoch(secs)
        }
        Value::String(s) => {
            let text = s.trim();
            if text.is_empty() {
                return None;
            }
            if let Ok(secs) = text.parse::<i64>() {
                return from_epoch(secs);
            }
            if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
                return Some(dt.with_timezone(&Utc));
            }
            // ISO without an offset: treat as UTC.
            chrono::NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S")
                .or_else(|_| chrono::NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S"))
                .ok()
                .map(|naive| naive.and_utc())
        }
        _ => None,
    }
}

fn from_epoch(value: i64) -> Option<DateTime<Utc>> {
    // Values are seconds; anything above 1e12 is almost certainly millis.
    if value > 1_000_000_000_000 {
        DateTime::from_timestamp(value / 1000, ((value % 1000) * 1_000_000) as u32)
    } else {
        DateTime::from_timestamp(value, 0)
    }
}

/// Coerce the numeric encodings upstream sources use (JSON number or numeric
/// string) into a `Decimal`.
pub fn coerce_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(Decimal::from(i))
            } else {
                n.as_f64().and_then(|f| Decimal::try_from(f).ok())
            }
        }
        Value::String(s) => s.trim().parse::<Decimal>().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw_from(value: Value) -> RawTrade {
        serde_json::from_value(value).expect("raw trade should deserialize")
    }

    #[test]
    fn test_normalize_clob_shape() {
        let raw = raw_from(json!({
            "taker": "0xABCDEF0000000000000000000000000000000001",
            "transactionHash": "0xhash1",
            "timestamp": 1_700_000_000,
            "cash": "12500.50",
            "price": "0.42",
            "conditionId": "0xmarket1",
            "question": "Will the token launch in Q1?",
        }));

        let event = normalize(&raw).expect("should normalize");
        assert_eq!(event.wallet, "0xabcdef0000000000000000000000000000000001");
        assert_eq!(event.tx_hash, "0xhash1");
        assert_eq!(event.amount, Decimal::new(1_250_050, 2));
        assert_eq!(event.price, Some(Decimal::new(42, 2)));
        assert_eq!(event.market_id, "0xmarket1");
    }

    #[test]
    fn test_normalize_alternate_field_names() {
        let raw = raw_from(json!({
            "user": "0xUSER",
            "hash": "0xhash2",
            "created_at": "2024-06-01T12:00:00Z",
            "value": 9000,
            "market_id": "m2",
        }));

        let event = normalize(&raw).expect("should normalize");
        assert_eq!(event.wallet, "0xuser");
        assert_eq!(event.amount, Decimal::from(9000));
        assert!(event.price.is_none());
    }

    #[test]
    fn test_normalize_size_times_price_fallback() {
        let raw = raw_from(json!({
            "maker": "0xMAKER",
            "txHash": "0xhash3",
            "timestamp": "1700000000",
            "size": "1000",
            "price": "0.65",
        }));

        let event = normalize(&raw).expect("should normalize");
        assert_eq!(event.amount, Decimal::from(650));
    }

    #[test]
    fn test_normalize_drops_incomplete_records() {
        // Missing wallet
        assert!(normalize(&raw_from(json!({
            "txHash": "0x1", "timestamp": 1_700_000_000, "cash": 100
        })))
        .is_none());
        // Missing tx hash
        assert!(normalize(&raw_from(json!({
            "user": "0xa", "timestamp": 1_700_000_000, "cash": 100
        })))
        .is_none());
        // Missing timestamp
        assert!(normalize(&raw_from(json!({
            "user": "0xa", "txHash": "0x1", "cash": 100
        })))
        .is_none());
        // No recoverable amount
        assert!(normalize(&raw_from(json!({
            "user": "0xa", "txHash": "0x1", "timestamp": 1_700_000_000
        })))
        .is_none());
        // Negative amount violates the invariant
        assert!(normalize(&raw_from(json!({
            "user": "0xa", "txHash": "0x1", "timestamp": 1_700_000_000, "cash": "-5"
        })))
        .is_none());
    }

    #[test]
    fn test_parse_timestamp_millis_magnitude() {
        let secs = parse_timestamp(&json!(1_700_000_000)).unwrap();
        let millis = parse_timestamp(&json!(1_700_000_000_123i64)).unwrap();
        assert_eq!(secs.timestamp(), 1_700_000_000);
        assert_eq!(millis.timestamp(), 1_700_000_000);
    }

    #[test]
    fn test_parse_timestamp_iso_variants() {
        let with_tz = parse_timestamp(&json!("2024-06-01T12:00:00+02:00")).unwrap();
        assert_eq!(with_tz.timestamp(), 1_717_236_000);
        let naive = parse_timestamp(&json!("2024-06-01T10:00:00")).unwrap();
        assert_eq!(naive, with_tz);
    }

    #[test]
    fn test_batch_dedup_by_tx_hash() {
        let a = raw_from(json!({
            "user": "0xa", "txHash": "0xsame", "timestamp": 1_700_000_000, "cash": 100
        }));
        let b = raw_from(json!({
            "user": "0xb", "txHash": "0xsame", "timestamp": 1_700_000_100, "cash": 200
        }));

        let (events, dropped) = normalize_batch(&[a, b]);
        assert_eq!(events.len(), 1);
        assert_eq!(dropped, 0);
        // First occurrence wins
        assert_eq!(events[0].wallet, "0xa");
    }

    #[test]
    fn test_batch_counts_shape_drops() {
        let good = raw_from(json!({
            "user": "0xa", "txHash": "0x1", "timestamp": 1_700_000_000, "cash": 100
        }));
        let bad = raw_from(json!({ "user": "0xa" }));

        let (events, dropped) = normalize_batch(&[good, bad]);
        assert_eq!(events.len(), 1);
        assert_eq!(dropped, 1);
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let raw = raw_from(json!({
            "taker": "0xWallet",
            "transactionHash": "0xhash9",
            "timestamp": 1_700_000_000,
            "cash": "20000",
            "price": "0.33",
            "conditionId": "m9",
            "question": "Will X be announced?",
            "category": "Crypto",
            "outcome": "Yes",
        }));
        let first = normalize(&raw).expect("should normalize");

        // Serialize the normalized event and feed it back through the
        // normalizer as if it were a raw record.
        let reraw: RawTrade =
            serde_json::from_value(serde_json::to_value(&first).unwrap()).unwrap();
        let second = normalize(&reraw).expect("should re-normalize");

        assert_eq!(first, second);
    }
}
