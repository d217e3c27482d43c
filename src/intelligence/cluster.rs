use std::collections::HashMap;

use chrono::Duration;

use crate::models::TradeEvent;

/// Detect coordinated entry: groups of at least `min_cluster_size` distinct
/// wallets whose first qualifying action on the same market falls inside a
/// `window_days` span.
///
/// Input is each wallet's first action in wallet iteration order; that order
/// is the tie-break for identical timestamps (stable sort). Returns wallet →
/// cluster id; wallets in no cluster are simply absent.
///
/// Per market, the first window reaching the minimum size wins and scanning
/// stops — this does not search for a maximal or optimal clustering. A wallet
/// keeps the first cluster it was assigned to.
pub fn detect_clusters(
    first_actions: &[(String, TradeEvent)],
    min_cluster_size: usize,
    window_days: i64,
) -> HashMap<String, String> {
    let mut clusters: HashMap<String, String> = HashMap::new();
    if min_cluster_size == 0 {
        return clusters;
    }

    // Group by market, preserving input order within and across markets.
    let mut market_order: Vec<&str> = Vec::new();
    let mut by_market: HashMap<&str, Vec<(&str, &TradeEvent)>> = HashMap::new();
    for (wallet, event) in first_actions {
        if event.market_id.is_empty() {
            continue;
        }
        let entry = by_market.entry(event.market_id.as_str()).or_default();
        if entry.is_empty() {
            market_order.push(event.market_id.as_str());
        }
        entry.push((wallet.as_str(), event));
    }

    let window = Duration::days(window_days);

    for market_id in market_order {
        let mut entries = match by_market.remove(market_id) {
            Some(e) => e,
            None => continue,
        };
        if entries.len() < min_cluster_size {
            continue;
        }

        entries.sort_by_key(|(_, event)| event.timestamp);

        for start in 0..entries.len() {
            let window_end = entries[start].1.timestamp + window;
            let members: Vec<&str> = entries[start..]
                .iter()
                .take_while(|(_, event)| event.timestamp <= window_end)
                .map(|(wallet, _)| *wallet)
                .collect();

            if members.len() >= min_cluster_size {
                let cluster_id = cluster_id_for(market_id);
                tracing::info!(
                    market = %market_id,
                    wallets = members.len(),
                    cluster = %cluster_id,
                    "Coordinated entry window detected"
                );
                for wallet in members {
                    clusters
                        .entry(wallet.to_string())
                        .or_insert_with(|| cluster_id.clone());
                }
                break;
            }
        }
    }

    clusters
}

/// Deterministic cluster identifier derived from the market. One cluster per
/// market per run, so the market prefix is unique enough and keeps runs
/// reproducible.
fn cluster_id_for(market_id: &str) -> String {
    let prefix: String = market_id.chars().take(10).collect();
    format!("cluster-{prefix}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;

    fn first_action(wallet: &str, market: &str, day_offset: i64) -> (String, TradeEvent) {
        (
            wallet.to_string(),
            TradeEvent {
                wallet: wallet.to_string(),
                market_id: market.to_string(),
                amount: Decimal::from(10_000),
                price: None,
                timestamp: Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
                    + Duration::days(day_offset),
                tx_hash: format!("0x{wallet}-{day_offset}"),
                block_number: None,
                market_name: String::new(),
                category: None,
                outcome: None,
            },
        )
    }

    #[test]
    fn test_three_wallets_inside_window_cluster() {
        let actions = vec![
            first_action("0xa", "M1", 0),
            first_action("0xb", "M1", 2),
            first_action("0xc", "M1", 6),
        ];

        let clusters = detect_clusters(&actions, 3, 7);
        assert_eq!(clusters.len(), 3);
        let id = &clusters["0xa"];
        assert_eq!(&clusters["0xb"], id);
        assert_eq!(&clusters["0xc"], id);
    }

    #[test]
    fn test_late_wallet_excluded_from_window() {
        let actions = vec![
            first_action("0xa", "M1", 0),
            first_action("0xb", "M1", 2),
            first_action("0xc", "M1", 6),
            first_action("0xd", "M1", 10),
        ];

        let clusters = detect_clusters(&actions, 3, 7);
        assert_eq!(clusters.len(), 3);
        assert!(!clusters.contains_key("0xd"));
    }

    #[test]
    fn test_below_min_size_never_clusters() {
        // Exactly min_cluster_size - 1 co-timed wallets
        let actions = vec![first_action("0xa", "M1", 0), first_action("0xb", "M1", 1)];

        let clusters = detect_clusters(&actions, 3, 7);
        assert!(clusters.is_empty());
    }

    #[test]
    fn test_separate_markets_form_separate_clusters() {
        let actions = vec![
            first_action("0xa", "M1", 0),
            first_action("0xb", "M1", 1),
            first_action("0xc", "M1", 2),
            first_action("0xd", "M2", 0),
            first_action("0xe", "M2", 1),
            first_action("0xf", "M2", 2),
        ];

        let clusters = detect_clusters(&actions, 3, 7);
        assert_eq!(clusters.len(), 6);
        assert_ne!(clusters["0xa"], clusters["0xd"]);
    }

    #[test]
    fn test_first_window_wins_not_maximal() {
        // A later, larger window exists (days 8..10 with 4 wallets) but the
        // scan stops at the first window that reaches the minimum size.
        let actions = vec![
            first_action("0xa", "M1", 0),
            first_action("0xb", "M1", 3),
            first_action("0xc", "M1", 6),
            first_action("0xd", "M1", 8),
            first_action("0xe", "M1", 9),
            first_action("0xf", "M1", 10),
        ];

        let clusters = detect_clusters(&actions, 3, 7);
        // First window starts at day 0 and captures a, b, c (and nothing
        // later); d/e/f are only reachable by a start the scan never tries.
        assert!(clusters.contains_key("0xa"));
        assert!(clusters.contains_key("0xb"));
        assert!(clusters.contains_key("0xc"));
        assert!(!clusters.contains_key("0xf"));
    }

    #[test]
    fn test_deterministic_for_fixed_input() {
        let actions = vec![
            first_action("0xa", "M1", 0),
            first_action("0xb", "M1", 2),
            first_action("0xc", "M1", 6),
        ];

        let first = detect_clusters(&actions, 3, 7);
        let second = detect_clusters(&actions, 3, 7);
        assert_eq!(first, second);
    }
}
