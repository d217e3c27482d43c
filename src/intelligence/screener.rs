use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;

use crate::config::ScreenConfig;
use crate::intelligence::cluster::detect_clusters;
use crate::intelligence::risk::MarketRiskClassifier;
use crate::models::{
    FirstAction, RiskTier, ScoredWallet, ScreenSummary, SignalTier, TradeEvent, WalletHistory,
};
use crate::oracle::{BalanceOracle, BlockRef};

// Insider score bonuses. The total is clamped to 1.0.
const FRESHNESS_7D_BONUS: Decimal = Decimal::from_parts(30, 0, 0, false, 2); // 0.30
const FRESHNESS_30D_BONUS: Decimal = Decimal::from_parts(15, 0, 0, false, 2); // 0.15
const CONVICTION_HIGH_BONUS: Decimal = Decimal::from_parts(30, 0, 0, false, 2);
const CONVICTION_MID_BONUS: Decimal = Decimal::from_parts(15, 0, 0, false, 2);
const RISK_HIGH_BONUS: Decimal = Decimal::from_parts(30, 0, 0, false, 2);
const RISK_MEDIUM_BONUS: Decimal = Decimal::from_parts(15, 0, 0, false, 2);
const CLUSTER_BONUS: Decimal = Decimal::from_parts(10, 0, 0, false, 2); // 0.10

const CONVICTION_HIGH_CUTOFF: Decimal = Decimal::from_parts(25, 0, 0, false, 2); // 0.25
const CONVICTION_MID_CUTOFF: Decimal = Decimal::from_parts(10, 0, 0, false, 2); // 0.10

/// Insider score at or above this qualifies a wallet as MEDIUM on its own.
const SCORE_MEDIUM_CUTOFF: Decimal = Decimal::from_parts(60, 0, 0, false, 2); // 0.60

/// Ranked output plus run-level counters.
#[derive(Debug)]
pub struct ScreenOutcome {
    pub wallets: Vec<ScoredWallet>,
    pub summary: ScreenSummary,
}

/// Run the full screening pass over a normalized event window.
///
/// `now` is the evaluation instant for freshness scoring; it is a parameter
/// so runs are reproducible under test.
pub async fn screen_wallets(
    events: Vec<TradeEvent>,
    oracle: &dyn BalanceOracle,
    classifier: &MarketRiskClassifier,
    config: &ScreenConfig,
    now: DateTime<Utc>,
) -> ScreenOutcome {
    let mut summary = ScreenSummary {
        events_fetched: events.len(),
        ..Default::default()
    };

    let histories = group_by_wallet(events);
    summary.wallets_grouped = histories.len();

    // Clusters are computed over every wallet's first action, before any
    // per-wallet filtering, in wallet first-seen order.
    let first_actions: Vec<(String, TradeEvent)> = histories
        .iter()
        .map(|h| (h.wallet.clone(), h.first_action().clone()))
        .collect();
    let clusters = detect_clusters(
        &first_actions,
        config.min_cluster_size,
        config.cluster_window_days,
    );

    let mut scored: Vec<ScoredWallet> = Vec::new();

    for history in &histories {
        let first = history.first_action();

        if !passes_prefilter(first.amount, config) {
            continue;
        }

        // External calls happen only past this point.
        let block = first
            .block_number
            .map(BlockRef::Number)
            .unwrap_or(BlockRef::Latest);

        let balance = match oracle.balance(&history.wallet, block).await {
            Ok(b) => b,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    wallet = %history.wallet,
                    "Balance lookup failed, skipping wallet"
                );
                summary.wallets_skipped += 1;
                continue;
            }
        };

        let conviction = conviction_ratio(first.amount, balance, config.min_balance_for_conviction);
        if conviction < config.min_conviction_ratio && balance < config.min_wallet_balance {
            continue;
        }

        let prior_tx = match oracle.prior_activity_count(&history.wallet, block).await {
            Ok(n) => n,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    wallet = %history.wallet,
                    "Prior-activity lookup failed, skipping wallet"
                );
                summary.wallets_skipped += 1;
                continue;
            }
        };

        let assessment =
            classifier.assess(&first.market_id, &first.market_name, first.category.as_deref());
        let cluster_id = clusters.get(&history.wallet).cloned();

        let score = insider_score(
            first.timestamp,
            conviction,
            assessment.tier,
            cluster_id.is_some(),
            now,
        );

        let tier = match assign_tier(
            conviction,
            balance,
            first.amount,
            assessment.tier,
            score,
            config,
        ) {
            Some(t) => t,
            None => continue,
        };

        match tier {
            SignalTier::Strong => summary.strong += 1,
            SignalTier::Medium => summary.medium += 1,
            SignalTier::Weak => summary.weak += 1,
        }

        tracing::info!(
            wallet = %history.wallet,
            tier = %tier,
            score = %score,
            conviction = %conviction,
            balance = %balance,
            "Wallet qualified"
        );

        scored.push(ScoredWallet {
            wallet: history.wallet.clone(),
            balance,
            conviction_ratio: conviction,
            insider_score: score,
            cluster_id,
            tier,
            prior_tx_count: Some(prior_tx),
            fresh: prior_tx <= config.fresh_max_prior_tx,
            first_action: FirstAction {
                amount: first.amount,
                market_id: first.market_id.clone(),
                market_name: first.market_name.clone(),
                category: first.category.clone(),
                insider_risk: assessment.tier,
                outcome: first.outcome.clone(),
                timestamp: first.timestamp,
                tx_hash: first.tx_hash.clone(),
            },
        });
    }

    rank(&mut scored);
    ScreenOutcome {
        wallets: scored,
        summary,
    }
}

/// Group events by wallet, preserving first-seen wallet order (the ranking
/// tie-break substrate). Each history is sorted ascending by timestamp.
pub fn group_by_wallet(events: Vec<TradeEvent>) -> Vec<WalletHistory> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut histories: Vec<WalletHistory> = Vec::new();

    for event in events {
        match index.get(&event.wallet) {
            Some(&i) => histories[i].events.push(event),
            None => {
                index.insert(event.wallet.clone(), histories.len());
                histories.push(WalletHistory {
                    wallet: event.wallet.clone(),
                    events: vec![event],
                });
            }
        }
    }

    for history in &mut histories {
        history.events.sort_by_key(|e| e.timestamp);
    }
    histories
}

/// Cheap cost-control gate, evaluated before any external call. Conservative
/// on purpose: the estimated conviction uses a placeholder balance of
/// `amount * estimated_balance_multiplier`, so true positives are not
/// discarded while the oracle call volume stays bounded.
pub fn passes_prefilter(amount: Decimal, config: &ScreenConfig) -> bool {
    if amount < config.min_amount_floor {
        return false;
    }
    if amount >= config.min_bet_margin {
        return true;
    }

    let estimated_balance = amount * config.estimated_balance_multiplier;
    let estimated_conviction = if estimated_balance.is_zero() {
        Decimal::ZERO
    } else {
        amount / estimated_balance
    };
    estimated_conviction >= config.min_conviction_ratio
}

/// Bet amount over balance. Zero when the balance is too small for the ratio
/// to mean anything.
pub fn conviction_ratio(
    amount: Decimal,
    balance: Decimal,
    min_balance_for_conviction: Decimal,
) -> Decimal {
    if balance < min_balance_for_conviction || balance.is_zero() {
        Decimal::ZERO
    } else {
        amount / balance
    }
}

/// Sum of four independent bonuses, clamped to [0, 1]:
/// freshness (first action near `now`), conviction, market risk, cluster.
pub fn insider_score(
    first_action_at: DateTime<Utc>,
    conviction: Decimal,
    risk: RiskTier,
    clustered: bool,
    now: DateTime<Utc>,
) -> Decimal {
    let mut score = Decimal::ZERO;

    let age = now - first_action_at;
    if age <= Duration::days(7) {
        score += FRESHNESS_7D_BONUS;
    } else if age <= Duration::days(30) {
        score += FRESHNESS_30D_BONUS;
    }

    if conviction >= CONVICTION_HIGH_CUTOFF {
        score += CONVICTION_HIGH_BONUS;
    } else if conviction >= CONVICTION_MID_CUTOFF {
        score += CONVICTION_MID_BONUS;
    }

    match risk {
        RiskTier::High => score += RISK_HIGH_BONUS,
        RiskTier::Medium => score += RISK_MEDIUM_BONUS,
        RiskTier::Low => {}
    }

    if clustered {
        score += CLUSTER_BONUS;
    }

    score.min(Decimal::ONE)
}

/// Tiered qualification, strict priority order — first match wins.
pub fn assign_tier(
    conviction: Decimal,
    balance: Decimal,
    amount: Decimal,
    risk: RiskTier,
    score: Decimal,
    config: &ScreenConfig,
) -> Option<SignalTier> {
    if conviction >= config.min_conviction_ratio && risk == RiskTier::High {
        return Some(SignalTier::Strong);
    }
    if conviction >= config.min_conviction_ratio {
        return Some(SignalTier::Medium);
    }
    if score >= SCORE_MEDIUM_CUTOFF {
        return Some(SignalTier::Medium);
    }
    if balance >= config.min_wallet_balance && amount >= config.min_bet_margin {
        return Some(SignalTier::Weak);
    }
    None
}

/// Stable descending order by (tier, insider score, conviction ratio); ties
/// keep the original wallet iteration order.
pub fn rank(wallets: &mut [ScoredWallet]) {
    wallets.sort_by(|a, b| {
        b.tier
            .cmp(&a.tier)
            .then(b.insider_score.cmp(&a.insider_score))
            .then(b.conviction_ratio.cmp(&a.conviction_ratio))
    });
}
