use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::intelligence::ScreenOutcome;
use crate::models::{ScoredWallet, SignalTier};

/// Print the human-readable run report to stdout.
pub fn print_summary(outcome: &ScreenOutcome) {
    let summary = &outcome.summary;

    println!("{}", "=".repeat(60));
    println!("Polymarket Smart-Money Screen");
    println!("{}", "=".repeat(60));
    println!(
        "Events: {} fetched, {} dropped | Wallets: {} grouped, {} skipped",
        summary.events_fetched, summary.events_dropped, summary.wallets_grouped,
        summary.wallets_skipped
    );
    println!(
        "Qualified: {} ({} strong / {} medium / {} weak)",
        summary.qualified(),
        summary.strong,
        summary.medium,
        summary.weak
    );

    if outcome.wallets.is_empty() {
        println!("\nNo wallets matched the screening criteria.");
        return;
    }

    let strong: Vec<&ScoredWallet> = by_tier(&outcome.wallets, SignalTier::Strong);
    let medium: Vec<&ScoredWallet> = by_tier(&outcome.wallets, SignalTier::Medium);
    let weak: Vec<&ScoredWallet> = by_tier(&outcome.wallets, SignalTier::Weak);

    if !strong.is_empty() {
        println!("\nSTRONG SIGNALS ({}):", strong.len());
        for (i, w) in strong.iter().enumerate() {
            println!("\n{}. {}", i + 1, w.wallet);
            println!(
                "   Balance: ${} | Conviction: {} | Insider score: {}",
                w.balance, w.conviction_ratio, w.insider_score
            );
            println!(
                "   Bet: ${} on {}",
                w.first_action.amount,
                w.first_action.timestamp.format("%Y-%m-%d %H:%M")
            );
            println!(
                "   Market: {} | Risk: {}",
                display_or_unknown(&w.first_action.market_name),
                w.first_action.insider_risk
            );
            if let Some(count) = w.prior_tx_count {
                println!("   Prior txs: {}{}", count, if w.fresh { " (fresh)" } else { "" });
            }
            if let Some(cluster) = &w.cluster_id {
                println!("   Coordinated cluster: {cluster}");
            }
            if let Some(url) = w.market_url() {
                println!("   {url}");
            }
            println!("   {}", w.polygonscan_url());
        }
    }

    if !medium.is_empty() {
        println!("\nMEDIUM SIGNALS ({}):", medium.len());
        for (i, w) in medium.iter().enumerate() {
            println!(
                "{}. {} | ${} | conviction {} | score {}{}",
                i + 1,
                w.wallet,
                w.balance,
                w.conviction_ratio,
                w.insider_score,
                w.cluster_id
                    .as_deref()
                    .map(|c| format!(" | {c}"))
                    .unwrap_or_default()
            );
        }
    }

    if !weak.is_empty() {
        println!("\nWEAK SIGNALS ({}): see CSV/JSON export for details", weak.len());
    }
}

fn by_tier(wallets: &[ScoredWallet], tier: SignalTier) -> Vec<&ScoredWallet> {
    wallets.iter().filter(|w| w.tier == tier).collect()
}

fn display_or_unknown(text: &str) -> &str {
    if text.trim().is_empty() {
        "unknown"
    } else {
        text
    }
}

/// Write the ranked list as JSON. The file is a plain array of
/// [`ScoredWallet`] records, so re-parsing it reconstructs tier, score, and
/// ordering exactly.
pub fn export_json(wallets: &[ScoredWallet], path: impl AsRef<Path>) -> anyhow::Result<()> {
    let file = File::create(path.as_ref())?;
    serde_json::to_writer_pretty(BufWriter::new(file), wallets)?;
    tracing::info!(path = %path.as_ref().display(), count = wallets.len(), "JSON export written");
    Ok(())
}

const CSV_HEADER: &str = "signal_tier,wallet,balance_usd,conviction_ratio,insider_score,\
cluster_id,prior_tx_count,fresh,first_bet_amount,market_id,market_name,category,insider_risk,\
outcome,timestamp,tx_hash";

/// Write the ranked list as CSV, one row per wallet.
pub fn export_csv(wallets: &[ScoredWallet], path: impl AsRef<Path>) -> anyhow::Result<()> {
    let file = File::create(path.as_ref())?;
    let mut out = BufWriter::new(file);

    writeln!(out, "{CSV_HEADER}")?;
    for w in wallets {
        let fields = [
            w.tier.to_string(),
            w.wallet.clone(),
            w.balance.to_string(),
            w.conviction_ratio.to_string(),
            w.insider_score.to_string(),
            w.cluster_id.clone().unwrap_or_default(),
            w.prior_tx_count.map(|c| c.to_string()).unwrap_or_default(),
            w.fresh.to_string(),
            w.first_action.amount.to_string(),
            w.first_action.market_id.clone(),
            w.first_action.market_name.clone(),
            w.first_action.category.clone().unwrap_or_default(),
            w.first_action.insider_risk.to_string(),
            w.first_action.outcome.clone().unwrap_or_default(),
            w.first_action.timestamp.to_rfc3339(),
            w.first_action.tx_hash.clone(),
        ];
        let row: Vec<String> = fields.iter().map(|f| csv_field(f)).collect();
        writeln!(out, "{}", row.join(","))?;
    }
    out.flush()?;

    tracing::info!(path = %path.as_ref().display(), count = wallets.len(), "CSV export written");
    Ok(())
}

/// Quote a CSV field when it contains a delimiter, quote, or newline.
fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_field_quoting() {
        assert_eq!(csv_field("plain"), "plain");
        assert_eq!(csv_field("a,b"), "\"a,b\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }
}
