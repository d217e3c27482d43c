use std::collections::{HashMap, HashSet};

use chrono::Utc;

use polyscout::config::ScreenConfig;
use polyscout::ingestion::normalize_batch;
use polyscout::intelligence::{screen_wallets, MarketRiskClassifier};
use polyscout::models::TradeEvent;
use polyscout::oracle::PolygonOracle;
use polyscout::polymarket::{DataClient, MarketDescription};
use polyscout::report;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    // Configuration failures are the only fatal path; fail before any
    // network activity.
    let config = ScreenConfig::from_env()?;

    let http = reqwest::Client::new();
    let data_client = DataClient::new(http.clone(), config.data_api_base.clone());
    let oracle = PolygonOracle::new(http, config.polygon_rpc_url.clone());
    let classifier = MarketRiskClassifier::new(config.insider_risk_keywords.clone());

    tracing::info!(
        lookback_days = config.lookback_days,
        limit = config.fetch_limit,
        "Fetching recent trade window"
    );
    let raw = data_client
        .fetch_trade_window(config.lookback_days, config.fetch_limit)
        .await;

    let (mut events, dropped) = normalize_batch(&raw);
    tracing::info!(events = events.len(), dropped, "Trade window normalized");

    enrich_market_text(&mut events, &data_client).await;

    let now = Utc::now();
    let mut outcome = screen_wallets(events, &oracle, &classifier, &config, now).await;
    outcome.summary.events_fetched = raw.len();
    outcome.summary.events_dropped = dropped;

    report::print_summary(&outcome);
    if let Some(path) = &config.csv_path {
        report::export_csv(&outcome.wallets, path)?;
    }
    if let Some(path) = &config.json_path {
        report::export_json(&outcome.wallets, path)?;
    }

    Ok(())
}

/// Some sources omit the market question from trade rows. Backfill the
/// description and category from the market endpoint, best-effort, one
/// lookup per distinct market.
async fn enrich_market_text(events: &mut [TradeEvent], data_client: &DataClient) {
    let missing: HashSet<String> = events
        .iter()
        .filter(|e| !e.market_id.is_empty() && e.market_name.trim().is_empty())
        .map(|e| e.market_id.clone())
        .collect();

    if missing.is_empty() {
        return;
    }

    let mut descriptions: HashMap<String, MarketDescription> = HashMap::new();
    for market_id in missing {
        let desc = data_client.market_description(&market_id).await;
        descriptions.insert(market_id, desc);
    }

    for event in events.iter_mut() {
        if let Some(desc) = descriptions.get(&event.market_id) {
            if event.market_name.trim().is_empty() {
                event.market_name = desc.text.clone();
            }
            if event.category.is_none() {
                event.category = desc.category.clone();
            }
        }
    }
}

fn init_tracing() {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer())
        .init();
}
