use chrono::{Duration, Utc};
use reqwest::Client;
use thiserror::Error;

use super::types::{ApiMarket, MarketDescription, RawTrade};
use crate::ingestion::normalizer::parse_timestamp;

const PAGE_SIZE: usize = 200;

#[derive(Debug, Error)]
pub enum DataClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected response: {0}")]
    Unexpected(String),
}

#[derive(Debug, Clone)]
pub struct DataClient {
    http: Client,
    base_url: String,
}

impl DataClient {
    pub fn new(http: Client, base_url: String) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Fetch up to `limit` raw trade records covering the last
    /// `lookback_days`, paging through the trades endpoint.
    ///
    /// Page-level transport failures end the scan with whatever was already
    /// collected; they never abort the run.
    pub async fn fetch_trade_window(&self, lookback_days: i64, limit: usize) -> Vec<RawTrade> {
        let cutoff = Utc::now() - Duration::days(lookback_days);
        let mut collected: Vec<RawTrade> = Vec::new();
        let mut offset = 0usize;

        while collected.len() < limit {
            let page = match self.get_trade_page(PAGE_SIZE, offset).await {
                Ok(p) => p,
                Err(e) => {
                    tracing::warn!(error = %e, offset, "Trade page fetch failed, stopping scan");
                    break;
                }
            };

            if page.is_empty() {
                break;
            }

            let page_len = page.len();
            let mut past_window = false;
            for raw in page {
                let ts = raw
                    .timestamp
                    .as_ref()
                    .or(raw.created_at.as_ref())
                    .and_then(parse_timestamp);
                if let Some(ts) = ts {
                    if ts < cutoff {
                        past_window = true;
                        continue;
                    }
                }
                collected.push(raw);
                if collected.len() >= limit {
                    break;
                }
            }

            // Rows arrive newest-first; once a page dips below the cutoff
            // there is nothing more recent further on.
            if past_window || page_len < PAGE_SIZE {
                break;
            }
            offset += page_len;
        }

        tracing::info!(
            records = collected.len(),
            lookback_days,
            "Trade window fetched"
        );
        collected
    }

    async fn get_trade_page(
        &self,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<RawTrade>, DataClientError> {
        let url = format!("{}/trades", self.base_url);
        let resp = self
            .http
            .get(&url)
            .query(&[("limit", limit.to_string()), ("offset", offset.to_string())])
            .send()
            .await?
            .error_for_status()?;

        let rows: Vec<RawTrade> = resp.json().await?;
        Ok(rows)
    }

    /// Best-effort market description lookup for the risk classifier.
    /// Returns the "unknown" placeholder instead of failing.
    pub async fn market_description(&self, condition_id: &str) -> MarketDescription {
        match self.get_market(condition_id).await {
            Ok(market) => {
                let text = market
                    .question
                    .or(market.description)
                    .filter(|s| !s.trim().is_empty())
                    .unwrap_or_else(|| "unknown".into());
                MarketDescription {
                    text,
                    category: market.category,
                }
            }
            Err(e) => {
                tracing::debug!(error = %e, condition_id, "Market lookup inconclusive");
                MarketDescription::unknown()
            }
        }
    }

    async fn get_market(&self, condition_id: &str) -> Result<ApiMarket, DataClientError> {
        let url = format!("{}/markets/{}", self.base_url, condition_id);
        let resp = self.http.get(&url).send().await?.error_for_status()?;
        let market: ApiMarket = resp.json().await?;
        Ok(market)
    }
}
