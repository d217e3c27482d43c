use serde::{Deserialize, Serialize};

use crate::models::RiskTier;
use crate::oracle::MemoCache;

/// Outcome of keyword scoring for one market.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub tier: RiskTier,
    pub match_count: usize,
}

/// Maps a market's text and category to a coarse insider-risk tier via
/// keyword scoring. Markets whose outcomes hinge on scheduled private
/// decisions (launches, appointments, awards, M&A) score higher.
pub struct MarketRiskClassifier {
    keywords: Vec<String>,
    memo: MemoCache<String, RiskAssessment>,
}

impl MarketRiskClassifier {
    pub fn new(keywords: Vec<String>) -> Self {
        Self {
            keywords: keywords.into_iter().map(|k| k.to_lowercase()).collect(),
            memo: MemoCache::new(),
        }
    }

    /// Memoized by market id: a market's text is stable within a run, so its
    /// tier never changes once computed.
    pub fn assess(&self, market_id: &str, text: &str, category: Option<&str>) -> RiskAssessment {
        if !market_id.is_empty() {
            if let Some(cached) = self.memo.get(&market_id.to_string()) {
                return cached;
            }
        }

        let assessment = classify(&self.keywords, text, category);
        if !market_id.is_empty() {
            self.memo.insert(market_id.to_string(), assessment);
        }
        assessment
    }
}

/// Pure keyword scoring: lowercase the concatenated description and category,
/// count keyword hits. Two or more hits is HIGH, exactly one is MEDIUM.
pub fn classify(keywords: &[String], text: &str, category: Option<&str>) -> RiskAssessment {
    let haystack = format!("{} {}", text, category.unwrap_or("")).to_lowercase();
    let match_count = keywords
        .iter()
        .filter(|keyword| haystack.contains(keyword.as_str()))
        .count();

    let tier = match match_count {
        0 => RiskTier::Low,
        1 => RiskTier::Medium,
        _ => RiskTier::High,
    };

    RiskAssessment { tier, match_count }
}
