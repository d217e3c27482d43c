pub mod cluster;
pub mod risk;
pub mod screener;

pub use cluster::detect_clusters;
pub use risk::{classify, MarketRiskClassifier, RiskAssessment};
pub use screener::{screen_wallets, ScreenOutcome};
