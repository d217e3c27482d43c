pub mod config;
pub mod ingestion;
pub mod intelligence;
pub mod models;
pub mod oracle;
pub mod polymarket;
pub mod report;
