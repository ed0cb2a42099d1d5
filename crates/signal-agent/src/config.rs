use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::env;

#[derive(Debug, Clone)]
pub struct AgentConfig {
    // External APIs
    pub alpha_vantage_key: String,
    pub finnhub_key: String,

    // Response caching (disabled when unset)
    pub cache_dir: Option<String>,

    // Scoring inputs
    pub insider_limit: usize,   // most-recent insider trades to score
    pub as_of: Option<NaiveDate>, // defaults to today when unset

    // Output
    pub show_reasoning: bool,
}

impl AgentConfig {
    pub fn from_env() -> Result<Self> {
        let as_of = match env::var("AS_OF_DATE") {
            Ok(raw) => Some(
                raw.parse()
                    .with_context(|| format!("AS_OF_DATE is not a valid date: {raw}"))?,
            ),
            Err(_) => None,
        };

        Ok(Self {
            alpha_vantage_key: env::var("ALPHA_VANTAGE_KEY")
                .context("ALPHA_VANTAGE_KEY must be set")?,
            finnhub_key: env::var("FINNHUB_API_KEY")
                .context("FINNHUB_API_KEY must be set")?,
            cache_dir: env::var("SIGNAL_CACHE_DIR").ok(),
            insider_limit: env::var("INSIDER_TRADE_LIMIT")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .context("INSIDER_TRADE_LIMIT must be a number")?,
            as_of,
            show_reasoning: env::var("SHOW_REASONING")
                .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
                .unwrap_or(false),
        })
    }
}
