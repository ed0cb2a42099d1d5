use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::Value;

use crate::{AnalysisError, InsiderTransaction, MetricsSnapshot, ScoreResult};

/// Fundamental scoring over a company's metric snapshots (latest first).
/// Implementations are pure: no I/O, no shared state, same input gives
/// byte-identical output. An empty snapshot list is the one fatal
/// precondition violation.
pub trait FundamentalScorer: Send + Sync {
    fn score(&self, metrics: &[MetricsSnapshot]) -> Result<ScoreResult, AnalysisError>;
}

/// Sentiment scoring over insider transactions. Pure; an empty or fully
/// unparsable list is valid input and scores neutral with zero confidence.
pub trait SentimentScorer: Send + Sync {
    fn score(&self, trades: &[InsiderTransaction]) -> Result<ScoreResult, AnalysisError>;
}

/// Upstream market-data collaborator. The scoring core only ever sees the
/// normalized structures this trait hands back.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Latest fundamentals snapshots for a ticker, most recent first.
    async fn fetch_fundamentals(
        &self,
        ticker: &str,
    ) -> Result<Vec<MetricsSnapshot>, AnalysisError>;

    /// Up to `limit` most recent insider transactions at or before `as_of`.
    async fn fetch_insider_transactions(
        &self,
        ticker: &str,
        as_of: NaiveDate,
        limit: usize,
    ) -> Result<Vec<InsiderTransaction>, AnalysisError>;
}

/// Keyed response cache: exact-key hits or misses, no eviction, no expiry.
/// `put` failures are an implementation concern (logged, never surfaced).
pub trait ResponseCache: Send + Sync {
    fn get(&self, key: &str) -> Option<Value>;
    fn put(&self, key: &str, value: &Value);
}
