//! Market-data collaborator: Alpha Vantage company fundamentals and Finnhub
//! insider transactions, normalized into the shapes the scoring core
//! consumes, with an injected keyed response cache.

use analysis_core::{
    AnalysisError, InsiderTransaction, MarketDataProvider, MetricsSnapshot, ResponseCache,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

pub mod cache;
pub use cache::{DiskCache, NoopCache};

const ALPHA_VANTAGE_URL: &str = "https://www.alphavantage.co/query";
const FINNHUB_URL: &str = "https://finnhub.io/api/v1";

/// Marker cached in place of a payload when the provider reports rate
/// limiting. Consumed the same as "no data": an all-unknown snapshot,
/// never an error.
pub const UNAVAILABLE_SENTINEL: &str = "__unavailable__";

/// Sliding-window rate limiter: at most `max_requests` per `window`.
struct RateLimiter {
    timestamps: Mutex<VecDeque<Instant>>,
    max_requests: usize,
    window: Duration,
}

impl RateLimiter {
    fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            timestamps: Mutex::new(VecDeque::new()),
            max_requests,
            window,
        }
    }

    async fn acquire(&self) {
        loop {
            let mut ts = self.timestamps.lock().await;
            let now = Instant::now();

            while let Some(&front) = ts.front() {
                if now.duration_since(front) >= self.window {
                    ts.pop_front();
                } else {
                    break;
                }
            }

            if ts.len() < self.max_requests {
                ts.push_back(now);
                return;
            }

            let oldest = *ts.front().expect("window is full");
            let sleep_dur = self.window - now.duration_since(oldest) + Duration::from_millis(50);
            drop(ts);
            tracing::debug!(
                "Rate limiter: waiting {:.1}s for Alpha Vantage slot",
                sleep_dur.as_secs_f64()
            );
            tokio::time::sleep(sleep_dur).await;
        }
    }
}

pub struct MarketDataClient {
    alpha_vantage_key: String,
    finnhub_key: String,
    client: Client,
    cache: Arc<dyn ResponseCache>,
    rate_limiter: RateLimiter,
}

impl MarketDataClient {
    pub fn new(alpha_vantage_key: String, finnhub_key: String) -> Self {
        // Free-tier Alpha Vantage allows 5 requests per minute.
        let rate_limit: usize = std::env::var("ALPHA_VANTAGE_RATE_LIMIT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(5)
            .max(1);

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            alpha_vantage_key,
            finnhub_key,
            client,
            cache: Arc::new(NoopCache),
            rate_limiter: RateLimiter::new(rate_limit, Duration::from_secs(60)),
        }
    }

    pub fn with_cache(mut self, cache: Arc<dyn ResponseCache>) -> Self {
        self.cache = cache;
        self
    }

    /// Alpha Vantage signals throttling in-band, with a 200 response whose
    /// body carries a `Note` (or `Information`) member instead of data.
    fn is_rate_limit_notice(payload: &Value) -> bool {
        payload
            .as_object()
            .map_or(false, |o| o.contains_key("Note") || o.contains_key("Information"))
    }

    async fn get_overview(
        &self,
        ticker: &str,
    ) -> Result<serde_json::Map<String, Value>, AnalysisError> {
        let key = format!("{ticker}:overview");
        if let Some(cached) = self.cache.get(&key) {
            if cached.as_str() == Some(UNAVAILABLE_SENTINEL) {
                tracing::debug!("cached unavailable marker for {ticker}, scoring without data");
                return Ok(serde_json::Map::new());
            }
            if let Value::Object(map) = cached {
                tracing::debug!("overview cache hit for {ticker}");
                return Ok(map);
            }
        }

        self.rate_limiter.acquire().await;
        let response = self
            .client
            .get(ALPHA_VANTAGE_URL)
            .query(&[
                ("function", "OVERVIEW"),
                ("symbol", ticker),
                ("apikey", self.alpha_vantage_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| AnalysisError::ApiError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AnalysisError::ApiError(format!(
                "overview request for {ticker} failed with status {}",
                response.status()
            )));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| AnalysisError::ApiError(e.to_string()))?;

        if Self::is_rate_limit_notice(&payload) {
            tracing::warn!("Alpha Vantage rate limited on {ticker}, caching unavailable marker");
            self.cache.put(&key, &Value::String(UNAVAILABLE_SENTINEL.to_string()));
            return Ok(serde_json::Map::new());
        }

        match payload {
            Value::Object(map) if !map.is_empty() => {
                self.cache.put(&key, &Value::Object(map.clone()));
                Ok(map)
            }
            _ => Err(AnalysisError::InsufficientData(format!(
                "no overview data returned for {ticker}"
            ))),
        }
    }

    async fn get_insider_payload(
        &self,
        ticker: &str,
    ) -> Result<Vec<InsiderTransaction>, AnalysisError> {
        let key = format!("{ticker}:insider");
        if let Some(cached) = self.cache.get(&key) {
            match serde_json::from_value(cached) {
                Ok(trades) => {
                    tracing::debug!("insider cache hit for {ticker}");
                    return Ok(trades);
                }
                Err(e) => tracing::warn!("ignoring stale insider cache for {ticker}: {e}"),
            }
        }

        let response = self
            .client
            .get(format!("{FINNHUB_URL}/stock/insider-transactions"))
            .query(&[("symbol", ticker), ("token", self.finnhub_key.as_str())])
            .send()
            .await
            .map_err(|e| AnalysisError::ApiError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AnalysisError::ApiError(format!(
                "insider transactions request for {ticker} failed with status {}",
                response.status()
            )));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| AnalysisError::ApiError(e.to_string()))?;

        let data = payload.get("data").cloned().ok_or_else(|| {
            AnalysisError::InvalidData(format!("no insider trade data returned for {ticker}"))
        })?;

        self.cache.put(&key, &data);
        serde_json::from_value(data).map_err(|e| AnalysisError::InvalidData(e.to_string()))
    }
}

/// Keep trades filed at or before `as_of`, newest first, truncated to
/// `limit`. Undated records are kept and sort last; whether they are usable
/// is the scorer's call.
pub fn select_recent_trades(
    mut trades: Vec<InsiderTransaction>,
    as_of: NaiveDate,
    limit: usize,
) -> Vec<InsiderTransaction> {
    trades.retain(|t| t.transaction_date.map_or(true, |d| d <= as_of));
    trades.sort_by(|a, b| b.transaction_date.cmp(&a.transaction_date));
    trades.truncate(limit);
    trades
}

#[async_trait]
impl MarketDataProvider for MarketDataClient {
    async fn fetch_fundamentals(
        &self,
        ticker: &str,
    ) -> Result<Vec<MetricsSnapshot>, AnalysisError> {
        let overview = self.get_overview(ticker).await?;
        tracing::debug!("fetched overview for {ticker} ({} fields)", overview.len());
        Ok(vec![MetricsSnapshot::from_raw(&overview)])
    }

    async fn fetch_insider_transactions(
        &self,
        ticker: &str,
        as_of: NaiveDate,
        limit: usize,
    ) -> Result<Vec<InsiderTransaction>, AnalysisError> {
        let trades = self.get_insider_payload(ticker).await?;
        tracing::debug!("fetched {} insider records for {ticker}", trades.len());
        Ok(select_recent_trades(trades, as_of, limit))
    }
}
