//! Ties the data provider to the scoring engines for one ticker and formats
//! the results as agent messages.

use analysis_core::{
    AnalysisError, FundamentalScorer, MarketDataProvider, ScoreResult, SentimentScorer,
};
use chrono::NaiveDate;
use fundamental_analysis::FundamentalScoringEngine;
use sentiment_analysis::InsiderSentimentEngine;
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;

const DEFAULT_INSIDER_LIMIT: usize = 5;

/// A scored ticker: both evaluations from one pass.
#[derive(Debug, Clone, PartialEq)]
pub struct TickerAnalysis {
    pub ticker: String,
    pub fundamental: ScoreResult,
    pub sentiment: ScoreResult,
}

impl TickerAnalysis {
    /// Both results as framework-ready messages.
    pub fn messages(&self) -> Vec<AgentMessage> {
        vec![
            agent_message("fundamentals_agent", &self.fundamental),
            agent_message("sentiment_agent", &self.sentiment),
        ]
    }
}

/// A named message whose content is the serialized score payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentMessage {
    pub name: String,
    pub content: String,
}

/// Serialize a score the way downstream agents expect it: a JSON object
/// with the confidence rendered as an integer percentage string ("25%").
pub fn agent_message(name: &str, result: &ScoreResult) -> AgentMessage {
    let content = json!({
        "signal": result.signal,
        "confidence": format!("{}%", result.confidence),
        "reasoning": result.reasoning,
    });
    AgentMessage {
        name: name.to_string(),
        content: content.to_string(),
    }
}

pub struct AnalysisOrchestrator {
    provider: Arc<dyn MarketDataProvider>,
    fundamental_engine: FundamentalScoringEngine,
    sentiment_engine: InsiderSentimentEngine,
    insider_limit: usize,
}

impl AnalysisOrchestrator {
    pub fn new(provider: Arc<dyn MarketDataProvider>) -> Self {
        Self {
            provider,
            fundamental_engine: FundamentalScoringEngine::new(),
            sentiment_engine: InsiderSentimentEngine::new(),
            insider_limit: DEFAULT_INSIDER_LIMIT,
        }
    }

    pub fn with_insider_limit(mut self, limit: usize) -> Self {
        self.insider_limit = limit;
        self
    }

    /// Score one ticker as of a date. A fundamentals fetch failure is fatal
    /// (the scorer's precondition cannot be met); an insider fetch failure
    /// degrades to the no-data neutral score.
    pub async fn analyze(
        &self,
        ticker: &str,
        as_of: NaiveDate,
    ) -> Result<TickerAnalysis, AnalysisError> {
        let metrics = self.provider.fetch_fundamentals(ticker).await?;

        let trades = match self
            .provider
            .fetch_insider_transactions(ticker, as_of, self.insider_limit)
            .await
        {
            Ok(trades) => trades,
            Err(e) => {
                tracing::warn!("insider trade fetch failed for {ticker}: {e}");
                Vec::new()
            }
        };

        let fundamental = self.fundamental_engine.score(&metrics)?;
        let sentiment = self.sentiment_engine.score(&trades)?;

        tracing::info!(
            "{ticker}: fundamentals {} ({}%), insider sentiment {} ({}%)",
            fundamental.signal,
            fundamental.confidence,
            sentiment.signal,
            sentiment.confidence
        );

        Ok(TickerAnalysis {
            ticker: ticker.to_string(),
            fundamental,
            sentiment,
        })
    }
}
