//! Insider-trade sentiment: classify each transaction by the sign of its
//! share delta and vote the directions into one signal.

use analysis_core::{
    vote, AnalysisError, InsiderTransaction, Reasoning, ScoreResult, SentimentScorer, Signal,
};

const NO_DATA_REASONING: &str =
    "No valid 'transaction_shares' data available for sentiment analysis.";

pub struct InsiderSentimentEngine;

impl InsiderSentimentEngine {
    pub fn new() -> Self {
        Self
    }
}

impl SentimentScorer for InsiderSentimentEngine {
    fn score(&self, trades: &[InsiderTransaction]) -> Result<ScoreResult, AnalysisError> {
        let shares: Vec<f64> = trades
            .iter()
            .filter_map(|t| t.transaction_shares)
            .filter(|s| s.is_finite())
            .collect();

        if shares.is_empty() {
            // Distinct terminal case: nothing to classify is not a 0/0 vote.
            return Ok(ScoreResult {
                signal: Signal::Neutral,
                confidence: 0,
                reasoning: Reasoning::Text(NO_DATA_REASONING.to_string()),
            });
        }

        // Disposals are bearish; everything else, including a zero-share
        // change, stays on the buy side. The zero boundary is deliberate
        // (see the test below) even though it reads oddly.
        let bearish = shares.iter().filter(|s| **s < 0.0).count();
        let bullish = shares.len() - bearish;

        Ok(ScoreResult {
            signal: vote::majority_signal(bullish, bearish),
            confidence: vote::agreement_confidence(bullish, bearish, shares.len()),
            reasoning: Reasoning::Text(format!(
                "Bullish signals: {}, Bearish signals: {}",
                bullish, bearish
            )),
        })
    }
}

impl Default for InsiderSentimentEngine {
    fn default() -> Self {
        Self::new()
    }
}
