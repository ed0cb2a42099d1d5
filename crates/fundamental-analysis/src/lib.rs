//! Fundamental scoring: four independently-earned rubrics (profitability,
//! growth, financial health, valuation) voted into one overall signal with
//! an agreement confidence and per-rubric reasoning.

use analysis_core::{
    vote, AnalysisError, FundamentalBreakdown, FundamentalScorer, MetricsSnapshot, Reasoning,
    RubricAssessment, ScoreResult, Signal,
};

pub struct FundamentalScoringEngine;

/// Running tally for one rubric. Checks against unknown inputs are skipped
/// entirely, so a rubric distinguishes "nothing was measurable" from
/// "everything measurable failed".
#[derive(Default)]
struct RubricTally {
    points: u32,
    evaluated: u32,
}

impl RubricTally {
    fn observe(&mut self, outcome: Option<bool>) {
        if let Some(earned) = outcome {
            self.evaluated += 1;
            if earned {
                self.points += 1;
            }
        }
    }

    fn signal(&self) -> Signal {
        if self.evaluated == 0 {
            // No usable inputs at all: unknown, not bad.
            Signal::Neutral
        } else if self.points >= 2 {
            Signal::Bullish
        } else if self.points == 0 {
            Signal::Bearish
        } else {
            Signal::Neutral
        }
    }
}

fn fmt_pct(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.2}%", v * 100.0),
        None => "N/A".to_string(),
    }
}

fn fmt_ratio(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.2}", v),
        None => "N/A".to_string(),
    }
}

impl FundamentalScoringEngine {
    pub fn new() -> Self {
        Self
    }

    fn profitability(&self, m: &MetricsSnapshot) -> RubricAssessment {
        let roe = m.return_on_equity;
        let net_margin = m.net_margin_or_derived();
        let operating_margin = m.operating_margin_or_derived();

        let mut tally = RubricTally::default();
        tally.observe(roe.map(|v| v > 0.15)); // Strong ROE above 15%
        tally.observe(net_margin.map(|v| v > 0.20)); // Healthy profit margins
        tally.observe(operating_margin.map(|v| v > 0.15)); // Strong operating efficiency

        RubricAssessment {
            signal: tally.signal(),
            details: format!(
                "ROE: {}, Net Margin: {}, Op Margin: {}",
                fmt_pct(roe),
                fmt_pct(net_margin),
                fmt_pct(operating_margin)
            ),
        }
    }

    fn growth(&self, m: &MetricsSnapshot) -> RubricAssessment {
        let mut tally = RubricTally::default();
        tally.observe(m.revenue_growth.map(|v| v > 0.10)); // 10% revenue growth
        tally.observe(m.earnings_growth.map(|v| v > 0.10)); // 10% earnings growth
        tally.observe(m.book_value_growth.map(|v| v > 0.10)); // 10% book value growth

        // Book value growth is scored but not reported, matching the
        // established output format downstream consumers parse.
        RubricAssessment {
            signal: tally.signal(),
            details: format!(
                "Revenue Growth: {}, Earnings Growth: {}",
                fmt_pct(m.revenue_growth),
                fmt_pct(m.earnings_growth)
            ),
        }
    }

    fn financial_health(&self, m: &MetricsSnapshot) -> RubricAssessment {
        let mut tally = RubricTally::default();
        tally.observe(m.current_ratio.map(|v| v > 1.5)); // Strong liquidity
        tally.observe(m.debt_to_equity.map(|v| v < 0.5)); // Conservative debt levels
        // FCF conversion needs both sides to be measurable
        tally.observe(
            m.free_cash_flow_per_share
                .zip(m.earnings_per_share)
                .map(|(fcf, eps)| fcf > eps * 0.8),
        );

        RubricAssessment {
            signal: tally.signal(),
            details: format!(
                "Current Ratio: {}, D/E: {}",
                fmt_ratio(m.current_ratio),
                fmt_ratio(m.debt_to_equity)
            ),
        }
    }

    fn price_ratios(&self, m: &MetricsSnapshot) -> RubricAssessment {
        let mut tally = RubricTally::default();
        tally.observe(m.price_to_earnings_ratio.map(|v| v < 25.0)); // Reasonable P/E
        tally.observe(m.price_to_book_ratio.map(|v| v < 3.0)); // Reasonable P/B
        tally.observe(m.price_to_sales_ratio.map(|v| v < 5.0)); // Reasonable P/S

        RubricAssessment {
            signal: tally.signal(),
            details: format!(
                "P/E: {}, P/B: {}, P/S: {}",
                fmt_ratio(m.price_to_earnings_ratio),
                fmt_ratio(m.price_to_book_ratio),
                fmt_ratio(m.price_to_sales_ratio)
            ),
        }
    }
}

impl FundamentalScorer for FundamentalScoringEngine {
    fn score(&self, metrics: &[MetricsSnapshot]) -> Result<ScoreResult, AnalysisError> {
        let latest = metrics.first().ok_or_else(|| {
            AnalysisError::InsufficientData("no financial metrics snapshot available".to_string())
        })?;

        let breakdown = FundamentalBreakdown {
            profitability_signal: self.profitability(latest),
            growth_signal: self.growth(latest),
            financial_health_signal: self.financial_health(latest),
            price_ratios_signal: self.price_ratios(latest),
        };

        let rubric_signals = [
            breakdown.profitability_signal.signal,
            breakdown.growth_signal.signal,
            breakdown.financial_health_signal.signal,
            breakdown.price_ratios_signal.signal,
        ];
        let bullish = rubric_signals
            .iter()
            .filter(|s| **s == Signal::Bullish)
            .count();
        let bearish = rubric_signals
            .iter()
            .filter(|s| **s == Signal::Bearish)
            .count();

        Ok(ScoreResult {
            signal: vote::majority_signal(bullish, bearish),
            confidence: vote::agreement_confidence(bullish, bearish, rubric_signals.len()),
            reasoning: Reasoning::Fundamental(breakdown),
        })
    }
}

impl Default for FundamentalScoringEngine {
    fn default() -> Self {
        Self::new()
    }
}
