use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::metrics;

/// Trading signal direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Signal {
    Bullish,
    Bearish,
    Neutral,
}

impl Signal {
    pub fn as_str(&self) -> &'static str {
        match self {
            Signal::Bullish => "bullish",
            Signal::Bearish => "bearish",
            Signal::Neutral => "neutral",
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One company's fundamentals at a point in time. Every metric is optional:
/// absence, nulls and unparsable provider values all land as `None`, which
/// downstream scoring treats as "check not earnable" rather than zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub return_on_equity: Option<f64>,
    pub net_margin: Option<f64>,
    pub operating_margin: Option<f64>,
    pub revenue: Option<f64>,
    pub net_income: Option<f64>,
    pub operating_income: Option<f64>,
    pub revenue_growth: Option<f64>,
    pub earnings_growth: Option<f64>,
    pub book_value_growth: Option<f64>,
    pub current_ratio: Option<f64>,
    pub debt_to_equity: Option<f64>,
    pub free_cash_flow_per_share: Option<f64>,
    pub earnings_per_share: Option<f64>,
    pub price_to_earnings_ratio: Option<f64>,
    pub price_to_book_ratio: Option<f64>,
    pub price_to_sales_ratio: Option<f64>,
}

impl MetricsSnapshot {
    /// Build a snapshot from a raw provider payload, resolving each logical
    /// metric through its ordered candidate keys.
    pub fn from_raw(raw: &Map<String, Value>) -> Self {
        Self {
            return_on_equity: metrics::resolve(raw, metrics::RETURN_ON_EQUITY),
            net_margin: metrics::resolve(raw, metrics::NET_MARGIN),
            operating_margin: metrics::resolve(raw, metrics::OPERATING_MARGIN),
            revenue: metrics::resolve(raw, metrics::REVENUE),
            net_income: metrics::resolve(raw, metrics::NET_INCOME),
            operating_income: metrics::resolve(raw, metrics::OPERATING_INCOME),
            revenue_growth: metrics::resolve(raw, metrics::REVENUE_GROWTH),
            earnings_growth: metrics::resolve(raw, metrics::EARNINGS_GROWTH),
            book_value_growth: metrics::resolve(raw, metrics::BOOK_VALUE_GROWTH),
            current_ratio: metrics::resolve(raw, metrics::CURRENT_RATIO),
            debt_to_equity: metrics::resolve(raw, metrics::DEBT_TO_EQUITY),
            free_cash_flow_per_share: metrics::resolve(raw, metrics::FREE_CASH_FLOW_PER_SHARE),
            earnings_per_share: metrics::resolve(raw, metrics::EARNINGS_PER_SHARE),
            price_to_earnings_ratio: metrics::resolve(raw, metrics::PE_RATIO),
            price_to_book_ratio: metrics::resolve(raw, metrics::PB_RATIO),
            price_to_sales_ratio: metrics::resolve(raw, metrics::PS_RATIO),
        }
    }

    /// Net margin: the reported field when present, else derived from
    /// net income and revenue.
    pub fn net_margin_or_derived(&self) -> Option<f64> {
        self.net_margin
            .or_else(|| metrics::ratio_of(self.net_income, self.revenue))
    }

    /// Operating margin: the reported field when present, else derived from
    /// operating income and revenue.
    pub fn operating_margin_or_derived(&self) -> Option<f64> {
        self.operating_margin
            .or_else(|| metrics::ratio_of(self.operating_income, self.revenue))
    }
}

/// One insider transaction. Finnhub spells the share delta `change`; the
/// financialdatasets shape spells it `transaction_shares`. Positive means
/// acquisition, negative means disposal. Malformed field values deserialize
/// to `None` instead of failing the whole payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InsiderTransaction {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(
        default,
        alias = "transactionDate",
        deserialize_with = "lenient_date"
    )]
    pub transaction_date: Option<NaiveDate>,
    #[serde(default, alias = "change", deserialize_with = "lenient_f64")]
    pub transaction_shares: Option<f64>,
    #[serde(
        default,
        alias = "transactionPrice",
        deserialize_with = "lenient_f64"
    )]
    pub transaction_price: Option<f64>,
    #[serde(default, alias = "transactionCode")]
    pub transaction_code: Option<String>,
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(metrics::safe_float))
}

fn lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(Value::as_str)
        .and_then(|s| s.parse().ok()))
}

/// One rubric's verdict plus the formatted inputs that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RubricAssessment {
    pub signal: Signal,
    pub details: String,
}

/// Per-rubric reasoning for a fundamental score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundamentalBreakdown {
    pub profitability_signal: RubricAssessment,
    pub growth_signal: RubricAssessment,
    pub financial_health_signal: RubricAssessment,
    pub price_ratios_signal: RubricAssessment,
}

/// Reasoning payload: sentiment scoring emits free text, fundamental scoring
/// emits the four-rubric breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Reasoning {
    Text(String),
    Fundamental(FundamentalBreakdown),
}

/// Output of any scorer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub signal: Signal,
    /// Integer percentage, 0-100.
    pub confidence: u8,
    pub reasoning: Reasoning,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn overview(value: serde_json::Value) -> MetricsSnapshot {
        MetricsSnapshot::from_raw(value.as_object().unwrap())
    }

    #[test]
    fn from_raw_reads_alternate_provider_keys() {
        let snapshot = overview(json!({
            "ReturnOnEquityTTM": "0.21",
            "QuarterlyRevenueGrowthYOY": "0.14",
            "CurrentRatio": "1.8",
            "DebtToEquityRatio": "0.3",
            "PERatio": "22.5",
            "PriceToBookRatio": "2.1",
            "PriceToSalesRatioTTM": "4.0",
        }));
        assert_eq!(snapshot.return_on_equity, Some(0.21));
        assert_eq!(snapshot.revenue_growth, Some(0.14));
        assert_eq!(snapshot.current_ratio, Some(1.8));
        assert_eq!(snapshot.debt_to_equity, Some(0.3));
        assert_eq!(snapshot.price_to_earnings_ratio, Some(22.5));
        assert_eq!(snapshot.price_to_book_ratio, Some(2.1));
        assert_eq!(snapshot.price_to_sales_ratio, Some(4.0));
    }

    #[test]
    fn from_raw_empty_payload_is_all_unknown() {
        assert_eq!(overview(json!({})), MetricsSnapshot::default());
    }

    #[test]
    fn net_margin_derives_from_components() {
        let snapshot = overview(json!({"RevenueTTM": 1000, "net_income": 300}));
        assert_eq!(snapshot.net_margin, None);
        assert_eq!(snapshot.net_margin_or_derived(), Some(0.3));
    }

    #[test]
    fn net_margin_zero_revenue_stays_unknown() {
        let snapshot = overview(json!({"RevenueTTM": 0, "net_income": 100}));
        assert_eq!(snapshot.net_margin_or_derived(), None);
    }

    #[test]
    fn reported_margin_beats_derivation() {
        let snapshot = overview(json!({
            "net_margin": 0.05,
            "RevenueTTM": 1000,
            "net_income": 300,
        }));
        assert_eq!(snapshot.net_margin_or_derived(), Some(0.05));
    }

    #[test]
    fn operating_margin_derives_from_components() {
        let snapshot = overview(json!({"RevenueTTM": 1000, "operating_income": 180}));
        assert_eq!(snapshot.operating_margin_or_derived(), Some(0.18));
    }

    #[test]
    fn insider_transaction_parses_finnhub_wire_shape() {
        let trade: InsiderTransaction = serde_json::from_value(json!({
            "name": "Jane Roe",
            "transactionDate": "2024-03-15",
            "change": -1200.0,
            "transactionPrice": 41.25,
            "transactionCode": "S",
        }))
        .unwrap();
        assert_eq!(trade.transaction_shares, Some(-1200.0));
        assert_eq!(
            trade.transaction_date,
            Some(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap())
        );
    }

    #[test]
    fn insider_transaction_tolerates_missing_fields() {
        let trade: InsiderTransaction = serde_json::from_value(json!({})).unwrap();
        assert_eq!(trade.transaction_shares, None);
        assert_eq!(trade.transaction_date, None);
    }

    #[test]
    fn insider_transaction_degrades_malformed_fields() {
        let trade: InsiderTransaction = serde_json::from_value(json!({
            "transactionDate": "not-a-date",
            "change": "n/a",
            "transactionPrice": null,
        }))
        .unwrap();
        assert_eq!(trade.transaction_date, None);
        assert_eq!(trade.transaction_shares, None);
        assert_eq!(trade.transaction_price, None);

        // Numeric strings still coerce.
        let trade: InsiderTransaction =
            serde_json::from_value(json!({"change": "-500"})).unwrap();
        assert_eq!(trade.transaction_shares, Some(-500.0));
    }

    #[test]
    fn signal_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Signal::Bullish).unwrap(), "\"bullish\"");
        assert_eq!(Signal::Neutral.to_string(), "neutral");
    }

    #[test]
    fn reasoning_serializes_untagged() {
        let text = Reasoning::Text("Bullish signals: 2, Bearish signals: 1".to_string());
        assert_eq!(
            serde_json::to_value(&text).unwrap(),
            json!("Bullish signals: 2, Bearish signals: 1")
        );

        let breakdown = Reasoning::Fundamental(FundamentalBreakdown {
            profitability_signal: RubricAssessment {
                signal: Signal::Bullish,
                details: "ROE: 20.00%, Net Margin: N/A, Op Margin: N/A".to_string(),
            },
            growth_signal: RubricAssessment {
                signal: Signal::Neutral,
                details: "Revenue Growth: N/A, Earnings Growth: N/A".to_string(),
            },
            financial_health_signal: RubricAssessment {
                signal: Signal::Neutral,
                details: "Current Ratio: N/A, D/E: N/A".to_string(),
            },
            price_ratios_signal: RubricAssessment {
                signal: Signal::Neutral,
                details: "P/E: N/A, P/B: N/A, P/S: N/A".to_string(),
            },
        });
        let value = serde_json::to_value(&breakdown).unwrap();
        assert_eq!(value["profitability_signal"]["signal"], json!("bullish"));
        assert_eq!(value["growth_signal"]["signal"], json!("neutral"));
    }
}
