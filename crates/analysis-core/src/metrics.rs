//! Field resolution for provider fundamentals payloads.
//!
//! Different providers spell the same metric differently (snake_case vs the
//! Alpha Vantage TTM names). Each logical metric has an ordered candidate
//! list; the first key that is present and coercible to a number wins.

use serde_json::{Map, Value};

pub const RETURN_ON_EQUITY: &[&str] = &["return_on_equity", "ReturnOnEquityTTM"];
pub const NET_MARGIN: &[&str] = &["net_margin"];
pub const OPERATING_MARGIN: &[&str] = &["operating_margin"];
pub const REVENUE: &[&str] = &["RevenueTTM"];
pub const NET_INCOME: &[&str] = &["net_income"];
pub const OPERATING_INCOME: &[&str] = &["operating_income"];
pub const REVENUE_GROWTH: &[&str] = &["revenue_growth", "QuarterlyRevenueGrowthYOY"];
pub const EARNINGS_GROWTH: &[&str] = &["earnings_growth", "QuarterlyEarningsGrowthYOY"];
pub const BOOK_VALUE_GROWTH: &[&str] = &["book_value_growth"];
pub const CURRENT_RATIO: &[&str] = &["current_ratio", "CurrentRatio"];
pub const DEBT_TO_EQUITY: &[&str] = &["debt_to_equity", "DebtToEquityRatio"];
pub const FREE_CASH_FLOW_PER_SHARE: &[&str] = &["free_cash_flow_per_share"];
pub const EARNINGS_PER_SHARE: &[&str] = &["earnings_per_share"];
pub const PE_RATIO: &[&str] = &["price_to_earnings_ratio", "PERatio"];
pub const PB_RATIO: &[&str] = &["price_to_book_ratio", "PriceToBookRatio"];
pub const PS_RATIO: &[&str] = &["price_to_sales_ratio", "PriceToSalesRatioTTM"];

/// Coerce a raw payload value to a number. Anything that does not parse
/// cleanly (null, missing markers like `"None"` or `"-"`, nested values,
/// non-finite results) is unknown — never zero, never an error.
pub fn safe_float(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|f| f.is_finite())
}

/// First candidate key that resolves to a usable number.
pub fn resolve(raw: &Map<String, Value>, candidates: &[&str]) -> Option<f64> {
    candidates
        .iter()
        .find_map(|key| raw.get(*key).and_then(safe_float))
}

/// Ratio of two optional components. A zero on either side is
/// indistinguishable from an unreported total in the upstream feeds, so it
/// yields unknown rather than a computed zero or infinity.
pub fn ratio_of(numerator: Option<f64>, denominator: Option<f64>) -> Option<f64> {
    match (numerator, denominator) {
        (Some(n), Some(d)) if n != 0.0 && d != 0.0 => Some(n / d),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn safe_float_coerces_numbers_and_strings() {
        assert_eq!(safe_float(&json!(0.15)), Some(0.15));
        assert_eq!(safe_float(&json!("0.15")), Some(0.15));
        assert_eq!(safe_float(&json!(" 1200 ")), Some(1200.0));
    }

    #[test]
    fn safe_float_treats_garbage_as_unknown() {
        assert_eq!(safe_float(&json!(null)), None);
        assert_eq!(safe_float(&json!("None")), None);
        assert_eq!(safe_float(&json!("-")), None);
        assert_eq!(safe_float(&json!("NaN")), None);
        assert_eq!(safe_float(&json!({"nested": 1})), None);
        assert_eq!(safe_float(&json!([1.0])), None);
    }

    #[test]
    fn resolve_prefers_canonical_key() {
        let raw = json!({"return_on_equity": 0.22, "ReturnOnEquityTTM": 0.11});
        let raw = raw.as_object().unwrap();
        assert_eq!(resolve(raw, RETURN_ON_EQUITY), Some(0.22));
    }

    #[test]
    fn resolve_falls_back_past_uncoercible_canonical() {
        // Alpha Vantage reports missing metrics as the string "None"; the
        // alternate key should still be consulted.
        let raw = json!({"return_on_equity": "None", "ReturnOnEquityTTM": "0.18"});
        let raw = raw.as_object().unwrap();
        assert_eq!(resolve(raw, RETURN_ON_EQUITY), Some(0.18));
    }

    #[test]
    fn resolve_missing_everywhere_is_unknown() {
        let raw = json!({});
        assert_eq!(resolve(raw.as_object().unwrap(), PE_RATIO), None);
    }

    #[test]
    fn ratio_of_guards_zero_components() {
        assert_eq!(ratio_of(Some(300.0), Some(1000.0)), Some(0.3));
        assert_eq!(ratio_of(Some(100.0), Some(0.0)), None);
        assert_eq!(ratio_of(Some(0.0), Some(1000.0)), None);
        assert_eq!(ratio_of(None, Some(1000.0)), None);
        assert_eq!(ratio_of(Some(300.0), None), None);
    }
}
