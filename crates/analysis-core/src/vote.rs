//! Signal aggregation shared by the scoring engines: majority vote over
//! directional sub-signals plus an agreement-based confidence percentage.

use crate::Signal;

/// Strict majority between the directional counts. Neutral sub-signals count
/// toward neither side, so 2 bullish / 1 bearish / 1 neutral is bullish.
pub fn majority_signal(bullish: usize, bearish: usize) -> Signal {
    if bullish > bearish {
        Signal::Bullish
    } else if bearish > bullish {
        Signal::Bearish
    } else {
        Signal::Neutral
    }
}

/// Share of sub-signals agreeing with the stronger side, as a rounded
/// integer percentage. Rounds half away from zero: 12.5% reports as 13.
pub fn agreement_confidence(bullish: usize, bearish: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    ((bullish.max(bearish) as f64 / total as f64) * 100.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn majority_needs_strict_lead() {
        assert_eq!(majority_signal(2, 1), Signal::Bullish);
        assert_eq!(majority_signal(1, 3), Signal::Bearish);
        assert_eq!(majority_signal(2, 2), Signal::Neutral);
        assert_eq!(majority_signal(0, 0), Signal::Neutral);
    }

    #[test]
    fn confidence_is_agreeing_share() {
        assert_eq!(agreement_confidence(1, 0, 4), 25);
        assert_eq!(agreement_confidence(2, 2, 4), 50);
        assert_eq!(agreement_confidence(4, 0, 4), 100);
        assert_eq!(agreement_confidence(0, 0, 4), 0);
    }

    #[test]
    fn confidence_of_empty_input_is_zero() {
        // Distinct terminal case, not a 0/0 division.
        assert_eq!(agreement_confidence(0, 0, 0), 0);
    }

    #[test]
    fn confidence_rounds_half_away_from_zero() {
        // The classic ambiguous boundary: exactly 12.5% must report as 13,
        // not banker's-rounded down to 12.
        assert_eq!(agreement_confidence(1, 0, 8), 13);
        assert_eq!(agreement_confidence(7, 1, 8), 88);
        assert_eq!(agreement_confidence(1, 2, 3), 67);
    }
}
