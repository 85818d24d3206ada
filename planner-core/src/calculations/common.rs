//! Shared helpers for the tax calculators.

use rust_decimal::Decimal;

/// Rounds a decimal value to exactly two decimal places using half-up
/// rounding (midpoints move away from zero, the standard financial
/// convention). Applied at aggregation points only; intermediate bracket
/// arithmetic stays exact.
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
}

/// Clamps a value at zero. Used for the documented floors (AMT owed,
/// exemption, taxable income), never to paper over bad input.
pub fn floor_zero(value: Decimal) -> Decimal {
    if value > Decimal::ZERO {
        value
    } else {
        Decimal::ZERO
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn round_half_up_rounds_down_below_midpoint() {
        assert_eq!(round_half_up(dec!(123.454)), dec!(123.45));
    }

    #[test]
    fn round_half_up_rounds_up_at_midpoint() {
        assert_eq!(round_half_up(dec!(123.455)), dec!(123.46));
    }

    #[test]
    fn round_half_up_rounds_away_from_zero_when_negative() {
        assert_eq!(round_half_up(dec!(-123.455)), dec!(-123.46));
    }

    #[test]
    fn floor_zero_passes_positives_and_clamps_negatives() {
        assert_eq!(floor_zero(dec!(12.34)), dec!(12.34));
        assert_eq!(floor_zero(dec!(0)), dec!(0));
        assert_eq!(floor_zero(dec!(-12.34)), dec!(0));
    }
}
