//! Preferential-income stacking.
//!
//! Long-term gains and qualified dividends are taxed as if layered on top
//! of ordinary taxable income: the ordinary amount occupies the bottom of
//! the combined income scale, and each preferential dollar is taxed at the
//! preferential-schedule rate of the layer it lands in. The operation is
//! deliberately order-sensitive: swapping the two amounts changes the
//! result, and that asymmetry is pinned by test.

use rust_decimal::Decimal;
use tracing::warn;

use crate::calculations::common::floor_zero;
use crate::models::BracketSchedule;

/// Taxes `preferential_amount` stacked on top of `ordinary_taxable` under
/// the preferential schedule.
///
/// A non-positive preferential amount owes nothing (a net loss is handled
/// by carryforward netting upstream, not here). Negative ordinary income
/// starts the stack at zero.
pub fn stack(
    preferential_schedule: &BracketSchedule,
    ordinary_taxable: Decimal,
    preferential_amount: Decimal,
) -> Decimal {
    if preferential_amount <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    if ordinary_taxable < Decimal::ZERO {
        warn!(
            ordinary_taxable = %ordinary_taxable,
            "negative ordinary taxable income; stacking from zero"
        );
    }

    let mut position = floor_zero(ordinary_taxable);
    let mut remaining = preferential_amount;
    let mut tax = Decimal::ZERO;

    for bracket in preferential_schedule.brackets() {
        let slice = match bracket.upper {
            Some(bound) => {
                if position >= bound {
                    continue;
                }
                remaining.min(bound - position)
            }
            None => remaining,
        };

        tax += slice * bracket.rate;
        position += slice;
        remaining -= slice;

        if remaining <= Decimal::ZERO {
            break;
        }
    }

    tax
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::Bracket;

    /// The 2025 single-filer long-term capital gains schedule.
    fn ltcg_single_2025() -> BracketSchedule {
        BracketSchedule::new(vec![
            Bracket {
                upper: Some(dec!(48350)),
                rate: dec!(0),
            },
            Bracket {
                upper: Some(dec!(533400)),
                rate: dec!(0.15),
            },
            Bracket {
                upper: None,
                rate: dec!(0.20),
            },
        ])
        .unwrap()
    }

    #[test]
    fn gains_below_zero_bracket_owe_nothing() {
        let tax = stack(&ltcg_single_2025(), dec!(0), dec!(40000));

        assert_eq!(tax, dec!(0));
    }

    #[test]
    fn ordinary_income_pushes_gains_into_higher_layers() {
        // Ordinary income fills the 0% layer entirely; every gain dollar
        // lands in the 15% layer.
        let tax = stack(&ltcg_single_2025(), dec!(100000), dec!(40000));

        assert_eq!(tax, dec!(6000.00));
    }

    #[test]
    fn gains_straddling_a_boundary_split_across_rates() {
        // 8,350 of the gain fills the rest of the 0% layer, 11,650 lands
        // in the 15% layer.
        let tax = stack(&ltcg_single_2025(), dec!(40000), dec!(20000));

        assert_eq!(tax, dec!(1747.50));
    }

    #[test]
    fn gains_reaching_the_top_layer_pay_the_top_rate() {
        let tax = stack(&ltcg_single_2025(), dec!(500000), dec!(100000));

        // 33,400 at 15%, 66,600 at 20%.
        assert_eq!(tax, dec!(18330.00));
    }

    #[test]
    fn stacking_is_not_commutative() {
        let schedule = ltcg_single_2025();

        let gains_on_top = stack(&schedule, dec!(100000), dec!(30000));
        let swapped = stack(&schedule, dec!(30000), dec!(100000));

        assert_ne!(gains_on_top, swapped);
        assert_eq!(gains_on_top, dec!(4500.00));
        // 18,350 free, 81,650 at 15%.
        assert_eq!(swapped, dec!(12247.50));
    }

    #[test]
    fn zero_or_negative_preferential_amount_owes_nothing() {
        let schedule = ltcg_single_2025();

        assert_eq!(stack(&schedule, dec!(80000), dec!(0)), dec!(0));
        assert_eq!(stack(&schedule, dec!(80000), dec!(-5000)), dec!(0));
    }

    #[test]
    fn negative_ordinary_income_stacks_from_zero() {
        let tax = stack(&ltcg_single_2025(), dec!(-10000), dec!(48350));

        assert_eq!(tax, dec!(0));
    }
}
