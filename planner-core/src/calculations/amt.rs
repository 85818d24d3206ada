//! Alternative minimum tax.
//!
//! The AMT runs in parallel with the regular computation: AMTI is regular
//! taxable income plus preference adjustments (ISO bargain elements, the
//! state-tax and standard-deduction addbacks), the exemption phases out at
//! 25 cents per dollar of AMTI over the threshold, and only the excess of
//! tentative minimum tax over regular tax is owed. Every intermediate
//! value floors at zero; AMT only ever adds to the liability.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::calculations::common::{floor_zero, round_half_up};
use crate::models::{AmtParameters, FilingStatus};

/// Fully-worked AMT computation for one profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmtOutcome {
    pub amti: Decimal,
    pub exemption_allowed: Decimal,
    pub tentative_minimum_tax: Decimal,
    /// Excess of tentative minimum tax over regular tax; never negative.
    pub amt_owed: Decimal,
    /// Minimum-tax credit usable this year against regular tax. Non-zero
    /// only in years where regular tax exceeds tentative minimum tax.
    pub amt_credit_used: Decimal,
}

/// Computes AMT owed on top of `regular_tax`.
///
/// `amt_adjustments` is the summed preference total (bargain elements plus
/// disallowed deductions). A negative adjustment total is tolerated; the
/// AMT base is floored at zero, never propagated negative.
pub fn compute_amt(
    params: &AmtParameters,
    status: FilingStatus,
    regular_taxable_income: Decimal,
    amt_adjustments: Decimal,
    regular_tax: Decimal,
    amt_credit_carryforward: Decimal,
) -> AmtOutcome {
    let amti = regular_taxable_income + amt_adjustments;
    if amti < Decimal::ZERO {
        warn!(
            amti = %amti,
            regular_taxable_income = %regular_taxable_income,
            amt_adjustments = %amt_adjustments,
            "negative AMTI; AMT base floors at zero"
        );
    }

    let base_exemption = *params.exemption.get(status);
    let phaseout_threshold = *params.phaseout_threshold.get(status);
    let phaseout = floor_zero((amti - phaseout_threshold) * params.phaseout_rate);
    let exemption_allowed = floor_zero(base_exemption - phaseout);

    let amt_base = floor_zero(amti - exemption_allowed);
    let tentative_minimum_tax = round_half_up(params.schedule.get(status).tax(amt_base));

    let amt_owed = floor_zero(round_half_up(tentative_minimum_tax - regular_tax));

    // The minimum-tax credit only releases in years where regular tax
    // exceeds tentative minimum tax.
    let amt_credit_used = if amt_owed.is_zero() {
        amt_credit_carryforward.min(floor_zero(regular_tax - tentative_minimum_tax))
    } else {
        Decimal::ZERO
    };

    AmtOutcome {
        amti,
        exemption_allowed,
        tentative_minimum_tax,
        amt_owed,
        amt_credit_used,
    }
}
