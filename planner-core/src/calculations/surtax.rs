//! NIIT, additional Medicare, and employee payroll tax.
//!
//! Both surtaxes follow the same lesser-of-excess shape over inputs the
//! profile layer has already aggregated. What counts as net
//! investment income is a profile-construction concern; the assumption
//! baked into callers of [`niit`] is: include interest, dividends, capital
//! gains, rental/royalty, and passive business income; exclude wages,
//! active business income, and retirement distributions.

use rust_decimal::Decimal;

use crate::calculations::common::{floor_zero, round_half_up};
use crate::models::{FicaParameters, FilingStatus, SurtaxParameters};

/// Net investment income tax: `rate × min(NII, max(0, MAGI − threshold))`.
///
/// Never exceeds `rate × NII`, and is zero whenever MAGI is at or below
/// the threshold.
pub fn niit(
    params: &SurtaxParameters,
    status: FilingStatus,
    magi: Decimal,
    net_investment_income: Decimal,
) -> Decimal {
    let threshold = *params.niit_threshold.get(status);
    let excess = floor_zero(magi - threshold);
    let base = floor_zero(net_investment_income).min(excess);
    round_half_up(params.niit_rate * base)
}

/// Additional Medicare surtax on wage-type income over the status
/// threshold. Same lesser-of-excess pattern as NIIT, with the excess
/// itself as the base.
pub fn additional_medicare(
    params: &SurtaxParameters,
    status: FilingStatus,
    medicare_wages: Decimal,
) -> Decimal {
    let threshold = *params.additional_medicare_threshold.get(status);
    let excess = floor_zero(medicare_wages - threshold);
    round_half_up(params.additional_medicare_rate * excess)
}

/// Employee-side FICA: social security up to the wage base plus Medicare
/// on every wage dollar. The 0.9% additional Medicare piece is computed
/// separately by [`additional_medicare`].
pub fn employee_fica(params: &FicaParameters, fica_wages: Decimal) -> Decimal {
    let wages = floor_zero(fica_wages);
    let ss = params.ss_rate * wages.min(params.ss_wage_base);
    let medicare = params.medicare_rate * wages;
    round_half_up(ss + medicare)
}
