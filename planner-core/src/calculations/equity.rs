//! Per-instrument income recognition for equity compensation.
//!
//! One pure function per event variant, each returning a typed
//! [`EquityRecognition`]. Classification rules:
//!
//! - ISO sale is *qualifying* iff sale ≥ grant + 2 years AND sale ≥
//!   exercise + 1 year. Both legs are required; the flip happens at the
//!   later of the two boundaries.
//! - ESPP sale is *qualifying* iff sale ≥ offering + 2 years AND sale ≥
//!   purchase + 1 year.
//! - Shares held one year or more from acquisition produce long-term
//!   gain; the same `>=` convention as the eligibility windows, pinned by
//!   test so the boundary day is unambiguous.
//!
//! The orchestrator sums recognitions across all events before invoking
//! the downstream modules.

use chrono::{Months, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::common::floor_zero;
use crate::models::{EquityEvent, SupplementalWithholding};

/// Holding-period classification of a sale event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispositionType {
    Qualifying,
    Disqualifying,
    /// Vest, exercise, and purchase events: nothing was sold.
    NotADisposition,
}

/// The tax consequences of one equity event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquityRecognition {
    pub ordinary_income: Decimal,
    pub short_term_gain: Decimal,
    pub long_term_gain: Decimal,
    /// Contribution to AMT preference adjustments (ISO bargain elements).
    pub amt_adjustment: Decimal,
    /// Portion of `ordinary_income` that is also FICA wages (RSU vests and
    /// NSO exercises; statutory ISO/ESPP income is FICA-exempt).
    pub fica_wages: Decimal,
    /// Under-withholding versus the actual marginal rate (RSU vests only).
    pub withholding_shortfall: Decimal,
    pub disposition: DispositionType,
}

impl EquityRecognition {
    fn zero() -> Self {
        Self {
            ordinary_income: Decimal::ZERO,
            short_term_gain: Decimal::ZERO,
            long_term_gain: Decimal::ZERO,
            amt_adjustment: Decimal::ZERO,
            fica_wages: Decimal::ZERO,
            withholding_shortfall: Decimal::ZERO,
            disposition: DispositionType::NotADisposition,
        }
    }

    pub fn capital_gain(&self) -> Decimal {
        self.short_term_gain + self.long_term_gain
    }
}

/// Summed recognitions for a whole profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquityAggregate {
    pub ordinary_income: Decimal,
    pub short_term_gain: Decimal,
    pub long_term_gain: Decimal,
    pub amt_adjustment: Decimal,
    pub fica_wages: Decimal,
}

/// `date >= start + months`, with end-of-month clamping from chrono.
fn reached(date: NaiveDate, start: NaiveDate, months: u32) -> bool {
    match start.checked_add_months(Months::new(months)) {
        Some(boundary) => date >= boundary,
        None => false,
    }
}

/// Recognizes one event. `marginal_rate` is the taxpayer's actual marginal
/// ordinary rate, used only for the RSU supplemental-withholding
/// shortfall; pass zero when it is not yet known.
pub fn recognize(
    event: &EquityEvent,
    supplemental: &SupplementalWithholding,
    marginal_rate: Decimal,
) -> EquityRecognition {
    match event {
        EquityEvent::RsuVest {
            shares,
            fmv_at_vest,
            ..
        } => rsu_vest(*shares, *fmv_at_vest, supplemental, marginal_rate),
        EquityEvent::IsoExercise {
            shares,
            strike_price,
            fmv_at_exercise,
            ..
        } => iso_exercise(*shares, *strike_price, *fmv_at_exercise),
        EquityEvent::IsoSale {
            grant_date,
            exercise_date,
            sale_date,
            shares,
            strike_price,
            fmv_at_exercise,
            sale_price,
            ..
        } => iso_sale(
            *grant_date,
            *exercise_date,
            *sale_date,
            *shares,
            *strike_price,
            *fmv_at_exercise,
            *sale_price,
        ),
        EquityEvent::NsoExercise {
            shares,
            strike_price,
            fmv_at_exercise,
            ..
        } => nso_exercise(*shares, *strike_price, *fmv_at_exercise),
        EquityEvent::EsppPurchase { .. } => EquityRecognition::zero(),
        EquityEvent::EsppSale {
            offering_date,
            purchase_date,
            sale_date,
            shares,
            fmv_at_offering,
            fmv_at_purchase,
            purchase_price,
            sale_price,
            ..
        } => espp_sale(
            *offering_date,
            *purchase_date,
            *sale_date,
            *shares,
            *fmv_at_offering,
            *fmv_at_purchase,
            *purchase_price,
            *sale_price,
        ),
    }
}

/// Sums recognitions across all events (withholding shortfall excluded;
/// it needs the final marginal rate; see [`rsu_withholding_shortfall`]).
pub fn aggregate(events: &[EquityEvent], supplemental: &SupplementalWithholding) -> EquityAggregate {
    let mut total = EquityAggregate::default();
    for event in events {
        let recognition = recognize(event, supplemental, Decimal::ZERO);
        total.ordinary_income += recognition.ordinary_income;
        total.short_term_gain += recognition.short_term_gain;
        total.long_term_gain += recognition.long_term_gain;
        total.amt_adjustment += recognition.amt_adjustment;
        total.fica_wages += recognition.fica_wages;
    }
    total
}

/// Total RSU supplemental-withholding shortfall at the actual marginal
/// rate, summed across vest events.
pub fn rsu_withholding_shortfall(
    events: &[EquityEvent],
    supplemental: &SupplementalWithholding,
    marginal_rate: Decimal,
) -> Decimal {
    events
        .iter()
        .map(|event| recognize(event, supplemental, marginal_rate).withholding_shortfall)
        .sum()
}

fn rsu_vest(
    shares: Decimal,
    fmv_at_vest: Decimal,
    supplemental: &SupplementalWithholding,
    marginal_rate: Decimal,
) -> EquityRecognition {
    let vest_value = shares * fmv_at_vest;

    // Flat supplemental withholding blends across the high-rate threshold:
    // the first $1M of supplemental wages withholds at the flat rate, the
    // remainder at the high rate.
    let shortfall = if vest_value > Decimal::ZERO {
        let below = vest_value.min(supplemental.high_rate_threshold);
        let above = floor_zero(vest_value - supplemental.high_rate_threshold);
        let withheld = supplemental.flat_rate * below + supplemental.high_rate * above;
        floor_zero(marginal_rate * vest_value - withheld)
    } else {
        Decimal::ZERO
    };

    EquityRecognition {
        ordinary_income: vest_value,
        fica_wages: vest_value,
        withholding_shortfall: shortfall,
        ..EquityRecognition::zero()
    }
}

fn iso_exercise(shares: Decimal, strike_price: Decimal, fmv_at_exercise: Decimal) -> EquityRecognition {
    // Bargain element is an AMT preference only; no regular-tax effect.
    let bargain = floor_zero((fmv_at_exercise - strike_price) * shares);

    EquityRecognition {
        amt_adjustment: bargain,
        ..EquityRecognition::zero()
    }
}

fn iso_sale(
    grant_date: NaiveDate,
    exercise_date: NaiveDate,
    sale_date: NaiveDate,
    shares: Decimal,
    strike_price: Decimal,
    fmv_at_exercise: Decimal,
    sale_price: Decimal,
) -> EquityRecognition {
    let bargain = floor_zero((fmv_at_exercise - strike_price) * shares);
    let gain = (sale_price - strike_price) * shares;

    let qualifying = reached(sale_date, grant_date, 24) && reached(sale_date, exercise_date, 12);
    let held_long = reached(sale_date, exercise_date, 12);

    if qualifying {
        // Entire gain (or loss) is long-term capital.
        return EquityRecognition {
            long_term_gain: gain,
            disposition: DispositionType::Qualifying,
            ..EquityRecognition::zero()
        };
    }

    // Disqualifying: the bargain element converts to ordinary income, but
    // never more than the actual gain, and never below zero on a loss.
    let ordinary = floor_zero(bargain.min(gain));
    let remainder = gain - ordinary;
    let (short_term_gain, long_term_gain) = if held_long {
        (Decimal::ZERO, remainder)
    } else {
        (remainder, Decimal::ZERO)
    };

    EquityRecognition {
        ordinary_income: ordinary,
        short_term_gain,
        long_term_gain,
        disposition: DispositionType::Disqualifying,
        ..EquityRecognition::zero()
    }
}

fn nso_exercise(shares: Decimal, strike_price: Decimal, fmv_at_exercise: Decimal) -> EquityRecognition {
    // NSO spread is wages at exercise: ordinary and FICA-subject, no
    // deferral.
    let bargain = floor_zero((fmv_at_exercise - strike_price) * shares);

    EquityRecognition {
        ordinary_income: bargain,
        fica_wages: bargain,
        ..EquityRecognition::zero()
    }
}

#[allow(clippy::too_many_arguments)]
fn espp_sale(
    offering_date: NaiveDate,
    purchase_date: NaiveDate,
    sale_date: NaiveDate,
    shares: Decimal,
    fmv_at_offering: Decimal,
    fmv_at_purchase: Decimal,
    purchase_price: Decimal,
    sale_price: Decimal,
) -> EquityRecognition {
    let gain = (sale_price - purchase_price) * shares;
    let qualifying = reached(sale_date, offering_date, 24) && reached(sale_date, purchase_date, 12);
    let held_long = reached(sale_date, purchase_date, 12);

    let ordinary = if qualifying {
        // Lesser of the offering-date discount and the actual gain.
        let offering_discount = floor_zero((fmv_at_offering - purchase_price) * shares);
        floor_zero(offering_discount.min(gain))
    } else {
        // Full bargain element at purchase, regardless of the sale price.
        floor_zero((fmv_at_purchase - purchase_price) * shares)
    };

    let remainder = gain - ordinary;
    let (short_term_gain, long_term_gain) = if held_long {
        (Decimal::ZERO, remainder)
    } else {
        (remainder, Decimal::ZERO)
    };

    EquityRecognition {
        ordinary_income: ordinary,
        short_term_gain,
        long_term_gain,
        disposition: if qualifying {
            DispositionType::Qualifying
        } else {
            DispositionType::Disqualifying
        },
        ..EquityRecognition::zero()
    }
}
