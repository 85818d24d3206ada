//! Multi-jurisdiction income sourcing and state tax.
//!
//! Equity compensation income is sourced by workdays: an event carrying a
//! workday map sends `income × fraction` to each listed jurisdiction
//! (fractions are validated upstream to sum to one). Everything without a
//! map (wages, investment income, capital gains) belongs to the
//! resident jurisdiction. Each jurisdiction is then taxed under its
//! registered regime; surtaxes are independent additive terms, so adding
//! a jurisdiction never touches an existing one.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::calculations::common::{floor_zero, round_half_up};
use crate::calculations::equity::recognize;
use crate::error::EngineError;
use crate::models::{
    FinancialProfile, JurisdictionCode, JurisdictionRegime, JurisdictionRegistry,
    SupplementalWithholding, Surtax,
};

/// Income attributed to one jurisdiction, split by character because the
/// regimes tax the components differently.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct SourcedIncome {
    /// Wage-type income: wages, RSU vests, sourced equity ordinary income.
    compensation: Decimal,
    /// Interest, dividends, and short-term gains.
    investment: Decimal,
    long_term_gains: Decimal,
}

impl SourcedIncome {
    fn total(&self) -> Decimal {
        self.compensation + self.investment + self.long_term_gains
    }
}

/// Computes per-jurisdiction state tax for the profile.
///
/// Every jurisdiction that receives income (the resident state and every
/// state named by a workday map) must have a registered regime.
pub fn apportion(
    profile: &FinancialProfile,
    registry: &JurisdictionRegistry,
    supplemental: &SupplementalWithholding,
) -> Result<BTreeMap<JurisdictionCode, Decimal>, EngineError> {
    let resident = profile.require_resident_jurisdiction()?;
    let mut income: BTreeMap<JurisdictionCode, SourcedIncome> = BTreeMap::new();

    // Non-equity income belongs to the resident jurisdiction.
    {
        let home = income.entry(resident.clone()).or_default();
        home.compensation = profile.wages + profile.rsu_vest_income;
        home.investment = profile.interest_income
            + profile.ordinary_dividends
            + profile.qualified_dividends
            + profile.short_term_gains;
        home.long_term_gains = profile.long_term_gains;
    }

    // Equity events: ordinary income follows workdays; capital gains and
    // AMT preferences stay with the resident state.
    for event in &profile.equity_events {
        let recognition = recognize(event, supplemental, Decimal::ZERO);

        match event.workdays() {
            Some(map) => {
                for (code, fraction) in map {
                    let entry = income.entry(code.clone()).or_default();
                    entry.compensation += recognition.ordinary_income * *fraction;
                }
            }
            None => {
                let home = income.entry(resident.clone()).or_default();
                home.compensation += recognition.ordinary_income;
            }
        }

        let home = income.entry(resident.clone()).or_default();
        home.investment += recognition.short_term_gain;
        home.long_term_gains += recognition.long_term_gain;
    }

    let mut taxes = BTreeMap::new();
    for (code, sourced) in income {
        let regime = registry
            .get(&code)
            .ok_or_else(|| EngineError::UnsupportedJurisdiction(code.clone()))?;
        taxes.insert(code, apply_regime(regime, &sourced));
    }

    Ok(taxes)
}

fn apply_regime(regime: &JurisdictionRegime, income: &SourcedIncome) -> Decimal {
    match regime {
        JurisdictionRegime::NoIncomeTax => Decimal::ZERO,

        JurisdictionRegime::Progressive {
            schedule,
            standard_deduction,
            surtaxes,
        } => {
            let taxable = floor_zero(income.total() - *standard_deduction);
            let mut tax = schedule.tax(taxable);
            for surtax in surtaxes {
                tax += match surtax {
                    Surtax::ThresholdFlat { threshold, rate } => {
                        *rate * floor_zero(taxable - *threshold)
                    }
                    Surtax::UncappedPayroll { rate } => *rate * floor_zero(income.compensation),
                };
            }
            round_half_up(tax)
        }

        JurisdictionRegime::CapitalGainsOnly {
            schedule,
            standard_deduction,
        } => {
            let taxable = floor_zero(income.long_term_gains - *standard_deduction);
            round_half_up(schedule.tax(taxable))
        }
    }
}
