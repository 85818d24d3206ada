//! Year-specific rates, thresholds, and schedules.
//!
//! These values change annually and are supplied by the configuration
//! layer; nothing in the calculators hard-codes a statutory figure.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::models::{BracketSchedule, FilingStatus};

/// One value per filing status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerStatus<T> {
    pub single: T,
    pub married_filing_jointly: T,
    pub married_filing_separately: T,
    pub head_of_household: T,
}

impl<T> PerStatus<T> {
    pub fn get(&self, status: FilingStatus) -> &T {
        match status {
            FilingStatus::Single => &self.single,
            FilingStatus::MarriedFilingJointly => &self.married_filing_jointly,
            FilingStatus::MarriedFilingSeparately => &self.married_filing_separately,
            FilingStatus::HeadOfHousehold => &self.head_of_household,
        }
    }
}

impl<T: Clone> PerStatus<T> {
    /// The same value for every status.
    pub fn uniform(value: T) -> Self {
        Self {
            single: value.clone(),
            married_filing_jointly: value.clone(),
            married_filing_separately: value.clone(),
            head_of_household: value,
        }
    }
}

/// Alternative-minimum-tax parameters: exemption, its phase-out, and the
/// two-tier rate schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmtParameters {
    pub exemption: PerStatus<Decimal>,
    pub phaseout_threshold: PerStatus<Decimal>,
    /// Exemption reduction per dollar of AMTI over the threshold (25%).
    pub phaseout_rate: Decimal,
    pub schedule: PerStatus<BracketSchedule>,
}

/// Employee-side payroll tax parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FicaParameters {
    pub ss_rate: Decimal,
    pub ss_wage_base: Decimal,
    pub medicare_rate: Decimal,
}

/// Flat supplemental-wage withholding rates and the cumulative wage level
/// at which the higher rate takes over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplementalWithholding {
    pub flat_rate: Decimal,
    pub high_rate: Decimal,
    pub high_rate_threshold: Decimal,
}

/// NIIT and additional-Medicare surtax parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurtaxParameters {
    pub niit_rate: Decimal,
    pub niit_threshold: PerStatus<Decimal>,
    pub additional_medicare_rate: Decimal,
    pub additional_medicare_threshold: PerStatus<Decimal>,
}

/// Everything year-specific the engine needs for one tax year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearParameters {
    pub tax_year: i32,
    pub ordinary: PerStatus<BracketSchedule>,
    pub capital_gains: PerStatus<BracketSchedule>,
    pub standard_deduction: PerStatus<Decimal>,
    pub amt: AmtParameters,
    pub surtaxes: SurtaxParameters,
    pub fica: FicaParameters,
    pub supplemental: SupplementalWithholding,
    /// Maximum net capital loss deductible against ordinary income.
    pub capital_loss_ordinary_limit: Decimal,
}

impl YearParameters {
    /// Sanity checks on rates and thresholds. Schedules validate themselves
    /// on construction and need no re-check here.
    pub fn validate(&self) -> Result<(), EngineError> {
        let rates = [
            ("amt.phaseout_rate", self.amt.phaseout_rate),
            ("surtaxes.niit_rate", self.surtaxes.niit_rate),
            (
                "surtaxes.additional_medicare_rate",
                self.surtaxes.additional_medicare_rate,
            ),
            ("fica.ss_rate", self.fica.ss_rate),
            ("fica.medicare_rate", self.fica.medicare_rate),
            ("supplemental.flat_rate", self.supplemental.flat_rate),
            ("supplemental.high_rate", self.supplemental.high_rate),
        ];
        for (field, rate) in rates {
            if rate < Decimal::ZERO || rate > Decimal::ONE {
                return Err(EngineError::InvalidInput {
                    field,
                    reason: format!("rate must be within [0, 1], got {rate}"),
                });
            }
        }

        let amounts = [
            ("fica.ss_wage_base", self.fica.ss_wage_base),
            (
                "supplemental.high_rate_threshold",
                self.supplemental.high_rate_threshold,
            ),
            (
                "capital_loss_ordinary_limit",
                self.capital_loss_ordinary_limit,
            ),
        ];
        for (field, amount) in amounts {
            if amount < Decimal::ZERO {
                return Err(EngineError::negative(field, amount));
            }
        }

        Ok(())
    }
}
