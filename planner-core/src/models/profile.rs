//! The immutable financial profile the engine computes over.
//!
//! A profile is populated by an upstream aggregation layer and handed to
//! the engine by reference; the engine never retains it beyond one
//! synchronous call and never mutates it. Income classification (what
//! counts as net investment income, which dividends are qualified) happens
//! at profile construction, not inside the calculators.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::models::{EquityEvent, FilingStatus, JurisdictionCode};

/// Itemized-deduction detail. The state-taxes-paid component is tracked
/// separately because it is added back when computing AMTI.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemizedDeductions {
    pub state_taxes_paid: Decimal,
    pub other: Decimal,
}

impl ItemizedDeductions {
    pub fn total(&self) -> Decimal {
        self.state_taxes_paid + self.other
    }
}

/// Amounts already withheld for the year.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Withholding {
    pub federal: Decimal,
    pub state: Decimal,
    pub fica: Decimal,
}

/// Prior-year carryforwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Carryforwards {
    /// Unused capital loss carried into the year (stored as a positive
    /// amount).
    pub capital_loss: Decimal,
    /// Minimum-tax credit available against regular tax.
    pub amt_credit: Decimal,
}

/// A complete financial picture for one taxpayer and one tax year.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinancialProfile {
    pub tax_year: i32,

    /// Filing status. The engine refuses to guess one.
    pub filing_status: Option<FilingStatus>,

    /// Resident jurisdiction; receives all income not sourced elsewhere by
    /// a workday map.
    pub resident_jurisdiction: Option<JurisdictionCode>,

    /// W-2 wages excluding equity compensation listed in `equity_events`.
    pub wages: Decimal,

    /// RSU vest income already aggregated upstream (vests not itemized as
    /// events).
    pub rsu_vest_income: Decimal,

    /// Net short-term capital gain; negative for a net loss.
    pub short_term_gains: Decimal,

    /// Net long-term capital gain; negative for a net loss.
    pub long_term_gains: Decimal,

    pub qualified_dividends: Decimal,

    /// Non-qualified dividend income, taxed as ordinary.
    pub ordinary_dividends: Decimal,

    pub interest_income: Decimal,

    pub itemized: ItemizedDeductions,

    /// Above-the-line adjustments (reduce AGI before any deduction).
    pub above_the_line_adjustments: Decimal,

    pub withholding: Withholding,

    pub carryforwards: Carryforwards,

    pub equity_events: Vec<EquityEvent>,
}

impl FinancialProfile {
    /// An empty profile for the given year; filing status and resident
    /// jurisdiction still have to be supplied before computation.
    pub fn new(tax_year: i32) -> Self {
        Self {
            tax_year,
            ..Self::default()
        }
    }

    /// The filing status, or the incomplete-profile error naming it.
    pub fn require_filing_status(&self) -> Result<FilingStatus, EngineError> {
        self.filing_status.ok_or(EngineError::IncompleteProfile {
            field: "filing_status",
        })
    }

    /// The resident jurisdiction, or the incomplete-profile error naming it.
    pub fn require_resident_jurisdiction(&self) -> Result<&JurisdictionCode, EngineError> {
        self.resident_jurisdiction
            .as_ref()
            .ok_or(EngineError::IncompleteProfile {
                field: "resident_jurisdiction",
            })
    }

    /// Fails fast on malformed input. Capital gain fields may be negative
    /// (a net loss); everything else here must be non-negative.
    pub fn validate(&self) -> Result<(), EngineError> {
        self.require_filing_status()?;
        self.require_resident_jurisdiction()?;

        let non_negative = [
            ("wages", self.wages),
            ("rsu_vest_income", self.rsu_vest_income),
            ("qualified_dividends", self.qualified_dividends),
            ("ordinary_dividends", self.ordinary_dividends),
            ("interest_income", self.interest_income),
            ("itemized.state_taxes_paid", self.itemized.state_taxes_paid),
            ("itemized.other", self.itemized.other),
            (
                "above_the_line_adjustments",
                self.above_the_line_adjustments,
            ),
            ("withholding.federal", self.withholding.federal),
            ("withholding.state", self.withholding.state),
            ("withholding.fica", self.withholding.fica),
            ("carryforwards.capital_loss", self.carryforwards.capital_loss),
            ("carryforwards.amt_credit", self.carryforwards.amt_credit),
        ];
        for (field, value) in non_negative {
            if value < Decimal::ZERO {
                return Err(EngineError::negative(field, value));
            }
        }

        for event in &self.equity_events {
            event.validate()?;
        }

        Ok(())
    }
}
