//! The engine's output: one immutable [`TaxResult`] per computation call.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{FilingStatus, JurisdictionCode};

/// Stable keys for the labeled breakdown map. The scenario differ and the
/// alert catalog refer to lines by these names, so they are part of the
/// output contract.
pub mod breakdown {
    pub const TAXABLE_INCOME: &str = "federal.taxable_income";
    pub const ORDINARY_TAX: &str = "federal.ordinary_tax";
    pub const PREFERENTIAL_TAX: &str = "federal.preferential_tax";
    pub const AMT_OWED: &str = "federal.amt_owed";
    pub const AMT_CREDIT_USED: &str = "federal.amt_credit_used";
    pub const NIIT: &str = "federal.niit";
    pub const ADDITIONAL_MEDICARE: &str = "federal.additional_medicare";
    pub const FICA: &str = "federal.fica";
    pub const BALANCE_DUE: &str = "federal.balance_due";
    pub const WITHHOLDING_SHORTFALL: &str = "equity.withholding_shortfall";
    pub const TOTAL_TAX: &str = "total_tax";

    /// Prefix for per-jurisdiction lines (`state.CA`, `state.WA`, ...).
    pub const STATE_PREFIX: &str = "state.";
}

/// Computed liability for one profile and year.
///
/// Produced fresh on every orchestrator call and never mutated afterwards.
/// `amt_owed` is already net of regular tax and never negative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxResult {
    pub tax_year: i32,
    pub filing_status: FilingStatus,

    pub taxable_income: Decimal,
    pub ordinary_tax: Decimal,
    pub preferential_tax: Decimal,
    pub amt_owed: Decimal,
    pub amt_credit_used: Decimal,
    pub niit: Decimal,
    pub additional_medicare: Decimal,
    pub fica: Decimal,

    pub state_tax: BTreeMap<JurisdictionCode, Decimal>,

    pub total_tax: Decimal,
    pub marginal_rate: Decimal,
    /// Total tax over gross income; zero when gross income is zero.
    pub effective_rate: Decimal,

    /// Federal liability net of federal withholding; negative means an
    /// expected refund. FICA is excluded; it is withheld at source.
    pub federal_balance_due: Decimal,

    /// RSU supplemental-withholding shortfall at the actual marginal rate.
    pub withholding_shortfall: Decimal,

    /// Labeled line items for downstream display, keyed by the constants in
    /// [`breakdown`].
    pub breakdown: BTreeMap<String, Decimal>,
}

impl TaxResult {
    pub fn state_tax_total(&self) -> Decimal {
        self.state_tax.values().copied().sum()
    }

    pub fn state_tax_for(&self, code: &JurisdictionCode) -> Decimal {
        self.state_tax.get(code).copied().unwrap_or(Decimal::ZERO)
    }
}
