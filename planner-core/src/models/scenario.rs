//! Scenario comparison inputs and outputs.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{
    Carryforwards, EquityEvent, FilingStatus, FinancialProfile, ItemizedDeductions,
    JurisdictionCode, TaxResult, Withholding,
};

/// Shallow field replacements applied over a copy of a baseline profile.
/// `None` means "keep the baseline value". The baseline itself is never
/// mutated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioOverrides {
    pub filing_status: Option<FilingStatus>,
    pub resident_jurisdiction: Option<JurisdictionCode>,
    pub wages: Option<Decimal>,
    pub rsu_vest_income: Option<Decimal>,
    pub short_term_gains: Option<Decimal>,
    pub long_term_gains: Option<Decimal>,
    pub qualified_dividends: Option<Decimal>,
    pub ordinary_dividends: Option<Decimal>,
    pub interest_income: Option<Decimal>,
    pub itemized: Option<ItemizedDeductions>,
    pub above_the_line_adjustments: Option<Decimal>,
    pub withholding: Option<Withholding>,
    pub carryforwards: Option<Carryforwards>,
    pub equity_events: Option<Vec<EquityEvent>>,
}

impl ScenarioOverrides {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Builds the alternative profile: a copy of `baseline` with every
    /// `Some` field replaced wholesale.
    pub fn apply(&self, baseline: &FinancialProfile) -> FinancialProfile {
        let mut alternative = baseline.clone();

        if let Some(status) = self.filing_status {
            alternative.filing_status = Some(status);
        }
        if let Some(jurisdiction) = &self.resident_jurisdiction {
            alternative.resident_jurisdiction = Some(jurisdiction.clone());
        }
        if let Some(wages) = self.wages {
            alternative.wages = wages;
        }
        if let Some(rsu) = self.rsu_vest_income {
            alternative.rsu_vest_income = rsu;
        }
        if let Some(stcg) = self.short_term_gains {
            alternative.short_term_gains = stcg;
        }
        if let Some(ltcg) = self.long_term_gains {
            alternative.long_term_gains = ltcg;
        }
        if let Some(dividends) = self.qualified_dividends {
            alternative.qualified_dividends = dividends;
        }
        if let Some(dividends) = self.ordinary_dividends {
            alternative.ordinary_dividends = dividends;
        }
        if let Some(interest) = self.interest_income {
            alternative.interest_income = interest;
        }
        if let Some(itemized) = &self.itemized {
            alternative.itemized = itemized.clone();
        }
        if let Some(adjustments) = self.above_the_line_adjustments {
            alternative.above_the_line_adjustments = adjustments;
        }
        if let Some(withholding) = &self.withholding {
            alternative.withholding = withholding.clone();
        }
        if let Some(carryforwards) = &self.carryforwards {
            alternative.carryforwards = carryforwards.clone();
        }
        if let Some(events) = &self.equity_events {
            alternative.equity_events = events.clone();
        }

        alternative
    }
}

/// Baseline-versus-alternative outcome of one comparison request.
///
/// `diff` holds `alternative − baseline` per breakdown line (union of
/// keys); `savings` is `baseline.total − alternative.total`, so a positive
/// value means the alternative is cheaper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioComparison {
    pub baseline: TaxResult,
    pub alternative: TaxResult,
    pub diff: BTreeMap<String, Decimal>,
    pub savings: Decimal,
}
