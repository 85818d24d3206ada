//! Jurisdictions and their tax regimes.
//!
//! A jurisdiction is identified by a short uppercase code and taxed under
//! one of a closed set of regimes. Regime-specific surtaxes are modeled as
//! independent additive terms so that a new jurisdiction is a new registry
//! entry, never an edit to an existing regime.

use std::collections::BTreeMap;
use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::BracketSchedule;

/// Short uppercase identifier for a taxing jurisdiction (e.g. `CA`, `WA`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JurisdictionCode(String);

impl JurisdictionCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into().to_ascii_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JurisdictionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for JurisdictionCode {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

/// An additive jurisdiction surtax. Each variant is an independent term:
/// the regime sums whatever list it carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Surtax {
    /// Flat extra rate on taxable income above a threshold (e.g. a
    /// mental-health services add-on over $1M).
    ThresholdFlat { threshold: Decimal, rate: Decimal },

    /// Payroll-style levy on all wage income with no wage cap.
    UncappedPayroll { rate: Decimal },
}

/// How a jurisdiction taxes a resident's (or sourced) income.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "regime", rename_all = "snake_case")]
pub enum JurisdictionRegime {
    /// No individual income tax at all.
    NoIncomeTax,

    /// A flat or progressive schedule over all income, plus any number of
    /// additive surtaxes.
    Progressive {
        schedule: BracketSchedule,
        standard_deduction: Decimal,
        #[serde(default)]
        surtaxes: Vec<Surtax>,
    },

    /// Taxes long-term capital gains only, under its own tiered schedule
    /// and standard deduction; all other income is untaxed.
    CapitalGainsOnly {
        schedule: BracketSchedule,
        standard_deduction: Decimal,
    },
}

/// Registry of apportionment regimes, keyed by jurisdiction code.
///
/// Built once by the configuration layer; the engine only reads it. A
/// lookup miss is an [`crate::EngineError::UnsupportedJurisdiction`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JurisdictionRegistry {
    regimes: BTreeMap<JurisdictionCode, JurisdictionRegime>,
}

impl JurisdictionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, code: JurisdictionCode, regime: JurisdictionRegime) {
        self.regimes.insert(code, regime);
    }

    pub fn get(&self, code: &JurisdictionCode) -> Option<&JurisdictionRegime> {
        self.regimes.get(code)
    }

    pub fn contains(&self, code: &JurisdictionCode) -> bool {
        self.regimes.contains_key(code)
    }

    pub fn codes(&self) -> impl Iterator<Item = &JurisdictionCode> {
        self.regimes.keys()
    }
}
