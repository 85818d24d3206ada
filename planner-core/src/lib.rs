//! Deterministic personal tax computation and planning engine.
//!
//! All money flows through [`rust_decimal::Decimal`]; the engine never
//! touches floating point, the system clock, or locale state. The typical
//! entry point is [`TaxEngine`]: build it from a [`YearParameters`] set
//! and a [`JurisdictionRegistry`], then call
//! [`compute`](TaxEngine::compute) per profile. Alert evaluation and
//! scenario comparison layer on top of the computed [`TaxResult`].

pub mod alerts;
pub mod calculations;
pub mod error;
pub mod models;
pub mod scenarios;

pub use calculations::TaxEngine;
pub use error::{EngineError, ScheduleError};
pub use models::{
    Alert, AlertDefinition, BracketSchedule, FilingStatus, FinancialProfile, JurisdictionCode,
    JurisdictionRegistry, ScenarioComparison, ScenarioOverrides, TaxResult, YearParameters,
};
pub use scenarios::ScenarioCache;
