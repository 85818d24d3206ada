//! Deterministic tax calculators. Every function here is pure: same
//! inputs, same output, no clock or locale reads.

pub mod amt;
pub mod apportionment;
pub mod common;
pub mod equity;
pub mod orchestrator;
pub mod stacking;
pub mod surtax;

pub use amt::{AmtOutcome, compute_amt};
pub use apportionment::apportion;
pub use equity::{DispositionType, EquityAggregate, EquityRecognition, aggregate, recognize};
pub use orchestrator::TaxEngine;
pub use stacking::stack;
pub use surtax::{additional_medicare, employee_fica, niit};
