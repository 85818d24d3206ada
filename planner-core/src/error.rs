use rust_decimal::Decimal;
use thiserror::Error;

use crate::models::JurisdictionCode;

/// Errors surfaced by the computation engine.
///
/// Validation failures name the offending field and surface immediately;
/// computation itself is deterministic and pure, so there is no retry or
/// local recovery path. Intentional clamps (AMT floor at zero, exemption
/// floor at zero, effective rate of zero on zero gross income) are
/// documented invariants of the calculators, not errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    /// An input value is malformed (negative income, workday fractions not
    /// summing to one, and so on). Never silently clamped.
    #[error("invalid input for {field}: {reason}")]
    InvalidInput {
        field: &'static str,
        reason: String,
    },

    /// A required profile field is absent. The engine refuses to guess a
    /// default filing status or resident jurisdiction.
    #[error("profile is missing required field {field}")]
    IncompleteProfile { field: &'static str },

    /// The requested jurisdiction has no registered apportionment regime.
    #[error("no apportionment regime registered for jurisdiction {0}")]
    UnsupportedJurisdiction(JurisdictionCode),

    /// A bracket schedule failed structural validation.
    #[error("invalid bracket schedule: {0}")]
    InvalidSchedule(#[from] ScheduleError),
}

impl EngineError {
    /// Convenience constructor for negative-amount validation failures.
    pub(crate) fn negative(field: &'static str, value: Decimal) -> Self {
        EngineError::InvalidInput {
            field,
            reason: format!("must be non-negative, got {value}"),
        }
    }
}

/// Structural errors in a [`crate::models::BracketSchedule`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScheduleError {
    /// A schedule must contain at least one bracket.
    #[error("schedule has no brackets")]
    Empty,

    /// Every bracket except the last must carry an upper bound.
    #[error("bracket {0} has no upper bound but is not the final bracket")]
    UnboundedInterior(usize),

    /// The final bracket must be unbounded.
    #[error("final bracket must have no upper bound")]
    BoundedFinal,

    /// Upper bounds must be strictly increasing and positive.
    #[error("bracket {index} upper bound {bound} does not exceed the previous bound")]
    NonIncreasingBound { index: usize, bound: Decimal },

    /// Rates must lie in [0, 1] and never decrease within one schedule.
    #[error("bracket {index} rate {rate} is out of range or decreasing")]
    InvalidRate { index: usize, rate: Decimal },
}
