//! Progressive rate schedules and the bracket engine.
//!
//! A [`BracketSchedule`] is an ordered list of `(upper bound, rate)` pairs,
//! validated on construction and carrying a precomputed cumulative-tax table
//! (the tax owed at each bracket's lower bound) so that evaluating any
//! amount is a single bracket lookup plus one multiplication.
//!
//! # Boundary convention
//!
//! An amount exactly equal to a bracket's upper bound is taxed *in that
//! bracket*: the comparison is `amount <= upper`, so the reported marginal
//! rate at a boundary is the lower bracket's rate. The accumulated tax is
//! continuous across every boundary regardless of convention; only the
//! marginal rate differs, and the choice here is pinned by test.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ScheduleError;

/// One bracket of a progressive schedule.
///
/// `upper` is `None` only for the final, unbounded bracket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bracket {
    pub upper: Option<Decimal>,
    pub rate: Decimal,
}

/// A validated progressive rate schedule.
///
/// Invariants (enforced by [`BracketSchedule::new`]): at least one bracket,
/// upper bounds strictly increasing and positive, only the final bracket
/// unbounded, rates within `[0, 1]` and non-decreasing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Bracket>", into = "Vec<Bracket>")]
pub struct BracketSchedule {
    brackets: Vec<Bracket>,
    /// `cumulative[i]` is the tax accumulated at bracket `i`'s lower bound.
    cumulative: Vec<Decimal>,
}

impl BracketSchedule {
    /// Validates the brackets and precomputes the cumulative-tax table.
    pub fn new(brackets: Vec<Bracket>) -> Result<Self, ScheduleError> {
        if brackets.is_empty() {
            return Err(ScheduleError::Empty);
        }

        let last = brackets.len() - 1;
        if brackets[last].upper.is_some() {
            return Err(ScheduleError::BoundedFinal);
        }

        let mut previous_bound = Decimal::ZERO;
        let mut previous_rate = Decimal::ZERO;
        let mut cumulative = Vec::with_capacity(brackets.len());
        let mut base = Decimal::ZERO;

        for (index, bracket) in brackets.iter().enumerate() {
            if bracket.rate < Decimal::ZERO
                || bracket.rate > Decimal::ONE
                || bracket.rate < previous_rate
            {
                return Err(ScheduleError::InvalidRate {
                    index,
                    rate: bracket.rate,
                });
            }
            previous_rate = bracket.rate;

            cumulative.push(base);

            match bracket.upper {
                // Interior bracket: the bounded-final case was rejected
                // above, so a bound here always has a successor.
                Some(bound) => {
                    if bound <= previous_bound {
                        return Err(ScheduleError::NonIncreasingBound { index, bound });
                    }
                    base += (bound - previous_bound) * bracket.rate;
                    previous_bound = bound;
                }
                None => {
                    if index != last {
                        return Err(ScheduleError::UnboundedInterior(index));
                    }
                }
            }
        }

        Ok(Self {
            brackets,
            cumulative,
        })
    }

    /// Builds a single-bracket flat schedule.
    pub fn flat(rate: Decimal) -> Result<Self, ScheduleError> {
        Self::new(vec![Bracket { upper: None, rate }])
    }

    pub fn brackets(&self) -> &[Bracket] {
        &self.brackets
    }

    /// Tax accumulated at bracket `index`'s lower bound, from the
    /// precomputed cumulative table. `cumulative_tax_at(0)` is zero;
    /// indexes past the last bracket yield `None`.
    pub fn cumulative_tax_at(&self, index: usize) -> Option<Decimal> {
        self.cumulative.get(index).copied()
    }

    /// Evaluates the schedule at `amount`, returning `(tax, marginal rate)`.
    ///
    /// Amounts at or below zero owe nothing and report the bottom rate as
    /// marginal. An amount equal to a bracket's upper bound belongs to that
    /// bracket (see the module docs).
    pub fn apply(&self, amount: Decimal) -> (Decimal, Decimal) {
        if amount <= Decimal::ZERO {
            return (Decimal::ZERO, self.brackets[0].rate);
        }

        let mut lower = Decimal::ZERO;
        for (index, bracket) in self.brackets.iter().enumerate() {
            let in_bracket = match bracket.upper {
                Some(bound) => amount <= bound,
                None => true,
            };
            if in_bracket {
                let tax = self.cumulative[index] + (amount - lower) * bracket.rate;
                return (tax, bracket.rate);
            }
            // upper is Some here: an unbounded bracket always matches above
            lower = bracket.upper.unwrap_or(lower);
        }

        unreachable!("final bracket is unbounded");
    }

    /// Tax only, discarding the marginal rate.
    pub fn tax(&self, amount: Decimal) -> Decimal {
        self.apply(amount).0
    }

    /// The rate of the final, unbounded bracket.
    pub fn top_rate(&self) -> Decimal {
        self.brackets[self.brackets.len() - 1].rate
    }
}

impl TryFrom<Vec<Bracket>> for BracketSchedule {
    type Error = ScheduleError;

    fn try_from(brackets: Vec<Bracket>) -> Result<Self, Self::Error> {
        Self::new(brackets)
    }
}

impl From<BracketSchedule> for Vec<Bracket> {
    fn from(schedule: BracketSchedule) -> Self {
        schedule.brackets
    }
}
