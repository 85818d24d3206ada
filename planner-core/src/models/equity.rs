//! Equity compensation events.
//!
//! Each event is a tagged variant carrying the dates and prices the
//! recognition functions in `calculations::equity` need, plus an optional
//! per-jurisdiction workday map used by apportionment. Workday fractions
//! for one event must sum to 1 within `1e-6`.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::models::JurisdictionCode;

/// Fraction of the vest/holding period worked in each jurisdiction.
pub type WorkdayMap = BTreeMap<JurisdictionCode, Decimal>;

const WORKDAY_EPSILON: Decimal = Decimal::from_parts(1, 0, 0, false, 6); // 1e-6

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EquityEvent {
    RsuVest {
        vest_date: NaiveDate,
        shares: Decimal,
        fmv_at_vest: Decimal,
        #[serde(default)]
        workdays: Option<WorkdayMap>,
    },
    IsoExercise {
        grant_date: NaiveDate,
        exercise_date: NaiveDate,
        shares: Decimal,
        strike_price: Decimal,
        fmv_at_exercise: Decimal,
        #[serde(default)]
        workdays: Option<WorkdayMap>,
    },
    IsoSale {
        grant_date: NaiveDate,
        exercise_date: NaiveDate,
        sale_date: NaiveDate,
        shares: Decimal,
        strike_price: Decimal,
        fmv_at_exercise: Decimal,
        sale_price: Decimal,
        #[serde(default)]
        workdays: Option<WorkdayMap>,
    },
    NsoExercise {
        grant_date: NaiveDate,
        exercise_date: NaiveDate,
        shares: Decimal,
        strike_price: Decimal,
        fmv_at_exercise: Decimal,
        #[serde(default)]
        workdays: Option<WorkdayMap>,
    },
    EsppPurchase {
        offering_date: NaiveDate,
        purchase_date: NaiveDate,
        shares: Decimal,
        fmv_at_offering: Decimal,
        fmv_at_purchase: Decimal,
        purchase_price: Decimal,
        #[serde(default)]
        workdays: Option<WorkdayMap>,
    },
    EsppSale {
        offering_date: NaiveDate,
        purchase_date: NaiveDate,
        sale_date: NaiveDate,
        shares: Decimal,
        fmv_at_offering: Decimal,
        fmv_at_purchase: Decimal,
        purchase_price: Decimal,
        sale_price: Decimal,
        #[serde(default)]
        workdays: Option<WorkdayMap>,
    },
}

impl EquityEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::RsuVest { .. } => "rsu_vest",
            Self::IsoExercise { .. } => "iso_exercise",
            Self::IsoSale { .. } => "iso_sale",
            Self::NsoExercise { .. } => "nso_exercise",
            Self::EsppPurchase { .. } => "espp_purchase",
            Self::EsppSale { .. } => "espp_sale",
        }
    }

    pub fn shares(&self) -> Decimal {
        match self {
            Self::RsuVest { shares, .. }
            | Self::IsoExercise { shares, .. }
            | Self::IsoSale { shares, .. }
            | Self::NsoExercise { shares, .. }
            | Self::EsppPurchase { shares, .. }
            | Self::EsppSale { shares, .. } => *shares,
        }
    }

    pub fn workdays(&self) -> Option<&WorkdayMap> {
        match self {
            Self::RsuVest { workdays, .. }
            | Self::IsoExercise { workdays, .. }
            | Self::IsoSale { workdays, .. }
            | Self::NsoExercise { workdays, .. }
            | Self::EsppPurchase { workdays, .. }
            | Self::EsppSale { workdays, .. } => workdays.as_ref(),
        }
    }

    /// Structural validation: non-negative shares and prices, and workday
    /// fractions summing to 1 within `1e-6` when a map is present.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.shares() < Decimal::ZERO {
            return Err(EngineError::negative("equity_event.shares", self.shares()));
        }
        for (field, value) in self.prices() {
            if value < Decimal::ZERO {
                return Err(EngineError::negative(field, value));
            }
        }
        if let Some(map) = self.workdays() {
            let total: Decimal = map.values().copied().sum();
            if (total - Decimal::ONE).abs() > WORKDAY_EPSILON {
                return Err(EngineError::InvalidInput {
                    field: "equity_event.workdays",
                    reason: format!("fractions sum to {total}, expected 1"),
                });
            }
            if map.values().any(|fraction| *fraction < Decimal::ZERO) {
                return Err(EngineError::InvalidInput {
                    field: "equity_event.workdays",
                    reason: "fractions must be non-negative".to_string(),
                });
            }
        }
        Ok(())
    }

    fn prices(&self) -> Vec<(&'static str, Decimal)> {
        match self {
            Self::RsuVest { fmv_at_vest, .. } => {
                vec![("equity_event.fmv_at_vest", *fmv_at_vest)]
            }
            Self::IsoExercise {
                strike_price,
                fmv_at_exercise,
                ..
            }
            | Self::NsoExercise {
                strike_price,
                fmv_at_exercise,
                ..
            } => vec![
                ("equity_event.strike_price", *strike_price),
                ("equity_event.fmv_at_exercise", *fmv_at_exercise),
            ],
            Self::IsoSale {
                strike_price,
                fmv_at_exercise,
                sale_price,
                ..
            } => vec![
                ("equity_event.strike_price", *strike_price),
                ("equity_event.fmv_at_exercise", *fmv_at_exercise),
                ("equity_event.sale_price", *sale_price),
            ],
            Self::EsppPurchase {
                fmv_at_offering,
                fmv_at_purchase,
                purchase_price,
                ..
            } => vec![
                ("equity_event.fmv_at_offering", *fmv_at_offering),
                ("equity_event.fmv_at_purchase", *fmv_at_purchase),
                ("equity_event.purchase_price", *purchase_price),
            ],
            Self::EsppSale {
                fmv_at_offering,
                fmv_at_purchase,
                purchase_price,
                sale_price,
                ..
            } => vec![
                ("equity_event.fmv_at_offering", *fmv_at_offering),
                ("equity_event.fmv_at_purchase", *fmv_at_purchase),
                ("equity_event.purchase_price", *purchase_price),
                ("equity_event.sale_price", *sale_price),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn validate_accepts_workdays_summing_to_one_within_epsilon() {
        let mut workdays = WorkdayMap::new();
        workdays.insert("CA".into(), dec!(0.6000001));
        workdays.insert("WA".into(), dec!(0.3999999));

        let event = EquityEvent::RsuVest {
            vest_date: date(2025, 3, 15),
            shares: dec!(100),
            fmv_at_vest: dec!(250),
            workdays: Some(workdays),
        };

        assert_eq!(event.validate(), Ok(()));
    }

    #[test]
    fn validate_rejects_workdays_not_summing_to_one() {
        let mut workdays = WorkdayMap::new();
        workdays.insert("CA".into(), dec!(0.6));
        workdays.insert("WA".into(), dec!(0.3));

        let event = EquityEvent::RsuVest {
            vest_date: date(2025, 3, 15),
            shares: dec!(100),
            fmv_at_vest: dec!(250),
            workdays: Some(workdays),
        };

        assert!(matches!(
            event.validate(),
            Err(EngineError::InvalidInput {
                field: "equity_event.workdays",
                ..
            })
        ));
    }

    #[test]
    fn validate_rejects_negative_shares() {
        let event = EquityEvent::RsuVest {
            vest_date: date(2025, 3, 15),
            shares: dec!(-10),
            fmv_at_vest: dec!(250),
            workdays: None,
        };

        assert!(matches!(
            event.validate(),
            Err(EngineError::InvalidInput {
                field: "equity_event.shares",
                ..
            })
        ));
    }

    #[test]
    fn validate_rejects_negative_price() {
        let event = EquityEvent::NsoExercise {
            grant_date: date(2022, 1, 10),
            exercise_date: date(2025, 2, 1),
            shares: dec!(500),
            strike_price: dec!(-4),
            fmv_at_exercise: dec!(40),
            workdays: None,
        };

        assert!(matches!(
            event.validate(),
            Err(EngineError::InvalidInput {
                field: "equity_event.strike_price",
                ..
            })
        ));
    }
}
