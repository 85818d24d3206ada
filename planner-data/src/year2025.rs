//! Built-in 2025 federal parameters and a starter jurisdiction registry.
//!
//! Figures follow the 2025 inflation-adjusted revenue procedure. Years
//! beyond 2025 come in through the CSV/JSON loaders, not by editing this
//! module.

use planner_core::models::{
    AmtParameters, Bracket, BracketSchedule, FicaParameters, JurisdictionRegime,
    JurisdictionRegistry, PerStatus, SupplementalWithholding, Surtax, SurtaxParameters,
    YearParameters,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn ladder(pairs: &[(Option<Decimal>, Decimal)]) -> BracketSchedule {
    let brackets = pairs
        .iter()
        .map(|(upper, rate)| Bracket {
            upper: *upper,
            rate: *rate,
        })
        .collect();
    // The tables below are statutory constants; a malformed ladder is a
    // bug in this file, not an input error.
    BracketSchedule::new(brackets).unwrap_or_else(|err| panic!("builtin 2025 ladder: {err}"))
}

fn ordinary_schedules() -> PerStatus<BracketSchedule> {
    PerStatus {
        single: ladder(&[
            (Some(dec!(11925)), dec!(0.10)),
            (Some(dec!(48475)), dec!(0.12)),
            (Some(dec!(103350)), dec!(0.22)),
            (Some(dec!(197300)), dec!(0.24)),
            (Some(dec!(250525)), dec!(0.32)),
            (Some(dec!(626350)), dec!(0.35)),
            (None, dec!(0.37)),
        ]),
        married_filing_jointly: ladder(&[
            (Some(dec!(23850)), dec!(0.10)),
            (Some(dec!(96950)), dec!(0.12)),
            (Some(dec!(206700)), dec!(0.22)),
            (Some(dec!(394600)), dec!(0.24)),
            (Some(dec!(501050)), dec!(0.32)),
            (Some(dec!(751600)), dec!(0.35)),
            (None, dec!(0.37)),
        ]),
        married_filing_separately: ladder(&[
            (Some(dec!(11925)), dec!(0.10)),
            (Some(dec!(48475)), dec!(0.12)),
            (Some(dec!(103350)), dec!(0.22)),
            (Some(dec!(197300)), dec!(0.24)),
            (Some(dec!(250525)), dec!(0.32)),
            (Some(dec!(375800)), dec!(0.35)),
            (None, dec!(0.37)),
        ]),
        head_of_household: ladder(&[
            (Some(dec!(17000)), dec!(0.10)),
            (Some(dec!(64850)), dec!(0.12)),
            (Some(dec!(103350)), dec!(0.22)),
            (Some(dec!(197300)), dec!(0.24)),
            (Some(dec!(250500)), dec!(0.32)),
            (Some(dec!(626350)), dec!(0.35)),
            (None, dec!(0.37)),
        ]),
    }
}

fn capital_gains_schedules() -> PerStatus<BracketSchedule> {
    PerStatus {
        single: ladder(&[
            (Some(dec!(48350)), dec!(0)),
            (Some(dec!(533400)), dec!(0.15)),
            (None, dec!(0.20)),
        ]),
        married_filing_jointly: ladder(&[
            (Some(dec!(96700)), dec!(0)),
            (Some(dec!(600050)), dec!(0.15)),
            (None, dec!(0.20)),
        ]),
        married_filing_separately: ladder(&[
            (Some(dec!(48350)), dec!(0)),
            (Some(dec!(300000)), dec!(0.15)),
            (None, dec!(0.20)),
        ]),
        head_of_household: ladder(&[
            (Some(dec!(64750)), dec!(0)),
            (Some(dec!(566700)), dec!(0.15)),
            (None, dec!(0.20)),
        ]),
    }
}

fn amt_parameters() -> AmtParameters {
    let two_tier = ladder(&[(Some(dec!(239100)), dec!(0.26)), (None, dec!(0.28))]);
    AmtParameters {
        exemption: PerStatus {
            single: dec!(88100),
            married_filing_jointly: dec!(137000),
            married_filing_separately: dec!(68500),
            head_of_household: dec!(88100),
        },
        phaseout_threshold: PerStatus {
            single: dec!(626350),
            married_filing_jointly: dec!(1252700),
            married_filing_separately: dec!(626350),
            head_of_household: dec!(626350),
        },
        phaseout_rate: dec!(0.25),
        schedule: PerStatus::uniform(two_tier),
    }
}

/// The complete 2025 federal parameter set.
pub fn year_2025() -> YearParameters {
    YearParameters {
        tax_year: 2025,
        ordinary: ordinary_schedules(),
        capital_gains: capital_gains_schedules(),
        standard_deduction: PerStatus {
            single: dec!(15750),
            married_filing_jointly: dec!(31500),
            married_filing_separately: dec!(15750),
            head_of_household: dec!(23625),
        },
        amt: amt_parameters(),
        surtaxes: SurtaxParameters {
            niit_rate: dec!(0.038),
            niit_threshold: PerStatus {
                single: dec!(200000),
                married_filing_jointly: dec!(250000),
                married_filing_separately: dec!(125000),
                head_of_household: dec!(200000),
            },
            additional_medicare_rate: dec!(0.009),
            additional_medicare_threshold: PerStatus {
                single: dec!(200000),
                married_filing_jointly: dec!(250000),
                married_filing_separately: dec!(125000),
                head_of_household: dec!(200000),
            },
        },
        fica: FicaParameters {
            ss_rate: dec!(0.062),
            ss_wage_base: dec!(176100),
            medicare_rate: dec!(0.0145),
        },
        supplemental: SupplementalWithholding {
            flat_rate: dec!(0.22),
            high_rate: dec!(0.37),
            high_rate_threshold: dec!(1000000),
        },
        capital_loss_ordinary_limit: dec!(3000),
    }
}

/// A starter registry covering the jurisdictions the 2025 fixtures use:
/// no-income-tax states, a Washington-style capital-gains excise, and a
/// California-style progressive regime with surtaxes.
pub fn jurisdictions_2025() -> JurisdictionRegistry {
    let mut registry = JurisdictionRegistry::new();

    for code in ["TX", "FL", "NV"] {
        registry.register(code.into(), JurisdictionRegime::NoIncomeTax);
    }

    registry.register(
        "WA".into(),
        JurisdictionRegime::CapitalGainsOnly {
            schedule: ladder(&[
                (Some(dec!(1000000)), dec!(0.07)),
                (None, dec!(0.099)),
            ]),
            standard_deduction: dec!(278000),
        },
    );

    registry.register(
        "CA".into(),
        JurisdictionRegime::Progressive {
            schedule: ladder(&[
                (Some(dec!(10756)), dec!(0.01)),
                (Some(dec!(25499)), dec!(0.02)),
                (Some(dec!(40245)), dec!(0.04)),
                (Some(dec!(55866)), dec!(0.06)),
                (Some(dec!(70606)), dec!(0.08)),
                (Some(dec!(360659)), dec!(0.093)),
                (Some(dec!(432787)), dec!(0.103)),
                (Some(dec!(721314)), dec!(0.113)),
                (None, dec!(0.123)),
            ]),
            standard_deduction: dec!(5540),
            surtaxes: vec![
                Surtax::ThresholdFlat {
                    threshold: dec!(1000000),
                    rate: dec!(0.01),
                },
                Surtax::UncappedPayroll { rate: dec!(0.011) },
            ],
        },
    );

    registry
}
