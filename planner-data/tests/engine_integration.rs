//! End-to-end tests: load configuration through the data layer and run
//! the full engine against it.

use planner_core::alerts::evaluate;
use planner_core::models::{FilingStatus, FinancialProfile, ScenarioOverrides};
use planner_core::scenarios::compare;
use planner_core::TaxEngine;
use planner_data::{jurisdictions_2025, AlertCatalogLoader, ScheduleLoader, year_2025};
use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;

const TEST_CSV_2025: &str = include_str!("test-data/schedules_2025.csv");

const TEST_CATALOG: &str = r#"{
    "version": 1,
    "alerts": [
        {
            "id": "amt-exposure",
            "category": "amt",
            "priority": "critical",
            "condition": {
                "leaf": { "field": "amt_owed", "op": "gt", "value": "0" }
            },
            "message": "Projected AMT of {amt_owed}",
            "deadline": { "rule": "filing_deadline" }
        },
        {
            "id": "niit-threshold",
            "category": "surtax",
            "priority": "warning",
            "condition": {
                "leaf": { "field": "niit", "op": "gt", "value": "0" }
            },
            "message": "NIIT of {niit} applies",
            "deadline": null
        }
    ]
}"#;

fn texas_single(wages: rust_decimal::Decimal) -> FinancialProfile {
    FinancialProfile {
        filing_status: Some(FilingStatus::Single),
        resident_jurisdiction: Some("TX".into()),
        wages,
        ..FinancialProfile::new(2025)
    }
}

#[test]
fn csv_loaded_schedules_match_the_builtin_tables() {
    let loaded = ScheduleLoader::load_year(TEST_CSV_2025.as_bytes(), 2025)
        .expect("test CSV should assemble");

    assert_eq!(loaded, year_2025().ordinary);
}

#[test]
fn engine_runs_against_csv_loaded_schedules() {
    let mut params = year_2025();
    params.ordinary = ScheduleLoader::load_year(TEST_CSV_2025.as_bytes(), 2025)
        .expect("test CSV should assemble");
    let registry = jurisdictions_2025();
    let engine = TaxEngine::new(&params, &registry).expect("parameters should validate");

    let result = engine.compute(&texas_single(dec!(215750))).unwrap();

    assert_eq!(result.taxable_income, dec!(200000));
    assert_eq!(result.ordinary_tax, dec!(41063.00));
    assert_eq!(result.marginal_rate, dec!(0.32));
}

#[test]
fn loaded_catalog_fires_against_a_computed_result() {
    let params = year_2025();
    let registry = jurisdictions_2025();
    let engine = TaxEngine::new(&params, &registry).unwrap();
    let catalog = AlertCatalogLoader::load(TEST_CATALOG.as_bytes()).unwrap();

    let mut profile = texas_single(dec!(230000));
    profile.interest_income = dec!(20000);
    profile.long_term_gains = dec!(30000);

    let result = engine.compute(&profile).unwrap();
    let alerts = evaluate(&catalog, &profile, &result);

    // NIIT fires (MAGI 280,000, NII 50,000); AMT does not.
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].id, "niit-threshold");
    assert_eq!(alerts[0].message, "NIIT of 1900.00 applies");
}

#[test]
fn scenario_comparison_over_builtin_parameters() {
    let params = year_2025();
    let registry = jurisdictions_2025();
    let engine = TaxEngine::new(&params, &registry).unwrap();

    let baseline = texas_single(dec!(215750));
    let overrides = ScenarioOverrides {
        resident_jurisdiction: Some("CA".into()),
        ..ScenarioOverrides::default()
    };

    let comparison = compare(&engine, &baseline, &overrides).unwrap();

    // Moving from a no-income-tax state to a progressive one costs money.
    assert!(comparison.savings < dec!(0));
    assert_eq!(
        comparison.alternative.state_tax_total(),
        comparison.alternative.state_tax_for(&"CA".into())
    );
}
