//! The composite engine: one call assembles every calculator into a
//! [`TaxResult`].
//!
//! Call order: (a) aggregate equity recognitions, (b) ordinary tax via the
//! bracket schedule, (c) preferential tax via stacking, (d) AMT, (e) NIIT
//! and payroll surtaxes, (f) jurisdiction apportionment, (g) totals and
//! rates. Steps (d), (e), and (f) depend only on the outputs of (a)–(c)
//! and on the immutable profile, so their relative order is free.
//!
//! MAGI is taken as AGI here; the foreign-income addbacks that separate
//! the two are out of scope for this profile model.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::calculations::amt::compute_amt;
use crate::calculations::apportionment::apportion;
use crate::calculations::common::{floor_zero, round_half_up};
use crate::calculations::equity::{aggregate, rsu_withholding_shortfall};
use crate::calculations::stacking::stack;
use crate::calculations::surtax::{additional_medicare, employee_fica, niit};
use crate::error::EngineError;
use crate::models::{FinancialProfile, JurisdictionRegistry, TaxResult, YearParameters, breakdown};

/// The composite tax engine for one parameter set and jurisdiction
/// registry. Holds references only; every computation is a pure function
/// of its profile argument.
#[derive(Debug, Clone, Copy)]
pub struct TaxEngine<'a> {
    params: &'a YearParameters,
    registry: &'a JurisdictionRegistry,
}

/// Net capital position after loss netting.
struct NetGains {
    short_term: Decimal,
    long_term: Decimal,
    /// Net loss allowed against ordinary income (a non-positive value).
    ordinary_offset: Decimal,
}

impl<'a> TaxEngine<'a> {
    pub fn new(
        params: &'a YearParameters,
        registry: &'a JurisdictionRegistry,
    ) -> Result<Self, EngineError> {
        params.validate()?;
        Ok(Self { params, registry })
    }

    pub fn params(&self) -> &YearParameters {
        self.params
    }

    /// Computes the complete liability for one profile.
    pub fn compute(&self, profile: &FinancialProfile) -> Result<TaxResult, EngineError> {
        profile.validate()?;
        let status = profile.require_filing_status()?;

        // (a) Equity recognition, summed across events.
        let equity = aggregate(&profile.equity_events, &self.params.supplemental);

        let gains = net_gains(
            profile.short_term_gains + equity.short_term_gain,
            profile.long_term_gains + equity.long_term_gain,
            profile.carryforwards.capital_loss,
            self.params.capital_loss_ordinary_limit,
        );

        let ordinary_income = profile.wages
            + profile.rsu_vest_income
            + profile.interest_income
            + profile.ordinary_dividends
            + equity.ordinary_income
            + gains.short_term
            + gains.ordinary_offset;
        let preferential_income = gains.long_term + profile.qualified_dividends;

        let gross_income = ordinary_income + preferential_income;
        let agi = gross_income - profile.above_the_line_adjustments;
        let magi = agi;

        // Itemize only when it beats the standard deduction.
        let standard_deduction = *self.params.standard_deduction.get(status);
        let itemized_total = profile.itemized.total();
        let used_itemized = itemized_total > standard_deduction;
        let deduction = if used_itemized {
            itemized_total
        } else {
            standard_deduction
        };

        let taxable_income = floor_zero(agi - deduction);
        let preferential_taxable = preferential_income.min(taxable_income);
        let ordinary_taxable = taxable_income - preferential_taxable;

        // (b) Ordinary tax, (c) preferential tax stacked on top of it.
        let ordinary_schedule = self.params.ordinary.get(status);
        let (ordinary_tax_raw, marginal_rate) = ordinary_schedule.apply(ordinary_taxable);
        let ordinary_tax = round_half_up(ordinary_tax_raw);
        let preferential_tax = round_half_up(stack(
            self.params.capital_gains.get(status),
            ordinary_taxable,
            preferential_taxable,
        ));
        let regular_tax = ordinary_tax + preferential_tax;

        // (d) AMT in parallel. The deduction taken for regular tax is a
        // preference: the standard deduction entirely, or the state-tax
        // component when itemizing.
        let deduction_addback = if used_itemized {
            profile.itemized.state_taxes_paid
        } else {
            standard_deduction
        };
        let amt = compute_amt(
            &self.params.amt,
            status,
            taxable_income,
            equity.amt_adjustment + deduction_addback,
            regular_tax,
            profile.carryforwards.amt_credit,
        );

        // (e) Surtaxes and payroll.
        let net_investment_income = profile.interest_income
            + profile.ordinary_dividends
            + profile.qualified_dividends
            + floor_zero(gains.short_term + gains.long_term + gains.ordinary_offset);
        let niit_tax = niit(&self.params.surtaxes, status, magi, net_investment_income);

        let medicare_wages = profile.wages + profile.rsu_vest_income + equity.fica_wages;
        let additional_medicare_tax =
            additional_medicare(&self.params.surtaxes, status, medicare_wages);
        let fica_tax = employee_fica(&self.params.fica, medicare_wages);

        // (f) Per-jurisdiction state tax.
        let state_tax = apportion(profile, self.registry, &self.params.supplemental)?;
        let state_total: Decimal = state_tax.values().copied().sum();

        // (g) Totals and rates.
        let federal_income_tax =
            regular_tax - amt.amt_credit_used + amt.amt_owed + niit_tax + additional_medicare_tax;
        let total_tax = federal_income_tax + fica_tax + state_total;
        let effective_rate = if gross_income > Decimal::ZERO {
            (total_tax / gross_income)
                .round_dp_with_strategy(4, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
        } else {
            Decimal::ZERO
        };

        let withholding_shortfall = rsu_withholding_shortfall(
            &profile.equity_events,
            &self.params.supplemental,
            marginal_rate,
        );
        let federal_balance_due = federal_income_tax - profile.withholding.federal;

        let mut lines = BTreeMap::new();
        lines.insert(breakdown::TAXABLE_INCOME.to_string(), taxable_income);
        lines.insert(breakdown::ORDINARY_TAX.to_string(), ordinary_tax);
        lines.insert(breakdown::PREFERENTIAL_TAX.to_string(), preferential_tax);
        lines.insert(breakdown::AMT_OWED.to_string(), amt.amt_owed);
        lines.insert(breakdown::AMT_CREDIT_USED.to_string(), amt.amt_credit_used);
        lines.insert(breakdown::NIIT.to_string(), niit_tax);
        lines.insert(
            breakdown::ADDITIONAL_MEDICARE.to_string(),
            additional_medicare_tax,
        );
        lines.insert(breakdown::FICA.to_string(), fica_tax);
        lines.insert(breakdown::BALANCE_DUE.to_string(), federal_balance_due);
        lines.insert(
            breakdown::WITHHOLDING_SHORTFALL.to_string(),
            withholding_shortfall,
        );
        for (code, tax) in &state_tax {
            lines.insert(format!("{}{code}", breakdown::STATE_PREFIX), *tax);
        }
        lines.insert(breakdown::TOTAL_TAX.to_string(), total_tax);

        Ok(TaxResult {
            tax_year: profile.tax_year,
            filing_status: status,
            taxable_income,
            ordinary_tax,
            preferential_tax,
            amt_owed: amt.amt_owed,
            amt_credit_used: amt.amt_credit_used,
            niit: niit_tax,
            additional_medicare: additional_medicare_tax,
            fica: fica_tax,
            state_tax,
            total_tax,
            marginal_rate,
            effective_rate,
            federal_balance_due,
            withholding_shortfall,
            breakdown: lines,
        })
    }
}

/// Nets current-year gains against each other and against the loss
/// carryforward: carryforward absorbs short-term gain first, then
/// long-term; any remaining net loss offsets ordinary income up to the
/// statutory limit.
fn net_gains(
    short_term: Decimal,
    long_term: Decimal,
    loss_carryforward: Decimal,
    ordinary_limit: Decimal,
) -> NetGains {
    let mut short_term = short_term;
    let mut long_term = long_term;

    // Cross-net current-year losses against the other character first.
    if short_term < Decimal::ZERO && long_term > Decimal::ZERO {
        let offset = (-short_term).min(long_term);
        long_term -= offset;
        short_term += offset;
    } else if long_term < Decimal::ZERO && short_term > Decimal::ZERO {
        let offset = (-long_term).min(short_term);
        short_term -= offset;
        long_term += offset;
    }

    let mut remaining_loss = loss_carryforward;
    if short_term > Decimal::ZERO {
        let used = short_term.min(remaining_loss);
        short_term -= used;
        remaining_loss -= used;
    }
    if long_term > Decimal::ZERO {
        let used = long_term.min(remaining_loss);
        long_term -= used;
        remaining_loss -= used;
    }

    let net_loss = floor_zero(-(short_term + long_term)) + remaining_loss;
    let ordinary_offset = -net_loss.min(ordinary_limit);

    if short_term + long_term < Decimal::ZERO {
        // The loss itself moved into ordinary_offset (capped); gains are
        // spent.
        short_term = Decimal::ZERO;
        long_term = Decimal::ZERO;
    }

    NetGains {
        short_term,
        long_term,
        ordinary_offset,
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::{
        AmtParameters, Bracket, BracketSchedule, EquityEvent, FicaParameters, FilingStatus,
        JurisdictionRegime, PerStatus, SupplementalWithholding, SurtaxParameters,
    };

    fn ordinary_single_2025() -> BracketSchedule {
        BracketSchedule::new(vec![
            Bracket { upper: Some(dec!(11925)), rate: dec!(0.10) },
            Bracket { upper: Some(dec!(48475)), rate: dec!(0.12) },
            Bracket { upper: Some(dec!(103350)), rate: dec!(0.22) },
            Bracket { upper: Some(dec!(197300)), rate: dec!(0.24) },
            Bracket { upper: Some(dec!(250525)), rate: dec!(0.32) },
            Bracket { upper: Some(dec!(626350)), rate: dec!(0.35) },
            Bracket { upper: None, rate: dec!(0.37) },
        ])
        .unwrap()
    }

    fn ltcg_single_2025() -> BracketSchedule {
        BracketSchedule::new(vec![
            Bracket { upper: Some(dec!(48350)), rate: dec!(0) },
            Bracket { upper: Some(dec!(533400)), rate: dec!(0.15) },
            Bracket { upper: None, rate: dec!(0.20) },
        ])
        .unwrap()
    }

    fn amt_schedule_2025() -> BracketSchedule {
        BracketSchedule::new(vec![
            Bracket { upper: Some(dec!(239100)), rate: dec!(0.26) },
            Bracket { upper: None, rate: dec!(0.28) },
        ])
        .unwrap()
    }

    /// 2025 parameters, single-filer figures replicated across statuses
    /// (these tests only exercise single filers).
    fn params_2025() -> YearParameters {
        YearParameters {
            tax_year: 2025,
            ordinary: PerStatus::uniform(ordinary_single_2025()),
            capital_gains: PerStatus::uniform(ltcg_single_2025()),
            standard_deduction: PerStatus::uniform(dec!(15750)),
            amt: AmtParameters {
                exemption: PerStatus::uniform(dec!(88100)),
                phaseout_threshold: PerStatus::uniform(dec!(626350)),
                phaseout_rate: dec!(0.25),
                schedule: PerStatus::uniform(amt_schedule_2025()),
            },
            surtaxes: SurtaxParameters {
                niit_rate: dec!(0.038),
                niit_threshold: PerStatus::uniform(dec!(200000)),
                additional_medicare_rate: dec!(0.009),
                additional_medicare_threshold: PerStatus::uniform(dec!(200000)),
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

    fn registry() -> JurisdictionRegistry {
        let mut registry = JurisdictionRegistry::new();
        registry.register("TX".into(), JurisdictionRegime::NoIncomeTax);
        registry.register(
            "WA".into(),
            JurisdictionRegime::CapitalGainsOnly {
                schedule: BracketSchedule::new(vec![
                    Bracket { upper: Some(dec!(1000000)), rate: dec!(0.07) },
                    Bracket { upper: None, rate: dec!(0.099) },
                ])
                .unwrap(),
                standard_deduction: dec!(278000),
            },
        );
        registry
    }

    fn single_profile(wages: Decimal) -> FinancialProfile {
        FinancialProfile {
            filing_status: Some(FilingStatus::Single),
            resident_jurisdiction: Some("TX".into()),
            wages,
            ..FinancialProfile::new(2025)
        }
    }

    #[test]
    fn wage_only_profile_matches_published_bracket_figure() {
        // $215,750 wages less the $15,750 standard deduction puts exactly
        // $200,000 through the ordinary schedule.
        let params = params_2025();
        let registry = registry();
        let engine = TaxEngine::new(&params, &registry).unwrap();

        let result = engine.compute(&single_profile(dec!(215750))).unwrap();

        assert_eq!(result.taxable_income, dec!(200000));
        assert_eq!(result.ordinary_tax, dec!(41063.00));
        assert_eq!(result.marginal_rate, dec!(0.32));
        assert_eq!(result.preferential_tax, dec!(0));
        assert_eq!(result.amt_owed, dec!(0));
    }

    #[test]
    fn preferential_income_stacks_on_top_of_ordinary() {
        let params = params_2025();
        let registry = registry();
        let engine = TaxEngine::new(&params, &registry).unwrap();

        let mut profile = single_profile(dec!(115750));
        profile.long_term_gains = dec!(40000);

        let result = engine.compute(&profile).unwrap();

        // Taxable 140,000 = 100,000 ordinary + 40,000 preferential; the
        // ordinary layer fills past the 0% breakpoint, so all 40,000 of
        // gain lands at 15%.
        assert_eq!(result.taxable_income, dec!(140000));
        assert_eq!(result.ordinary_tax, dec!(16914.00));
        assert_eq!(result.preferential_tax, dec!(6000.00));
    }

    #[test]
    fn iso_exercise_triggers_amt_with_deduction_addback() {
        let params = params_2025();
        let registry = registry();
        let engine = TaxEngine::new(&params, &registry).unwrap();

        let mut profile = single_profile(dec!(200000));
        profile.equity_events = vec![EquityEvent::IsoExercise {
            grant_date: NaiveDate::from_ymd_opt(2023, 1, 10).unwrap(),
            exercise_date: NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(),
            shares: dec!(10000),
            strike_price: dec!(5),
            fmv_at_exercise: dec!(45),
            workdays: None,
        }];

        let result = engine.compute(&profile).unwrap();

        // Taxable 184,250, regular tax 37,067. AMTI adds the 400,000
        // bargain element plus the 15,750 standard-deduction addback:
        // 600,000, full exemption, TMT 138,550.
        assert_eq!(result.taxable_income, dec!(184250));
        assert_eq!(result.ordinary_tax, dec!(37067.00));
        assert_eq!(result.amt_owed, dec!(101483.00));
    }

    #[test]
    fn niit_applies_to_investment_income_over_the_threshold() {
        let params = params_2025();
        let registry = registry();
        let engine = TaxEngine::new(&params, &registry).unwrap();

        let mut profile = single_profile(dec!(230000));
        profile.interest_income = dec!(20000);
        profile.long_term_gains = dec!(30000);

        let result = engine.compute(&profile).unwrap();

        // MAGI 280,000, NII 50,000: the 80,000 excess is the larger leg.
        assert_eq!(result.niit, dec!(1900.00));
    }

    #[test]
    fn capital_loss_carryforward_nets_gains_then_ordinary() {
        let params = params_2025();
        let registry = registry();
        let engine = TaxEngine::new(&params, &registry).unwrap();

        let mut profile = single_profile(dec!(100000));
        profile.short_term_gains = dec!(5000);
        profile.long_term_gains = dec!(10000);
        profile.carryforwards.capital_loss = dec!(20000);

        let result = engine.compute(&profile).unwrap();

        // 15,000 of the carryforward absorbs every gain; 3,000 of the
        // remaining 5,000 offsets ordinary income.
        // AGI = 100,000 − 3,000; taxable = 97,000 − 15,750 = 81,250.
        assert_eq!(result.taxable_income, dec!(81250));
        assert_eq!(result.preferential_tax, dec!(0));
        assert_eq!(result.niit, dec!(0));
    }

    #[test]
    fn state_tax_flows_into_the_total() {
        let params = params_2025();
        let registry = registry();
        let engine = TaxEngine::new(&params, &registry).unwrap();

        let mut profile = single_profile(dec!(0));
        profile.resident_jurisdiction = Some("WA".into());
        profile.long_term_gains = dec!(2000000);

        let result = engine.compute(&profile).unwrap();

        assert_eq!(result.state_tax_for(&"WA".into()), dec!(141478.00));
        assert_eq!(result.state_tax_total(), dec!(141478.00));
    }

    #[test]
    fn effective_rate_is_zero_on_zero_gross_income() {
        let params = params_2025();
        let registry = registry();
        let engine = TaxEngine::new(&params, &registry).unwrap();

        let result = engine.compute(&single_profile(dec!(0))).unwrap();

        assert_eq!(result.total_tax, dec!(0));
        assert_eq!(result.effective_rate, dec!(0));
    }

    #[test]
    fn balance_due_nets_federal_withholding() {
        let params = params_2025();
        let registry = registry();
        let engine = TaxEngine::new(&params, &registry).unwrap();

        let mut profile = single_profile(dec!(215750));
        profile.withholding.federal = dec!(50000);

        let result = engine.compute(&profile).unwrap();

        // Federal income side: 41,063 ordinary + 141.75 additional
        // Medicare; FICA is excluded from balance due.
        assert_eq!(result.additional_medicare, dec!(141.75));
        assert_eq!(result.federal_balance_due, dec!(-8795.25));
    }

    #[test]
    fn breakdown_lines_are_complete_and_consistent() {
        let params = params_2025();
        let registry = registry();
        let engine = TaxEngine::new(&params, &registry).unwrap();

        let result = engine.compute(&single_profile(dec!(215750))).unwrap();

        assert_eq!(
            result.breakdown.get(breakdown::ORDINARY_TAX),
            Some(&result.ordinary_tax)
        );
        assert_eq!(
            result.breakdown.get(breakdown::TOTAL_TAX),
            Some(&result.total_tax)
        );
        assert_eq!(result.breakdown.get("state.TX"), Some(&dec!(0)));
    }

    #[test]
    fn rsu_shortfall_uses_the_computed_marginal_rate() {
        let params = params_2025();
        let registry = registry();
        let engine = TaxEngine::new(&params, &registry).unwrap();

        let mut profile = single_profile(dec!(115750));
        profile.equity_events = vec![EquityEvent::RsuVest {
            vest_date: NaiveDate::from_ymd_opt(2025, 3, 15).unwrap(),
            shares: dec!(1000),
            fmv_at_vest: dec!(100),
            workdays: None,
        }];

        let result = engine.compute(&profile).unwrap();

        // Taxable 200,000 → 32% marginal; shortfall (0.32 − 0.22) × 100,000.
        assert_eq!(result.marginal_rate, dec!(0.32));
        assert_eq!(result.withholding_shortfall, dec!(10000.00));
    }

    #[test]
    fn incomplete_profile_is_rejected_before_any_computation() {
        let params = params_2025();
        let registry = registry();
        let engine = TaxEngine::new(&params, &registry).unwrap();

        let profile = FinancialProfile::new(2025);

        assert_eq!(
            engine.compute(&profile),
            Err(EngineError::IncompleteProfile {
                field: "filing_status"
            })
        );
    }
}
