//! Alert catalog data model.
//!
//! Alert *definitions* are static, declarative configuration: a condition
//! tree over typed field accessors, a priority, a message template, and an
//! optional deadline rule. Alert *instances* are the ephemeral outputs of
//! one evaluation pass. Field access goes through the closed [`FieldRef`]
//! enum, never a string lookup, so a malformed catalog fails to
//! deserialize instead of failing at evaluation time.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{FinancialProfile, TaxResult};

/// Alert severity, ordered: Critical sorts before Warning before Info.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertPriority {
    Critical,
    Warning,
    Info,
}

/// Typed accessor into the (profile, result) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldRef {
    // Result fields
    TotalTax,
    OrdinaryTax,
    PreferentialTax,
    AmtOwed,
    AmtCreditUsed,
    Niit,
    AdditionalMedicare,
    Fica,
    StateTaxTotal,
    TaxableIncome,
    FederalBalanceDue,
    WithholdingShortfall,
    EffectiveRate,
    MarginalRate,
    // Profile fields
    Wages,
    ShortTermGains,
    LongTermGains,
    InvestmentIncome,
    FederalWithheld,
    CapitalLossCarryforward,
    AmtCreditCarryforward,
}

impl FieldRef {
    pub const ALL: [FieldRef; 21] = [
        Self::TotalTax,
        Self::OrdinaryTax,
        Self::PreferentialTax,
        Self::AmtOwed,
        Self::AmtCreditUsed,
        Self::Niit,
        Self::AdditionalMedicare,
        Self::Fica,
        Self::StateTaxTotal,
        Self::TaxableIncome,
        Self::FederalBalanceDue,
        Self::WithholdingShortfall,
        Self::EffectiveRate,
        Self::MarginalRate,
        Self::Wages,
        Self::ShortTermGains,
        Self::LongTermGains,
        Self::InvestmentIncome,
        Self::FederalWithheld,
        Self::CapitalLossCarryforward,
        Self::AmtCreditCarryforward,
    ];

    /// The token this accessor answers to inside a message template.
    pub fn token(&self) -> &'static str {
        match self {
            Self::TotalTax => "total_tax",
            Self::OrdinaryTax => "ordinary_tax",
            Self::PreferentialTax => "preferential_tax",
            Self::AmtOwed => "amt_owed",
            Self::AmtCreditUsed => "amt_credit_used",
            Self::Niit => "niit",
            Self::AdditionalMedicare => "additional_medicare",
            Self::Fica => "fica",
            Self::StateTaxTotal => "state_tax_total",
            Self::TaxableIncome => "taxable_income",
            Self::FederalBalanceDue => "federal_balance_due",
            Self::WithholdingShortfall => "withholding_shortfall",
            Self::EffectiveRate => "effective_rate",
            Self::MarginalRate => "marginal_rate",
            Self::Wages => "wages",
            Self::ShortTermGains => "short_term_gains",
            Self::LongTermGains => "long_term_gains",
            Self::InvestmentIncome => "investment_income",
            Self::FederalWithheld => "federal_withheld",
            Self::CapitalLossCarryforward => "capital_loss_carryforward",
            Self::AmtCreditCarryforward => "amt_credit_carryforward",
        }
    }

    /// Resolves the accessor against one evaluation context.
    pub fn resolve(&self, profile: &FinancialProfile, result: &TaxResult) -> Decimal {
        match self {
            Self::TotalTax => result.total_tax,
            Self::OrdinaryTax => result.ordinary_tax,
            Self::PreferentialTax => result.preferential_tax,
            Self::AmtOwed => result.amt_owed,
            Self::AmtCreditUsed => result.amt_credit_used,
            Self::Niit => result.niit,
            Self::AdditionalMedicare => result.additional_medicare,
            Self::Fica => result.fica,
            Self::StateTaxTotal => result.state_tax_total(),
            Self::TaxableIncome => result.taxable_income,
            Self::FederalBalanceDue => result.federal_balance_due,
            Self::WithholdingShortfall => result.withholding_shortfall,
            Self::EffectiveRate => result.effective_rate,
            Self::MarginalRate => result.marginal_rate,
            Self::Wages => profile.wages,
            Self::ShortTermGains => profile.short_term_gains,
            Self::LongTermGains => profile.long_term_gains,
            Self::InvestmentIncome => {
                profile.interest_income
                    + profile.ordinary_dividends
                    + profile.qualified_dividends
                    + profile.short_term_gains
                    + profile.long_term_gains
            }
            Self::FederalWithheld => profile.withholding.federal,
            Self::CapitalLossCarryforward => profile.carryforwards.capital_loss,
            Self::AmtCreditCarryforward => profile.carryforwards.amt_credit,
        }
    }
}

/// Right-hand side of a leaf comparison: a literal or another field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Operand {
    Literal(Decimal),
    Field(FieldRef),
}

impl Operand {
    pub fn resolve(&self, profile: &FinancialProfile, result: &TaxResult) -> Decimal {
        match self {
            Self::Literal(value) => *value,
            Self::Field(field) => field.resolve(profile, result),
        }
    }
}

/// Leaf comparison operators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Comparison {
    Gt { value: Operand },
    Lt { value: Operand },
    Gte { value: Operand },
    Lte { value: Operand },
    Eq { value: Operand },
    Between { low: Operand, high: Operand },
}

/// A condition tree: leaves compare one field, composites AND/OR their
/// children. An empty `All` is vacuously true; an empty `Any` is false.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    Leaf {
        field: FieldRef,
        #[serde(flatten)]
        comparison: Comparison,
    },
    All(Vec<Condition>),
    Any(Vec<Condition>),
}

/// How an alert's deadline is derived from the tax year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum DeadlineRule {
    /// December 31 of the tax year (e.g. realize losses, exercise windows).
    EndOfYear,
    /// April 15 of the following year.
    FilingDeadline,
    /// A fixed month/day within the tax year (e.g. Q4 estimated payment).
    FixedDate { month: u32, day: u32 },
}

impl DeadlineRule {
    /// Resolves the rule to a calendar date; `None` if the month/day pair
    /// is not a real date in that year.
    pub fn deadline(&self, tax_year: i32) -> Option<NaiveDate> {
        match self {
            Self::EndOfYear => NaiveDate::from_ymd_opt(tax_year, 12, 31),
            Self::FilingDeadline => NaiveDate::from_ymd_opt(tax_year + 1, 4, 15),
            Self::FixedDate { month, day } => NaiveDate::from_ymd_opt(tax_year, *month, *day),
        }
    }
}

/// One entry of the declarative alert catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertDefinition {
    pub id: String,
    pub category: String,
    pub priority: AlertPriority,
    pub condition: Condition,
    /// Message template; `{token}` placeholders are filled from the same
    /// typed accessors the condition uses.
    pub message: String,
    #[serde(default)]
    pub deadline: Option<DeadlineRule>,
}

/// One triggered alert: the ephemeral output of an evaluation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub id: String,
    pub category: String,
    pub priority: AlertPriority,
    pub message: String,
    pub deadline: Option<NaiveDate>,
}
