mod alert;
mod equity;
mod filing_status;
mod jurisdiction;
mod profile;
mod scenario;
mod schedule;
mod tax_result;
mod year_parameters;

pub use alert::{
    Alert, AlertDefinition, AlertPriority, Comparison, Condition, DeadlineRule, FieldRef, Operand,
};
pub use equity::{EquityEvent, WorkdayMap};
pub use filing_status::FilingStatus;
pub use jurisdiction::{JurisdictionCode, JurisdictionRegime, JurisdictionRegistry, Surtax};
pub use profile::{Carryforwards, FinancialProfile, ItemizedDeductions, Withholding};
pub use scenario::{ScenarioComparison, ScenarioOverrides};
pub use schedule::{Bracket, BracketSchedule};
pub use tax_result::{TaxResult, breakdown};
pub use year_parameters::{
    AmtParameters, FicaParameters, PerStatus, SupplementalWithholding, SurtaxParameters,
    YearParameters,
};
