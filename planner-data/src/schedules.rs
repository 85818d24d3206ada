use std::collections::BTreeMap;
use std::io::Read;

use planner_core::error::ScheduleError;
use planner_core::models::{Bracket, BracketSchedule, FilingStatus, PerStatus};
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when loading bracket schedule data.
#[derive(Debug, Error)]
pub enum ScheduleLoaderError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("Invalid schedule code: {0}")]
    InvalidScheduleCode(String),

    #[error("Schedule {schedule} for {tax_year} is not a valid bracket ladder: {source}")]
    InvalidLadder {
        tax_year: i32,
        schedule: String,
        source: ScheduleError,
    },

    #[error("Tax year {tax_year} is missing schedule {schedule}")]
    MissingSchedule { tax_year: i32, schedule: String },

    #[error("No records for tax year {0}")]
    TaxYearNotFound(i32),
}

impl From<csv::Error> for ScheduleLoaderError {
    fn from(err: csv::Error) -> Self {
        ScheduleLoaderError::CsvParse(err.to_string())
    }
}

/// Maps IRS schedule codes to filing statuses.
///
/// - Schedule X → Single
/// - Schedule Y-1 → Married Filing Jointly
/// - Schedule Y-2 → Married Filing Separately
/// - Schedule Z → Head of Household
fn schedule_to_filing_status(schedule: &str) -> Result<FilingStatus, ScheduleLoaderError> {
    match schedule {
        "X" => Ok(FilingStatus::Single),
        "Y-1" => Ok(FilingStatus::MarriedFilingJointly),
        "Y-2" => Ok(FilingStatus::MarriedFilingSeparately),
        "Z" => Ok(FilingStatus::HeadOfHousehold),
        _ => Err(ScheduleLoaderError::InvalidScheduleCode(
            schedule.to_string(),
        )),
    }
}

fn filing_status_to_schedule(status: FilingStatus) -> &'static str {
    match status {
        FilingStatus::Single => "X",
        FilingStatus::MarriedFilingJointly => "Y-1",
        FilingStatus::MarriedFilingSeparately => "Y-2",
        FilingStatus::HeadOfHousehold => "Z",
    }
}

/// A single record from a bracket schedule CSV file.
///
/// The CSV format uses IRS schedule designations:
/// - `tax_year`: The tax year (e.g., 2025)
/// - `schedule`: The IRS schedule code (X, Y-1, Y-2, Z)
/// - `upper_bound`: The bracket's inclusive upper bound (empty for unlimited)
/// - `rate`: The marginal tax rate as a decimal (e.g., 0.10 for 10%)
///
/// Rows for one (tax_year, schedule) pair must appear in ascending bound
/// order with the unbounded row last.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ScheduleRecord {
    pub tax_year: i32,
    pub schedule: String,
    #[serde(deserialize_with = "deserialize_optional_decimal")]
    pub upper_bound: Option<Decimal>,
    pub rate: Decimal,
}

fn deserialize_optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s
            .trim()
            .parse::<Decimal>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

/// Loader for bracket schedule data from CSV files.
///
/// Parses CSV rows keyed by IRS schedule code and assembles them into
/// validated per-status [`BracketSchedule`] ladders, one set per tax year.
pub struct ScheduleLoader;

impl ScheduleLoader {
    /// Parse schedule records from a CSV reader.
    ///
    /// Returns the raw rows in file order. The reader can be any type that
    /// implements `Read`, such as a file or a string slice.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<ScheduleRecord>, ScheduleLoaderError> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut records = Vec::new();

        for result in csv_reader.deserialize() {
            let record: ScheduleRecord = result?;
            // Fail on unknown codes at parse time, before assembly.
            schedule_to_filing_status(&record.schedule)?;
            records.push(record);
        }

        Ok(records)
    }

    /// Assembles parsed records into per-year, per-status schedules.
    ///
    /// Every year present must carry all four schedule codes; each code's
    /// rows must form a valid ladder (ascending bounds, unbounded last,
    /// rates within [0, 1]).
    pub fn assemble(
        records: &[ScheduleRecord],
    ) -> Result<BTreeMap<i32, PerStatus<BracketSchedule>>, ScheduleLoaderError> {
        let mut grouped: BTreeMap<(i32, FilingStatus), Vec<Bracket>> = BTreeMap::new();
        for record in records {
            let status = schedule_to_filing_status(&record.schedule)?;
            grouped
                .entry((record.tax_year, status))
                .or_default()
                .push(Bracket {
                    upper: record.upper_bound,
                    rate: record.rate,
                });
        }

        let mut ladders: BTreeMap<(i32, FilingStatus), BracketSchedule> = BTreeMap::new();
        for ((tax_year, status), brackets) in grouped {
            let schedule = BracketSchedule::new(brackets).map_err(|source| {
                ScheduleLoaderError::InvalidLadder {
                    tax_year,
                    schedule: filing_status_to_schedule(status).to_string(),
                    source,
                }
            })?;
            ladders.insert((tax_year, status), schedule);
        }

        let years: Vec<i32> = {
            let mut years: Vec<i32> = ladders.keys().map(|(year, _)| *year).collect();
            years.dedup();
            years
        };

        let mut by_year = BTreeMap::new();
        for tax_year in years {
            let mut take = |status: FilingStatus| {
                ladders.remove(&(tax_year, status)).ok_or_else(|| {
                    ScheduleLoaderError::MissingSchedule {
                        tax_year,
                        schedule: filing_status_to_schedule(status).to_string(),
                    }
                })
            };
            by_year.insert(
                tax_year,
                PerStatus {
                    single: take(FilingStatus::Single)?,
                    married_filing_jointly: take(FilingStatus::MarriedFilingJointly)?,
                    married_filing_separately: take(FilingStatus::MarriedFilingSeparately)?,
                    head_of_household: take(FilingStatus::HeadOfHousehold)?,
                },
            );
        }

        Ok(by_year)
    }

    /// Parses and assembles in one pass, returning the schedules for a
    /// single requested year.
    pub fn load_year<R: Read>(
        reader: R,
        tax_year: i32,
    ) -> Result<PerStatus<BracketSchedule>, ScheduleLoaderError> {
        let records = Self::parse(reader)?;
        let mut by_year = Self::assemble(&records)?;
        by_year
            .remove(&tax_year)
            .ok_or(ScheduleLoaderError::TaxYearNotFound(tax_year))
    }
}
