use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use planner_core::models::PerStatus;
use planner_data::{AlertCatalogLoader, ScheduleLoader, year_2025};
use tracing_subscriber::EnvFilter;

/// Validate planner configuration files before deployment.
///
/// Checks bracket-schedule CSVs (ascending bounds, complete schedule
/// coverage per year) and alert-catalog JSON (version, unique ids,
/// well-formed condition trees) without running any computation.
#[derive(Parser, Debug)]
#[command(name = "planner-data-validate")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to a bracket schedule CSV file to validate
    #[arg(short, long)]
    schedules: Option<PathBuf>,

    /// Path to an alert catalog JSON file to validate
    #[arg(short, long)]
    catalog: Option<PathBuf>,

    /// Also confirm the built-in parameter set passes engine validation
    #[arg(long, default_value_t = false)]
    builtin: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();

    if args.schedules.is_none() && args.catalog.is_none() && !args.builtin {
        anyhow::bail!("nothing to validate: pass --schedules, --catalog, or --builtin");
    }

    if let Some(path) = &args.schedules {
        let file =
            File::open(path).with_context(|| format!("Failed to open: {}", path.display()))?;
        let records = ScheduleLoader::parse(file)
            .with_context(|| format!("Failed to parse CSV: {}", path.display()))?;
        println!("Parsed {} records from {}", records.len(), path.display());

        let by_year = ScheduleLoader::assemble(&records)
            .with_context(|| format!("Invalid schedule data in: {}", path.display()))?;
        for (year, schedules) in &by_year {
            let PerStatus { single, .. } = schedules;
            println!(
                "  {year}: all four schedules valid (single top rate {})",
                single.top_rate()
            );
        }
    }

    if let Some(path) = &args.catalog {
        let file =
            File::open(path).with_context(|| format!("Failed to open: {}", path.display()))?;
        let alerts = AlertCatalogLoader::load(file)
            .with_context(|| format!("Invalid alert catalog: {}", path.display()))?;
        println!("Catalog OK: {} alert definitions", alerts.len());
    }

    if args.builtin {
        let params = year_2025();
        params
            .validate()
            .context("Built-in 2025 parameters failed validation")?;
        println!("Built-in {} parameters OK", params.tax_year);
    }

    Ok(())
}
