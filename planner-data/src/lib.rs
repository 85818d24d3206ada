//! Configuration layer for the planning engine: CSV bracket-schedule
//! loading, JSON alert catalogs, and the built-in 2025 parameter set.

mod catalog;
mod schedules;
mod year2025;

pub use catalog::{AlertCatalogLoader, CatalogError, SUPPORTED_CATALOG_VERSION};
pub use schedules::{ScheduleLoader, ScheduleLoaderError, ScheduleRecord};
pub use year2025::{jurisdictions_2025, year_2025};
