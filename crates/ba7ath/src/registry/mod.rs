//! Company registry: canonical domain types, activity normalization,
//! ingestion from JSON/CSV exports, and per-wilaya aggregation.

pub mod aggregate;
pub mod domain;
mod importer;
mod loader;
mod normalizer;

pub use aggregate::{
    national_aggregate, wilaya_aggregate, ActivityCount, NationalAggregate, WilayaAggregate,
    TOP_ACTIVITIES_LIMIT,
};
pub use domain::{
    ActivityGroup, CompanyRecord, CompanyType, IngestOutcome, RegistryError, Wilaya,
};
pub use importer::WatchlistImporter;
pub use loader::{load_dataset, records_from_json, DatasetSnapshot};
pub use normalizer::{normalize_activity, UNCLASSIFIED_LABEL};
