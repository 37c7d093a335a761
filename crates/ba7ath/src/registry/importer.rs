use super::domain::{CompanyRecord, CompanyType, IngestOutcome, RegistryError, Wilaya};
use super::normalizer::{clean_text, normalize_activity};
use chrono::NaiveDate;
use csv::StringRecord;
use std::io::Read;
use std::path::Path;
use tracing::warn;

/// Column aliases accepted in watchlist CSV exports. The scraper emits
/// Arabic headers; hand-curated sheets tend to use the latin ones.
const NAME_COLUMNS: &[&str] = &["name_ar", "اسم_الشركة"];
const WILAYA_COLUMNS: &[&str] = &["wilaya", "الولاية"];
const TYPE_COLUMNS: &[&str] = &["type", "النوع"];
const DELEGATION_COLUMNS: &[&str] = &["delegation", "المعتمدية"];
const ACTIVITY_COLUMNS: &[&str] = &["activity", "الموضوع / النشاط"];
const DATE_COLUMNS: &[&str] = &["date_annonce", "تاريخ الإعلان", "date"];

/// Imports watchlist CSV exports into registry records.
pub struct WatchlistImporter;

impl WatchlistImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<IngestOutcome, RegistryError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    /// Parses CSV rows, dropping (and counting) rows whose wilaya or type
    /// falls outside the canonical sets. A header set missing one of the
    /// required columns fails the import outright.
    pub fn from_reader<R: Read>(reader: R) -> Result<IngestOutcome, RegistryError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        let name_idx = find_column(&headers, NAME_COLUMNS)
            .ok_or(RegistryError::MissingColumn { name: "name_ar" })?;
        let wilaya_idx = find_column(&headers, WILAYA_COLUMNS)
            .ok_or(RegistryError::MissingColumn { name: "wilaya" })?;
        let type_idx = find_column(&headers, TYPE_COLUMNS)
            .ok_or(RegistryError::MissingColumn { name: "type" })?;
        let delegation_idx = find_column(&headers, DELEGATION_COLUMNS);
        let activity_idx = find_column(&headers, ACTIVITY_COLUMNS);
        let date_idx = find_column(&headers, DATE_COLUMNS);

        let mut companies = Vec::new();
        let mut skipped = 0;

        for row in csv_reader.records() {
            let row = row?;
            let raw_wilaya = field(&row, Some(wilaya_idx));
            let Some(wilaya) = Wilaya::parse(&raw_wilaya) else {
                warn!(wilaya = %raw_wilaya, "dropping watchlist row with unknown wilaya");
                skipped += 1;
                continue;
            };
            let raw_type = field(&row, Some(type_idx));
            let Some(company_type) = CompanyType::parse(&raw_type) else {
                warn!(company_type = %raw_type, "dropping watchlist row with unknown type");
                skipped += 1;
                continue;
            };

            let activity_raw = field(&row, activity_idx);
            let (activity_normalized, activity_group) = normalize_activity(&activity_raw);

            companies.push(CompanyRecord {
                id: companies.len() as u64 + 1,
                name: field(&row, Some(name_idx)),
                wilaya,
                delegation: non_empty(field(&row, delegation_idx)),
                locality: None,
                company_type,
                activity_raw,
                activity_normalized,
                activity_group,
                announced_on: parse_announce_date(&field(&row, date_idx)),
            });
        }

        Ok(IngestOutcome { companies, skipped })
    }
}

fn find_column(headers: &StringRecord, aliases: &[&str]) -> Option<usize> {
    headers
        .iter()
        .position(|header| aliases.contains(&clean_text(header).as_str()))
}

fn field(row: &StringRecord, index: Option<usize>) -> String {
    index
        .and_then(|index| row.get(index))
        .map(clean_text)
        .unwrap_or_default()
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

fn parse_announce_date(value: &str) -> Option<NaiveDate> {
    if value.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}
