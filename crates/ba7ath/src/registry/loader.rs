use super::domain::{
    ActivityGroup, CompanyRecord, CompanyType, IngestOutcome, RegistryError, Wilaya,
};
use super::normalizer::{clean_text, normalize_activity};
use serde::Deserialize;
use std::io::Read;
use std::path::Path;
use tracing::warn;

/// Immutable set of scored records. Versions increase monotonically as
/// the service swaps in refreshed snapshots; results are cached per
/// version since every downstream computation is pure.
#[derive(Debug, Clone)]
pub struct DatasetSnapshot {
    pub version: u64,
    pub companies: Vec<CompanyRecord>,
}

impl DatasetSnapshot {
    pub fn new(version: u64, companies: Vec<CompanyRecord>) -> Self {
        Self { version, companies }
    }

    pub fn empty() -> Self {
        Self {
            version: 0,
            companies: Vec::new(),
        }
    }
}

/// One row of the registry JSON export. The scraper writes Arabic column
/// names; re-exports from this service use the latin aliases.
#[derive(Debug, Deserialize)]
struct RawCompanyRow {
    #[serde(rename = "اسم_الشركة", alias = "name")]
    name: String,
    #[serde(rename = "الولاية", alias = "wilaya")]
    wilaya: String,
    #[serde(default, rename = "المعتمدية", alias = "delegation")]
    delegation: Option<String>,
    #[serde(default, rename = "المنطقة", alias = "locality")]
    locality: Option<String>,
    #[serde(rename = "النوع", alias = "type")]
    company_type: String,
    #[serde(default, rename = "الموضوع / النشاط", alias = "activity_raw")]
    activity_raw: Option<String>,
    #[serde(default, rename = "activité_normalisée", alias = "activity_normalized")]
    activity_normalized: Option<String>,
    #[serde(default, rename = "activité_groupe", alias = "activity_group")]
    activity_group: Option<String>,
}

/// Reads the registry export at `path`.
pub fn load_dataset(path: &Path) -> Result<IngestOutcome, RegistryError> {
    let file = std::fs::File::open(path)?;
    records_from_json(file)
}

/// Parses a registry JSON export. Rows naming a wilaya or type outside
/// the canonical sets are dropped and counted, keeping the record
/// invariants intact without failing the whole load.
pub fn records_from_json<R: Read>(reader: R) -> Result<IngestOutcome, RegistryError> {
    let rows: Vec<RawCompanyRow> = serde_json::from_reader(reader)?;
    let mut companies = Vec::with_capacity(rows.len());
    let mut skipped = 0;

    for row in rows {
        match company_from_row(row, companies.len() as u64 + 1) {
            Some(record) => companies.push(record),
            None => skipped += 1,
        }
    }

    Ok(IngestOutcome { companies, skipped })
}

fn company_from_row(row: RawCompanyRow, id: u64) -> Option<CompanyRecord> {
    let Some(wilaya) = Wilaya::parse(&row.wilaya) else {
        warn!(wilaya = %row.wilaya.trim(), "dropping row with unknown wilaya");
        return None;
    };
    let Some(company_type) = CompanyType::parse(&row.company_type) else {
        warn!(company_type = %row.company_type.trim(), "dropping row with unknown company type");
        return None;
    };

    let activity_raw = row.activity_raw.map(|raw| clean_text(&raw)).unwrap_or_default();

    // Trust pre-normalized columns when the export carries them; fall
    // back to the normalizer otherwise.
    let (activity_normalized, activity_group) = match (row.activity_normalized, row.activity_group)
    {
        (Some(normalized), Some(group)) if !clean_text(&normalized).is_empty() => {
            let group = ActivityGroup::parse_code(&group).unwrap_or(ActivityGroup::Autre);
            (clean_text(&normalized), group)
        }
        _ => normalize_activity(&activity_raw),
    };

    Some(CompanyRecord {
        id,
        name: clean_text(&row.name),
        wilaya,
        delegation: row.delegation.map(|value| clean_text(&value)).filter(|value| !value.is_empty()),
        locality: row.locality.map(|value| clean_text(&value)).filter(|value| !value.is_empty()),
        company_type,
        activity_raw,
        activity_normalized,
        activity_group,
        announced_on: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn loads_arabic_columns_and_assigns_sequential_ids() {
        let json = r#"[
            {"اسم_الشركة": "شركة المثال", "الولاية": "قفصة", "النوع": "محلية",
             "الموضوع / النشاط": "استغلال المحاجر",
             "activité_normalisée": "استغلال المحاجر", "activité_groupe": "ENERGIE_MINES"},
            {"اسم_الشركة": "شركة النقل", "الولاية": "قفصة", "النوع": "جهوية",
             "الموضوع / النشاط": "نقل بضائع"}
        ]"#;

        let outcome = records_from_json(Cursor::new(json)).expect("valid export");
        assert_eq!(outcome.skipped, 0);
        assert_eq!(outcome.companies.len(), 2);
        assert_eq!(outcome.companies[0].id, 1);
        assert_eq!(outcome.companies[1].id, 2);
        assert_eq!(outcome.companies[0].activity_group, ActivityGroup::EnergieMines);
        // Second row had no pre-normalized columns: the normalizer ran.
        assert_eq!(outcome.companies[1].activity_group, ActivityGroup::Transport);
    }

    #[test]
    fn latin_aliases_are_accepted() {
        let json = r#"[
            {"name": "شركة البيئة", "wilaya": "توزر", "type": "محلية",
             "activity_raw": "رسكلة النفايات"}
        ]"#;

        let outcome = records_from_json(Cursor::new(json)).expect("valid export");
        assert_eq!(outcome.companies.len(), 1);
        assert_eq!(outcome.companies[0].wilaya, Wilaya::Tozeur);
        assert_eq!(
            outcome.companies[0].activity_group,
            ActivityGroup::Environnement
        );
    }

    #[test]
    fn rows_violating_invariants_are_skipped_not_fatal() {
        let json = r#"[
            {"اسم_الشركة": "خارج التقسيم", "الولاية": "قرطاج", "النوع": "محلية"},
            {"اسم_الشركة": "نوع مجهول", "الولاية": "تونس", "النوع": "وطنية"},
            {"اسم_الشركة": "سليمة", "الولاية": "تونس", "النوع": "محلية"}
        ]"#;

        let outcome = records_from_json(Cursor::new(json)).expect("valid export");
        assert_eq!(outcome.skipped, 2);
        assert_eq!(outcome.companies.len(), 1);
        assert_eq!(outcome.companies[0].name, "سليمة");
        // Missing activity text lands in the placeholder bucket.
        assert_eq!(outcome.companies[0].activity_group, ActivityGroup::Autre);
        assert_eq!(outcome.companies[0].activity_normalized, "غير مصنف");
    }

    #[test]
    fn malformed_json_is_an_error() {
        let result = records_from_json(Cursor::new("{not json"));
        assert!(matches!(result, Err(RegistryError::Json(_))));
    }

    #[test]
    fn unknown_group_code_falls_back_to_autre() {
        let json = r#"[
            {"اسم_الشركة": "شركة", "الولاية": "باجة", "النوع": "محلية",
             "activité_normalisée": "نشاط غامض", "activité_groupe": "MYSTERE"}
        ]"#;

        let outcome = records_from_json(Cursor::new(json)).expect("valid export");
        assert_eq!(outcome.companies[0].activity_group, ActivityGroup::Autre);
        assert_eq!(outcome.companies[0].activity_normalized, "نشاط غامض");
    }
}
