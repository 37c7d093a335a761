use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tunisian first-level administrative region. The registry only ever
/// refers to the 24 canonical names below; anything else is rejected at
/// ingestion so downstream aggregation can treat the set as closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Wilaya {
    #[serde(rename = "تونس")]
    Tunis,
    #[serde(rename = "أريانة")]
    Ariana,
    #[serde(rename = "بن عروس")]
    BenArous,
    #[serde(rename = "منوبة")]
    Manouba,
    #[serde(rename = "نابل")]
    Nabeul,
    #[serde(rename = "زغوان")]
    Zaghouan,
    #[serde(rename = "بنزرت")]
    Bizerte,
    #[serde(rename = "باجة")]
    Beja,
    #[serde(rename = "جندوبة")]
    Jendouba,
    #[serde(rename = "الكاف")]
    Kef,
    #[serde(rename = "سليانة")]
    Siliana,
    #[serde(rename = "سوسة")]
    Sousse,
    #[serde(rename = "المنستير")]
    Monastir,
    #[serde(rename = "المهدية")]
    Mahdia,
    #[serde(rename = "صفاقس")]
    Sfax,
    #[serde(rename = "القيروان")]
    Kairouan,
    #[serde(rename = "القصرين")]
    Kasserine,
    #[serde(rename = "سيدي بوزيد")]
    SidiBouzid,
    #[serde(rename = "قابس")]
    Gabes,
    #[serde(rename = "مدنين")]
    Medenine,
    #[serde(rename = "تطاوين")]
    Tataouine,
    #[serde(rename = "قفصة")]
    Gafsa,
    #[serde(rename = "توزر")]
    Tozeur,
    #[serde(rename = "قبلي")]
    Kebili,
}

impl Wilaya {
    pub const fn ordered() -> [Self; 24] {
        [
            Self::Tunis,
            Self::Ariana,
            Self::BenArous,
            Self::Manouba,
            Self::Nabeul,
            Self::Zaghouan,
            Self::Bizerte,
            Self::Beja,
            Self::Jendouba,
            Self::Kef,
            Self::Siliana,
            Self::Sousse,
            Self::Monastir,
            Self::Mahdia,
            Self::Sfax,
            Self::Kairouan,
            Self::Kasserine,
            Self::SidiBouzid,
            Self::Gabes,
            Self::Medenine,
            Self::Tataouine,
            Self::Gafsa,
            Self::Tozeur,
            Self::Kebili,
        ]
    }

    pub const fn name_ar(self) -> &'static str {
        match self {
            Self::Tunis => "تونس",
            Self::Ariana => "أريانة",
            Self::BenArous => "بن عروس",
            Self::Manouba => "منوبة",
            Self::Nabeul => "نابل",
            Self::Zaghouan => "زغوان",
            Self::Bizerte => "بنزرت",
            Self::Beja => "باجة",
            Self::Jendouba => "جندوبة",
            Self::Kef => "الكاف",
            Self::Siliana => "سليانة",
            Self::Sousse => "سوسة",
            Self::Monastir => "المنستير",
            Self::Mahdia => "المهدية",
            Self::Sfax => "صفاقس",
            Self::Kairouan => "القيروان",
            Self::Kasserine => "القصرين",
            Self::SidiBouzid => "سيدي بوزيد",
            Self::Gabes => "قابس",
            Self::Medenine => "مدنين",
            Self::Tataouine => "تطاوين",
            Self::Gafsa => "قفصة",
            Self::Tozeur => "توزر",
            Self::Kebili => "قبلي",
        }
    }

    /// Resolves a registry name to a canonical wilaya. Whitespace is
    /// trimmed; no fuzzy matching.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        Self::ordered()
            .into_iter()
            .find(|wilaya| wilaya.name_ar() == trimmed)
    }
}

impl std::fmt::Display for Wilaya {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name_ar())
    }
}

/// Governance scope under which a community company is chartered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CompanyType {
    #[serde(rename = "محلية")]
    Local,
    #[serde(rename = "جهوية")]
    Regional,
}

impl CompanyType {
    pub const fn ordered() -> [Self; 2] {
        [Self::Local, Self::Regional]
    }

    pub const fn label_ar(self) -> &'static str {
        match self {
            Self::Local => "محلية",
            Self::Regional => "جهوية",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "محلية" => Some(Self::Local),
            "جهوية" => Some(Self::Regional),
            _ => None,
        }
    }
}

/// Coarse sector bucket used for concentration analysis. Free-text
/// activities collapse into exactly one of these eight groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityGroup {
    AgriNaturel,
    Transport,
    Environnement,
    EnergieMines,
    Industrie,
    ServicesCom,
    LoisirsTourisme,
    Autre,
}

impl ActivityGroup {
    pub const fn ordered() -> [Self; 8] {
        [
            Self::AgriNaturel,
            Self::Transport,
            Self::Environnement,
            Self::EnergieMines,
            Self::Industrie,
            Self::ServicesCom,
            Self::LoisirsTourisme,
            Self::Autre,
        ]
    }

    pub const fn code(self) -> &'static str {
        match self {
            Self::AgriNaturel => "AGRI_NATUREL",
            Self::Transport => "TRANSPORT",
            Self::Environnement => "ENVIRONNEMENT",
            Self::EnergieMines => "ENERGIE_MINES",
            Self::Industrie => "INDUSTRIE",
            Self::ServicesCom => "SERVICES_COM",
            Self::LoisirsTourisme => "LOISIRS_TOURISME",
            Self::Autre => "AUTRE",
        }
    }

    pub const fn label_ar(self) -> &'static str {
        match self {
            Self::AgriNaturel => "فلاحة و غابات و صيد",
            Self::Transport => "نقل و خدمات ملحقة به",
            Self::Environnement => "بيئة، تطهير و رسكلة",
            Self::EnergieMines => "طاقة و صناعات إستخراجية",
            Self::Industrie => "صناعات تحويلية و حرفية",
            Self::ServicesCom => "خدمات و تجارة",
            Self::LoisirsTourisme => "ترفيه و سياحة",
            Self::Autre => "أنشطة أخرى",
        }
    }

    pub fn parse_code(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        Self::ordered()
            .into_iter()
            .find(|group| group.code() == trimmed)
    }
}

/// Immutable registry fact. Constructed only through ingestion, which
/// guarantees the wilaya and type invariants.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanyRecord {
    pub id: u64,
    pub name: String,
    pub wilaya: Wilaya,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delegation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locality: Option<String>,
    #[serde(rename = "type")]
    pub company_type: CompanyType,
    pub activity_raw: String,
    pub activity_normalized: String,
    pub activity_group: ActivityGroup,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub announced_on: Option<NaiveDate>,
}

/// Rows that survived ingestion plus the count of rows dropped for
/// violating the record invariants.
#[derive(Debug)]
pub struct IngestOutcome {
    pub companies: Vec<CompanyRecord>,
    pub skipped: usize,
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("failed to read dataset: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid dataset JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid watchlist CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("watchlist CSV is missing required column '{name}'")]
    MissingColumn { name: &'static str },
    #[error("unknown wilaya '{0}'")]
    UnknownWilaya(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wilaya_set_is_closed_at_twenty_four() {
        assert_eq!(Wilaya::ordered().len(), 24);
        for wilaya in Wilaya::ordered() {
            assert_eq!(Wilaya::parse(wilaya.name_ar()), Some(wilaya));
        }
    }

    #[test]
    fn wilaya_parse_trims_but_never_guesses() {
        assert_eq!(Wilaya::parse("  تونس "), Some(Wilaya::Tunis));
        assert_eq!(Wilaya::parse("تونس الكبرى"), None);
        assert_eq!(Wilaya::parse(""), None);
    }

    #[test]
    fn company_type_parses_canonical_labels_only() {
        assert_eq!(CompanyType::parse("محلية"), Some(CompanyType::Local));
        assert_eq!(CompanyType::parse(" جهوية "), Some(CompanyType::Regional));
        assert_eq!(CompanyType::parse("وطنية"), None);
    }

    #[test]
    fn activity_group_codes_round_trip() {
        for group in ActivityGroup::ordered() {
            assert_eq!(ActivityGroup::parse_code(group.code()), Some(group));
        }
        assert_eq!(ActivityGroup::parse_code("AGRO"), None);
    }

    #[test]
    fn wilaya_serializes_to_registry_name() {
        let json = serde_json::to_string(&Wilaya::SidiBouzid).expect("serializes");
        assert_eq!(json, "\"سيدي بوزيد\"");
        let group = serde_json::to_string(&ActivityGroup::AgriNaturel).expect("serializes");
        assert_eq!(group, "\"AGRI_NATUREL\"");
    }
}
