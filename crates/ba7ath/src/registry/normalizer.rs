use super::domain::ActivityGroup;

/// Label assigned when the registry gives no usable activity text.
pub const UNCLASSIFIED_LABEL: &str = "غير مصنف";

/// Ordered keyword table driving activity classification. The first
/// keyword contained in the cleaned text wins, so narrow stems must come
/// before the broad ones they overlap with ("صيدل" before "صيد").
const KEYWORD_TABLE: &[(&str, &str, ActivityGroup)] = &[
    // Health services first: "صيدلية" contains the fishing stem "صيد".
    ("صيدل", "خدمات صحية", ActivityGroup::ServicesCom),
    // AGRI_NATUREL
    ("فلاح", "فلاحة و تربية ماشية", ActivityGroup::AgriNaturel),
    ("زراع", "زراعات كبرى", ActivityGroup::AgriNaturel),
    ("غاب", "استغلال الغابات", ActivityGroup::AgriNaturel),
    ("تربية", "فلاحة و تربية ماشية", ActivityGroup::AgriNaturel),
    ("نحل", "تربية نحل", ActivityGroup::AgriNaturel),
    ("صيد", "صيد بحري و قنص", ActivityGroup::AgriNaturel),
    // ENVIRONNEMENT
    ("تطهير", "تطهير و صرف صحي", ActivityGroup::Environnement),
    ("رسكلة", "رسكلة و تثمين النفايات", ActivityGroup::Environnement),
    ("نفايات", "رسكلة و تثمين النفايات", ActivityGroup::Environnement),
    ("فضلات", "جمع الفضلات", ActivityGroup::Environnement),
    ("نظاف", "نظافة و صيانة المحيط", ActivityGroup::Environnement),
    ("بيئ", "حماية البيئة", ActivityGroup::Environnement),
    // ENERGIE_MINES
    ("شمسي", "طاقة شمسية", ActivityGroup::EnergieMines),
    ("طاق", "إنتاج الطاقة", ActivityGroup::EnergieMines),
    ("منجم", "استغلال المناجم", ActivityGroup::EnergieMines),
    ("مناجم", "استغلال المناجم", ActivityGroup::EnergieMines),
    ("محاجر", "استغلال المحاجر", ActivityGroup::EnergieMines),
    ("مقاطع", "استغلال المقاطع", ActivityGroup::EnergieMines),
    ("استخراج", "صناعات استخراجية", ActivityGroup::EnergieMines),
    // TRANSPORT
    ("نقل", "نقل بضائع و أشخاص", ActivityGroup::Transport),
    ("لوجست", "خدمات لوجستية", ActivityGroup::Transport),
    // INDUSTRIE
    ("نسيج", "نسيج و ملابس", ActivityGroup::Industrie),
    ("خياط", "نسيج و ملابس", ActivityGroup::Industrie),
    ("تعليب", "تعليب و تحويل غذائي", ActivityGroup::Industrie),
    ("تحويل", "صناعات تحويلية", ActivityGroup::Industrie),
    ("حرفي", "صناعات حرفية و تقليدية", ActivityGroup::Industrie),
    ("تقليدية", "صناعات حرفية و تقليدية", ActivityGroup::Industrie),
    ("صناع", "صناعات تحويلية", ActivityGroup::Industrie),
    // LOISIRS_TOURISME
    ("سياح", "سياحة و أسفار", ActivityGroup::LoisirsTourisme),
    ("ترفيه", "أنشطة ترفيهية", ActivityGroup::LoisirsTourisme),
    ("ثقاف", "أنشطة ثقافية", ActivityGroup::LoisirsTourisme),
    ("رياض", "أنشطة رياضية", ActivityGroup::LoisirsTourisme),
    // SERVICES_COM, broad stems last so the specific buckets win.
    ("رقمي", "خدمات رقمية", ActivityGroup::ServicesCom),
    ("تسويق", "تسويق منتوجات", ActivityGroup::ServicesCom),
    ("توزيع", "بيع و توزيع", ActivityGroup::ServicesCom),
    ("بيع", "بيع و توزيع", ActivityGroup::ServicesCom),
    ("تجار", "تجارة عامة", ActivityGroup::ServicesCom),
    ("خدمات", "خدمات متنوعة", ActivityGroup::ServicesCom),
];

/// Strips BOM and zero-width characters and collapses runs of whitespace.
pub(crate) fn clean_text(value: &str) -> String {
    let cleaned = value.replace(['\u{feff}', '\u{200b}', '\u{200f}'], "");
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Maps free-text activity descriptions to a canonical label and sector
/// group. Total over all strings: unmatched text keeps its cleaned form
/// under `AUTRE`, and empty input gets the fixed placeholder.
pub fn normalize_activity(raw: &str) -> (String, ActivityGroup) {
    let cleaned = clean_text(raw);
    if cleaned.is_empty() {
        return (UNCLASSIFIED_LABEL.to_string(), ActivityGroup::Autre);
    }

    for (keyword, canonical, group) in KEYWORD_TABLE {
        if cleaned.contains(keyword) {
            return ((*canonical).to_string(), *group);
        }
    }

    (cleaned, ActivityGroup::Autre)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_whitespace_input_fall_back_to_placeholder() {
        assert_eq!(
            normalize_activity(""),
            (UNCLASSIFIED_LABEL.to_string(), ActivityGroup::Autre)
        );
        assert_eq!(
            normalize_activity("  \u{feff} "),
            (UNCLASSIFIED_LABEL.to_string(), ActivityGroup::Autre)
        );
    }

    #[test]
    fn unmatched_text_keeps_cleaned_form_under_autre() {
        let (label, group) = normalize_activity("  تعاون   دولي ");
        assert_eq!(label, "تعاون دولي");
        assert_eq!(group, ActivityGroup::Autre);
    }

    #[test]
    fn keywords_route_to_expected_groups() {
        assert_eq!(
            normalize_activity("جمع و رسكلة النفايات المنزلية").1,
            ActivityGroup::Environnement
        );
        assert_eq!(
            normalize_activity("نقل البضائع بين الولايات").1,
            ActivityGroup::Transport
        );
        assert_eq!(
            normalize_activity("تربية الأبقار و إنتاج الحليب").1,
            ActivityGroup::AgriNaturel
        );
        assert_eq!(
            normalize_activity("استغلال المقاطع و بيع الحجارة").1,
            ActivityGroup::EnergieMines
        );
        assert_eq!(
            normalize_activity("صناعات تقليدية و حرف صغرى").1,
            ActivityGroup::Industrie
        );
    }

    #[test]
    fn pharmacy_is_a_service_despite_the_fishing_stem() {
        let (label, group) = normalize_activity("صيدلية قرية");
        assert_eq!(group, ActivityGroup::ServicesCom);
        assert_eq!(label, "خدمات صحية");
    }

    #[test]
    fn normalization_is_deterministic() {
        let raw = "تطهير و نظافة الأحياء";
        let first = normalize_activity(raw);
        for _ in 0..10 {
            assert_eq!(normalize_activity(raw), first);
        }
    }
}
