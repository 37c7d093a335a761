use super::composite::{FlagCode, RiskFlag, RiskLevel};
use super::config::ScoringConfig;
use super::subscores::{SubScores, RESOURCE_GROUPS};
use crate::registry::{ActivityGroup, CompanyType, WilayaAggregate};

/// Below the ultra-concentration flag but above this share, the comment
/// still points out a notable sector tilt.
const CONCENTRATION_NOTICE: f64 = 0.5;

/// A resource group must hold at least this share to be named in the
/// dependency comment.
const DOMINANT_GROUP_FLOOR: f64 = 0.3;

const NO_DATA_COMMENT: &str = "لا توجد بيانات كافية";
const NO_SIGNAL_COMMENT: &str = "لا توجد إشارات خطر واضحة في البيانات الحالية";

const REC_CHECK_STATE_LAND: &str = "التحقق من الأراضي الدولية المُسندة (OTD)";
const REC_SEARCH_PROCUREMENT: &str = "البحث في صفقات التطهير والبيئة (TUNEPS)";
const REC_ANALYZE_MONOPOLIES: &str = "تحليل الاحتكارات القطاعية المحتملة";
const REC_REVIEW_BOARDS: &str = "مراجعة التوازن بين المحلي والجهوي في تركيبة مجالس الإدارة";
const REC_DEEP_INVESTIGATION: &str = "يُنصح بتحقيق صحفي معمق على هذه الولاية";

/// Deterministic editorial narrative: templates selected by the active
/// flag set and band, with percentages interpolated from the aggregate.
/// The same inputs always produce the same text.
pub(crate) fn compose(
    aggregate: &WilayaAggregate,
    scores: SubScores,
    flags: &[RiskFlag],
    level: RiskLevel,
    config: &ScoringConfig,
) -> (String, Vec<String>) {
    if aggregate.total == 0 {
        return (NO_DATA_COMMENT.to_string(), Vec::new());
    }

    let mut comments = Vec::new();

    if has_flag(flags, FlagCode::ResourceDependent) {
        let dominant: Vec<&str> = RESOURCE_GROUPS
            .iter()
            .filter(|group| aggregate.group_share(**group) > DOMINANT_GROUP_FLOOR)
            .map(|group| group.code())
            .collect();
        if !dominant.is_empty() {
            comments.push(format!(
                "الولاية تعتمد بشكل كبير على الأنشطة المرتبطة بالموارد العمومية ({})",
                dominant.join(", ")
            ));
        }
    }

    if scores.sector_concentration > config.flags.sector_concentration {
        if let Some(top) = dominant_group(aggregate) {
            comments.push(format!(
                "تركيز عالٍ جدا في مجموعة نشاط واحدة ({}: {:.0}%)",
                top.code(),
                aggregate.group_share(top) * 100.0
            ));
        }
    } else if scores.sector_concentration > CONCENTRATION_NOTICE {
        comments.push("تركيز ملحوظ في عدد محدود من القطاعات".to_string());
    }

    if has_flag(flags, FlagCode::GovernanceImbalance) {
        comments.push(format!(
            "اختلال واضح في الحوكمة: {:.0}% محلية مقابل {:.0}% جهوية",
            aggregate.type_share(CompanyType::Local) * 100.0,
            aggregate.type_share(CompanyType::Regional) * 100.0
        ));
    }

    let comment_ar = if comments.is_empty() {
        NO_SIGNAL_COMMENT.to_string()
    } else {
        comments.join(" · ")
    };

    let mut recommendations = Vec::new();
    if has_flag(flags, FlagCode::ResourceDependent) {
        recommendations.push(REC_CHECK_STATE_LAND.to_string());
        recommendations.push(REC_SEARCH_PROCUREMENT.to_string());
    }
    if has_flag(flags, FlagCode::UltraConcentration) {
        recommendations.push(REC_ANALYZE_MONOPOLIES.to_string());
    }
    if has_flag(flags, FlagCode::GovernanceImbalance) {
        recommendations.push(REC_REVIEW_BOARDS.to_string());
    }
    if level == RiskLevel::High {
        recommendations.push(REC_DEEP_INVESTIGATION.to_string());
    }

    (comment_ar, recommendations)
}

fn has_flag(flags: &[RiskFlag], code: FlagCode) -> bool {
    flags.iter().any(|flag| flag.code == code)
}

/// First group (in canonical order) holding the maximum count, so tied
/// counts resolve the same way on every run.
fn dominant_group(aggregate: &WilayaAggregate) -> Option<ActivityGroup> {
    let mut best: Option<(ActivityGroup, usize)> = None;
    for (group, count) in &aggregate.top_groups {
        match best {
            Some((_, best_count)) if *count <= best_count => {}
            _ => best = Some((*group, *count)),
        }
    }
    best.map(|(group, _)| group)
}
