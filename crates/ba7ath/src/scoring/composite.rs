use super::config::ScoringConfig;
use super::narrative;
use super::subscores::SubScores;
use super::ScoringError;
use crate::registry::{Wilaya, WilayaAggregate};
use serde::Serialize;

/// Risk band derived from the composite index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub const fn label_ar(self) -> &'static str {
        match self {
            Self::Low => "منخفض",
            Self::Medium => "متوسط",
            Self::High => "مرتفع",
        }
    }

    /// Color token the dashboards key their badges on.
    pub const fn color(self) -> &'static str {
        match self {
            Self::Low => "emerald",
            Self::Medium => "amber",
            Self::High => "red",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FlagSeverity {
    Low,
    Medium,
    High,
}

/// Machine codes for the independently-raised risk indicators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FlagCode {
    ResourceDependent,
    UltraConcentration,
    GovernanceImbalance,
}

impl FlagCode {
    pub const fn ordered() -> [Self; 3] {
        [
            Self::ResourceDependent,
            Self::UltraConcentration,
            Self::GovernanceImbalance,
        ]
    }

    pub const fn severity(self) -> FlagSeverity {
        match self {
            Self::ResourceDependent => FlagSeverity::High,
            Self::UltraConcentration => FlagSeverity::Medium,
            Self::GovernanceImbalance => FlagSeverity::Low,
        }
    }

    pub const fn label_ar(self) -> &'static str {
        match self {
            Self::ResourceDependent => "اعتماد كبير على الأنشطة المرتبطة بالموارد العمومية",
            Self::UltraConcentration => "تركيز عالٍ في مجموعة نشاط واحدة",
            Self::GovernanceImbalance => "اختلال واضح بين الشركات المحلية والجهوية",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RiskFlag {
    pub code: FlagCode,
    pub severity: FlagSeverity,
    pub label_ar: &'static str,
}

impl RiskFlag {
    fn raise(code: FlagCode) -> Self {
        Self {
            code,
            severity: code.severity(),
            label_ar: code.label_ar(),
        }
    }
}

/// Scored view of one wilaya. Pure function of the aggregate and the
/// scoring policy; replaced wholesale whenever the snapshot changes.
#[derive(Debug, Clone, Serialize)]
pub struct RiskProfile {
    pub wilaya: Wilaya,
    pub baath_index: f64,
    #[serde(rename = "s1")]
    pub resource_dependency: f64,
    #[serde(rename = "s2")]
    pub sector_concentration: f64,
    #[serde(rename = "s3")]
    pub governance_imbalance: f64,
    pub flags: Vec<RiskFlag>,
    pub level: RiskLevel,
    pub level_ar: &'static str,
    pub color: &'static str,
    pub comment_ar: String,
    pub recommendations: Vec<String>,
}

/// Builds the composite profile for one wilaya. This is the validation
/// boundary of the pipeline: sub-scores outside [0,1] (or non-finite)
/// indicate an upstream computation bug and are rejected.
pub fn build_profile(
    aggregate: &WilayaAggregate,
    scores: SubScores,
    config: &ScoringConfig,
) -> Result<RiskProfile, ScoringError> {
    for (dimension, value) in [
        ("s1", scores.resource_dependency),
        ("s2", scores.sector_concentration),
        ("s3", scores.governance_imbalance),
    ] {
        if !value.is_finite() || !(0.0..=1.0).contains(&value) {
            return Err(ScoringError::SubScoreOutOfRange { dimension, value });
        }
    }

    let raw_index = 100.0
        * (config.weights.resource_dependency * scores.resource_dependency
            + config.weights.sector_concentration * scores.sector_concentration
            + config.weights.governance_imbalance * scores.governance_imbalance);
    let baath_index = round1(raw_index.min(100.0));

    let level = band_for(baath_index, config);
    let flags = active_flags(scores, config);
    let (comment_ar, recommendations) =
        narrative::compose(aggregate, scores, &flags, level, config);

    Ok(RiskProfile {
        wilaya: aggregate.wilaya,
        baath_index,
        resource_dependency: scores.resource_dependency,
        sector_concentration: scores.sector_concentration,
        governance_imbalance: scores.governance_imbalance,
        flags,
        level,
        level_ar: level.label_ar(),
        color: level.color(),
        comment_ar,
        recommendations,
    })
}

/// Assigns the band for an index value. The cutoffs partition [0,100]
/// completely: low is `[0, medium_floor)`, medium `[medium_floor,
/// high_floor)`, high `[high_floor, 100]`.
pub fn band_for(index: f64, config: &ScoringConfig) -> RiskLevel {
    if index >= config.bands.high_floor {
        RiskLevel::High
    } else if index >= config.bands.medium_floor {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

fn active_flags(scores: SubScores, config: &ScoringConfig) -> Vec<RiskFlag> {
    let mut flags = Vec::new();
    if scores.resource_dependency > config.flags.resource_dependency {
        flags.push(RiskFlag::raise(FlagCode::ResourceDependent));
    }
    if scores.sector_concentration > config.flags.sector_concentration {
        flags.push(RiskFlag::raise(FlagCode::UltraConcentration));
    }
    if scores.governance_imbalance > config.flags.governance_imbalance {
        flags.push(RiskFlag::raise(FlagCode::GovernanceImbalance));
    }
    flags
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Wilaya;
    use std::collections::BTreeMap;

    fn empty_aggregate(wilaya: Wilaya) -> WilayaAggregate {
        WilayaAggregate {
            wilaya,
            total: 0,
            types: BTreeMap::new(),
            top_groups: BTreeMap::new(),
            top_activities: Vec::new(),
        }
    }

    fn scores(s1: f64, s2: f64, s3: f64) -> SubScores {
        SubScores {
            resource_dependency: s1,
            sector_concentration: s2,
            governance_imbalance: s3,
        }
    }

    #[test]
    fn index_follows_the_published_formula() {
        let config = ScoringConfig::v2();
        let profile = build_profile(
            &empty_aggregate(Wilaya::Gafsa),
            scores(0.5, 0.5, 0.5),
            &config,
        )
        .expect("valid scores");
        // 100 * (0.4*0.5 + 0.4*0.5 + 0.2*0.5) = 50
        assert_eq!(profile.baath_index, 50.0);
        assert_eq!(profile.level, RiskLevel::Medium);
        assert_eq!(profile.color, "amber");
    }

    #[test]
    fn out_of_range_sub_scores_are_rejected() {
        let config = ScoringConfig::v2();
        for bad in [
            scores(1.2, 0.0, 0.0),
            scores(0.0, -0.1, 0.0),
            scores(0.0, 0.0, f64::NAN),
        ] {
            let error = build_profile(&empty_aggregate(Wilaya::Tunis), bad, &config)
                .expect_err("contract violation");
            assert!(matches!(error, ScoringError::SubScoreOutOfRange { .. }));
        }
    }

    #[test]
    fn every_integer_index_maps_to_exactly_one_band() {
        let config = ScoringConfig::v2();
        for index in 0..=100 {
            let index = index as f64;
            let level = band_for(index, &config);
            let matches_low = index < config.bands.medium_floor;
            let matches_medium =
                index >= config.bands.medium_floor && index < config.bands.high_floor;
            let matches_high = index >= config.bands.high_floor;
            let expected = match level {
                RiskLevel::Low => matches_low,
                RiskLevel::Medium => matches_medium,
                RiskLevel::High => matches_high,
            };
            assert!(expected, "index {index} landed in {level:?}");
            assert_eq!(
                [matches_low, matches_medium, matches_high]
                    .iter()
                    .filter(|hit| **hit)
                    .count(),
                1
            );
        }
    }

    #[test]
    fn band_boundaries_are_inclusive_low() {
        let config = ScoringConfig::v2();
        assert_eq!(band_for(39.9, &config), RiskLevel::Low);
        assert_eq!(band_for(40.0, &config), RiskLevel::Medium);
        assert_eq!(band_for(69.9, &config), RiskLevel::Medium);
        assert_eq!(band_for(70.0, &config), RiskLevel::High);
        assert_eq!(band_for(100.0, &config), RiskLevel::High);
    }

    #[test]
    fn index_is_monotone_in_each_dimension() {
        let config = ScoringConfig::v2();
        let aggregate = empty_aggregate(Wilaya::Beja);
        let base = build_profile(&aggregate, scores(0.3, 0.3, 0.3), &config)
            .expect("valid")
            .baath_index;

        for bumped in [
            scores(0.5, 0.3, 0.3),
            scores(0.3, 0.5, 0.3),
            scores(0.3, 0.3, 0.5),
        ] {
            let index = build_profile(&aggregate, bumped, &config)
                .expect("valid")
                .baath_index;
            assert!(index >= base, "{index} < {base}");
        }
    }

    #[test]
    fn flags_raise_independently_of_the_band() {
        let config = ScoringConfig::v2();
        let aggregate = empty_aggregate(Wilaya::Tataouine);

        // High governance imbalance alone: flag raised, band still low.
        let profile = build_profile(&aggregate, scores(0.0, 0.0, 0.9), &config).expect("valid");
        assert_eq!(profile.level, RiskLevel::Low);
        assert_eq!(profile.flags.len(), 1);
        assert_eq!(profile.flags[0].code, FlagCode::GovernanceImbalance);
        assert_eq!(profile.flags[0].severity, FlagSeverity::Low);

        // All three past threshold.
        let profile = build_profile(&aggregate, scores(0.9, 0.9, 0.9), &config).expect("valid");
        let codes: Vec<FlagCode> = profile.flags.iter().map(|flag| flag.code).collect();
        assert_eq!(codes, FlagCode::ordered().to_vec());
    }

    #[test]
    fn threshold_values_themselves_do_not_raise_flags() {
        let config = ScoringConfig::v2();
        let aggregate = empty_aggregate(Wilaya::Siliana);
        let profile = build_profile(&aggregate, scores(0.6, 0.7, 0.5), &config).expect("valid");
        assert!(profile.flags.is_empty());
    }

    #[test]
    fn index_saturates_at_one_hundred() {
        let config = ScoringConfig::v2();
        let profile = build_profile(
            &empty_aggregate(Wilaya::Kairouan),
            scores(1.0, 1.0, 1.0),
            &config,
        )
        .expect("valid");
        assert_eq!(profile.baath_index, 100.0);
        assert_eq!(profile.level, RiskLevel::High);
    }
}
