use crate::registry::{ActivityGroup, CompanyType, WilayaAggregate};
use serde::Serialize;

/// Sector groups whose activity depends on publicly-allocated resources
/// (state land, concessions, extraction permits).
pub const RESOURCE_GROUPS: [ActivityGroup; 3] = [
    ActivityGroup::AgriNaturel,
    ActivityGroup::Environnement,
    ActivityGroup::EnergieMines,
];

/// The three risk dimensions, each in [0,1]. An empty aggregate scores
/// the neutral 0.0 on every dimension.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SubScores {
    pub resource_dependency: f64,
    pub sector_concentration: f64,
    pub governance_imbalance: f64,
}

impl SubScores {
    pub const NEUTRAL: SubScores = SubScores {
        resource_dependency: 0.0,
        sector_concentration: 0.0,
        governance_imbalance: 0.0,
    };
}

/// Computes the sub-scores for one wilaya.
///
/// - resource dependency: share of companies in [`RESOURCE_GROUPS`],
///   saturated with `min(1, x)` (the ratio cannot exceed 1, the clamp
///   guards the invariant regardless).
/// - sector concentration: largest single group share; depends only on
///   the count multiset, so relabeling groups cannot change it.
/// - governance imbalance: absolute gap between the local and regional
///   shares of the type distribution.
pub fn compute(aggregate: &WilayaAggregate) -> SubScores {
    if aggregate.total == 0 {
        return SubScores::NEUTRAL;
    }

    let total = aggregate.total as f64;

    let resource_count: usize = RESOURCE_GROUPS
        .iter()
        .map(|group| aggregate.group_count(*group))
        .sum();
    let resource_dependency = (resource_count as f64 / total).min(1.0);

    let dominant_count = aggregate
        .top_groups
        .values()
        .copied()
        .max()
        .unwrap_or(0);
    let sector_concentration = dominant_count as f64 / total;

    let local_share = aggregate.type_share(CompanyType::Local);
    let regional_share = aggregate.type_share(CompanyType::Regional);
    let governance_imbalance = (local_share - regional_share).abs();

    SubScores {
        resource_dependency: round2(resource_dependency),
        sector_concentration: round2(sector_concentration),
        governance_imbalance: round2(governance_imbalance),
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
