use super::domain::{ActivityGroup, CompanyRecord, CompanyType, Wilaya};
use serde::Serialize;
use std::collections::BTreeMap;

/// Cap on the `top_activities` listing, matching the registry dashboards.
pub const TOP_ACTIVITIES_LIMIT: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivityCount {
    pub activity: String,
    pub count: usize,
}

/// Counts for one wilaya over an immutable record snapshot. Sums of the
/// `types` and `top_groups` maps both equal `total` by construction.
#[derive(Debug, Clone, Serialize)]
pub struct WilayaAggregate {
    pub wilaya: Wilaya,
    pub total: usize,
    pub types: BTreeMap<CompanyType, usize>,
    pub top_groups: BTreeMap<ActivityGroup, usize>,
    pub top_activities: Vec<ActivityCount>,
}

impl WilayaAggregate {
    pub fn group_count(&self, group: ActivityGroup) -> usize {
        self.top_groups.get(&group).copied().unwrap_or(0)
    }

    pub fn type_count(&self, company_type: CompanyType) -> usize {
        self.types.get(&company_type).copied().unwrap_or(0)
    }

    /// Share of `group` in the wilaya, 0.0 for an empty aggregate.
    pub fn group_share(&self, group: ActivityGroup) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.group_count(group) as f64 / self.total as f64
        }
    }

    pub fn type_share(&self, company_type: CompanyType) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.type_count(company_type) as f64 / self.total as f64
        }
    }
}

/// Country-wide counts plus the per-wilaya totals used for stats ranking.
#[derive(Debug, Clone, Serialize)]
pub struct NationalAggregate {
    pub total: usize,
    pub wilayas: BTreeMap<Wilaya, usize>,
    pub types: BTreeMap<CompanyType, usize>,
    pub top_groups: BTreeMap<ActivityGroup, usize>,
    pub top_activities: Vec<ActivityCount>,
}

/// Aggregates the records belonging to `wilaya`. A scope with no records
/// yields the all-zero aggregate rather than an error.
pub fn wilaya_aggregate(records: &[CompanyRecord], wilaya: Wilaya) -> WilayaAggregate {
    let mut total = 0;
    let mut types = BTreeMap::new();
    let mut top_groups = BTreeMap::new();
    let mut activity_counts: BTreeMap<&str, usize> = BTreeMap::new();

    for record in records.iter().filter(|record| record.wilaya == wilaya) {
        total += 1;
        *types.entry(record.company_type).or_insert(0) += 1;
        *top_groups.entry(record.activity_group).or_insert(0) += 1;
        *activity_counts
            .entry(record.activity_normalized.as_str())
            .or_insert(0) += 1;
    }

    WilayaAggregate {
        wilaya,
        total,
        types,
        top_groups,
        top_activities: rank_activities(activity_counts),
    }
}

/// Aggregates the full snapshot regardless of region.
pub fn national_aggregate(records: &[CompanyRecord]) -> NationalAggregate {
    let mut wilayas = BTreeMap::new();
    let mut types = BTreeMap::new();
    let mut top_groups = BTreeMap::new();
    let mut activity_counts: BTreeMap<&str, usize> = BTreeMap::new();

    for record in records {
        *wilayas.entry(record.wilaya).or_insert(0) += 1;
        *types.entry(record.company_type).or_insert(0) += 1;
        *top_groups.entry(record.activity_group).or_insert(0) += 1;
        *activity_counts
            .entry(record.activity_normalized.as_str())
            .or_insert(0) += 1;
    }

    NationalAggregate {
        total: records.len(),
        wilayas,
        types,
        top_groups,
        top_activities: rank_activities(activity_counts),
    }
}

/// Orders activity counts descending; ties break on the label ascending
/// so repeated runs over the same snapshot always agree.
fn rank_activities(counts: BTreeMap<&str, usize>) -> Vec<ActivityCount> {
    let mut ranked: Vec<ActivityCount> = counts
        .into_iter()
        .map(|(activity, count)| ActivityCount {
            activity: activity.to_string(),
            count,
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.activity.cmp(&b.activity))
    });
    ranked.truncate(TOP_ACTIVITIES_LIMIT);
    ranked
}
