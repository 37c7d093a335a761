use super::composite::RiskProfile;
use serde::Serialize;

/// A risk profile with its position in the national ordering.
#[derive(Debug, Clone, Serialize)]
pub struct RankedRiskProfile {
    pub rank: usize,
    #[serde(flatten)]
    pub profile: RiskProfile,
}

/// Orders profiles by index descending, ties by wilaya name ascending,
/// and assigns 1-based contiguous ranks. Tied wilayas still occupy one
/// rank slot each, so the rank column never repeats.
pub fn rank_profiles(mut profiles: Vec<RiskProfile>) -> Vec<RankedRiskProfile> {
    profiles.sort_by(|a, b| {
        b.baath_index
            .total_cmp(&a.baath_index)
            .then_with(|| a.wilaya.name_ar().cmp(b.wilaya.name_ar()))
    });

    profiles
        .into_iter()
        .enumerate()
        .map(|(position, profile)| RankedRiskProfile {
            rank: position + 1,
            profile,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{wilaya_aggregate, Wilaya};
    use crate::scoring::composite::build_profile;
    use crate::scoring::subscores::SubScores;
    use crate::scoring::ScoringConfig;

    fn profile(wilaya: Wilaya, s1: f64, s2: f64, s3: f64) -> RiskProfile {
        let aggregate = wilaya_aggregate(&[], wilaya);
        let scores = SubScores {
            resource_dependency: s1,
            sector_concentration: s2,
            governance_imbalance: s3,
        };
        build_profile(&aggregate, scores, &ScoringConfig::v2()).expect("valid scores")
    }

    #[test]
    fn highest_index_takes_rank_one() {
        let ranked = rank_profiles(vec![
            profile(Wilaya::Nabeul, 0.2, 0.2, 0.2),
            profile(Wilaya::Gafsa, 0.9, 0.9, 0.9),
            profile(Wilaya::Sousse, 0.5, 0.5, 0.5),
        ]);
        assert_eq!(ranked[0].profile.wilaya, Wilaya::Gafsa);
        assert_eq!(ranked[0].rank, 1);
        assert_eq!(ranked[1].profile.wilaya, Wilaya::Sousse);
        assert_eq!(ranked[2].profile.wilaya, Wilaya::Nabeul);
        assert_eq!(ranked[2].rank, 3);
    }

    #[test]
    fn ties_break_alphabetically_and_keep_ranks_contiguous() {
        // Identical sub-scores: both index 50. "توزر" sorts before
        // "سوسة" bytewise.
        let ranked = rank_profiles(vec![
            profile(Wilaya::Sousse, 0.5, 0.5, 0.5),
            profile(Wilaya::Tozeur, 0.5, 0.5, 0.5),
        ]);
        assert_eq!(ranked[0].profile.wilaya, Wilaya::Tozeur);
        assert_eq!(ranked[1].profile.wilaya, Wilaya::Sousse);
        assert_eq!(
            ranked.iter().map(|entry| entry.rank).collect::<Vec<_>>(),
            vec![1, 2]
        );
    }

    #[test]
    fn ranking_is_idempotent() {
        let first = rank_profiles(vec![
            profile(Wilaya::Kebili, 0.1, 0.4, 0.3),
            profile(Wilaya::Mahdia, 0.6, 0.2, 0.1),
            profile(Wilaya::Kef, 0.6, 0.2, 0.1),
        ]);
        let again = rank_profiles(first.iter().map(|entry| entry.profile.clone()).collect());
        let order: Vec<Wilaya> = first.iter().map(|entry| entry.profile.wilaya).collect();
        let reorder: Vec<Wilaya> = again.iter().map(|entry| entry.profile.wilaya).collect();
        assert_eq!(order, reorder);
    }
}
