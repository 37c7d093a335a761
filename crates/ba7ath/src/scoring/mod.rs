//! Composite risk scoring: sub-score calculators, the BA7ATH index
//! builder with its flags and narrative, and the national ranking.

mod composite;
mod config;
mod narrative;
mod rank;
mod subscores;

pub use composite::{
    band_for, build_profile, FlagCode, FlagSeverity, RiskFlag, RiskLevel, RiskProfile,
};
pub use config::{BandThresholds, FlagThresholds, ScoreWeights, ScoringConfig};
pub use rank::{rank_profiles, RankedRiskProfile};
pub use subscores::{compute as compute_subscores, SubScores, RESOURCE_GROUPS};

use crate::registry::{wilaya_aggregate, CompanyRecord, Wilaya};
use thiserror::Error;

/// Stateless engine applying one validated scoring policy.
pub struct RiskEngine {
    config: ScoringConfig,
}

impl RiskEngine {
    /// Rejects malformed policies up front so profile building can only
    /// fail on a genuine upstream contract violation.
    pub fn new(config: ScoringConfig) -> Result<Self, ScoringError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Scores a single wilaya aggregate.
    pub fn profile(
        &self,
        aggregate: &crate::registry::WilayaAggregate,
    ) -> Result<RiskProfile, ScoringError> {
        let scores = subscores::compute(aggregate);
        composite::build_profile(aggregate, scores, &self.config)
    }

    /// Scores every wilaya over a record snapshot and ranks the result.
    /// Wilayas absent from the snapshot still get their neutral profile,
    /// so the board always covers the full 24-member set.
    pub fn ranked_board(
        &self,
        records: &[CompanyRecord],
    ) -> Result<Vec<RankedRiskProfile>, ScoringError> {
        let mut profiles = Vec::with_capacity(Wilaya::ordered().len());
        for wilaya in Wilaya::ordered() {
            let aggregate = wilaya_aggregate(records, wilaya);
            profiles.push(self.profile(&aggregate)?);
        }
        Ok(rank::rank_profiles(profiles))
    }
}

#[derive(Debug, Error)]
pub enum ScoringError {
    #[error("sub-score {dimension} must lie in [0,1], got {value}")]
    SubScoreOutOfRange { dimension: &'static str, value: f64 },
    #[error("scoring weight {dimension} must be non-negative, got {value}")]
    NegativeWeight { dimension: &'static str, value: f64 },
    #[error("scoring weights must sum to 1.0, got {sum}")]
    WeightsNotNormalized { sum: f64 },
    #[error("band cutoffs must satisfy 0 < medium_floor < high_floor <= 100, got {medium_floor} and {high_floor}")]
    InvalidBandCutoffs { medium_floor: f64, high_floor: f64 },
    #[error("flag threshold {dimension} must lie in [0,1], got {value}")]
    FlagThresholdOutOfRange { dimension: &'static str, value: f64 },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{ActivityGroup, CompanyType};

    fn record(
        id: u64,
        wilaya: Wilaya,
        company_type: CompanyType,
        group: ActivityGroup,
    ) -> CompanyRecord {
        CompanyRecord {
            id,
            name: format!("شركة {id}"),
            wilaya,
            delegation: None,
            locality: None,
            company_type,
            activity_raw: String::new(),
            activity_normalized: group.label_ar().to_string(),
            activity_group: group,
            announced_on: None,
        }
    }

    #[test]
    fn engine_rejects_invalid_policy() {
        let mut config = ScoringConfig::v2();
        config.weights.resource_dependency = 0.9;
        assert!(RiskEngine::new(config).is_err());
    }

    #[test]
    fn board_covers_all_wilayas_with_neutral_profiles_for_missing_data() {
        let records = vec![record(
            1,
            Wilaya::Gafsa,
            CompanyType::Local,
            ActivityGroup::EnergieMines,
        )];
        let engine = RiskEngine::new(ScoringConfig::v2()).expect("valid policy");
        let board = engine.ranked_board(&records).expect("board builds");

        assert_eq!(board.len(), 24);
        assert_eq!(board[0].profile.wilaya, Wilaya::Gafsa);
        assert_eq!(board[0].rank, 1);
        // Everyone else scored the neutral zero.
        assert!(board[1..]
            .iter()
            .all(|entry| entry.profile.baath_index == 0.0));
    }

    #[test]
    fn single_lookup_matches_full_board_rank() {
        let mut records = Vec::new();
        for id in 1..=6 {
            records.push(record(
                id,
                Wilaya::Gafsa,
                CompanyType::Local,
                ActivityGroup::EnergieMines,
            ));
        }
        for id in 7..=8 {
            records.push(record(
                id,
                Wilaya::Sousse,
                CompanyType::Regional,
                ActivityGroup::ServicesCom,
            ));
        }

        let engine = RiskEngine::new(ScoringConfig::v2()).expect("valid policy");
        let board = engine.ranked_board(&records).expect("board builds");
        let gafsa_entry = board
            .iter()
            .find(|entry| entry.profile.wilaya == Wilaya::Gafsa)
            .expect("present");

        let direct = engine
            .profile(&wilaya_aggregate(&records, Wilaya::Gafsa))
            .expect("profile builds");
        assert_eq!(direct.baath_index, gafsa_entry.profile.baath_index);
        assert_eq!(gafsa_entry.rank, 1);
    }
}
