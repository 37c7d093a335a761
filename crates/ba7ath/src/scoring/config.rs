use super::ScoringError;
use serde::{Deserialize, Serialize};

/// Weights combining the three sub-scores into the composite index.
/// Must be non-negative and sum to 1; they are part of the published
/// methodology, so any change is a new scoring policy version.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub resource_dependency: f64,
    pub sector_concentration: f64,
    pub governance_imbalance: f64,
}

/// Band cutoffs partitioning the 0-100 index. Bands are half-open on
/// the low side: `[0, medium_floor)` low, `[medium_floor, high_floor)`
/// medium, `[high_floor, 100]` high.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandThresholds {
    pub medium_floor: f64,
    pub high_floor: f64,
}

/// Per-dimension thresholds above which the corresponding flag raises.
/// Independent of the band cutoffs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlagThresholds {
    pub resource_dependency: f64,
    pub sector_concentration: f64,
    pub governance_imbalance: f64,
}

/// Full scoring policy handed to the engine. Kept as an explicit value
/// object so alternative policies can be evaluated side by side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub weights: ScoreWeights,
    pub bands: BandThresholds,
    pub flags: FlagThresholds,
}

impl ScoringConfig {
    /// The published v2 methodology:
    /// `INDEX = 100 * (0.4*s1 + 0.4*s2 + 0.2*s3)`, bands at 40/70,
    /// flags at 0.6 / 0.7 / 0.5.
    pub fn v2() -> Self {
        Self {
            weights: ScoreWeights {
                resource_dependency: 0.4,
                sector_concentration: 0.4,
                governance_imbalance: 0.2,
            },
            bands: BandThresholds {
                medium_floor: 40.0,
                high_floor: 70.0,
            },
            flags: FlagThresholds {
                resource_dependency: 0.6,
                sector_concentration: 0.7,
                governance_imbalance: 0.5,
            },
        }
    }

    pub(crate) fn validate(&self) -> Result<(), ScoringError> {
        for (dimension, value) in [
            ("resource_dependency", self.weights.resource_dependency),
            ("sector_concentration", self.weights.sector_concentration),
            ("governance_imbalance", self.weights.governance_imbalance),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ScoringError::NegativeWeight { dimension, value });
            }
        }

        let sum = self.weights.resource_dependency
            + self.weights.sector_concentration
            + self.weights.governance_imbalance;
        if (sum - 1.0).abs() > 1e-9 {
            return Err(ScoringError::WeightsNotNormalized { sum });
        }

        if !(0.0 < self.bands.medium_floor
            && self.bands.medium_floor < self.bands.high_floor
            && self.bands.high_floor <= 100.0)
        {
            return Err(ScoringError::InvalidBandCutoffs {
                medium_floor: self.bands.medium_floor,
                high_floor: self.bands.high_floor,
            });
        }

        for (dimension, value) in [
            ("resource_dependency", self.flags.resource_dependency),
            ("sector_concentration", self.flags.sector_concentration),
            ("governance_imbalance", self.flags.governance_imbalance),
        ] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(ScoringError::FlagThresholdOutOfRange { dimension, value });
            }
        }

        Ok(())
    }
}
