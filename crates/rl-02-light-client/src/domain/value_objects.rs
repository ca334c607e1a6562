//! # Value Objects

use serde::{Deserialize, Serialize};
use tendermint::trust_threshold::TrustThresholdFraction;

use super::errors::{LightClientError, LightClientResult};

/// Fraction of trusted voting power that must sign a skipping header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrustThreshold {
    /// Numerator.
    pub numerator: u64,
    /// Denominator.
    pub denominator: u64,
}

impl TrustThreshold {
    /// Default threshold for non-adjacent verification.
    pub const ONE_THIRD: TrustThreshold = TrustThreshold {
        numerator: 1,
        denominator: 3,
    };

    /// Threshold a block's own validator set must clear.
    pub const TWO_THIRDS: TrustThreshold = TrustThreshold {
        numerator: 2,
        denominator: 3,
    };

    /// Builds a threshold in [1/3, 1].
    pub fn new(numerator: u64, denominator: u64) -> LightClientResult<Self> {
        let valid = denominator > 0
            && numerator <= denominator
            && (numerator as u128) * 3 >= denominator as u128;
        if !valid {
            return Err(LightClientError::InvalidTrustThreshold {
                numerator,
                denominator,
            });
        }
        Ok(Self {
            numerator,
            denominator,
        })
    }

    /// Power that must be strictly exceeded out of `total`.
    pub fn required_power(&self, total: u128) -> u128 {
        total * self.numerator as u128 / self.denominator as u128
    }

    /// Whether `tallied` out of `total` strictly exceeds the threshold.
    pub fn is_enough_power(&self, tallied: u64, total: u64) -> bool {
        tallied as u128 * self.denominator as u128 > total as u128 * self.numerator as u128
    }

    /// The same fraction as the verifier's threshold type.
    pub fn to_fraction(self) -> LightClientResult<TrustThresholdFraction> {
        TrustThresholdFraction::new(self.numerator, self.denominator).map_err(|_| {
            LightClientError::InvalidTrustThreshold {
                numerator: self.numerator,
                denominator: self.denominator,
            }
        })
    }
}

impl Default for TrustThreshold {
    fn default() -> Self {
        Self::ONE_THIRD
    }
}
