//! Genesis configuration for the settlement engine.
//!
//! Defines the initial owner and timing parameters the engine starts with.

use serde::{Deserialize, Serialize};

use sealed_auction_types::{Address, Timestamp};

use crate::state::AuctionState as EngineState;

/// Default grace period before the owner may sweep unclaimed funds: 30 days.
pub const DEFAULT_REMAINING_FUNDS_DELAY: Timestamp = 30 * 24 * 60 * 60;

/// Genesis configuration for the settlement engine.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AuctionGenesisConfig {
    /// Initial owner (the curator)
    pub owner: Address,

    /// Delay after auction end before `withdraw_remaining_funds` unlocks
    pub remaining_funds_delay: Timestamp,
}

impl AuctionGenesisConfig {
    /// Create a genesis config for `owner` with the default grace period.
    pub fn new(owner: Address) -> Self {
        Self {
            owner,
            remaining_funds_delay: DEFAULT_REMAINING_FUNDS_DELAY,
        }
    }

    /// Validate the genesis configuration.
    pub fn validate(&self) -> Result<(), GenesisValidationError> {
        if self.owner == [0u8; 32] {
            return Err(GenesisValidationError::InvalidOwner);
        }
        if self.remaining_funds_delay == 0 {
            return Err(GenesisValidationError::InvalidDelay(
                "Remaining-funds delay cannot be zero".into(),
            ));
        }
        Ok(())
    }

    /// Build the initial engine state from this configuration.
    pub fn build(&self) -> Result<EngineState, GenesisValidationError> {
        self.validate()?;
        Ok(EngineState::new(self.owner, self.remaining_funds_delay))
    }
}

/// Errors that can occur during genesis validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenesisValidationError {
    #[error("Owner cannot be the zero address")]
    InvalidOwner,

    #[error("Invalid delay configuration: {0}")]
    InvalidDelay(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_delay_is_thirty_days() {
        let config = AuctionGenesisConfig::new([1u8; 32]);
        assert_eq!(config.remaining_funds_delay, 2_592_000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_owner_rejected() {
        let config = AuctionGenesisConfig::new([0u8; 32]);
        assert!(matches!(
            config.validate(),
            Err(GenesisValidationError::InvalidOwner)
        ));
    }

    #[test]
    fn test_zero_delay_rejected() {
        let mut config = AuctionGenesisConfig::new([1u8; 32]);
        config.remaining_funds_delay = 0;
        assert!(matches!(
            config.validate(),
            Err(GenesisValidationError::InvalidDelay(_))
        ));
    }

    #[test]
    fn test_build_initial_state() {
        let state = AuctionGenesisConfig::new([1u8; 32]).build().unwrap();
        assert_eq!(state.owner, [1u8; 32]);
        assert_eq!(state.bids.len(), 0);
        assert_eq!(state.withdrawal_cursor, 0);
        assert_eq!(state.escrow, 0);
    }
}
