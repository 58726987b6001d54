//! Mock chain for local testing of the settlement engine.
//!
//! Simulates the execution environment the engine expects: serialized calls,
//! per-account balances, attached value, and a controllable clock. Calls are
//! dispatched through the engine's `apply_call`; payouts returned by handlers
//! are applied to account balances only after the engine has committed its
//! mutations, and every emitted event is recorded in order.

use std::collections::HashMap;

use thiserror::Error;
use tracing::{debug, info};

use sealed_auction_engine::{apply_call, AuctionError, CallContext, CallOutcome};
use sealed_auction_engine::{
    AuctionCall, AuctionGenesisConfig, AuctionState as EngineState, GenesisValidationError,
};
use sealed_auction_types::{Address, Amount, AuctionEvent, Timestamp};

/// Seconds per simulated block.
const BLOCK_TIME: Timestamp = 12;

/// Errors surfaced by the chain layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    #[error("Insufficient balance: need {required}, got {available}")]
    InsufficientBalance { required: Amount, available: Amount },

    #[error(transparent)]
    Call(#[from] AuctionError),

    #[error(transparent)]
    Genesis(#[from] GenesisValidationError),
}

/// Simulated chain state.
pub struct ChainState {
    /// Engine state
    engine: EngineState,
    /// Current block height
    block_height: u64,
    /// Current timestamp, advanced by blocks or set directly
    timestamp: Timestamp,
    /// Spendable balance per account
    balances: HashMap<Address, Amount>,
    /// Every event emitted by successful calls, in order
    events: Vec<AuctionEvent>,
}

impl ChainState {
    /// Create a chain with a freshly initialized engine.
    pub fn new(genesis: &AuctionGenesisConfig) -> Result<Self, ChainError> {
        let engine = genesis.build()?;
        Ok(Self {
            engine,
            block_height: 0,
            timestamp: 0,
            events: Vec::new(),
            balances: HashMap::new(),
        })
    }

    /// Advance the chain by one block.
    pub fn advance_block(&mut self) {
        self.block_height += 1;
        self.timestamp += BLOCK_TIME;
    }

    /// Set the current timestamp (for testing time-dependent logic).
    pub fn set_timestamp(&mut self, timestamp: Timestamp) {
        self.timestamp = timestamp;
    }

    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    pub fn block_height(&self) -> u64 {
        self.block_height
    }

    /// Credit an account with spendable funds.
    pub fn fund(&mut self, account: Address, amount: Amount) {
        *self.balances.entry(account).or_insert(0) += amount;
    }

    pub fn balance_of(&self, account: &Address) -> Amount {
        self.balances.get(account).copied().unwrap_or(0)
    }

    /// Read access to the engine state, for assertions.
    pub fn engine(&self) -> &EngineState {
        &self.engine
    }

    /// Events emitted so far, in order.
    pub fn events(&self) -> &[AuctionEvent] {
        &self.events
    }

    /// Execute a call from `sender`, attaching `value` from its balance.
    ///
    /// On failure the attached value never leaves the sender and the engine
    /// state is untouched. On success the payout, if any, is credited after
    /// the engine committed, matching the ordering contract the engine
    /// depends on.
    pub fn execute(
        &mut self,
        sender: Address,
        value: Amount,
        call: AuctionCall,
    ) -> Result<CallOutcome, ChainError> {
        let available = self.balance_of(&sender);
        if available < value {
            return Err(ChainError::InsufficientBalance {
                required: value,
                available,
            });
        }
        self.balances.insert(sender, available - value);

        let ctx = CallContext {
            sender,
            block_height: self.block_height,
            timestamp: self.timestamp,
            value,
        };

        let outcome = match apply_call(&mut self.engine, &ctx, &call) {
            Ok(outcome) => outcome,
            Err(err) => {
                // Failed call: the attached value returns to the sender
                *self.balances.entry(sender).or_insert(0) += value;
                return Err(err.into());
            }
        };

        if let Some(payout) = &outcome.payout {
            *self.balances.entry(payout.to).or_insert(0) += payout.amount;
            debug!(amount = payout.amount, "applied payout");
        }
        if let Some(event) = &outcome.event {
            info!(height = self.block_height, ?event, "call applied");
            self.events.push(event.clone());
        }

        Ok(outcome)
    }

    /// Total value in the system: escrowed by the engine plus all account
    /// balances. Conservation means this never changes across calls.
    pub fn total_value(&self) -> Amount {
        self.engine.escrow + self.balances.values().sum::<Amount>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OWNER: Address = [9u8; 32];
    const BIDDER: Address = [1u8; 32];

    fn chain() -> ChainState {
        ChainState::new(&AuctionGenesisConfig::new(OWNER)).unwrap()
    }

    #[test]
    fn test_advance_block() {
        let mut chain = chain();
        chain.advance_block();
        chain.advance_block();
        assert_eq!(chain.block_height(), 2);
        assert_eq!(chain.timestamp(), 24);
    }

    #[test]
    fn test_execute_debits_attached_value() {
        let mut chain = chain();
        chain.fund(BIDDER, 1_000);
        chain
            .execute(
                OWNER,
                0,
                AuctionCall::StartAuction {
                    start_time: 100,
                    end_time: 200,
                    min_bid: 100,
                    bid_denomination: 10,
                },
            )
            .unwrap();

        chain.set_timestamp(100);
        chain.execute(BIDDER, 200, AuctionCall::PlaceBid).unwrap();

        assert_eq!(chain.balance_of(&BIDDER), 800);
        assert_eq!(chain.engine().escrow, 200);
        assert_eq!(chain.events().len(), 1);
    }

    #[test]
    fn test_insufficient_balance() {
        let mut chain = chain();
        let result = chain.execute(BIDDER, 200, AuctionCall::PlaceBid);
        assert_eq!(
            result,
            Err(ChainError::InsufficientBalance {
                required: 200,
                available: 0
            })
        );
    }

    #[test]
    fn test_failed_call_returns_value() {
        let mut chain = chain();
        chain.fund(BIDDER, 500);

        // No auction started: the bid fails and the value comes back
        let result = chain.execute(BIDDER, 200, AuctionCall::PlaceBid);
        assert_eq!(result, Err(ChainError::Call(AuctionError::AuctionAlreadyEnded)));
        assert_eq!(chain.balance_of(&BIDDER), 500);
        assert_eq!(chain.engine().escrow, 0);
        assert!(chain.events().is_empty());
    }

    #[test]
    fn test_total_value_conserved_on_failures() {
        let mut chain = chain();
        chain.fund(BIDDER, 500);
        let before = chain.total_value();

        let _ = chain.execute(BIDDER, 200, AuctionCall::PlaceBid);
        let _ = chain.execute(BIDDER, 9_999, AuctionCall::PlaceBid);

        assert_eq!(chain.total_value(), before);
    }
}
