//! In-memory state for the settlement engine.

use std::collections::HashMap;

use sealed_auction_types::{Address, Amount, Auction, Bid, BidId, Timestamp};

use crate::error::AuctionError;

/// Settlement engine state.
///
/// Holds the single auction instance, the append-only bid ledger with its
/// per-bidder reverse index, the batched-withdrawal cursor and the escrowed
/// balance. Mutated only through the call handlers; the execution environment
/// serializes calls, so no interior locking is needed here.
#[derive(Debug, Clone)]
pub struct AuctionState {
    /// The curator: may start/reset the auction, announce winners and
    /// withdraw funds. Transferable.
    pub owner: Address,

    /// Auction configuration and lifecycle state
    pub auction: Auction,

    /// Append-only bid ledger; a bid's id is its position
    pub bids: Vec<Bid>,

    /// Bid ids per bidder, in insertion order
    pub bidder_index: HashMap<Address, Vec<BidId>>,

    /// Next bid id not yet considered for winning-funds withdrawal.
    /// Monotonically increases and survives an auction reset.
    pub withdrawal_cursor: BidId,

    /// Value currently held by the engine
    pub escrow: Amount,

    /// When the auction was ended; anchors the remaining-funds time lock
    pub ended_at: Option<Timestamp>,

    /// Delay after `ended_at` before the owner may sweep remaining funds
    pub remaining_funds_delay: Timestamp,
}

impl AuctionState {
    /// Create a fresh engine state with an empty ledger.
    pub fn new(owner: Address, remaining_funds_delay: Timestamp) -> Self {
        Self {
            owner,
            auction: Auction::default(),
            bids: Vec::new(),
            bidder_index: HashMap::new(),
            withdrawal_cursor: 0,
            escrow: 0,
            ended_at: None,
            remaining_funds_delay,
        }
    }

    /// Get a bid by id.
    pub fn bid(&self, bid_id: BidId) -> Result<&Bid, AuctionError> {
        self.bids
            .get(bid_id as usize)
            .ok_or(AuctionError::BidNotFound(bid_id))
    }

    /// Get a mutable bid by id.
    pub fn bid_mut(&mut self, bid_id: BidId) -> Result<&mut Bid, AuctionError> {
        self.bids
            .get_mut(bid_id as usize)
            .ok_or(AuctionError::BidNotFound(bid_id))
    }

    /// Append a bid to the ledger and index it for its bidder.
    pub fn append_bid(&mut self, bidder: Address, amount: Amount) -> BidId {
        let id = self.bids.len() as BidId;
        self.bids.push(Bid {
            id,
            bidder,
            amount,
            is_winner: false,
            is_claimed: false,
        });
        self.bidder_index.entry(bidder).or_default().push(id);
        id
    }

    /// Number of bids a bidder has placed.
    pub fn bid_count(&self, bidder: &Address) -> usize {
        self.bidder_index.get(bidder).map(Vec::len).unwrap_or(0)
    }

    /// All bids a bidder has placed, in insertion order.
    pub fn bids_for(&self, bidder: &Address) -> Vec<&Bid> {
        self.bidder_index
            .get(bidder)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| self.bids.get(*id as usize))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Add deposited value to the escrowed balance.
    pub fn credit_escrow(&mut self, amount: Amount) -> Result<(), AuctionError> {
        self.escrow = self
            .escrow
            .checked_add(amount)
            .ok_or(AuctionError::AmountOverflow)?;
        Ok(())
    }

    /// Remove paid-out value from the escrowed balance.
    ///
    /// The ledger only ever pays out what was deposited, so underflow here
    /// means a broken invariant rather than caller error.
    pub fn debit_escrow(&mut self, amount: Amount) -> Result<(), AuctionError> {
        self.escrow = self
            .escrow
            .checked_sub(amount)
            .ok_or(AuctionError::AmountOverflow)?;
        Ok(())
    }

    /// Whether `account` is the current owner.
    pub fn is_owner(&self, account: &Address) -> bool {
        &self.owner == account
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_state() -> AuctionState {
        AuctionState::new([9u8; 32], 30 * 24 * 60 * 60)
    }

    #[test]
    fn test_append_and_lookup() {
        let mut state = test_state();
        let bidder = [1u8; 32];

        assert_eq!(state.append_bid(bidder, 200), 0);
        assert_eq!(state.append_bid(bidder, 300), 1);

        let bid = state.bid(1).unwrap();
        assert_eq!(bid.amount, 300);
        assert_eq!(bid.bidder, bidder);
        assert!(!bid.is_winner);
        assert!(!bid.is_claimed);

        assert_eq!(state.bid(2), Err(AuctionError::BidNotFound(2)));
    }

    #[test]
    fn test_bidder_index_insertion_order() {
        let mut state = test_state();
        let a = [1u8; 32];
        let b = [2u8; 32];

        state.append_bid(a, 200);
        state.append_bid(b, 300);
        state.append_bid(a, 400);

        assert_eq!(state.bid_count(&a), 2);
        assert_eq!(state.bid_count(&b), 1);
        assert_eq!(state.bid_count(&[3u8; 32]), 0);

        let ids: Vec<_> = state.bids_for(&a).iter().map(|bid| bid.id).collect();
        assert_eq!(ids, vec![0, 2]);
    }

    #[test]
    fn test_escrow_operations() {
        let mut state = test_state();

        state.credit_escrow(100).unwrap();
        state.credit_escrow(50).unwrap();
        assert_eq!(state.escrow, 150);

        state.debit_escrow(75).unwrap();
        assert_eq!(state.escrow, 75);

        assert_eq!(state.debit_escrow(100), Err(AuctionError::AmountOverflow));
        assert_eq!(state.escrow, 75);

        state.escrow = Amount::MAX;
        assert_eq!(state.credit_escrow(1), Err(AuctionError::AmountOverflow));
    }
}
