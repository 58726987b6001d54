//! Core type definitions for the sealed-ledger auction settlement engine.
//!
//! This crate provides the shared data structures used across the auction
//! system: the auction configuration and lifecycle, the bid ledger entry,
//! payout instructions and the notification events consumed by indexers.

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

// =========================
// PRIMITIVES
// =========================

/// Generic address type (32 bytes)
pub type Address = [u8; 32];

/// Deposit / payout amount in the engine's base unit
pub type Amount = u64;

/// Sequential bid identifier (position in the append-only ledger)
pub type BidId = u64;

/// Wall-clock time in seconds
pub type Timestamp = u64;

// =========================
// AUCTION LIFECYCLE
// =========================

/// Auction lifecycle state
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize,
    Deserialize,
)]
pub enum AuctionState {
    /// No configuration set yet
    #[default]
    NotStarted,
    /// Accepting bids within the configured time window
    Ongoing,
    /// Bidding closed, waiting for winner designation
    Ended,
    /// Winners designated; settlement in progress (terminal)
    WinnersAnnounced,
}

/// Where a timestamp falls relative to the configured bidding window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BidWindow {
    BeforeStart,
    Open,
    AfterEnd,
}

/// Auction configuration and current lifecycle state.
///
/// Set exactly once by `start_auction` and immutable until an explicit reset.
#[derive(
    Clone, Debug, Default, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize,
)]
pub struct Auction {
    /// First instant at which bids are accepted (inclusive)
    pub start_time: Timestamp,
    /// First instant at which bids are rejected (exclusive window end)
    pub end_time: Timestamp,
    /// Minimum accepted bid amount
    pub min_bid: Amount,
    /// Bid granularity: every bid must be an exact multiple of this
    pub bid_denomination: Amount,
    /// Current lifecycle state
    pub state: AuctionState,
}

impl Auction {
    /// Classify `now` against the bidding window `[start_time, end_time)`.
    pub fn bid_window(&self, now: Timestamp) -> BidWindow {
        if now < self.start_time {
            BidWindow::BeforeStart
        } else if now >= self.end_time {
            BidWindow::AfterEnd
        } else {
            BidWindow::Open
        }
    }
}

// =========================
// BID LEDGER
// =========================

/// A single entry in the append-only bid ledger.
///
/// Immutable except for the two flags, each of which is set at most once over
/// the bid's lifetime and never reverts to `false`.
#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct Bid {
    pub id: BidId,
    pub bidder: Address,
    pub amount: Amount,
    /// Designated a winner by `set_winners`
    pub is_winner: bool,
    /// Paid out, either as a refund or through the withdrawal cursor
    pub is_claimed: bool,
}

impl Bid {
    /// A non-winning bid that has not been paid out yet.
    pub fn is_refundable(&self) -> bool {
        !self.is_winner && !self.is_claimed
    }
}

// =========================
// SETTLEMENT OUTPUTS
// =========================

/// A value transfer the embedding runtime must perform.
///
/// Handlers return this only after every ledger mutation has committed, so a
/// recipient re-entering the engine observes already-settled state.
#[must_use]
#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct Payout {
    pub to: Address,
    pub amount: Amount,
}

/// Notification events, the sole observable record consumed by indexers.
#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub enum AuctionEvent {
    BidPlaced {
        bidder: Address,
        amount: Amount,
    },
    AuctionEnded,
    WinnersAnnounced {
        winning_bids: Vec<BidId>,
    },
    RefundClaimed {
        bidder: Address,
        amount: Amount,
    },
    FundsWithdrawn {
        owner: Address,
        amount: Amount,
    },
    OwnershipTransferred {
        previous_owner: Address,
        new_owner: Address,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bid_window_edges() {
        let auction = Auction {
            start_time: 100,
            end_time: 200,
            min_bid: 10,
            bid_denomination: 1,
            state: AuctionState::Ongoing,
        };

        assert_eq!(auction.bid_window(99), BidWindow::BeforeStart);
        assert_eq!(auction.bid_window(100), BidWindow::Open);
        assert_eq!(auction.bid_window(199), BidWindow::Open);
        assert_eq!(auction.bid_window(200), BidWindow::AfterEnd);
        assert_eq!(auction.bid_window(201), BidWindow::AfterEnd);
    }

    #[test]
    fn test_bid_serialization() {
        let bid = Bid {
            id: 7,
            bidder: [3u8; 32],
            amount: 250,
            is_winner: true,
            is_claimed: false,
        };
        let encoded = borsh::to_vec(&bid).unwrap();
        let decoded: Bid = borsh::from_slice(&encoded).unwrap();
        assert_eq!(bid, decoded);
    }

    #[test]
    fn test_refundable_excludes_winners_and_claimed() {
        let mut bid = Bid {
            id: 0,
            bidder: [1u8; 32],
            amount: 100,
            is_winner: false,
            is_claimed: false,
        };
        assert!(bid.is_refundable());

        bid.is_winner = true;
        assert!(!bid.is_refundable());

        bid.is_winner = false;
        bid.is_claimed = true;
        assert!(!bid.is_refundable());
    }
}
