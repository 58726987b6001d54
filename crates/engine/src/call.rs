//! Call message types for the settlement engine.

use borsh::{BorshDeserialize, BorshSerialize};

use sealed_auction_types::{Address, Amount, BidId, Timestamp};

/// Call messages for the settlement engine.
///
/// `PlaceBid` carries no amount; the deposit is the value attached to the
/// call (`CallContext::value`).
#[derive(Clone, Debug, BorshSerialize, BorshDeserialize)]
pub enum AuctionCall {
    // === Lifecycle ===
    /// Configure and open the auction (owner only).
    StartAuction {
        start_time: Timestamp,
        end_time: Timestamp,
        min_bid: Amount,
        bid_denomination: Amount,
    },

    /// Deposit the attached value as a new bid.
    PlaceBid,

    /// Close bidding once the end time has passed (anyone).
    EndAuction,

    /// Administrative escape back to `NotStarted` (owner only).
    /// Clears the configuration but keeps the bid ledger.
    ResetAuction,

    /// Designate the winning bids by id (owner only).
    SetWinners { bid_ids: Vec<BidId> },

    // === Settlement ===
    /// Reclaim the deposit of a single non-winning bid.
    ClaimRefund { bid_id: BidId, recipient: Address },

    /// Reclaim several non-winning bids in one aggregate transfer.
    /// All-or-nothing: one failing id rejects the whole call.
    ClaimRefunds {
        bid_ids: Vec<BidId>,
        recipient: Address,
    },

    /// Sweep up to `batch_size` bids past the withdrawal cursor,
    /// collecting unclaimed winning deposits (owner only).
    WithdrawWinningFunds { batch_size: u64 },

    /// Time-locked sweep of the entire remaining balance (owner only).
    WithdrawRemainingFunds,

    // === Admin ===
    /// Hand the curator role to another account (owner only).
    TransferOwnership { new_owner: Address },
}
