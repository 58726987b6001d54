//! Query handlers for the settlement engine.
//!
//! These functions provide read-only access to auction state.

use serde::{Deserialize, Serialize};

use sealed_auction_types::{Address, Amount, Auction, Bid, BidId};

use crate::state::AuctionState as EngineState;

/// Query request types.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum AuctionQuery {
    /// Get the auction configuration and lifecycle state.
    GetAuction,

    /// Get a bid by id.
    GetBid { bid_id: BidId },

    /// Get the number of bids a bidder has placed.
    GetBidCount { bidder: Address },

    /// Get all bids a bidder has placed.
    GetBidderBids { bidder: Address },

    /// Get the full ledger (paginated).
    ListBids { offset: u64, limit: u64 },

    /// Get the current owner.
    GetOwner,

    /// Get the value currently escrowed by the engine.
    GetEscrowBalance,

    /// Get the batched-withdrawal cursor.
    GetWithdrawalCursor,
}

/// Query response types.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum AuctionQueryResponse {
    /// Auction configuration and state.
    Auction(Auction),

    /// Single bid.
    Bid(Option<Bid>),

    /// Bid count for a bidder.
    BidCount(u64),

    /// Bids for a bidder.
    Bids(Vec<Bid>),

    /// Current owner.
    Owner(Address),

    /// Escrowed balance.
    EscrowBalance(Amount),

    /// Withdrawal cursor.
    WithdrawalCursor(BidId),
}

/// Handle a query.
pub fn handle_query(state: &EngineState, query: AuctionQuery) -> AuctionQueryResponse {
    match query {
        AuctionQuery::GetAuction => AuctionQueryResponse::Auction(state.auction.clone()),

        AuctionQuery::GetBid { bid_id } => {
            AuctionQueryResponse::Bid(state.bid(bid_id).ok().cloned())
        }

        AuctionQuery::GetBidCount { bidder } => {
            AuctionQueryResponse::BidCount(state.bid_count(&bidder) as u64)
        }

        AuctionQuery::GetBidderBids { bidder } => {
            let bids = state.bids_for(&bidder).into_iter().cloned().collect();
            AuctionQueryResponse::Bids(bids)
        }

        AuctionQuery::ListBids { offset, limit } => {
            let bids = state
                .bids
                .iter()
                .skip(offset as usize)
                .take(limit as usize)
                .cloned()
                .collect();
            AuctionQueryResponse::Bids(bids)
        }

        AuctionQuery::GetOwner => AuctionQueryResponse::Owner(state.owner),

        AuctionQuery::GetEscrowBalance => AuctionQueryResponse::EscrowBalance(state.escrow),

        AuctionQuery::GetWithdrawalCursor => {
            AuctionQueryResponse::WithdrawalCursor(state.withdrawal_cursor)
        }
    }
}

/// Ids of a bidder's bids that can still be refunded.
pub fn refundable_bids(state: &EngineState, bidder: &Address) -> Vec<BidId> {
    state
        .bids_for(bidder)
        .into_iter()
        .filter(|bid| bid.is_refundable())
        .map(|bid| bid.id)
        .collect()
}

/// Total value of winning bids not yet collected by the batched withdrawal.
pub fn unclaimed_winning_total(state: &EngineState) -> Amount {
    state
        .bids
        .iter()
        .filter(|bid| bid.is_winner && !bid.is_claimed)
        .map(|bid| bid.amount)
        .sum()
}
