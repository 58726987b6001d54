//! Settlement engine error types.

use thiserror::Error;

use sealed_auction_types::{Address, Amount, BidId};

/// Errors that can occur in the settlement engine.
///
/// Every guard either passes or rejects the whole call; no failure leaves
/// partial mutations behind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuctionError {
    // === Lifecycle violations ===
    #[error("Auction has already been started")]
    AuctionAlreadyStarted,

    #[error("Auction is not ongoing")]
    AuctionNotOngoing,

    #[error("Auction has not started yet")]
    AuctionNotStarted,

    #[error("Auction has already ended")]
    AuctionAlreadyEnded,

    #[error("Auction has not ended yet")]
    AuctionNotEnded,

    #[error("Winners have not been announced")]
    WinnersNotAnnounced,

    // === Authorization violations ===
    #[error("Account is not the auction owner: {0:?}")]
    UnauthorizedAccount(Address),

    #[error("Caller is not the bidder on this bid")]
    NotBidder,

    // === Accounting violations ===
    #[error("Refund has already been claimed")]
    RefundAlreadyClaimed,

    #[error("Winning bids cannot be refunded")]
    WinnerCannotClaimRefund,

    #[error("No winning funds left in this batch")]
    NoWinningFunds,

    #[error("Amount arithmetic overflowed")]
    AmountOverflow,

    // === Timing violations ===
    #[error("Remaining funds are still time-locked")]
    TooEarlyForRemainingFunds,

    // === Not found ===
    #[error("Bid not found: {0}")]
    BidNotFound(BidId),

    // === Invalid parameters ===
    #[error("Start time must precede end time")]
    InvalidTiming,

    #[error("Minimum bid and denomination must be positive")]
    InvalidAuctionParams,

    #[error("Bid too low: need at least {required}, got {got}")]
    BidTooLow { required: Amount, got: Amount },

    #[error("Bid must be a multiple of {denomination}, got {got}")]
    BidNotDenominated { denomination: Amount, got: Amount },
}
