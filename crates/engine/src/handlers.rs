//! Call handlers for the settlement engine.
//!
//! These functions implement the business logic for each call type. Every
//! handler either completes all of its ledger mutations or fails without
//! touching state; handlers that move value return the transfer as a
//! [`Payout`] so the runtime performs it strictly after the mutations have
//! committed.

use std::collections::HashSet;

use sealed_auction_types::{
    Address, Amount, Auction, AuctionEvent, AuctionState, BidId, BidWindow, Payout, Timestamp,
};

use crate::call::AuctionCall;
use crate::error::AuctionError;
use crate::state::AuctionState as EngineState;

/// Context provided by the runtime for each call.
pub struct CallContext {
    /// Sender of the transaction
    pub sender: Address,
    /// Current block height
    pub block_height: u64,
    /// Current timestamp
    pub timestamp: Timestamp,
    /// Value attached to the call (the deposit for `PlaceBid`)
    pub value: Amount,
}

/// Result type for handlers.
pub type HandlerResult<T> = Result<T, AuctionError>;

/// Everything a successful call produces besides its state mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallOutcome {
    /// Notification for downstream indexers, if this call emits one
    pub event: Option<AuctionEvent>,
    /// Transfer the runtime must perform after the call returns
    pub payout: Option<Payout>,
}

impl CallOutcome {
    fn quiet() -> Self {
        Self {
            event: None,
            payout: None,
        }
    }

    fn event(event: AuctionEvent) -> Self {
        Self {
            event: Some(event),
            payout: None,
        }
    }

    fn paid(event: AuctionEvent, payout: Payout) -> Self {
        Self {
            event: Some(event),
            payout: Some(payout),
        }
    }
}

fn ensure_owner(state: &EngineState, ctx: &CallContext) -> HandlerResult<()> {
    if !state.is_owner(&ctx.sender) {
        return Err(AuctionError::UnauthorizedAccount(ctx.sender));
    }
    Ok(())
}

/// Handle StartAuction.
pub fn handle_start_auction(
    state: &mut EngineState,
    ctx: &CallContext,
    start_time: Timestamp,
    end_time: Timestamp,
    min_bid: Amount,
    bid_denomination: Amount,
) -> HandlerResult<()> {
    ensure_owner(state, ctx)?;

    if state.auction.state != AuctionState::NotStarted {
        return Err(AuctionError::AuctionAlreadyStarted);
    }
    if start_time >= end_time {
        return Err(AuctionError::InvalidTiming);
    }
    if min_bid == 0 || bid_denomination == 0 {
        return Err(AuctionError::InvalidAuctionParams);
    }

    state.auction = Auction {
        start_time,
        end_time,
        min_bid,
        bid_denomination,
        state: AuctionState::Ongoing,
    };

    Ok(())
}

/// Handle PlaceBid.
///
/// The deposit is `ctx.value`; on success it is credited to escrow and the
/// bid is appended to the ledger.
pub fn handle_place_bid(state: &mut EngineState, ctx: &CallContext) -> HandlerResult<BidId> {
    if state.auction.state != AuctionState::Ongoing {
        return Err(AuctionError::AuctionAlreadyEnded);
    }
    match state.auction.bid_window(ctx.timestamp) {
        BidWindow::BeforeStart => return Err(AuctionError::AuctionNotStarted),
        BidWindow::AfterEnd => return Err(AuctionError::AuctionAlreadyEnded),
        BidWindow::Open => {}
    }

    if ctx.value < state.auction.min_bid {
        return Err(AuctionError::BidTooLow {
            required: state.auction.min_bid,
            got: ctx.value,
        });
    }
    if ctx.value % state.auction.bid_denomination != 0 {
        return Err(AuctionError::BidNotDenominated {
            denomination: state.auction.bid_denomination,
            got: ctx.value,
        });
    }

    state.credit_escrow(ctx.value)?;
    Ok(state.append_bid(ctx.sender, ctx.value))
}

/// Handle EndAuction.
///
/// Time-gated but permissionless: anyone may close the auction once the end
/// time has passed.
pub fn handle_end_auction(state: &mut EngineState, ctx: &CallContext) -> HandlerResult<()> {
    if state.auction.state != AuctionState::Ongoing {
        return Err(AuctionError::AuctionNotOngoing);
    }
    if ctx.timestamp < state.auction.end_time {
        return Err(AuctionError::AuctionNotOngoing);
    }

    state.auction.state = AuctionState::Ended;
    state.ended_at = Some(ctx.timestamp);

    Ok(())
}

/// Handle ResetAuction.
///
/// Clears the configuration and returns to `NotStarted`. The bid ledger,
/// bidder index and withdrawal cursor are independent storage and survive.
pub fn handle_reset_auction(state: &mut EngineState, ctx: &CallContext) -> HandlerResult<()> {
    ensure_owner(state, ctx)?;

    state.auction = Auction::default();
    state.ended_at = None;

    Ok(())
}

/// Handle SetWinners.
///
/// Accepted once per auction instance, only in `Ended`. Duplicate ids are a
/// no-op on the second mark; accounting reads per-bid flags, never this list,
/// so duplicates cannot double-count.
pub fn handle_set_winners(
    state: &mut EngineState,
    ctx: &CallContext,
    bid_ids: &[BidId],
) -> HandlerResult<()> {
    ensure_owner(state, ctx)?;

    if state.auction.state != AuctionState::Ended {
        return Err(AuctionError::AuctionNotEnded);
    }

    // Validate the whole list before setting any flag
    for &bid_id in bid_ids {
        state.bid(bid_id)?;
    }
    for &bid_id in bid_ids {
        state.bid_mut(bid_id)?.is_winner = true;
    }

    state.auction.state = AuctionState::WinnersAnnounced;

    Ok(())
}

/// Handle ClaimRefund.
pub fn handle_claim_refund(
    state: &mut EngineState,
    ctx: &CallContext,
    bid_id: BidId,
    recipient: Address,
) -> HandlerResult<Payout> {
    let bid = state.bid(bid_id)?;
    if bid.bidder != ctx.sender {
        return Err(AuctionError::NotBidder);
    }
    if bid.is_winner {
        return Err(AuctionError::WinnerCannotClaimRefund);
    }
    if bid.is_claimed {
        return Err(AuctionError::RefundAlreadyClaimed);
    }

    let amount = bid.amount;
    state.bid_mut(bid_id)?.is_claimed = true;
    state.debit_escrow(amount)?;

    Ok(Payout {
        to: recipient,
        amount,
    })
}

/// Handle ClaimRefunds.
///
/// All-or-nothing: every id passes the same checks as `ClaimRefund` before
/// any flag is set. A duplicate id within one call fails as an already
/// claimed refund.
pub fn handle_claim_refunds(
    state: &mut EngineState,
    ctx: &CallContext,
    bid_ids: &[BidId],
    recipient: Address,
) -> HandlerResult<Payout> {
    let mut total: Amount = 0;
    let mut seen = HashSet::new();
    for &bid_id in bid_ids {
        let bid = state.bid(bid_id)?;
        if bid.bidder != ctx.sender {
            return Err(AuctionError::NotBidder);
        }
        if bid.is_winner {
            return Err(AuctionError::WinnerCannotClaimRefund);
        }
        if bid.is_claimed || !seen.insert(bid_id) {
            return Err(AuctionError::RefundAlreadyClaimed);
        }
        total = total
            .checked_add(bid.amount)
            .ok_or(AuctionError::AmountOverflow)?;
    }

    for &bid_id in bid_ids {
        state.bid_mut(bid_id)?.is_claimed = true;
    }
    state.debit_escrow(total)?;

    Ok(Payout {
        to: recipient,
        amount: total,
    })
}

/// Handle WithdrawWinningFunds.
///
/// Scans up to `batch_size` bids past the withdrawal cursor; incomplete
/// batches at the end of the ledger are processed, not rejected. A zero batch
/// total rejects the whole call and commits nothing, so the cursor never
/// advances on failure and repeated exhausting calls terminate
/// deterministically.
pub fn handle_withdraw_winning_funds(
    state: &mut EngineState,
    ctx: &CallContext,
    batch_size: u64,
) -> HandlerResult<Payout> {
    ensure_owner(state, ctx)?;

    if state.auction.state != AuctionState::WinnersAnnounced {
        return Err(AuctionError::WinnersNotAnnounced);
    }

    let start = state.withdrawal_cursor as usize;
    let end = start
        .saturating_add(batch_size as usize)
        .min(state.bids.len());

    let mut total: Amount = 0;
    for bid in &state.bids[start..end] {
        if bid.is_winner && !bid.is_claimed {
            total = total
                .checked_add(bid.amount)
                .ok_or(AuctionError::AmountOverflow)?;
        }
    }
    if total == 0 {
        return Err(AuctionError::NoWinningFunds);
    }

    for bid in &mut state.bids[start..end] {
        if bid.is_winner && !bid.is_claimed {
            bid.is_claimed = true;
        }
    }
    state.withdrawal_cursor = end as BidId;
    state.debit_escrow(total)?;

    Ok(Payout {
        to: state.owner,
        amount: total,
    })
}

/// Handle WithdrawRemainingFunds.
///
/// Blunt fallback: once the grace period after auction end has elapsed, the
/// owner sweeps the engine's entire remaining balance, covering value never
/// claimed by bidders nor collected by the batched withdrawal.
pub fn handle_withdraw_remaining_funds(
    state: &mut EngineState,
    ctx: &CallContext,
) -> HandlerResult<Payout> {
    ensure_owner(state, ctx)?;

    let ended_at = state
        .ended_at
        .ok_or(AuctionError::TooEarlyForRemainingFunds)?;
    let unlock_at = ended_at.saturating_add(state.remaining_funds_delay);
    if ctx.timestamp < unlock_at {
        return Err(AuctionError::TooEarlyForRemainingFunds);
    }

    let amount = state.escrow;
    state.escrow = 0;

    Ok(Payout {
        to: state.owner,
        amount,
    })
}

/// Handle TransferOwnership.
pub fn handle_transfer_ownership(
    state: &mut EngineState,
    ctx: &CallContext,
    new_owner: Address,
) -> HandlerResult<Address> {
    ensure_owner(state, ctx)?;

    let previous_owner = state.owner;
    state.owner = new_owner;

    Ok(previous_owner)
}

/// Dispatch a call message to its handler and assemble the call outcome.
///
/// One notification event per successful mutating call; `StartAuction` and
/// `ResetAuction` are the two calls that emit nothing.
pub fn apply_call(
    state: &mut EngineState,
    ctx: &CallContext,
    call: &AuctionCall,
) -> HandlerResult<CallOutcome> {
    match call {
        AuctionCall::StartAuction {
            start_time,
            end_time,
            min_bid,
            bid_denomination,
        } => {
            handle_start_auction(state, ctx, *start_time, *end_time, *min_bid, *bid_denomination)?;
            Ok(CallOutcome::quiet())
        }

        AuctionCall::PlaceBid => {
            handle_place_bid(state, ctx)?;
            Ok(CallOutcome::event(AuctionEvent::BidPlaced {
                bidder: ctx.sender,
                amount: ctx.value,
            }))
        }

        AuctionCall::EndAuction => {
            handle_end_auction(state, ctx)?;
            Ok(CallOutcome::event(AuctionEvent::AuctionEnded))
        }

        AuctionCall::ResetAuction => {
            handle_reset_auction(state, ctx)?;
            Ok(CallOutcome::quiet())
        }

        AuctionCall::SetWinners { bid_ids } => {
            handle_set_winners(state, ctx, bid_ids)?;
            Ok(CallOutcome::event(AuctionEvent::WinnersAnnounced {
                winning_bids: bid_ids.clone(),
            }))
        }

        AuctionCall::ClaimRefund { bid_id, recipient } => {
            let payout = handle_claim_refund(state, ctx, *bid_id, *recipient)?;
            Ok(CallOutcome::paid(
                AuctionEvent::RefundClaimed {
                    bidder: payout.to,
                    amount: payout.amount,
                },
                payout,
            ))
        }

        AuctionCall::ClaimRefunds { bid_ids, recipient } => {
            let payout = handle_claim_refunds(state, ctx, bid_ids, *recipient)?;
            Ok(CallOutcome::paid(
                AuctionEvent::RefundClaimed {
                    bidder: payout.to,
                    amount: payout.amount,
                },
                payout,
            ))
        }

        AuctionCall::WithdrawWinningFunds { batch_size } => {
            let payout = handle_withdraw_winning_funds(state, ctx, *batch_size)?;
            Ok(CallOutcome::paid(
                AuctionEvent::FundsWithdrawn {
                    owner: payout.to,
                    amount: payout.amount,
                },
                payout,
            ))
        }

        AuctionCall::WithdrawRemainingFunds => {
            let payout = handle_withdraw_remaining_funds(state, ctx)?;
            Ok(CallOutcome::paid(
                AuctionEvent::FundsWithdrawn {
                    owner: payout.to,
                    amount: payout.amount,
                },
                payout,
            ))
        }

        AuctionCall::TransferOwnership { new_owner } => {
            let previous_owner = handle_transfer_ownership(state, ctx, *new_owner)?;
            Ok(CallOutcome::event(AuctionEvent::OwnershipTransferred {
                previous_owner,
                new_owner: *new_owner,
            }))
        }
    }
}
