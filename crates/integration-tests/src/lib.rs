//! End-to-end integration tests for the sealed auction settlement engine.
//!
//! These tests exercise the full settlement lifecycle on the mock chain:
//! 1. Auction start with timing and price parameters
//! 2. Deposit-carrying bids inside the time window
//! 3. Winner designation by the curator
//! 4. Refund claims, batched winning-funds withdrawal and the time-locked
//!    remaining-funds sweep
//!
//! The recurring assertion is exact conservation: escrowed value plus all
//! account balances never changes, whatever partition into winners and
//! losers and whatever batch-size schedule is used.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use sealed_auction_engine::{AuctionCall, AuctionError, AuctionGenesisConfig};
use sealed_auction_mock_chain::{ChainError, ChainState};
use sealed_auction_types::{Address, Amount, AuctionEvent, AuctionState};

const OWNER: Address = [9u8; 32];
const BIDDER_A: Address = [1u8; 32];
const BIDDER_B: Address = [2u8; 32];

const DAY: u64 = 24 * 60 * 60;
const START: u64 = 1_000;
const END: u64 = START + 3_600;
const MIN_BID: Amount = 100;
const DENOMINATION: Amount = 10;

fn start_call() -> AuctionCall {
    AuctionCall::StartAuction {
        start_time: START,
        end_time: END,
        min_bid: MIN_BID,
        bid_denomination: DENOMINATION,
    }
}

fn funded_chain(accounts: &[(Address, Amount)]) -> ChainState {
    let mut chain = ChainState::new(&AuctionGenesisConfig::new(OWNER)).unwrap();
    for (account, amount) in accounts {
        chain.fund(*account, *amount);
    }
    chain
}

#[test]
fn test_full_settlement_lifecycle() {
    let mut chain = funded_chain(&[(BIDDER_A, 1_000), (BIDDER_B, 1_000)]);
    let total = chain.total_value();

    chain.execute(OWNER, 0, start_call()).unwrap();

    // Bidder A deposits 200, bidder B deposits 300
    chain.set_timestamp(START);
    chain.execute(BIDDER_A, 200, AuctionCall::PlaceBid).unwrap();
    chain.execute(BIDDER_B, 300, AuctionCall::PlaceBid).unwrap();
    assert_eq!(chain.engine().escrow, 500);
    assert_eq!(chain.total_value(), total);

    chain.set_timestamp(END + 1);
    chain.execute(BIDDER_A, 0, AuctionCall::EndAuction).unwrap();

    chain
        .execute(OWNER, 0, AuctionCall::SetWinners { bid_ids: vec![1] })
        .unwrap();
    assert_eq!(
        chain.engine().auction.state,
        AuctionState::WinnersAnnounced
    );

    // The loser reclaims its deposit
    chain
        .execute(
            BIDDER_A,
            0,
            AuctionCall::ClaimRefund {
                bid_id: 0,
                recipient: BIDDER_A,
            },
        )
        .unwrap();
    assert_eq!(chain.balance_of(&BIDDER_A), 1_000);
    assert!(chain.engine().bid(0).unwrap().is_claimed);

    // The winner cannot
    let result = chain.execute(
        BIDDER_B,
        0,
        AuctionCall::ClaimRefund {
            bid_id: 1,
            recipient: BIDDER_B,
        },
    );
    assert_eq!(
        result,
        Err(ChainError::Call(AuctionError::WinnerCannotClaimRefund))
    );

    // The curator collects the winning deposit
    chain
        .execute(OWNER, 0, AuctionCall::WithdrawWinningFunds { batch_size: 2 })
        .unwrap();
    assert_eq!(chain.balance_of(&OWNER), 300);
    assert_eq!(chain.engine().escrow, 0);
    assert_eq!(chain.total_value(), total);

    assert_eq!(
        chain.events(),
        &[
            AuctionEvent::BidPlaced {
                bidder: BIDDER_A,
                amount: 200
            },
            AuctionEvent::BidPlaced {
                bidder: BIDDER_B,
                amount: 300
            },
            AuctionEvent::AuctionEnded,
            AuctionEvent::WinnersAnnounced {
                winning_bids: vec![1]
            },
            AuctionEvent::RefundClaimed {
                bidder: BIDDER_A,
                amount: 200
            },
            AuctionEvent::FundsWithdrawn {
                owner: OWNER,
                amount: 300
            },
        ]
    );
}

#[test]
fn test_batched_withdrawal_schedule() {
    let mut chain = funded_chain(&[(BIDDER_A, 1_000), (BIDDER_B, 1_000)]);

    chain.execute(OWNER, 0, start_call()).unwrap();
    chain.set_timestamp(START);
    chain.execute(BIDDER_A, 200, AuctionCall::PlaceBid).unwrap();
    chain.execute(BIDDER_B, 300, AuctionCall::PlaceBid).unwrap();
    chain.execute(BIDDER_A, 400, AuctionCall::PlaceBid).unwrap();
    chain.execute(BIDDER_B, 500, AuctionCall::PlaceBid).unwrap();

    chain.set_timestamp(END + 1);
    chain.execute(OWNER, 0, AuctionCall::EndAuction).unwrap();
    chain
        .execute(
            OWNER,
            0,
            AuctionCall::SetWinners {
                bid_ids: vec![0, 1, 2, 3],
            },
        )
        .unwrap();

    let first = chain
        .execute(OWNER, 0, AuctionCall::WithdrawWinningFunds { batch_size: 2 })
        .unwrap();
    assert_eq!(first.payout.unwrap().amount, 500); // 200 + 300

    let second = chain
        .execute(OWNER, 0, AuctionCall::WithdrawWinningFunds { batch_size: 2 })
        .unwrap();
    assert_eq!(second.payout.unwrap().amount, 900); // 400 + 500

    assert_eq!(chain.balance_of(&OWNER), 1_400);

    let result = chain.execute(OWNER, 0, AuctionCall::WithdrawWinningFunds { batch_size: 1 });
    assert_eq!(result, Err(ChainError::Call(AuctionError::NoWinningFunds)));
}

#[test]
fn test_remaining_funds_sweep() {
    let mut chain = funded_chain(&[(BIDDER_A, 1_000), (BIDDER_B, 1_000)]);
    let total = chain.total_value();

    chain.execute(OWNER, 0, start_call()).unwrap();
    chain.set_timestamp(START);
    chain.execute(BIDDER_A, 200, AuctionCall::PlaceBid).unwrap();
    chain.execute(BIDDER_B, 300, AuctionCall::PlaceBid).unwrap();

    chain.set_timestamp(END + 1);
    chain.execute(OWNER, 0, AuctionCall::EndAuction).unwrap();
    chain
        .execute(OWNER, 0, AuctionCall::SetWinners { bid_ids: vec![1] })
        .unwrap();
    chain
        .execute(OWNER, 0, AuctionCall::WithdrawWinningFunds { batch_size: 2 })
        .unwrap();

    // Bidder A never claims; the residue stays locked for 30 days
    chain.set_timestamp(END + 1 + 29 * DAY);
    let result = chain.execute(OWNER, 0, AuctionCall::WithdrawRemainingFunds);
    assert_eq!(
        result,
        Err(ChainError::Call(AuctionError::TooEarlyForRemainingFunds))
    );

    chain.set_timestamp(END + 1 + 30 * DAY);
    let sweep = chain
        .execute(OWNER, 0, AuctionCall::WithdrawRemainingFunds)
        .unwrap();
    assert_eq!(sweep.payout.unwrap().amount, 200);

    assert_eq!(chain.engine().escrow, 0);
    assert_eq!(chain.balance_of(&OWNER), 500);
    assert_eq!(chain.total_value(), total);
}

#[test]
fn test_bid_timing_edges() {
    let mut chain = funded_chain(&[(BIDDER_A, 1_000)]);
    chain.execute(OWNER, 0, start_call()).unwrap();

    chain.set_timestamp(START - 1);
    let result = chain.execute(BIDDER_A, 200, AuctionCall::PlaceBid);
    assert_eq!(result, Err(ChainError::Call(AuctionError::AuctionNotStarted)));

    chain.set_timestamp(START);
    chain.execute(BIDDER_A, 200, AuctionCall::PlaceBid).unwrap();

    chain.set_timestamp(END);
    let result = chain.execute(BIDDER_A, 200, AuctionCall::PlaceBid);
    assert_eq!(
        result,
        Err(ChainError::Call(AuctionError::AuctionAlreadyEnded))
    );
}

/// Conservation under randomized bid sets, winner partitions and batch-size
/// schedules: refunds + winning withdrawals + final sweep always add up to
/// exactly the deposited total.
#[test]
fn test_conservation_randomized() {
    let mut rng = StdRng::seed_from_u64(7);

    for round in 0..20 {
        let bidders: [Address; 4] = [[1u8; 32], [2u8; 32], [3u8; 32], [4u8; 32]];
        let mut chain = funded_chain(&[
            (bidders[0], 1_000_000),
            (bidders[1], 1_000_000),
            (bidders[2], 1_000_000),
            (bidders[3], 1_000_000),
        ]);
        let total = chain.total_value();

        chain.execute(OWNER, 0, start_call()).unwrap();
        chain.set_timestamp(START);

        let num_bids = rng.gen_range(1..=20);
        let mut deposits: Vec<(Address, Amount)> = Vec::new();
        for _ in 0..num_bids {
            let bidder = bidders[rng.gen_range(0..bidders.len())];
            let amount = DENOMINATION * rng.gen_range(10..=100);
            chain.execute(bidder, amount, AuctionCall::PlaceBid).unwrap();
            deposits.push((bidder, amount));
        }
        let deposited: Amount = deposits.iter().map(|(_, amount)| amount).sum();

        chain.set_timestamp(END + 1);
        chain.execute(OWNER, 0, AuctionCall::EndAuction).unwrap();

        // Random winner partition (possibly empty)
        let winners: Vec<u64> = (0..num_bids as u64)
            .filter(|_| rng.gen_bool(0.5))
            .collect();
        let winning_total: Amount = winners
            .iter()
            .map(|id| deposits[*id as usize].1)
            .sum();
        chain
            .execute(
                OWNER,
                0,
                AuctionCall::SetWinners {
                    bid_ids: winners.clone(),
                },
            )
            .unwrap();

        // Some losers claim their refunds, one by one or batched per bidder
        let mut refunded: Amount = 0;
        for bidder in &bidders {
            let ids = sealed_auction_engine::queries::refundable_bids(chain.engine(), bidder);
            if ids.is_empty() || rng.gen_bool(0.25) {
                continue; // this bidder forgets to claim
            }
            let claimed: Amount = ids.iter().map(|id| deposits[*id as usize].1).sum();
            if rng.gen_bool(0.5) {
                chain
                    .execute(
                        *bidder,
                        0,
                        AuctionCall::ClaimRefunds {
                            bid_ids: ids,
                            recipient: *bidder,
                        },
                    )
                    .unwrap();
            } else {
                for id in ids {
                    chain
                        .execute(
                            *bidder,
                            0,
                            AuctionCall::ClaimRefund {
                                bid_id: id,
                                recipient: *bidder,
                            },
                        )
                        .unwrap();
                }
            }
            refunded += claimed;
            assert_eq!(chain.total_value(), total);
        }

        // Withdraw with a random batch-size schedule until exhaustion
        let mut withdrawn: Amount = 0;
        while sealed_auction_engine::queries::unclaimed_winning_total(chain.engine()) > 0 {
            let batch_size = rng.gen_range(1..=8);
            match chain.execute(OWNER, 0, AuctionCall::WithdrawWinningFunds { batch_size }) {
                Ok(outcome) => withdrawn += outcome.payout.unwrap().amount,
                Err(ChainError::Call(AuctionError::NoWinningFunds)) => {
                    // A batch of losers pays nothing and leaves the cursor
                    // put; a full-ledger batch is guaranteed to make progress.
                    let outcome = chain
                        .execute(
                            OWNER,
                            0,
                            AuctionCall::WithdrawWinningFunds {
                                batch_size: num_bids as u64,
                            },
                        )
                        .unwrap();
                    withdrawn += outcome.payout.unwrap().amount;
                }
                Err(err) => panic!("round {round}: unexpected error {err}"),
            }
            assert_eq!(chain.total_value(), total);
        }
        assert_eq!(withdrawn, winning_total, "round {round}");

        // Sweep whatever the forgetful losers left behind
        chain.set_timestamp(END + 1 + 30 * DAY);
        let sweep = chain
            .execute(OWNER, 0, AuctionCall::WithdrawRemainingFunds)
            .unwrap();
        let swept = sweep.payout.unwrap().amount;

        assert_eq!(
            refunded + withdrawn + swept,
            deposited,
            "round {round}: deposits must partition exactly"
        );
        assert_eq!(chain.engine().escrow, 0);
        assert_eq!(chain.total_value(), total);
        assert_eq!(chain.balance_of(&OWNER), withdrawn + swept);
    }
}

#[test]
fn test_ownership_transfer_moves_curator_rights() {
    let new_owner: Address = [8u8; 32];
    let mut chain = funded_chain(&[(BIDDER_A, 1_000)]);

    chain
        .execute(OWNER, 0, AuctionCall::TransferOwnership { new_owner })
        .unwrap();
    assert_eq!(
        chain.events().last(),
        Some(&AuctionEvent::OwnershipTransferred {
            previous_owner: OWNER,
            new_owner,
        })
    );

    // Only the new owner may start the auction now
    let result = chain.execute(OWNER, 0, start_call());
    assert_eq!(
        result,
        Err(ChainError::Call(AuctionError::UnauthorizedAccount(OWNER)))
    );
    chain.execute(new_owner, 0, start_call()).unwrap();
}
