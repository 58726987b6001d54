//! Sealed-ledger auction settlement engine.
//!
//! This crate implements the settlement logic for a sealed auction:
//!
//! - Lifecycle state machine (`NotStarted → Ongoing → Ended → WinnersAnnounced`)
//!   with wall-clock gates on every operation
//! - Append-only bid ledger with a per-bidder reverse index
//! - Refund settlement with at-most-once payout per bid
//! - Batched, cursor-driven withdrawal of winning funds and a time-locked
//!   sweep of anything left unclaimed
//!
//! # Architecture
//!
//! - `call`: Message types for state-changing operations
//! - `handlers`: Business logic for processing calls
//! - `queries`: Read-only state access
//! - `state`: Engine state structures
//! - `genesis`: Initial configuration
//! - `error`: Error types
//!
//! # Example
//!
//! ```
//! use sealed_auction_engine::{handlers, AuctionGenesisConfig, CallContext};
//!
//! let mut state = AuctionGenesisConfig::new([9u8; 32]).build().unwrap();
//! let ctx = CallContext {
//!     sender: [9u8; 32],
//!     block_height: 1,
//!     timestamp: 0,
//!     value: 0,
//! };
//!
//! // Open the auction
//! handlers::handle_start_auction(&mut state, &ctx, 100, 200, 10, 1).unwrap();
//! ```

pub mod call;
pub mod error;
pub mod genesis;
pub mod handlers;
pub mod queries;
pub mod state;

pub use call::AuctionCall;
pub use error::AuctionError;
pub use genesis::{AuctionGenesisConfig, GenesisValidationError, DEFAULT_REMAINING_FUNDS_DELAY};
pub use handlers::{apply_call, CallContext, CallOutcome, HandlerResult};
pub use queries::{handle_query, AuctionQuery, AuctionQueryResponse};
pub use state::AuctionState;
