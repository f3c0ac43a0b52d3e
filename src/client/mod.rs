//! Chain client subsystem.
//!
//! # Data Flow
//! ```text
//! View action (connect / submit / refresh)
//!     → chain.rs (state machine, validation, error classification)
//!     → WalletBridge (accounts, network id, signing context)
//!     → ContractProxy (getEntries / signGuestbook)
//!     → state.rs snapshots published on a watch channel
//! ```
//!
//! # Design Decisions
//! - Single owner of ConnectionState / SubmissionState; observers get clones
//! - At most one submission in flight, enforced by an atomic slot claim
//! - No automatic retries; every retry is a user action

pub mod chain;
pub mod error;
pub mod state;

pub use chain::{validate_entry, ChainClient, ChainClientSettings};
pub use error::{ErrorKind, FailureReason, GuestbookError, ValidationFailure};
pub use state::{
    ClientEvent, ClientSnapshot, ConnectionState, ContractHandle, SubmissionState, SubmitOutcome,
};
