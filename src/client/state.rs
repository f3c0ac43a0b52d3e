//! Observable client state.
//!
//! # States
//! ```text
//! Connection:  Disconnected → Connecting → Ready
//!                   │              ├────→ WrongNetwork
//!                   └──────────────┴────→ Failed
//! Submission:  Idle → Pending → Confirming → Succeeded → Idle
//!                        └──────────┴────→ Failed → Idle
//! ```
//!
//! Snapshots are cloned out of the client; nothing here can mutate it.

use alloy::primitives::Address;
use std::sync::Arc;

use crate::blockchain::{ChainId, ContractProxy, TxHandle};
use crate::client::error::FailureReason;
use crate::guestbook::Entry;

/// A contract bound to a signing context.
#[derive(Clone)]
pub struct ContractHandle {
    pub account: Address,
    pub chain_id: ChainId,
    pub contract: Address,
    pub(crate) proxy: Arc<dyn ContractProxy>,
}

impl PartialEq for ContractHandle {
    fn eq(&self, other: &Self) -> bool {
        self.account == other.account
            && self.chain_id == other.chain_id
            && self.contract == other.contract
            && Arc::ptr_eq(&self.proxy, &other.proxy)
    }
}

impl std::fmt::Debug for ContractHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContractHandle")
            .field("account", &self.account)
            .field("chain_id", &self.chain_id)
            .field("contract", &self.contract)
            .finish()
    }
}

/// Wallet/network connection state.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Ready(ContractHandle),
    WrongNetwork { expected: ChainId, actual: ChainId },
    Failed(FailureReason),
}

impl ConnectionState {
    pub fn is_ready(&self) -> bool {
        matches!(self, ConnectionState::Ready(_))
    }

    pub fn name(&self) -> &'static str {
        match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Ready(_) => "ready",
            ConnectionState::WrongNetwork { .. } => "wrong_network",
            ConnectionState::Failed(_) => "failed",
        }
    }
}

/// State of the (single) in-flight signing attempt.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SubmissionState {
    #[default]
    Idle,
    /// Write-call issued, waiting for the wallet/network to accept it.
    Pending(Entry),
    /// Accepted; waiting for the transaction to be mined.
    Confirming(TxHandle),
    Succeeded(TxHandle),
    Failed(FailureReason),
}

impl SubmissionState {
    pub fn is_idle(&self) -> bool {
        matches!(self, SubmissionState::Idle)
    }

    /// Pending or confirming: inputs stay locked.
    pub fn is_in_flight(&self) -> bool {
        matches!(
            self,
            SubmissionState::Pending(_) | SubmissionState::Confirming(_)
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            SubmissionState::Idle => "idle",
            SubmissionState::Pending(_) => "pending",
            SubmissionState::Confirming(_) => "confirming",
            SubmissionState::Succeeded(_) => "succeeded",
            SubmissionState::Failed(_) => "failed",
        }
    }
}

/// Everything the view needs to render.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ClientSnapshot {
    pub connection: ConnectionState,
    pub submission: SubmissionState,
    /// Entries in contract order.
    pub entries: Vec<Entry>,
    /// Whether at least one read-call has succeeded since connecting.
    pub entries_loaded: bool,
    /// Error banner: the latest surfaced failure, cleared on success.
    pub error: Option<FailureReason>,
}

/// A single state transition, as broadcast to subscribers.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    Connection(ConnectionState),
    Submission(SubmissionState),
    EntriesLoaded(usize),
    Error(FailureReason),
}

/// Result of a submit request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Transaction mined and entries refreshed.
    Confirmed { tx: TxHandle, block_number: u64 },
    /// Another submission was in flight; nothing was sent.
    Ignored,
}
