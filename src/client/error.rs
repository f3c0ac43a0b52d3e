//! User-facing error taxonomy of the chain client.

use thiserror::Error;

use crate::blockchain::{BlockchainError, ChainId};

/// Coarse classification of every failure the client can surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// No wallet available in this environment.
    EnvironmentMissing,
    /// The wallet holder declined account access.
    AccessDenied,
    /// Setup failed talking to the wallet or network (not a mismatch).
    ConnectionFailure,
    /// The wallet is on a different network than required.
    NetworkMismatch,
    /// A read-call failed or returned undecodable data.
    ReadFailure,
    /// Signing rejected, send rejected, reverted, or confirmation timed out.
    WriteFailure,
    /// Client-side input check failed; nothing was sent.
    ValidationFailure,
    /// An operation needing a bound contract ran before the client was ready.
    NotConnected,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::EnvironmentMissing => "environment_missing",
            ErrorKind::AccessDenied => "access_denied",
            ErrorKind::ConnectionFailure => "connection_failure",
            ErrorKind::NetworkMismatch => "network_mismatch",
            ErrorKind::ReadFailure => "read_failure",
            ErrorKind::WriteFailure => "write_failure",
            ErrorKind::ValidationFailure => "validation_failure",
            ErrorKind::NotConnected => "not_connected",
        }
    }
}

/// Required form fields that were left empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationFailure {
    pub missing: Vec<&'static str>,
}

impl std::fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Please enter: {}", self.missing.join(", "))
    }
}

/// Errors reported by chain client operations.
///
/// `Display` is the message shown to the user.
#[derive(Debug, Error)]
pub enum GuestbookError {
    #[error("No wallet found: {0}")]
    EnvironmentMissing(String),

    #[error("Account access denied: {0}")]
    AccessDenied(String),

    #[error("Could not connect: {0}")]
    Connection(#[source] BlockchainError),

    #[error("Please switch your wallet to chain {expected} (currently on chain {actual})")]
    NetworkMismatch { expected: ChainId, actual: ChainId },

    #[error("Could not load guestbook entries: {0}")]
    Read(#[source] BlockchainError),

    #[error("Could not sign the guestbook, please try again: {0}")]
    Write(#[source] BlockchainError),

    #[error("{0}")]
    Validation(ValidationFailure),

    #[error("The contract is not initialized yet, wait until it is ready")]
    NotConnected,
}

impl GuestbookError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GuestbookError::EnvironmentMissing(_) => ErrorKind::EnvironmentMissing,
            GuestbookError::AccessDenied(_) => ErrorKind::AccessDenied,
            GuestbookError::Connection(_) => ErrorKind::ConnectionFailure,
            GuestbookError::NetworkMismatch { .. } => ErrorKind::NetworkMismatch,
            GuestbookError::Read(_) => ErrorKind::ReadFailure,
            GuestbookError::Write(_) => ErrorKind::WriteFailure,
            GuestbookError::Validation(_) => ErrorKind::ValidationFailure,
            GuestbookError::NotConnected => ErrorKind::NotConnected,
        }
    }

    /// Cloneable rendition for state snapshots.
    pub fn reason(&self) -> FailureReason {
        FailureReason {
            kind: self.kind(),
            message: self.to_string(),
        }
    }
}

/// An error as stored in observable state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureReason {
    pub kind: ErrorKind,
    pub message: String,
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}
