//! Blockchain integration subsystem.
//!
//! # Data Flow
//! ```text
//! Environment Variable (private key) + ChainConfig (RPC URL)
//!     → wallet.rs (WalletBridge: accounts, network id, signing context)
//!     → client.rs (read-side RPC with timeouts and failover)
//!     → contract.rs (ContractProxy: call / send against a bound ABI)
//!     → transaction.rs (bounded confirmation wait)
//! ```
//!
//! # Security Constraints
//! - Private keys ONLY from environment variables
//! - Never log private keys or sensitive data
//! - All RPC calls have configurable timeouts

pub mod client;
pub mod contract;
pub mod transaction;
pub mod types;
pub mod wallet;

pub use client::RpcClient;
pub use contract::{ContractBinding, ContractProxy, InterfaceSchema, RpcContract};
pub use transaction::{wait_for_confirmation, ConfirmationPolicy};
pub use types::{
    BlockchainError, BlockchainResult, ChainConfig, ChainId, ConfirmationStatus, SendOptions,
    TxHandle, TxReceipt,
};
pub use wallet::{LocalWallet, SigningContext, WalletBridge};
