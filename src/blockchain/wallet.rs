//! Wallet bridge and local private-key wallet.
//!
//! # Security
//! - Private keys are loaded ONLY from environment variables
//! - Keys are never logged or serialized

use alloy::primitives::Address;
use alloy::providers::{Provider, ProviderBuilder};
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::Signer;
use async_trait::async_trait;
use std::sync::Arc;

use crate::blockchain::client::RpcClient;
use crate::blockchain::contract::{ContractBinding, ContractProxy, RpcContract};
use crate::blockchain::types::{BlockchainError, BlockchainResult, ChainId};

/// The (account, network) pair used to authorize write-calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SigningContext {
    pub account: Address,
    pub chain_id: ChainId,
}

/// Capability the chain client uses to reach a wallet.
///
/// `request_accounts` may suspend for user approval. Implementations return
/// [`BlockchainError::Rejected`] when the holder declines.
#[async_trait]
pub trait WalletBridge: Send + Sync {
    /// Ask for account access.
    async fn request_accounts(&self) -> BlockchainResult<Vec<Address>>;

    /// Identifier of the network the wallet is currently on.
    async fn network_id(&self) -> BlockchainResult<ChainId>;

    /// Signing context bound to the current account and network.
    async fn signing_context(&self) -> BlockchainResult<SigningContext>;

    /// Bind a contract to the given signing context.
    fn bind_contract(
        &self,
        context: &SigningContext,
        binding: &ContractBinding,
    ) -> BlockchainResult<Arc<dyn ContractProxy>>;
}

/// Wallet backed by a local private key and a JSON-RPC endpoint.
///
/// Account access is implicit: holding the key is the approval.
#[derive(Debug, Clone)]
pub struct LocalWallet {
    /// The underlying signer (private key).
    signer: PrivateKeySigner,
    /// Read-side RPC client (chain id, receipts).
    rpc: RpcClient,
}

impl LocalWallet {
    /// Create a wallet from a hex-encoded private key string.
    ///
    /// # Arguments
    /// * `private_key_hex` - Hex string (with or without 0x prefix)
    /// * `rpc` - RPC client for the target network
    pub fn from_private_key(private_key_hex: &str, rpc: RpcClient) -> BlockchainResult<Self> {
        let key_hex = private_key_hex.trim();
        let key_hex = key_hex.strip_prefix("0x").unwrap_or(key_hex);

        let signer: PrivateKeySigner = key_hex
            .parse()
            .map_err(|e| BlockchainError::Wallet(format!("Invalid private key format: {}", e)))?;

        tracing::info!(address = %signer.address(), "Wallet loaded");

        Ok(Self { signer, rpc })
    }

    /// Load the wallet from environment variable `var`.
    ///
    /// Returns `Ok(None)` when the variable is unset, which the chain client
    /// treats as "no wallet installed".
    pub fn from_env(var: &str, rpc: RpcClient) -> BlockchainResult<Option<Self>> {
        match std::env::var(var) {
            Ok(key) => Self::from_private_key(&key, rpc).map(Some),
            Err(_) => {
                tracing::debug!(env_var = var, "No private key in environment");
                Ok(None)
            }
        }
    }

    /// Get the wallet's address.
    pub fn address(&self) -> Address {
        self.signer.address()
    }
}

#[async_trait]
impl WalletBridge for LocalWallet {
    async fn request_accounts(&self) -> BlockchainResult<Vec<Address>> {
        Ok(vec![self.signer.address()])
    }

    async fn network_id(&self) -> BlockchainResult<ChainId> {
        self.rpc.get_chain_id().await
    }

    async fn signing_context(&self) -> BlockchainResult<SigningContext> {
        let chain_id = self.network_id().await?;
        Ok(SigningContext {
            account: self.signer.address(),
            chain_id,
        })
    }

    fn bind_contract(
        &self,
        context: &SigningContext,
        binding: &ContractBinding,
    ) -> BlockchainResult<Arc<dyn ContractProxy>> {
        if context.account != self.signer.address() {
            return Err(BlockchainError::Wallet(format!(
                "Signing context account {} does not belong to this wallet",
                context.account
            )));
        }

        let signer = self.signer.clone().with_chain_id(Some(context.chain_id.0));
        let provider = ProviderBuilder::new()
            .wallet(signer)
            .connect_http(self.rpc.primary_url().clone())
            .erased();

        tracing::debug!(
            contract = %binding.address,
            account = %context.account,
            chain_id = %context.chain_id,
            "Contract bound to signing context"
        );

        let proxy: Arc<dyn ContractProxy> =
            Arc::new(RpcContract::new(binding.clone(), provider, self.rpc.clone()));
        Ok(proxy)
    }
}
