//! Contract proxy: an (address, interface schema) pair with generic call primitives.
//!
//! The proxy holds no policy. Timeouts on individual RPC requests are
//! enforced here; everything else (validation, confirmation wait, error
//! classification) belongs to the chain client.

use alloy::contract::{ContractInstance, Interface};
use alloy::dyn_abi::DynSolValue;
use alloy::json_abi::JsonAbi;
use alloy::primitives::Address;
use alloy::providers::DynProvider;
use async_trait::async_trait;
use tokio::time::timeout;

use crate::blockchain::client::RpcClient;
use crate::blockchain::types::{
    BlockchainError, BlockchainResult, SendOptions, TxHandle, TxReceipt,
};

/// Parsed JSON interface schema (ABI) of a deployed contract.
///
/// Construction only checks that the document is a well-formed ABI. Whether
/// a method exists is checked when the method is called.
#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceSchema {
    abi: JsonAbi,
}

impl InterfaceSchema {
    /// Parse a schema from either a bare ABI array or a compiler artifact
    /// carrying an `abi` key.
    pub fn from_json(json: &str) -> BlockchainResult<Self> {
        let value: serde_json::Value = serde_json::from_str(json)
            .map_err(|e| BlockchainError::Abi(format!("Invalid interface schema JSON: {}", e)))?;
        let abi_value = match value {
            serde_json::Value::Object(mut artifact) => artifact
                .remove("abi")
                .ok_or_else(|| BlockchainError::Abi("Artifact has no `abi` key".to_string()))?,
            other => other,
        };
        let abi: JsonAbi = serde_json::from_value(abi_value)
            .map_err(|e| BlockchainError::Abi(format!("Malformed ABI: {}", e)))?;
        Ok(Self { abi })
    }

    /// Whether the schema declares a function with this name.
    pub fn has_function(&self, name: &str) -> bool {
        self.abi.function(name).is_some()
    }

    pub fn abi(&self) -> &JsonAbi {
        &self.abi
    }
}

/// Immutable binding of a contract address to its interface schema.
#[derive(Debug, Clone, PartialEq)]
pub struct ContractBinding {
    pub address: Address,
    pub schema: InterfaceSchema,
}

impl ContractBinding {
    pub fn new(address: Address, schema: InterfaceSchema) -> Self {
        Self { address, schema }
    }
}

/// Generic contract-call primitives bound to one contract and signing context.
#[async_trait]
pub trait ContractProxy: Send + Sync {
    /// The binding this proxy was constructed with.
    fn binding(&self) -> &ContractBinding;

    /// Read-call: no signature, no gas.
    async fn call(&self, method: &str, args: &[DynSolValue]) -> BlockchainResult<Vec<DynSolValue>>;

    /// Write-call: signed with the bound signing context.
    async fn send(
        &self,
        method: &str,
        args: &[DynSolValue],
        options: SendOptions,
    ) -> BlockchainResult<TxHandle>;

    /// Receipt for a broadcast transaction, `None` while it is unmined.
    async fn receipt(&self, tx: &TxHandle) -> BlockchainResult<Option<TxReceipt>>;

    /// Latest block number.
    async fn block_number(&self) -> BlockchainResult<u64>;
}

/// Contract proxy over JSON-RPC.
pub struct RpcContract {
    binding: ContractBinding,
    instance: ContractInstance<DynProvider>,
    rpc: RpcClient,
}

impl RpcContract {
    /// Bind `binding` to a signing provider. Receipts and block numbers are
    /// read through `rpc` so they benefit from failover.
    pub fn new(binding: ContractBinding, signing_provider: DynProvider, rpc: RpcClient) -> Self {
        let interface = Interface::new(binding.schema.abi().clone());
        let instance = ContractInstance::new(binding.address, signing_provider, interface);
        Self {
            binding,
            instance,
            rpc,
        }
    }
}

#[async_trait]
impl ContractProxy for RpcContract {
    fn binding(&self) -> &ContractBinding {
        &self.binding
    }

    async fn call(&self, method: &str, args: &[DynSolValue]) -> BlockchainResult<Vec<DynSolValue>> {
        let builder = self
            .instance
            .function(method, args)
            .map_err(|e| BlockchainError::Abi(format!("{}: {}", method, e)))?;
        let limit = self.rpc.timeout_duration();
        match timeout(limit, builder.call()).await {
            Ok(Ok(values)) => Ok(values),
            Ok(Err(e)) => Err(BlockchainError::Rpc(format!("{} call failed: {}", method, e))),
            Err(_) => Err(BlockchainError::Timeout(limit.as_secs())),
        }
    }

    async fn send(
        &self,
        method: &str,
        args: &[DynSolValue],
        options: SendOptions,
    ) -> BlockchainResult<TxHandle> {
        let builder = self
            .instance
            .function(method, args)
            .map_err(|e| BlockchainError::Abi(format!("{}: {}", method, e)))?
            .gas(options.gas_limit);
        let limit = self.rpc.timeout_duration();
        match timeout(limit, builder.send()).await {
            Ok(Ok(pending)) => Ok(TxHandle::from(*pending.tx_hash())),
            Ok(Err(e)) => Err(BlockchainError::Rpc(format!("{} send failed: {}", method, e))),
            Err(_) => Err(BlockchainError::Timeout(limit.as_secs())),
        }
    }

    async fn receipt(&self, tx: &TxHandle) -> BlockchainResult<Option<TxReceipt>> {
        self.rpc.get_transaction_receipt(tx.hash).await
    }

    async fn block_number(&self) -> BlockchainResult<u64> {
        self.rpc.get_block_number().await
    }
}

impl std::fmt::Debug for RpcContract {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcContract")
            .field("address", &self.binding.address)
            .field("rpc", &self.rpc)
            .finish()
    }
}
