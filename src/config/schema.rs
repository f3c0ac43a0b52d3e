//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the client.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Address of the deployed guestbook contract on Core testnet.
pub const DEFAULT_CONTRACT_ADDRESS: &str = "0xb48c3613F117a087c4f3786fB7f95F00fd12c706";

/// Core testnet chain ID.
pub const DEFAULT_CHAIN_ID: u64 = 1115;

/// Gas-limit ceiling supplied on every write-call.
pub const DEFAULT_GAS_LIMIT: u64 = 300_000;

/// Root configuration for the guestbook client.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GuestbookConfig {
    /// Network settings (RPC endpoints, required chain, gas, confirmations).
    pub chain: ChainConfig,

    /// Contract binding (address and interface schema).
    pub contract: ContractConfig,

    /// Wallet settings.
    pub wallet: WalletConfig,

    /// Form variant settings.
    pub form: FormConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Identity/auth provider wiring.
    pub auth: AuthConfig,
}

/// Blockchain network configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ChainConfig {
    /// JSON-RPC endpoint URL.
    pub rpc_url: String,

    /// Failover JSON-RPC endpoint URLs (read queries only).
    pub failover_urls: Vec<String>,

    /// Required chain ID. Connection refuses to proceed on any other network.
    pub chain_id: u64,

    /// RPC request timeout in seconds.
    pub rpc_timeout_secs: u64,

    /// Confirmations required, counting the inclusion block (1 = included).
    pub confirmation_blocks: u32,

    /// Upper bound on the confirmation wait, in seconds.
    pub confirmation_timeout_secs: u64,

    /// Receipt polling interval in milliseconds.
    pub confirmation_poll_ms: u64,

    /// Fixed gas limit for write-calls.
    pub gas_limit: u64,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            rpc_url: "https://rpc.test.btcs.network".to_string(),
            failover_urls: Vec::new(),
            chain_id: DEFAULT_CHAIN_ID,
            rpc_timeout_secs: 10,
            confirmation_blocks: 1,
            confirmation_timeout_secs: 120,
            confirmation_poll_ms: 2000,
            gas_limit: DEFAULT_GAS_LIMIT,
        }
    }
}

/// Contract binding configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ContractConfig {
    /// Deployed contract address.
    pub address: String,

    /// Optional path to a JSON ABI (bare array or artifact with an `abi` key).
    /// The built-in guestbook ABI is used when unset.
    pub abi_path: Option<String>,
}

impl Default for ContractConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_CONTRACT_ADDRESS.to_string(),
            abi_path: None,
        }
    }
}

/// Wallet configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WalletConfig {
    /// Environment variable holding the hex private key.
    /// The wallet is treated as absent when the variable is unset.
    pub private_key_env: String,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            private_key_env: "GUESTBOOK_PRIVATE_KEY".to_string(),
        }
    }
}

/// Form variant configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct FormConfig {
    /// Require the extended fields (email, country, signature) before submit.
    /// They are never sent on-chain.
    pub extended: bool,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

/// Identity/auth provider configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Enable the auth provider.
    pub enabled: bool,

    /// Client identifier issued by the auth provider.
    pub client_id: String,

    /// Domain the auth provider issues sessions for.
    pub domain: String,
}
