//! Startup orchestration.
//!
//! # Responsibilities
//! - Load and validate configuration (file + CLI overrides)
//! - Start the session and optional metrics exporter
//! - Build the wallet bridge and the chain client
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - A missing private key is NOT a startup error; the client reports
//!   "no wallet" when it tries to connect

use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

use crate::blockchain::{BlockchainError, LocalWallet, RpcClient, WalletBridge};
use crate::client::{ChainClient, ChainClientSettings};
use crate::config::loader::{load_config, ConfigError};
use crate::config::validation::validate_config;
use crate::config::GuestbookConfig;
use crate::observability::metrics;
use crate::session::Session;

/// Errors that abort startup.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("blockchain setup error: {0}")]
    Blockchain(#[from] BlockchainError),
}

/// Command-line overrides applied on top of the config file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub rpc_url: Option<String>,
    pub chain_id: Option<u64>,
    pub contract: Option<String>,
}

/// Load configuration from `path` (defaults when `None`) and apply overrides.
pub fn resolve_config(
    path: Option<&Path>,
    overrides: &Overrides,
) -> Result<GuestbookConfig, ConfigError> {
    let mut config = match path {
        Some(path) => load_config(path)?,
        None => GuestbookConfig::default(),
    };
    if let Some(url) = &overrides.rpc_url {
        config.chain.rpc_url = url.clone();
    }
    if let Some(chain_id) = overrides.chain_id {
        config.chain.chain_id = chain_id;
    }
    if let Some(contract) = &overrides.contract {
        config.contract.address = contract.clone();
    }
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Everything a command needs to run.
#[derive(Debug)]
pub struct App {
    pub config: GuestbookConfig,
    pub session: Session,
    pub client: Arc<ChainClient>,
}

/// Initialize subsystems in dependency order. Logging must already be set up.
pub fn build(config: GuestbookConfig) -> Result<App, StartupError> {
    let session = Session::start(&config.auth);

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let rpc = RpcClient::new(&config.chain)?;
    let wallet = LocalWallet::from_env(&config.wallet.private_key_env, rpc)?
        .map(|w| Arc::new(w) as Arc<dyn WalletBridge>);
    let settings = ChainClientSettings::from_config(&config)?;

    tracing::info!(
        session_id = %session.id(),
        rpc_url = %config.chain.rpc_url,
        chain_id = config.chain.chain_id,
        contract = %settings.binding.address,
        wallet_present = wallet.is_some(),
        "Configuration loaded"
    );

    let client = Arc::new(ChainClient::new(wallet, settings));
    Ok(App {
        config,
        session,
        client,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_apply_and_validate() {
        let overrides = Overrides {
            rpc_url: Some("http://localhost:8545".to_string()),
            chain_id: Some(31337),
            contract: None,
        };
        let config = resolve_config(None, &overrides).unwrap();
        assert_eq!(config.chain.rpc_url, "http://localhost:8545");
        assert_eq!(config.chain.chain_id, 31337);
    }

    #[test]
    fn test_invalid_override_is_rejected() {
        let overrides = Overrides {
            contract: Some("not-an-address".to_string()),
            ..Overrides::default()
        };
        assert!(matches!(
            resolve_config(None, &overrides),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_build_without_key_has_no_wallet() {
        let mut config = GuestbookConfig::default();
        config.wallet.private_key_env = "GUESTBOOK_TEST_KEY_THAT_IS_NEVER_SET".to_string();
        let app = build(config).unwrap();
        assert!(app.client.snapshot().entries.is_empty());
        assert!(format!("{:?}", app.client).contains("wallet_present: false"));
    }
}
