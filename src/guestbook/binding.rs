//! Guestbook contract binding: method names and the interface schema.

use alloy::primitives::Address;
use std::fs;

use crate::blockchain::{BlockchainError, BlockchainResult, ContractBinding, InterfaceSchema};
use crate::config::schema::{ContractConfig, DEFAULT_CONTRACT_ADDRESS};

/// Read-call returning every entry in insertion order.
pub const GET_ENTRIES: &str = "getEntries";

/// Write-call appending `(name, message)`.
pub const SIGN_GUESTBOOK: &str = "signGuestbook";

/// Published ABI of the deployed guestbook contract.
pub const GUESTBOOK_ABI: &str = include_str!("../../abi/Guestbook.json");

/// Binding for the deployed contract with the built-in ABI.
pub fn default_binding() -> BlockchainResult<ContractBinding> {
    let address: Address = DEFAULT_CONTRACT_ADDRESS
        .parse()
        .map_err(|e| BlockchainError::Abi(format!("Invalid contract address: {}", e)))?;
    Ok(ContractBinding::new(address, InterfaceSchema::from_json(GUESTBOOK_ABI)?))
}

/// Build the binding described by `[contract]`.
pub fn binding_from_config(config: &ContractConfig) -> BlockchainResult<ContractBinding> {
    let address: Address = config.address.parse().map_err(|e| {
        BlockchainError::Abi(format!("Invalid contract address '{}': {}", config.address, e))
    })?;

    let schema = match &config.abi_path {
        Some(path) => {
            let json = fs::read_to_string(path).map_err(|e| {
                BlockchainError::Abi(format!("Cannot read interface schema {}: {}", path, e))
            })?;
            InterfaceSchema::from_json(&json)?
        }
        None => InterfaceSchema::from_json(GUESTBOOK_ABI)?,
    };

    for method in [GET_ENTRIES, SIGN_GUESTBOOK] {
        if !schema.has_function(method) {
            // Not fatal here: the call itself reports the mismatch.
            tracing::warn!(method, "Interface schema does not declare guestbook method");
        }
    }

    Ok(ContractBinding::new(address, schema))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_binding() {
        let binding = default_binding().unwrap();
        assert_eq!(
            binding.address.to_string().to_lowercase(),
            DEFAULT_CONTRACT_ADDRESS.to_lowercase()
        );
        assert!(binding.schema.has_function(GET_ENTRIES));
        assert!(binding.schema.has_function(SIGN_GUESTBOOK));
    }

    #[test]
    fn test_config_without_abi_path_uses_builtin() {
        let binding = binding_from_config(&ContractConfig::default()).unwrap();
        assert_eq!(binding, default_binding().unwrap());
    }

    #[test]
    fn test_schema_mismatch_does_not_fail_construction() {
        let path = std::env::temp_dir().join(format!("guestbook-abi-{}.json", std::process::id()));
        fs::write(&path, "[]").unwrap();
        let config = ContractConfig {
            abi_path: Some(path.to_string_lossy().into_owned()),
            ..ContractConfig::default()
        };
        let binding = binding_from_config(&config).unwrap();
        assert!(!binding.schema.has_function(GET_ENTRIES));
        fs::remove_file(path).ok();
    }

    #[test]
    fn test_bad_address() {
        let config = ContractConfig {
            address: "0xnope".to_string(),
            abi_path: None,
        };
        assert!(binding_from_config(&config).is_err());
    }
}
