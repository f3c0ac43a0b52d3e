//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, gas limit > 0)
//! - Check that URLs and the contract address parse
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GuestbookConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use alloy::primitives::Address;

use crate::config::schema::GuestbookConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a deserialized configuration.
pub fn validate_config(config: &GuestbookConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let chain = &config.chain;

    if let Err(e) = chain.rpc_url.parse::<url::Url>() {
        errors.push(ValidationError::new(
            "chain.rpc_url",
            format!("invalid URL '{}': {}", chain.rpc_url, e),
        ));
    }
    for (i, failover) in chain.failover_urls.iter().enumerate() {
        if let Err(e) = failover.parse::<url::Url>() {
            errors.push(ValidationError::new(
                &format!("chain.failover_urls[{}]", i),
                format!("invalid URL '{}': {}", failover, e),
            ));
        }
    }
    if chain.chain_id == 0 {
        errors.push(ValidationError::new("chain.chain_id", "must be non-zero"));
    }
    if chain.rpc_timeout_secs == 0 {
        errors.push(ValidationError::new("chain.rpc_timeout_secs", "must be > 0"));
    }
    if chain.confirmation_timeout_secs == 0 {
        errors.push(ValidationError::new(
            "chain.confirmation_timeout_secs",
            "must be > 0",
        ));
    }
    if chain.confirmation_poll_ms == 0 {
        errors.push(ValidationError::new("chain.confirmation_poll_ms", "must be > 0"));
    }
    if chain.gas_limit == 0 {
        errors.push(ValidationError::new("chain.gas_limit", "must be > 0"));
    }

    if let Err(e) = config.contract.address.parse::<Address>() {
        errors.push(ValidationError::new(
            "contract.address",
            format!("invalid address '{}': {}", config.contract.address, e),
        ));
    }

    if config.wallet.private_key_env.trim().is_empty() {
        errors.push(ValidationError::new("wallet.private_key_env", "must not be empty"));
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<std::net::SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("invalid socket address '{}'", config.observability.metrics_address),
        ));
    }

    if config.auth.enabled && config.auth.client_id.trim().is_empty() {
        errors.push(ValidationError::new(
            "auth.client_id",
            "required when auth is enabled",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
