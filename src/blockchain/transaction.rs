//! Transaction confirmation monitoring.
//!
//! # Responsibilities
//! - Poll for the receipt of a broadcast transaction
//! - Count confirmations against the required depth
//! - Bound the total wait (a network that never confirms is a failure)

use std::time::Duration;
use tokio::time::{interval, timeout, MissedTickBehavior};

use crate::blockchain::contract::ContractProxy;
use crate::blockchain::types::{
    BlockchainError, BlockchainResult, ChainConfig, ConfirmationStatus, TxHandle,
};

/// Bounded wait policy for transaction confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmationPolicy {
    /// Confirmations required; the inclusion block is the first, so 0 and 1
    /// both mean "included".
    pub required_blocks: u32,
    /// Delay between receipt polls.
    pub poll_interval: Duration,
    /// Maximum total wait.
    pub timeout: Duration,
}

impl ConfirmationPolicy {
    pub fn from_config(config: &ChainConfig) -> Self {
        Self {
            required_blocks: config.confirmation_blocks,
            poll_interval: Duration::from_millis(config.confirmation_poll_ms),
            timeout: Duration::from_secs(config.confirmation_timeout_secs),
        }
    }
}

impl Default for ConfirmationPolicy {
    fn default() -> Self {
        Self::from_config(&ChainConfig::default())
    }
}

/// Wait for a transaction to be confirmed.
///
/// Returns `Confirmed` or `Failed` (reverted). RPC errors while polling are
/// logged and polling continues; only running past `policy.timeout` yields
/// `ConfirmationTimeout`.
pub async fn wait_for_confirmation(
    proxy: &dyn ContractProxy,
    tx: &TxHandle,
    policy: &ConfirmationPolicy,
) -> BlockchainResult<ConfirmationStatus> {
    let required = policy.required_blocks;

    let result = timeout(policy.timeout, async {
        let mut ticker = interval(policy.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            // Poll errors are transient: the transaction may already be mined.
            let receipt = match proxy.receipt(tx).await {
                Ok(Some(r)) => r,
                Ok(None) => {
                    tracing::debug!(tx_hash = %tx, "Transaction pending");
                    continue;
                }
                Err(e) => {
                    tracing::warn!(tx_hash = %tx, error = %e, "Receipt poll failed, retrying");
                    continue;
                }
            };

            if !receipt.success {
                return Ok(ConfirmationStatus::Failed(
                    "Transaction reverted".to_string(),
                ));
            }

            let current_block = match proxy.block_number().await {
                Ok(n) => n,
                Err(e) => {
                    tracing::warn!(tx_hash = %tx, error = %e, "Block number poll failed, retrying");
                    continue;
                }
            };
            let tx_block = receipt.block_number.unwrap_or(current_block);
            // The inclusion block counts as the first confirmation.
            let confirmations = (current_block.saturating_sub(tx_block) + 1) as u32;

            if confirmations >= required {
                return Ok(ConfirmationStatus::Confirmed {
                    block_number: tx_block,
                });
            }

            tracing::debug!(
                tx_hash = %tx,
                confirmations = confirmations,
                required = required,
                "Waiting for confirmations"
            );
        }
    })
    .await;

    match result {
        Ok(status) => status,
        Err(_) => Err(BlockchainError::ConfirmationTimeout(policy.timeout.as_secs())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::contract::{ContractBinding, InterfaceSchema};
    use crate::blockchain::types::{SendOptions, TxReceipt};
    use alloy::dyn_abi::DynSolValue;
    use alloy::primitives::{Address, TxHash};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

    /// Mined at block 10. The head optionally advances one block per query
    /// and the first `failing_polls` receipt polls return an RPC error.
    struct Chain {
        binding: ContractBinding,
        head: AtomicU64,
        advance: bool,
        failing_polls: AtomicUsize,
    }

    impl Chain {
        fn new(advance: bool, failing_polls: usize) -> Self {
            Self {
                binding: ContractBinding::new(
                    Address::ZERO,
                    InterfaceSchema::from_json("[]").unwrap(),
                ),
                head: AtomicU64::new(10),
                advance,
                failing_polls: AtomicUsize::new(failing_polls),
            }
        }
    }

    #[async_trait]
    impl ContractProxy for Chain {
        fn binding(&self) -> &ContractBinding {
            &self.binding
        }

        async fn call(&self, _: &str, _: &[DynSolValue]) -> BlockchainResult<Vec<DynSolValue>> {
            Ok(Vec::new())
        }

        async fn send(&self, _: &str, _: &[DynSolValue], _: SendOptions) -> BlockchainResult<TxHandle> {
            Ok(TxHandle::from(TxHash::ZERO))
        }

        async fn receipt(&self, _: &TxHandle) -> BlockchainResult<Option<TxReceipt>> {
            let failing = self
                .failing_polls
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok();
            if failing {
                return Err(BlockchainError::Rpc("connection reset".to_string()));
            }
            Ok(Some(TxReceipt {
                block_number: Some(10),
                success: true,
            }))
        }

        async fn block_number(&self) -> BlockchainResult<u64> {
            if self.advance {
                Ok(self.head.fetch_add(1, Ordering::SeqCst))
            } else {
                Ok(self.head.load(Ordering::SeqCst))
            }
        }
    }

    fn tx() -> TxHandle {
        TxHandle::from(TxHash::ZERO)
    }

    fn policy(required_blocks: u32) -> ConfirmationPolicy {
        ConfirmationPolicy {
            required_blocks,
            poll_interval: Duration::from_millis(100),
            timeout: Duration::from_secs(10),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_waits_for_required_depth() {
        let chain = Chain::new(true, 0);
        let status = wait_for_confirmation(&chain, &tx(), &policy(3)).await.unwrap();
        assert_eq!(status, ConfirmationStatus::Confirmed { block_number: 10 });
        // Heads 10, 11, 12 give one, two, three confirmations.
        assert_eq!(chain.head.load(Ordering::SeqCst), 13);
    }

    #[tokio::test(start_paused = true)]
    async fn test_default_policy_confirms_on_inclusion() {
        let chain = Chain::new(false, 0);
        let status = wait_for_confirmation(&chain, &tx(), &ConfirmationPolicy::default())
            .await
            .unwrap();
        assert_eq!(status, ConfirmationStatus::Confirmed { block_number: 10 });
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_errors_do_not_end_the_wait() {
        let chain = Chain::new(false, 3);
        let status = wait_for_confirmation(&chain, &tx(), &policy(1)).await.unwrap();
        assert_eq!(status, ConfirmationStatus::Confirmed { block_number: 10 });
        assert_eq!(chain.failing_polls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_persistent_poll_errors_time_out() {
        let chain = Chain::new(false, usize::MAX);
        let err = wait_for_confirmation(&chain, &tx(), &policy(1)).await.unwrap_err();
        assert!(matches!(err, BlockchainError::ConfirmationTimeout(10)));
    }

    #[test]
    fn test_policy_from_config() {
        let config = ChainConfig {
            confirmation_blocks: 3,
            confirmation_poll_ms: 500,
            confirmation_timeout_secs: 30,
            ..ChainConfig::default()
        };
        let policy = ConfirmationPolicy::from_config(&config);
        assert_eq!(policy.required_blocks, 3);
        assert_eq!(policy.poll_interval, Duration::from_millis(500));
        assert_eq!(policy.timeout, Duration::from_secs(30));
    }
}
