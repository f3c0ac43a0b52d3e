//! Shared test doubles: a scripted wallet and an in-memory guestbook contract.

#![allow(dead_code)]

use alloy::dyn_abi::DynSolValue;
use alloy::primitives::{Address, TxHash};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

use guestbook_client::blockchain::{
    BlockchainError, BlockchainResult, ChainId, ConfirmationPolicy, ContractBinding,
    ContractProxy, SendOptions, SigningContext, TxHandle, TxReceipt, WalletBridge,
};
use guestbook_client::client::{ChainClient, ChainClientSettings};
use guestbook_client::guestbook::{
    default_binding, encode_entries, Entry, GET_ENTRIES, SIGN_GUESTBOOK,
};

pub const REQUIRED_CHAIN: u64 = 1115;

pub fn account() -> Address {
    Address::repeat_byte(0xAA)
}

/// Client settings with a fast confirmation policy.
pub fn settings() -> ChainClientSettings {
    settings_with(default_binding().unwrap())
}

pub fn settings_with(binding: ContractBinding) -> ChainClientSettings {
    ChainClientSettings {
        required_chain: ChainId(REQUIRED_CHAIN),
        binding,
        gas_limit: 300_000,
        confirmation: ConfirmationPolicy {
            required_blocks: 0,
            poll_interval: Duration::from_millis(10),
            timeout: Duration::from_secs(5),
        },
    }
}

/// In-memory guestbook. Sent entries are appended when their receipt is
/// first observed.
pub struct MockContract {
    binding: ContractBinding,
    entries: Mutex<Vec<Entry>>,
    in_flight: Mutex<Vec<(TxHash, Entry)>>,
    block: AtomicU64,
    pub calls: AtomicUsize,
    pub sends: AtomicUsize,
    pub last_gas_limit: AtomicU64,
    pub fail_reads: AtomicBool,
    pub reject_sends: AtomicBool,
    pub revert: AtomicBool,
    pub never_confirm: AtomicBool,
    /// Receipt polls that fail with an RPC error before polling recovers.
    pub failing_receipt_polls: AtomicUsize,
    /// When set, `send` waits for a permit before returning.
    pub send_gate: Mutex<Option<Arc<Notify>>>,
}

impl MockContract {
    pub fn new(entries: Vec<Entry>) -> Arc<Self> {
        Self::with_binding(default_binding().unwrap(), entries)
    }

    pub fn with_binding(binding: ContractBinding, entries: Vec<Entry>) -> Arc<Self> {
        Arc::new(Self {
            binding,
            entries: Mutex::new(entries),
            in_flight: Mutex::new(Vec::new()),
            block: AtomicU64::new(100),
            calls: AtomicUsize::new(0),
            sends: AtomicUsize::new(0),
            last_gas_limit: AtomicU64::new(0),
            fail_reads: AtomicBool::new(false),
            reject_sends: AtomicBool::new(false),
            revert: AtomicBool::new(false),
            never_confirm: AtomicBool::new(false),
            failing_receipt_polls: AtomicUsize::new(0),
            send_gate: Mutex::new(None),
        })
    }

    pub fn entries(&self) -> Vec<Entry> {
        self.entries.lock().unwrap().clone()
    }

    pub fn network_calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst) + self.sends.load(Ordering::SeqCst)
    }

    pub fn gate_sends(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.send_gate.lock().unwrap() = Some(gate.clone());
        gate
    }
}

#[async_trait]
impl ContractProxy for MockContract {
    fn binding(&self) -> &ContractBinding {
        &self.binding
    }

    async fn call(&self, method: &str, _args: &[DynSolValue]) -> BlockchainResult<Vec<DynSolValue>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.binding.schema.has_function(method) {
            return Err(BlockchainError::Abi(format!("function {} not in schema", method)));
        }
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(BlockchainError::Rpc("connection reset".to_string()));
        }
        assert_eq!(method, GET_ENTRIES);
        Ok(encode_entries(&self.entries()))
    }

    async fn send(
        &self,
        method: &str,
        args: &[DynSolValue],
        options: SendOptions,
    ) -> BlockchainResult<TxHandle> {
        let n = self.sends.fetch_add(1, Ordering::SeqCst) + 1;
        self.last_gas_limit.store(options.gas_limit, Ordering::SeqCst);
        assert_eq!(method, SIGN_GUESTBOOK);

        let gate = self.send_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if self.reject_sends.load(Ordering::SeqCst) {
            return Err(BlockchainError::Rejected("user denied transaction signature".into()));
        }

        let entry = match args {
            [DynSolValue::String(name), DynSolValue::String(message)] => {
                Entry::new(name.as_str(), message.as_str())
            }
            _ => return Err(BlockchainError::Abi("signGuestbook expects (string,string)".into())),
        };
        let hash = TxHash::with_last_byte(n as u8);
        self.in_flight.lock().unwrap().push((hash, entry));
        Ok(TxHandle::from(hash))
    }

    async fn receipt(&self, tx: &TxHandle) -> BlockchainResult<Option<TxReceipt>> {
        let failing = self
            .failing_receipt_polls
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(BlockchainError::Rpc("connection reset".to_string()));
        }
        if self.never_confirm.load(Ordering::SeqCst) {
            return Ok(None);
        }
        let success = !self.revert.load(Ordering::SeqCst);
        let mined = {
            let mut in_flight = self.in_flight.lock().unwrap();
            let index = in_flight.iter().position(|(hash, _)| *hash == tx.hash);
            index.map(|i| in_flight.remove(i).1)
        };
        if let Some(entry) = mined {
            if success {
                self.entries.lock().unwrap().push(entry);
            }
        }
        Ok(Some(TxReceipt {
            block_number: Some(self.block.fetch_add(1, Ordering::SeqCst)),
            success,
        }))
    }

    async fn block_number(&self) -> BlockchainResult<u64> {
        Ok(self.block.load(Ordering::SeqCst))
    }
}

/// Wallet double with a switchable network and approval behavior.
pub struct ScriptedWallet {
    pub chain_id: AtomicU64,
    pub deny_access: AtomicBool,
    pub binds: AtomicUsize,
    /// When set, `request_accounts` waits for a permit before answering.
    pub access_gate: Mutex<Option<Arc<Notify>>>,
    contract: Arc<MockContract>,
}

impl ScriptedWallet {
    pub fn new(chain_id: u64, contract: Arc<MockContract>) -> Arc<Self> {
        Arc::new(Self {
            chain_id: AtomicU64::new(chain_id),
            deny_access: AtomicBool::new(false),
            binds: AtomicUsize::new(0),
            access_gate: Mutex::new(None),
            contract,
        })
    }

    pub fn gate_access(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.access_gate.lock().unwrap() = Some(gate.clone());
        gate
    }
}

#[async_trait]
impl WalletBridge for ScriptedWallet {
    async fn request_accounts(&self) -> BlockchainResult<Vec<Address>> {
        let gate = self.access_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if self.deny_access.load(Ordering::SeqCst) {
            return Err(BlockchainError::Rejected("user rejected the request".into()));
        }
        Ok(vec![account()])
    }

    async fn network_id(&self) -> BlockchainResult<ChainId> {
        Ok(ChainId(self.chain_id.load(Ordering::SeqCst)))
    }

    async fn signing_context(&self) -> BlockchainResult<SigningContext> {
        Ok(SigningContext {
            account: account(),
            chain_id: self.network_id().await?,
        })
    }

    fn bind_contract(
        &self,
        _context: &SigningContext,
        _binding: &ContractBinding,
    ) -> BlockchainResult<Arc<dyn ContractProxy>> {
        self.binds.fetch_add(1, Ordering::SeqCst);
        Ok(self.contract.clone() as Arc<dyn ContractProxy>)
    }
}

/// Client wired to a scripted wallet on `chain_id`.
pub fn client_on(chain_id: u64, contract: Arc<MockContract>) -> (Arc<ChainClient>, Arc<ScriptedWallet>) {
    let wallet = ScriptedWallet::new(chain_id, contract);
    let client = ChainClient::new(Some(wallet.clone() as Arc<dyn WalletBridge>), settings());
    (Arc::new(client), wallet)
}
