//! The chain client: one state machine in front of the wallet and contract.
//!
//! All wallet/network calls are awaited on the caller's task; nothing is
//! spawned. State lives in a `watch` channel (latest snapshot) and every
//! transition is also broadcast as a [`ClientEvent`].

use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{broadcast, watch};

use crate::blockchain::{
    wait_for_confirmation, BlockchainError, BlockchainResult, ChainId, ConfirmationPolicy,
    ConfirmationStatus, ContractBinding, ContractProxy, SendOptions, WalletBridge,
};
use crate::client::error::{FailureReason, GuestbookError, ValidationFailure};
use crate::client::state::{
    ClientEvent, ClientSnapshot, ConnectionState, ContractHandle, SubmissionState, SubmitOutcome,
};
use crate::config::GuestbookConfig;
use crate::guestbook::{
    binding_from_config, decode_entries, Entry, EntryLayout, GET_ENTRIES, SIGN_GUESTBOOK,
};
use crate::observability::metrics;

const EVENT_CAPACITY: usize = 64;

/// Fixed parameters of a client session.
#[derive(Debug, Clone)]
pub struct ChainClientSettings {
    /// The only network the client will bind a contract on.
    pub required_chain: ChainId,
    pub binding: ContractBinding,
    /// Gas-limit ceiling for every write-call.
    pub gas_limit: u64,
    pub confirmation: ConfirmationPolicy,
}

impl ChainClientSettings {
    pub fn from_config(config: &GuestbookConfig) -> BlockchainResult<Self> {
        Ok(Self {
            required_chain: ChainId(config.chain.chain_id),
            binding: binding_from_config(&config.contract)?,
            gas_limit: config.chain.gas_limit,
            confirmation: ConfirmationPolicy::from_config(&config.chain),
        })
    }
}

/// Mediates every interaction with the wallet and the guestbook contract.
pub struct ChainClient {
    wallet: Option<Arc<dyn WalletBridge>>,
    settings: ChainClientSettings,
    state: watch::Sender<ClientSnapshot>,
    events: broadcast::Sender<ClientEvent>,
}

impl ChainClient {
    /// `wallet` is `None` when no wallet is available in this environment.
    pub fn new(wallet: Option<Arc<dyn WalletBridge>>, settings: ChainClientSettings) -> Self {
        let (state, _) = watch::channel(ClientSnapshot::default());
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            wallet,
            settings,
            state,
            events,
        }
    }

    pub fn settings(&self) -> &ChainClientSettings {
        &self.settings
    }

    /// Latest state.
    pub fn snapshot(&self) -> ClientSnapshot {
        self.state.borrow().clone()
    }

    /// Receiver that always holds the latest snapshot.
    pub fn subscribe(&self) -> watch::Receiver<ClientSnapshot> {
        self.state.subscribe()
    }

    /// Receiver for every individual transition.
    pub fn events(&self) -> broadcast::Receiver<ClientEvent> {
        self.events.subscribe()
    }

    /// Connect to the wallet, check the network, bind the contract and load
    /// entries.
    ///
    /// No-op while already connecting or connected. A failed read after
    /// binding is returned as an error but leaves the connection `Ready`.
    pub async fn connect(&self) -> Result<(), GuestbookError> {
        let Some(wallet) = self.wallet.clone() else {
            let err = GuestbookError::EnvironmentMissing(
                "install a wallet or provide a private key".to_string(),
            );
            tracing::warn!("No wallet available, cannot connect");
            self.fail_connection(&err);
            return Err(err);
        };

        let mut claimed = false;
        self.state.send_if_modified(|s| {
            if matches!(
                s.connection,
                ConnectionState::Connecting | ConnectionState::Ready(_)
            ) {
                return false;
            }
            s.connection = ConnectionState::Connecting;
            s.error = None;
            claimed = true;
            true
        });
        if !claimed {
            tracing::debug!("connect() ignored: already connecting or connected");
            return Ok(());
        }
        self.emit(ClientEvent::Connection(ConnectionState::Connecting));
        metrics::record_connection_state("connecting");

        let handle = match self.establish(wallet.as_ref()).await {
            Ok(handle) => handle,
            Err(err) => {
                if let GuestbookError::NetworkMismatch { expected, actual } = &err {
                    self.wrong_network(*expected, *actual, &err);
                } else {
                    self.fail_connection(&err);
                }
                return Err(err);
            }
        };

        tracing::info!(
            account = %handle.account,
            contract = %handle.contract,
            chain_id = %handle.chain_id,
            "Contract ready"
        );
        let ready = ConnectionState::Ready(handle.clone());
        self.state.send_modify(|s| s.connection = ready.clone());
        self.emit(ClientEvent::Connection(ready));
        metrics::record_connection_state("ready");

        self.load_entries(handle.proxy.as_ref()).await.map(|_| ())
    }

    /// Drop the current connection and run [`connect`](Self::connect) again.
    ///
    /// Refused while a submission is in flight.
    pub async fn reconnect(&self) -> Result<(), GuestbookError> {
        let mut reset = false;
        self.state.send_if_modified(|s| {
            if !s.submission.is_idle() || matches!(s.connection, ConnectionState::Connecting) {
                return false;
            }
            *s = ClientSnapshot::default();
            reset = true;
            true
        });
        if !reset {
            tracing::debug!("reconnect() ignored: busy");
            return Ok(());
        }
        self.emit(ClientEvent::Connection(ConnectionState::Disconnected));
        self.connect().await
    }

    /// Re-issue the `getEntries` read-call.
    pub async fn refresh_entries(&self) -> Result<Vec<Entry>, GuestbookError> {
        let proxy = self.ready_proxy().ok_or(GuestbookError::NotConnected)?;
        self.load_entries(proxy.as_ref()).await
    }

    /// Sign the guestbook with `(name, message)`.
    ///
    /// Input is validated before anything else and a validation failure
    /// leaves all state untouched. While another submission is in flight
    /// this returns [`SubmitOutcome::Ignored`] without touching the network.
    pub async fn sign_guestbook(
        &self,
        name: &str,
        message: &str,
    ) -> Result<SubmitOutcome, GuestbookError> {
        let entry = validate_entry(name, message)?;
        let proxy = self.ready_proxy().ok_or(GuestbookError::NotConnected)?;

        let mut claimed = false;
        self.state.send_if_modified(|s| {
            if !s.submission.is_idle() {
                return false;
            }
            s.submission = SubmissionState::Pending(entry.clone());
            claimed = true;
            true
        });
        if !claimed {
            tracing::debug!("Submission already in flight, ignoring submit");
            metrics::record_submission("ignored");
            return Ok(SubmitOutcome::Ignored);
        }
        self.emit(ClientEvent::Submission(SubmissionState::Pending(entry.clone())));
        tracing::info!(name = %entry.name, "Signing guestbook");

        let options = SendOptions {
            gas_limit: self.settings.gas_limit,
        };
        let tx = match proxy
            .send(SIGN_GUESTBOOK, &entry.to_call_args(), options)
            .await
        {
            Ok(tx) => tx,
            Err(e) => return Err(self.fail_submission(GuestbookError::Write(e))),
        };

        tracing::info!(tx_hash = %tx, "Transaction sent, waiting for confirmation");
        self.set_submission(SubmissionState::Confirming(tx));

        let started = Instant::now();
        let block_number =
            match wait_for_confirmation(proxy.as_ref(), &tx, &self.settings.confirmation).await {
                Ok(ConfirmationStatus::Confirmed { block_number }) => block_number,
                Ok(ConfirmationStatus::Failed(reason)) => {
                    return Err(self.fail_submission(GuestbookError::Write(
                        BlockchainError::Reverted(reason),
                    )))
                }
                Err(e) => return Err(self.fail_submission(GuestbookError::Write(e))),
            };
        metrics::record_confirmation_time(started.elapsed());
        tracing::info!(tx_hash = %tx, block_number, "Transaction confirmed");

        self.state.send_modify(|s| s.error = None);
        // A failed refresh is surfaced on its own; the entry is on-chain either way.
        if let Err(e) = self.load_entries(proxy.as_ref()).await {
            tracing::warn!(error = %e, "Entries refresh after confirmation failed");
        }

        self.set_submission(SubmissionState::Succeeded(tx));
        self.set_submission(SubmissionState::Idle);
        metrics::record_submission("succeeded");

        Ok(SubmitOutcome::Confirmed { tx, block_number })
    }

    async fn establish(&self, wallet: &dyn WalletBridge) -> Result<ContractHandle, GuestbookError> {
        let accounts = wallet.request_accounts().await.map_err(|e| match e {
            BlockchainError::Rejected(reason) => GuestbookError::AccessDenied(reason),
            other => GuestbookError::AccessDenied(other.to_string()),
        })?;
        if accounts.is_empty() {
            return Err(GuestbookError::AccessDenied(
                "wallet returned no accounts".to_string(),
            ));
        }

        let actual = wallet.network_id().await.map_err(GuestbookError::Connection)?;
        let expected = self.settings.required_chain;
        if actual != expected {
            return Err(GuestbookError::NetworkMismatch { expected, actual });
        }

        let context = wallet
            .signing_context()
            .await
            .map_err(GuestbookError::Connection)?;
        let proxy = wallet
            .bind_contract(&context, &self.settings.binding)
            .map_err(GuestbookError::Connection)?;

        Ok(ContractHandle {
            account: context.account,
            chain_id: context.chain_id,
            contract: self.settings.binding.address,
            proxy,
        })
    }

    async fn load_entries(&self, proxy: &dyn ContractProxy) -> Result<Vec<Entry>, GuestbookError> {
        let result = proxy
            .call(GET_ENTRIES, &[])
            .await
            .and_then(|output| {
                let layout = EntryLayout::from_schema(&proxy.binding().schema)?;
                decode_entries(&output, &layout)
            });
        metrics::record_read_call(result.is_ok());

        match result {
            Ok(entries) => {
                tracing::debug!(count = entries.len(), "Entries loaded");
                let count = entries.len();
                self.state.send_modify(|s| {
                    s.entries = entries.clone();
                    s.entries_loaded = true;
                });
                self.emit(ClientEvent::EntriesLoaded(count));
                Ok(entries)
            }
            Err(e) => {
                let err = GuestbookError::Read(e);
                tracing::warn!(error = %err, "Reading entries failed");
                self.set_error(err.reason());
                Err(err)
            }
        }
    }

    fn ready_proxy(&self) -> Option<Arc<dyn ContractProxy>> {
        match &self.state.borrow().connection {
            ConnectionState::Ready(handle) => Some(handle.proxy.clone()),
            _ => None,
        }
    }

    fn fail_connection(&self, err: &GuestbookError) {
        let reason = err.reason();
        tracing::warn!(kind = reason.kind.as_str(), error = %reason, "Connection failed");
        let failed = ConnectionState::Failed(reason.clone());
        self.state.send_modify(|s| {
            s.connection = failed.clone();
            s.error = Some(reason.clone());
        });
        self.emit(ClientEvent::Connection(failed));
        self.emit(ClientEvent::Error(reason));
        metrics::record_connection_state("failed");
    }

    fn wrong_network(&self, expected: ChainId, actual: ChainId, err: &GuestbookError) {
        let reason = err.reason();
        tracing::warn!(expected = %expected, actual = %actual, "Wallet is on the wrong network");
        let state = ConnectionState::WrongNetwork { expected, actual };
        self.state.send_modify(|s| {
            s.connection = state.clone();
            s.entries.clear();
            s.entries_loaded = false;
            s.error = Some(reason.clone());
        });
        self.emit(ClientEvent::Connection(state));
        self.emit(ClientEvent::Error(reason));
        metrics::record_connection_state("wrong_network");
    }

    /// `Failed` is shown, then the slot returns to `Idle` so the user can retry.
    fn fail_submission(&self, err: GuestbookError) -> GuestbookError {
        let reason = err.reason();
        tracing::warn!(error = %reason, "Signing failed");
        self.set_error(reason.clone());
        self.set_submission(SubmissionState::Failed(reason));
        self.set_submission(SubmissionState::Idle);
        metrics::record_submission("failed");
        err
    }

    fn set_submission(&self, submission: SubmissionState) {
        self.state.send_modify(|s| s.submission = submission.clone());
        self.emit(ClientEvent::Submission(submission));
    }

    fn set_error(&self, reason: FailureReason) {
        self.state.send_modify(|s| s.error = Some(reason.clone()));
        self.emit(ClientEvent::Error(reason));
    }

    fn emit(&self, event: ClientEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}

impl std::fmt::Debug for ChainClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainClient")
            .field("wallet_present", &self.wallet.is_some())
            .field("settings", &self.settings)
            .field("state", &*self.state.borrow())
            .finish()
    }
}

/// Check that both fields are non-blank; values are kept as typed.
pub fn validate_entry(name: &str, message: &str) -> Result<Entry, GuestbookError> {
    let mut missing = Vec::new();
    if name.trim().is_empty() {
        missing.push("name");
    }
    if message.trim().is_empty() {
        missing.push("message");
    }
    if missing.is_empty() {
        Ok(Entry::new(name, message))
    } else {
        Err(GuestbookError::Validation(ValidationFailure { missing }))
    }
}
