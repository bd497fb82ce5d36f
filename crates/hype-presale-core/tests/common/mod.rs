#![allow(dead_code)]

use std::collections::{BTreeSet, VecDeque};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use alloy::primitives::{keccak256, Address, B256};
use async_trait::async_trait;
use tokio::sync::Notify;

use hype_presale_core::{
    ClockPort, FlowSettings, NetworkDescriptor, Orchestrator, PortError, ProviderEvent,
    ProviderEventKind, ProviderPort, TransactionPayload, TxReceipt,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    RequestAccounts,
    ChainId,
    Switch(u64),
    Add(u64),
    Send(TransactionPayload),
    Receipt(B256),
}

#[derive(Debug)]
pub struct Wallet {
    pub accounts: Vec<Address>,
    pub chain_id: u64,
    pub known_chains: BTreeSet<u64>,
    pub reject_accounts: bool,
    pub reject_switch: bool,
    pub reject_add: bool,
    pub switch_is_noop: bool,
    pub fail_chain_query: bool,
    pub reject_send: bool,
    pub receipts: VecDeque<Result<Option<TxReceipt>, PortError>>,
    pub events: Vec<ProviderEvent>,
    pub calls: Vec<Call>,
    event_seq: u64,
}

/// In-memory wallet that behaves like an injected provider and logs every
/// call it receives.
#[derive(Debug, Clone)]
pub struct ScriptedProvider {
    pub available: bool,
    pub wallet: Arc<Mutex<Wallet>>,
    pub accounts_gate: Option<Arc<Notify>>,
    pub switch_gate: Option<Arc<Notify>>,
}

impl ScriptedProvider {
    pub fn on_chain(chain_id: u64) -> Self {
        Self {
            available: true,
            wallet: Arc::new(Mutex::new(Wallet {
                accounts: vec![owner_address()],
                chain_id,
                known_chains: BTreeSet::from([1, chain_id]),
                reject_accounts: false,
                reject_switch: false,
                reject_add: false,
                switch_is_noop: false,
                fail_chain_query: false,
                reject_send: false,
                receipts: VecDeque::new(),
                events: Vec::new(),
                calls: Vec::new(),
                event_seq: 0,
            })),
            accounts_gate: None,
            switch_gate: None,
        }
    }

    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::on_chain(1)
        }
    }

    pub fn with<F: FnOnce(&mut Wallet)>(self, f: F) -> Self {
        f(&mut self.wallet.lock().expect("wallet lock"));
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.wallet.lock().expect("wallet lock").calls.clone()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|c| pred(c)).count()
    }

    pub fn sent(&self) -> Vec<TransactionPayload> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Send(payload) => Some(payload),
                _ => None,
            })
            .collect()
    }

    /// Simulates the user moving the wallet to another chain.
    pub fn user_switches_to(&self, chain_id: u64) {
        let mut g = self.wallet.lock().expect("wallet lock");
        g.chain_id = chain_id;
        g.push_event(ProviderEventKind::ChainChanged(chain_id));
    }

    pub fn user_changes_accounts(&self, accounts: Vec<Address>) {
        let mut g = self.wallet.lock().expect("wallet lock");
        g.accounts = accounts.clone();
        g.push_event(ProviderEventKind::AccountsChanged(accounts));
    }

    fn log(&self, call: Call) -> std::sync::MutexGuard<'_, Wallet> {
        let mut g = self.wallet.lock().expect("wallet lock");
        g.calls.push(call);
        g
    }
}

impl Wallet {
    fn push_event(&mut self, kind: ProviderEventKind) {
        self.event_seq += 1;
        self.events.push(ProviderEvent {
            sequence: self.event_seq,
            kind,
        });
    }
}

#[async_trait(?Send)]
impl ProviderPort for ScriptedProvider {
    fn is_available(&self) -> bool {
        self.available
    }

    async fn request_accounts(&self) -> Result<Vec<Address>, PortError> {
        if let Some(gate) = &self.accounts_gate {
            gate.notified().await;
        }
        let g = self.log(Call::RequestAccounts);
        if g.reject_accounts {
            return Err(PortError::UserRejected("User rejected the request.".to_owned()));
        }
        Ok(g.accounts.clone())
    }

    async fn chain_id(&self) -> Result<u64, PortError> {
        let g = self.log(Call::ChainId);
        if g.fail_chain_query {
            return Err(PortError::QueryFailed("eth_chainId unavailable".to_owned()));
        }
        Ok(g.chain_id)
    }

    async fn switch_chain(&self, chain_id: u64) -> Result<(), PortError> {
        if let Some(gate) = &self.switch_gate {
            gate.notified().await;
        }
        let mut g = self.log(Call::Switch(chain_id));
        if !g.known_chains.contains(&chain_id) {
            return Err(PortError::ChainNotRegistered(chain_id));
        }
        if g.reject_switch {
            return Err(PortError::SwitchRejectedOrFailed(
                "User rejected the request. (code 4001)".to_owned(),
            ));
        }
        if !g.switch_is_noop {
            g.chain_id = chain_id;
        }
        Ok(())
    }

    async fn add_chain(&self, network: &NetworkDescriptor) -> Result<(), PortError> {
        let mut g = self.log(Call::Add(network.chain_id));
        if g.reject_add {
            return Err(PortError::AddChainRejectedOrFailed(
                "User rejected the request. (code 4001)".to_owned(),
            ));
        }
        g.known_chains.insert(network.chain_id);
        Ok(())
    }

    async fn send_transaction(&self, tx: &TransactionPayload) -> Result<B256, PortError> {
        let g = self.log(Call::Send(tx.clone()));
        if g.reject_send {
            return Err(PortError::SubmissionFailed(
                "User denied transaction signature. (code 4001)".to_owned(),
            ));
        }
        let body = serde_json::to_vec(tx).map_err(|e| PortError::Validation(e.to_string()))?;
        Ok(keccak256(body))
    }

    async fn transaction_receipt(&self, tx_hash: B256) -> Result<Option<TxReceipt>, PortError> {
        let mut g = self.log(Call::Receipt(tx_hash));
        g.receipts.pop_front().unwrap_or(Ok(None))
    }

    fn drain_events(&self) -> Result<Vec<ProviderEvent>, PortError> {
        let mut g = self.wallet.lock().expect("wallet lock");
        Ok(std::mem::take(&mut g.events))
    }
}

/// Virtual clock: sleeping advances time instantly.
#[derive(Debug, Default)]
pub struct TestClock {
    now: AtomicU64,
    pub sleeps: AtomicUsize,
}

#[async_trait(?Send)]
impl ClockPort for TestClock {
    fn now_ms(&self) -> Result<u64, PortError> {
        Ok(self.now.load(Ordering::SeqCst) + 1_739_750_400_000)
    }

    async fn sleep_ms(&self, ms: u64) {
        self.sleeps.fetch_add(1, Ordering::SeqCst);
        self.now.fetch_add(ms, Ordering::SeqCst);
    }
}

pub type TestOrchestrator = Orchestrator<ScriptedProvider, TestClock>;

pub fn new_orchestrator(provider: ScriptedProvider) -> TestOrchestrator {
    Orchestrator::new(provider, TestClock::default(), test_settings())
}

pub fn test_settings() -> FlowSettings {
    FlowSettings {
        confirmation_timeout_ms: 10_000,
        receipt_poll_interval_ms: 1_000,
        ..FlowSettings::default()
    }
}

pub fn owner_address() -> Address {
    "0x1000000000000000000000000000000000000001"
        .parse()
        .expect("valid owner address")
}

pub fn other_address() -> Address {
    "0x2000000000000000000000000000000000000002"
        .parse()
        .expect("valid other address")
}
