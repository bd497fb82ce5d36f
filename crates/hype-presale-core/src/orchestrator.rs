use std::sync::{Mutex, MutexGuard};

use alloy::primitives::Address;

use crate::domain::{
    ConfirmationRecord, ConnectOutcome, ConnectionState, Environment, FlowSettings,
    NetworkDescriptor, NetworkType, PendingHandle, ProviderEventKind, TransferKind,
    TransferRequest,
};
use crate::error::FlowError;
use crate::networks::resolve;
use crate::ports::{ClockPort, PortError, ProviderPort};
use crate::reconciler::reconcile;
use crate::state_machine::{reconcile_transition, ReconcileAction, ReconcileState, StateTransition};
use crate::submitter::{await_confirmation, dispatch_transfer, ConfirmationPolicy};

const TRANSITION_LOG_CAP: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Connect,
    Reconcile,
    Submit,
}

/// Everything the projector needs, copied out from under the lock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerSnapshot {
    pub connection: ConnectionState,
    pub reconcile: ReconcileState,
    pub in_flight: Option<Operation>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventSummary {
    pub drained_events: usize,
    pub accounts_changed: bool,
    pub chain_changed: bool,
    pub session_cleared: bool,
}

#[derive(Debug)]
struct ControllerState {
    connection: ConnectionState,
    reconcile: ReconcileState,
    in_flight: Option<Operation>,
    transitions: Vec<StateTransition>,
}

impl ControllerState {
    fn target(&self) -> &'static NetworkDescriptor {
        resolve(self.connection.selected_network)
    }

    fn apply(&mut self, action: ReconcileAction) -> Result<(), FlowError> {
        let (next, transition) = reconcile_transition(self.reconcile, action)?;
        self.reconcile = next;
        self.record(std::iter::once(transition));
        Ok(())
    }

    /// Compares a chain the wallet is known to be on with the current target.
    fn observe_chain(&mut self, chain_id: u64) -> Result<(), FlowError> {
        let action = if chain_id == self.target().chain_id {
            ReconcileAction::ObservedMatch
        } else {
            ReconcileAction::ObservedMismatch
        };
        self.apply(action)
    }

    fn record(&mut self, transitions: impl IntoIterator<Item = StateTransition>) {
        self.transitions.extend(transitions);
        if self.transitions.len() > TRANSITION_LOG_CAP {
            let excess = self.transitions.len() - TRANSITION_LOG_CAP;
            self.transitions.drain(..excess);
        }
    }
}

/// Controller state is plain data; a poisoned lock still holds a usable value.
fn lock_recovering(state: &Mutex<ControllerState>) -> MutexGuard<'_, ControllerState> {
    state.lock().unwrap_or_else(|poisoned| {
        tracing::warn!("controller lock poisoned by a panic, recovering state");
        poisoned.into_inner()
    })
}

/// Clears the in-flight marker when the guarded operation finishes, however
/// it finishes.
struct InFlight<'a> {
    state: &'a Mutex<ControllerState>,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        lock_recovering(self.state).in_flight = None;
    }
}

/// Owns the connection state and drives connect, reconcile and submit
/// against a provider. All mutation happens after an awaited provider call
/// completes; the lock is never held across an await.
pub struct Orchestrator<P, C>
where
    P: ProviderPort,
    C: ClockPort,
{
    pub provider: P,
    pub clock: C,
    settings: FlowSettings,
    state: Mutex<ControllerState>,
}

impl<P, C> Orchestrator<P, C>
where
    P: ProviderPort,
    C: ClockPort,
{
    pub fn new(provider: P, clock: C, settings: FlowSettings) -> Self {
        let state = ControllerState {
            connection: ConnectionState::new(settings.default_network),
            reconcile: ReconcileState::Unknown,
            in_flight: None,
            transitions: Vec::new(),
        };
        Self {
            provider,
            clock,
            settings,
            state: Mutex::new(state),
        }
    }

    pub fn settings(&self) -> &FlowSettings {
        &self.settings
    }

    fn lock(&self) -> Result<MutexGuard<'_, ControllerState>, FlowError> {
        Ok(lock_recovering(&self.state))
    }

    fn begin(&self, op: Operation) -> Result<InFlight<'_>, FlowError> {
        let mut g = self.lock()?;
        if let Some(current) = g.in_flight {
            tracing::debug!(?op, ?current, "operation rejected while another is in flight");
            return Err(FlowError::Busy);
        }
        g.in_flight = Some(op);
        Ok(InFlight { state: &self.state })
    }

    pub fn snapshot(&self) -> Result<ControllerSnapshot, FlowError> {
        let g = self.lock()?;
        Ok(ControllerSnapshot {
            connection: g.connection.clone(),
            reconcile: g.reconcile,
            in_flight: g.in_flight,
        })
    }

    pub fn transition_log(&self) -> Result<Vec<StateTransition>, FlowError> {
        Ok(self.lock()?.transitions.clone())
    }

    pub fn target(&self) -> Result<&'static NetworkDescriptor, FlowError> {
        Ok(self.lock()?.target())
    }

    /// Changes the target network. The earlier comparison is discarded and,
    /// for a connected wallet on a known chain, recomputed against the new
    /// target without calling the provider.
    pub fn select_network(&self, network: NetworkType) -> Result<(), FlowError> {
        let mut g = self.lock()?;
        if g.in_flight.is_some() {
            return Err(FlowError::Busy);
        }
        if g.connection.selected_network == network {
            return Ok(());
        }
        tracing::info!(%network, "target network selected");
        g.connection.selected_network = network;
        g.apply(ReconcileAction::Reset)?;
        if g.connection.wallet_address.is_some() {
            if let Some(chain_id) = g.connection.active_chain_id {
                g.observe_chain(chain_id)?;
            }
        }
        Ok(())
    }

    pub async fn connect(&self, env: &Environment) -> Result<ConnectOutcome, FlowError> {
        if !self.provider.is_available() {
            if env.is_mobile {
                let url = self.settings.deep_link(env);
                tracing::info!(%url, "no injected provider on mobile, redirecting to wallet app");
                return Ok(ConnectOutcome::RedirectToWallet { url });
            }
            return Err(PortError::ProviderUnavailable("Please install MetaMask!".to_owned()).into());
        }

        if self.lock()?.connection.wallet_address.is_some() {
            return Err(FlowError::AlreadyConnected);
        }
        let _guard = self.begin(Operation::Connect)?;

        let accounts = self.provider.request_accounts().await?;
        let address = accounts
            .first()
            .copied()
            .ok_or_else(|| PortError::UserRejected("wallet returned no accounts".to_owned()))?;
        tracing::info!(%address, "wallet connected");
        self.lock()?.connection.wallet_address = Some(address);

        self.run_reconcile().await?;
        let chain_id = self.lock()?.connection.active_chain_id;
        Ok(ConnectOutcome::Connected { address, chain_id })
    }

    /// Explicit "switch network" action once a wallet is connected.
    pub async fn reconcile(&self) -> Result<ReconcileState, FlowError> {
        if self.lock()?.connection.wallet_address.is_none() {
            return Err(FlowError::NotConnected);
        }
        let _guard = self.begin(Operation::Reconcile)?;
        self.run_reconcile().await
    }

    async fn run_reconcile(&self) -> Result<ReconcileState, FlowError> {
        let (target, from) = {
            let g = self.lock()?;
            (g.target(), g.reconcile)
        };

        let report = reconcile(&self.provider, target, from).await;

        let mut g = self.lock()?;
        if report.active_chain_id.is_some() {
            g.connection.active_chain_id = report.active_chain_id;
        }
        g.reconcile = report.state;
        g.record(report.transitions);
        report.outcome.map(|()| report.state)
    }

    pub async fn submit(&self, kind: TransferKind, amount: &str) -> Result<PendingHandle, FlowError> {
        tracing::debug!(?kind, amount, "submit requested");
        self.submit_transfer(kind.recipient(), amount).await
    }

    /// Sends `amount` of the native currency to `recipient`. Only reachable
    /// while the reconciler reports `Matched`.
    pub async fn submit_transfer(
        &self,
        recipient: Address,
        amount: &str,
    ) -> Result<PendingHandle, FlowError> {
        let _guard = self.begin(Operation::Submit)?;

        let (from, target) = {
            let g = self.lock()?;
            let from = g.connection.wallet_address.ok_or(FlowError::NotConnected)?;
            let target = g.target();
            if g.reconcile != ReconcileState::Matched {
                return Err(FlowError::WrongNetwork {
                    expected: target.chain_name,
                    actual: g.connection.active_chain_id,
                });
            }
            (from, target)
        };
        let request = TransferRequest::new(recipient, amount, target)?;

        let active = self.provider.chain_id().await?;
        if active != target.chain_id {
            let mut g = self.lock()?;
            g.connection.active_chain_id = Some(active);
            g.apply(ReconcileAction::ObservedMismatch)?;
            tracing::warn!(active, expected = target.chain_id, "wallet left target chain before submit");
            return Err(FlowError::WrongNetwork {
                expected: target.chain_name,
                actual: Some(active),
            });
        }

        dispatch_transfer(&self.provider, from, &request, target).await
    }

    pub async fn await_confirmation(
        &self,
        handle: &PendingHandle,
    ) -> Result<ConfirmationRecord, FlowError> {
        let policy = ConfirmationPolicy {
            timeout_ms: self.settings.confirmation_timeout_ms,
            poll_interval_ms: self.settings.receipt_poll_interval_ms,
        };
        await_confirmation(&self.provider, &self.clock, policy, handle).await
    }

    /// Applies wallet-initiated account and chain changes. Events are left
    /// queued while an operation is in flight.
    pub fn apply_provider_events(&self) -> Result<EventSummary, FlowError> {
        let mut g = self.lock()?;
        if g.in_flight.is_some() {
            return Ok(EventSummary::default());
        }
        let events = self.provider.drain_events()?;
        let mut summary = EventSummary {
            drained_events: events.len(),
            ..EventSummary::default()
        };

        for event in events {
            if g.connection.wallet_address.is_none() {
                continue;
            }
            match event.kind {
                ProviderEventKind::AccountsChanged(accounts) => match accounts.first() {
                    Some(first) => {
                        summary.accounts_changed |= g.connection.wallet_address != Some(*first);
                        g.connection.wallet_address = Some(*first);
                    }
                    None => {
                        tracing::info!("wallet reported no accounts, clearing session");
                        g.connection.wallet_address = None;
                        g.connection.active_chain_id = None;
                        g.apply(ReconcileAction::Reset)?;
                        summary.accounts_changed = true;
                        summary.session_cleared = true;
                    }
                },
                ProviderEventKind::ChainChanged(chain_id) => {
                    summary.chain_changed |= g.connection.active_chain_id != Some(chain_id);
                    g.connection.active_chain_id = Some(chain_id);
                    if g.reconcile.is_settled() {
                        g.observe_chain(chain_id)?;
                    }
                }
            }
        }
        Ok(summary)
    }
}
