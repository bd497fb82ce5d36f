use crate::domain::NetworkDescriptor;
use crate::error::FlowError;
use crate::ports::{PortError, ProviderPort};
use crate::state_machine::{reconcile_transition, ReconcileAction, ReconcileState, StateTransition};

/// Result of one reconciliation pass. The state and the last observed chain
/// are reported even when the pass fails so the caller can refresh its view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileReport {
    pub state: ReconcileState,
    pub active_chain_id: Option<u64>,
    pub transitions: Vec<StateTransition>,
    pub outcome: Result<(), FlowError>,
}

struct Run {
    state: ReconcileState,
    active_chain_id: Option<u64>,
    transitions: Vec<StateTransition>,
}

impl Run {
    fn step(&mut self, action: ReconcileAction) -> Result<(), FlowError> {
        let (next, transition) = reconcile_transition(self.state, action)?;
        tracing::debug!(
            from = ?transition.from,
            to = ?transition.to,
            reason = transition.reason,
            "reconcile transition"
        );
        self.state = next;
        self.transitions.push(transition);
        Ok(())
    }

    fn finish(self, outcome: Result<(), FlowError>) -> ReconcileReport {
        ReconcileReport {
            state: self.state,
            active_chain_id: self.active_chain_id,
            transitions: self.transitions,
            outcome,
        }
    }
}

/// Brings the wallet onto `target`, starting from `from`.
///
/// A mismatch triggers one switch request; if the wallet does not know the
/// chain it is added and the switch is retried exactly once. The chain is
/// always re-queried after a switch before the result is trusted.
pub async fn reconcile<P>(provider: &P, target: &NetworkDescriptor, from: ReconcileState) -> ReconcileReport
where
    P: ProviderPort + ?Sized,
{
    let mut run = Run {
        state: from,
        active_chain_id: None,
        transitions: Vec::new(),
    };
    let outcome = drive(provider, target, &mut run).await;
    if let Err(ref e) = outcome {
        tracing::warn!(chain = target.chain_name, state = ?run.state, "reconcile failed: {e}");
    } else {
        tracing::info!(chain = target.chain_name, "wallet on target network");
    }
    run.finish(outcome)
}

async fn drive<P>(provider: &P, target: &NetworkDescriptor, run: &mut Run) -> Result<(), FlowError>
where
    P: ProviderPort + ?Sized,
{
    run.step(ReconcileAction::BeginCheck)?;
    if compare(provider, target, run).await? {
        return Ok(());
    }

    run.step(ReconcileAction::BeginSwitch)?;
    if let Err(e) = switch_or_add(provider, target).await {
        run.step(ReconcileAction::SwitchFailed)?;
        return Err(e.into());
    }
    run.step(ReconcileAction::SwitchSucceeded)?;

    // SwitchSucceeded lands in Checking; a successful switch call alone does
    // not prove the wallet moved.
    if compare(provider, target, run).await? {
        Ok(())
    } else {
        Err(FlowError::WrongNetwork {
            expected: target.chain_name,
            actual: run.active_chain_id,
        })
    }
}

async fn compare<P>(provider: &P, target: &NetworkDescriptor, run: &mut Run) -> Result<bool, FlowError>
where
    P: ProviderPort + ?Sized,
{
    let active = match provider.chain_id().await {
        Ok(active) => active,
        Err(e) => {
            run.step(ReconcileAction::QueryFailed)?;
            return Err(e.into());
        }
    };
    run.active_chain_id = Some(active);

    if active == target.chain_id {
        run.step(ReconcileAction::ChainMatched)?;
        Ok(true)
    } else {
        run.step(ReconcileAction::ChainMismatched)?;
        Ok(false)
    }
}

async fn switch_or_add<P>(provider: &P, target: &NetworkDescriptor) -> Result<(), PortError>
where
    P: ProviderPort + ?Sized,
{
    match provider.switch_chain(target.chain_id).await {
        Ok(()) => Ok(()),
        Err(PortError::ChainNotRegistered(chain_id)) => {
            tracing::info!(chain_id, "chain unknown to wallet, adding {}", target.chain_name);
            provider.add_chain(target).await?;
            match provider.switch_chain(target.chain_id).await {
                Err(PortError::ChainNotRegistered(chain_id)) => {
                    Err(PortError::SwitchRejectedOrFailed(format!(
                        "chain {chain_id} still unknown to wallet after add"
                    )))
                }
                other => other,
            }
        }
        Err(e) => Err(e),
    }
}
