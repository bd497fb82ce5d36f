use crate::ports::PortError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReconcileState {
    #[default]
    Unknown,
    Checking,
    Matched,
    Mismatched,
    Switching,
    SwitchFailed,
}

impl ReconcileState {
    /// States in which no provider call is outstanding.
    pub fn is_settled(&self) -> bool {
        !matches!(self, ReconcileState::Checking | ReconcileState::Switching)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileAction {
    BeginCheck,
    ChainMatched,
    ChainMismatched,
    QueryFailed,
    BeginSwitch,
    SwitchSucceeded,
    SwitchFailed,
    ObservedMatch,
    ObservedMismatch,
    Reset,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateTransition {
    pub from: ReconcileState,
    pub to: ReconcileState,
    pub reason: &'static str,
}

pub fn reconcile_transition(
    state: ReconcileState,
    action: ReconcileAction,
) -> Result<(ReconcileState, StateTransition), PortError> {
    use ReconcileAction as A;
    use ReconcileState as S;

    let (to, reason) = match (state, action) {
        (_, A::Reset) => (S::Unknown, "target network reset"),
        (S::Unknown | S::Matched | S::Mismatched | S::SwitchFailed, A::BeginCheck) => {
            (S::Checking, "query active chain")
        }
        (S::Checking, A::ChainMatched) => (S::Matched, "active chain matches target"),
        (S::Checking, A::ChainMismatched) => (S::Mismatched, "active chain differs from target"),
        (S::Checking, A::QueryFailed) => (S::Unknown, "active chain query failed"),
        (S::Mismatched, A::BeginSwitch) => (S::Switching, "request chain switch"),
        (S::Switching, A::SwitchSucceeded) => (S::Checking, "switch accepted, re-query chain"),
        (S::Switching, A::SwitchFailed) => (S::SwitchFailed, "switch or add failed"),
        (S::Unknown | S::Matched | S::Mismatched | S::SwitchFailed, A::ObservedMatch) => {
            (S::Matched, "known chain is the target")
        }
        (S::Unknown | S::Matched | S::Mismatched | S::SwitchFailed, A::ObservedMismatch) => {
            (S::Mismatched, "known chain is not the target")
        }
        (from, action) => {
            return Err(PortError::Validation(format!(
                "illegal reconcile transition: {from:?} on {action:?}"
            )))
        }
    };

    Ok((
        to,
        StateTransition {
            from: state,
            to,
            reason,
        },
    ))
}
