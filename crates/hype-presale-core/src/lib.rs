pub mod amount;
pub mod domain;
pub mod error;
pub mod networks;
pub mod orchestrator;
pub mod ports;
pub mod projector;
pub mod reconciler;
pub mod state_machine;
pub mod submitter;

pub use amount::{parse_native_amount, AmountError};
pub use domain::{
    ConfirmationRecord, ConnectOutcome, ConnectionState, Environment, FlowSettings,
    NativeCurrency, NetworkDescriptor, NetworkType, PendingHandle, ProviderEvent,
    ProviderEventKind, TransactionPayload, TransferKind, TransferRequest, TxReceipt,
    BRIDGE_RECIPIENT, PURCHASE_RECIPIENT,
};
pub use error::FlowError;
pub use networks::{chain_id_hex, resolve, resolve_by_chain_id, AddChainParams, SwitchChainParams};
pub use orchestrator::{ControllerSnapshot, EventSummary, Operation, Orchestrator};
pub use ports::{ClockPort, PortError, ProviderPort};
pub use projector::{project, short_address, BannerTone, StatusView};
pub use reconciler::{reconcile, ReconcileReport};
pub use state_machine::{reconcile_transition, ReconcileAction, ReconcileState, StateTransition};
pub use submitter::{await_confirmation, dispatch_transfer, ConfirmationPolicy};
