//! Bridge between the egui shell and the presale workspace crates.
//! This must remain the only shell-facing boundary for wallet operations.

use std::future::Future;
use std::sync::Arc;

use hype_presale_adapters::{Eip1193Adapter, PresaleConfig, SystemClockAdapter};
use hype_presale_core::{
    ConfirmationRecord, ConnectOutcome, ControllerSnapshot, Environment, EventSummary, FlowError,
    NetworkType, Orchestrator, PendingHandle, ReconcileState, TransferKind,
};

type PresaleOrchestrator = Orchestrator<Eip1193Adapter, SystemClockAdapter>;

#[derive(Clone)]
pub struct PresaleBridge {
    orchestrator: Arc<PresaleOrchestrator>,
}

impl PresaleBridge {
    pub fn with_config(config: &PresaleConfig) -> Self {
        Self {
            orchestrator: Arc::new(PresaleOrchestrator::new(
                Eip1193Adapter::with_config(config),
                SystemClockAdapter,
                config.flow_settings(),
            )),
        }
    }

    pub fn provider_mode(&self) -> &'static str {
        self.orchestrator.provider.mode_name()
    }

    pub fn snapshot(&self) -> Result<ControllerSnapshot, FlowError> {
        self.orchestrator.snapshot()
    }

    pub fn select_network(&self, network: NetworkType) -> Result<(), FlowError> {
        self.orchestrator.select_network(network)
    }

    pub fn apply_provider_events(&self) -> Result<EventSummary, FlowError> {
        self.orchestrator.apply_provider_events()
    }

    pub async fn connect(&self, env: &Environment) -> Result<ConnectOutcome, FlowError> {
        self.orchestrator.connect(env).await
    }

    pub async fn switch_network(&self) -> Result<ReconcileState, FlowError> {
        self.orchestrator.reconcile().await
    }

    pub async fn submit(
        &self,
        kind: TransferKind,
        amount: &str,
    ) -> Result<PendingHandle, FlowError> {
        self.orchestrator.submit(kind, amount).await
    }

    pub async fn await_confirmation(
        &self,
        handle: &PendingHandle,
    ) -> Result<ConfirmationRecord, FlowError> {
        self.orchestrator.await_confirmation(handle).await
    }
}

/// Runs a wallet task off the UI loop. The future is built inside the task
/// since provider futures are not `Send`.
#[cfg(target_arch = "wasm32")]
pub fn spawn_ui_task<F, Fut>(make: F)
where
    F: FnOnce() -> Fut + 'static,
    Fut: Future<Output = ()> + 'static,
{
    wasm_bindgen_futures::spawn_local(make());
}

#[cfg(not(target_arch = "wasm32"))]
pub fn spawn_ui_task<F, Fut>(make: F)
where
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + 'static,
{
    std::thread::spawn(move || {
        match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(rt) => rt.block_on(make()),
            Err(e) => tracing::error!(error = %e, "failed to start async runtime"),
        }
    });
}
