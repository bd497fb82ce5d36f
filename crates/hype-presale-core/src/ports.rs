use alloy::primitives::{Address, B256};
use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{NetworkDescriptor, ProviderEvent, TransactionPayload, TxReceipt};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PortError {
    #[error("wallet provider unavailable: {0}")]
    ProviderUnavailable(String),
    #[error("request rejected by user: {0}")]
    UserRejected(String),
    #[error("provider query failed: {0}")]
    QueryFailed(String),
    #[error("chain {0} is not registered with the wallet")]
    ChainNotRegistered(u64),
    #[error("chain switch rejected or failed: {0}")]
    SwitchRejectedOrFailed(String),
    #[error("adding chain rejected or failed: {0}")]
    AddChainRejectedOrFailed(String),
    #[error("transaction submission failed: {0}")]
    SubmissionFailed(String),
    #[error("receipt lookup failed: {0}")]
    ReceiptLookupFailed(String),
    #[error("provider request timed out: {0}")]
    ProviderTimeout(String),
    #[error("port not implemented: {0}")]
    NotImplemented(&'static str),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("validation error: {0}")]
    Validation(String),
}

/// Injected EIP-1193 wallet provider.
///
/// Futures are not `Send`: in the browser every call resolves a JS promise
/// on the page's single thread.
#[async_trait(?Send)]
pub trait ProviderPort {
    fn is_available(&self) -> bool;
    async fn request_accounts(&self) -> Result<Vec<Address>, PortError>;
    async fn chain_id(&self) -> Result<u64, PortError>;
    async fn switch_chain(&self, chain_id: u64) -> Result<(), PortError>;
    async fn add_chain(&self, network: &NetworkDescriptor) -> Result<(), PortError>;
    async fn send_transaction(&self, tx: &TransactionPayload) -> Result<B256, PortError>;
    async fn transaction_receipt(&self, tx_hash: B256) -> Result<Option<TxReceipt>, PortError>;
    fn drain_events(&self) -> Result<Vec<ProviderEvent>, PortError>;
}

#[async_trait(?Send)]
pub trait ClockPort {
    fn now_ms(&self) -> Result<u64, PortError>;
    async fn sleep_ms(&self, ms: u64);
}
