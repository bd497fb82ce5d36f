use alloy::primitives::B256;
use thiserror::Error;

use crate::amount::AmountError;
use crate::ports::PortError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlowError {
    #[error(transparent)]
    Port(#[from] PortError),
    #[error("no wallet connected")]
    NotConnected,
    #[error("please switch to {expected} first")]
    WrongNetwork {
        expected: &'static str,
        actual: Option<u64>,
    },
    #[error("invalid amount: {0}")]
    InvalidAmount(#[from] AmountError),
    #[error("wallet already connected")]
    AlreadyConnected,
    #[error("another wallet operation is in progress")]
    Busy,
    #[error("transaction {0} was not confirmed in time")]
    ConfirmationTimeout(B256),
    #[error("transaction {tx_hash} failed: {reason}")]
    ConfirmationError { tx_hash: B256, reason: String },
}
