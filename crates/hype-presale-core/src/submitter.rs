use alloy::primitives::{Address, U64};

use crate::amount::parse_native_amount;
use crate::domain::{
    ConfirmationRecord, NetworkDescriptor, PendingHandle, TransactionPayload, TransferRequest,
};
use crate::error::FlowError;
use crate::ports::{ClockPort, PortError, ProviderPort};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmationPolicy {
    pub timeout_ms: u64,
    pub poll_interval_ms: u64,
}

impl TransferRequest {
    /// Converts `amount_native` with the network's own currency decimals.
    pub fn new(
        recipient: Address,
        amount_native: &str,
        network: &NetworkDescriptor,
    ) -> Result<Self, FlowError> {
        let value_wei = parse_native_amount(amount_native, network.native_currency.decimals)?;
        Ok(Self {
            recipient,
            amount_native: amount_native.trim().to_owned(),
            value_wei,
        })
    }
}

/// Sends exactly one transfer for the wallet to sign. Any failure is reported
/// as `SubmissionFailed` and never retried.
pub async fn dispatch_transfer<P>(
    provider: &P,
    from: Address,
    request: &TransferRequest,
    network: &NetworkDescriptor,
) -> Result<PendingHandle, FlowError>
where
    P: ProviderPort + ?Sized,
{
    let payload = TransactionPayload {
        from,
        to: request.recipient,
        value: request.value_wei,
        chain_id: U64::from(network.chain_id),
    };

    let tx_hash = provider
        .send_transaction(&payload)
        .await
        .map_err(|e| match e {
            PortError::SubmissionFailed(_) => e,
            other => PortError::SubmissionFailed(other.to_string()),
        })?;

    tracing::info!(
        %tx_hash,
        to = %request.recipient,
        amount = %request.amount_native,
        chain_id = network.chain_id,
        "transfer submitted"
    );

    Ok(PendingHandle {
        tx_hash,
        from,
        recipient: request.recipient,
        value_wei: request.value_wei,
        chain_id: network.chain_id,
    })
}

/// Polls for the receipt of `handle` until it is mined or the policy's
/// deadline passes. A reverted or dropped transaction is not resubmitted.
pub async fn await_confirmation<P, C>(
    provider: &P,
    clock: &C,
    policy: ConfirmationPolicy,
    handle: &PendingHandle,
) -> Result<ConfirmationRecord, FlowError>
where
    P: ProviderPort + ?Sized,
    C: ClockPort + ?Sized,
{
    let deadline = clock.now_ms()?.saturating_add(policy.timeout_ms);

    loop {
        match provider.transaction_receipt(handle.tx_hash).await {
            Ok(Some(receipt)) if receipt.succeeded => {
                tracing::info!(
                    tx_hash = %handle.tx_hash,
                    block = receipt.block_number,
                    "transfer confirmed"
                );
                return Ok(ConfirmationRecord {
                    tx_hash: handle.tx_hash,
                    block_number: receipt.block_number,
                });
            }
            Ok(Some(receipt)) => {
                tracing::warn!(tx_hash = %handle.tx_hash, block = receipt.block_number, "transfer reverted");
                return Err(FlowError::ConfirmationError {
                    tx_hash: handle.tx_hash,
                    reason: format!("transaction reverted in block {}", receipt.block_number),
                });
            }
            Ok(None) => {}
            Err(e) => {
                return Err(FlowError::ConfirmationError {
                    tx_hash: handle.tx_hash,
                    reason: e.to_string(),
                })
            }
        }

        if clock.now_ms()? >= deadline {
            tracing::warn!(tx_hash = %handle.tx_hash, "confirmation timed out");
            return Err(FlowError::ConfirmationTimeout(handle.tx_hash));
        }
        clock.sleep_ms(policy.poll_interval_ms).await;
    }
}
