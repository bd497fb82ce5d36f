use alloy::primitives::Address;

use crate::domain::{BRIDGE_RECIPIENT, PURCHASE_RECIPIENT};
use crate::networks::resolve;
use crate::orchestrator::{ControllerSnapshot, Operation};
use crate::state_machine::ReconcileState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerTone {
    Ok,
    Warning,
}

/// User-facing status derived from a controller snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusView {
    pub connect_label: &'static str,
    pub connect_enabled: bool,
    pub network_banner: String,
    pub banner_tone: BannerTone,
    pub wallet_short: Option<String>,
    pub pending_amount: Option<String>,
    pub switch_enabled: bool,
    pub purchase_enabled: bool,
    pub bridge_enabled: bool,
    pub busy_label: Option<&'static str>,
    pub purchase_recipient: String,
    pub bridge_recipient: String,
}

pub fn project(snapshot: &ControllerSnapshot, amount_input: &str) -> StatusView {
    let connection = &snapshot.connection;
    let target = resolve(connection.selected_network);
    let connected = connection.wallet_address.is_some();
    let idle = snapshot.in_flight.is_none();
    let amount = amount_input.trim();
    let symbol = target.native_currency.symbol;

    let (network_banner, banner_tone) = match connection.active_chain_id {
        Some(id) if id == target.chain_id => {
            (format!("Connected to {}", target.chain_name), BannerTone::Ok)
        }
        Some(_) => (format!("Please switch to {}", target.chain_name), BannerTone::Warning),
        None => ("Network not connected".to_owned(), BannerTone::Warning),
    };

    let can_send = connected && !amount.is_empty() && idle;

    StatusView {
        connect_label: if connected {
            "Wallet Connected"
        } else {
            "Connect Wallet"
        },
        connect_enabled: !connected && idle,
        network_banner,
        banner_tone,
        wallet_short: connection.wallet_address.map(|a| short_address(&a)),
        pending_amount: (connected && !amount.is_empty()).then(|| format!("{amount} {symbol}")),
        switch_enabled: connected && idle && snapshot.reconcile != ReconcileState::Matched,
        purchase_enabled: can_send,
        bridge_enabled: can_send,
        busy_label: snapshot.in_flight.map(|op| match op {
            Operation::Connect => "Connecting wallet...",
            Operation::Reconcile => "Switching network...",
            Operation::Submit => "Waiting for wallet signature...",
        }),
        purchase_recipient: PURCHASE_RECIPIENT.to_string(),
        bridge_recipient: BRIDGE_RECIPIENT.to_string(),
    }
}

/// `0x1234...abcd` form of a checksummed address.
pub fn short_address(address: &Address) -> String {
    let full = address.to_string();
    format!("{}...{}", &full[..6], &full[full.len() - 4..])
}
