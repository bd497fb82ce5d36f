use alloy::primitives::{address, Address, B256, U256, U64};
use serde::{Deserialize, Serialize};

/// Recipient of presale purchases.
pub const PURCHASE_RECIPIENT: Address = address!("8254a986319461bf29ae35940a96786e507ad9ac");

/// System address that moves HYPE between HyperCore and HyperEVM.
pub const BRIDGE_RECIPIENT: Address = address!("2222222222222222222222222222222222222222");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NetworkType {
    #[default]
    Mainnet,
    Testnet,
}

impl NetworkType {
    pub const ALL: [NetworkType; 2] = [NetworkType::Mainnet, NetworkType::Testnet];

    pub fn as_str(&self) -> &'static str {
        match self {
            NetworkType::Mainnet => "mainnet",
            NetworkType::Testnet => "testnet",
        }
    }
}

impl std::str::FromStr for NetworkType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mainnet" => Ok(NetworkType::Mainnet),
            "testnet" => Ok(NetworkType::Testnet),
            other => Err(format!("unknown network type: {other}")),
        }
    }
}

impl std::fmt::Display for NetworkType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NativeCurrency {
    pub name: &'static str,
    pub symbol: &'static str,
    pub decimals: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkDescriptor {
    pub network_type: NetworkType,
    pub chain_id: u64,
    pub chain_name: &'static str,
    pub rpc_url: &'static str,
    pub explorer_url: &'static str,
    pub native_currency: NativeCurrency,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionState {
    pub wallet_address: Option<Address>,
    pub active_chain_id: Option<u64>,
    pub selected_network: NetworkType,
}

impl ConnectionState {
    pub fn new(selected_network: NetworkType) -> Self {
        Self {
            selected_network,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferKind {
    Purchase,
    Bridge,
}

impl TransferKind {
    pub fn recipient(&self) -> Address {
        match self {
            TransferKind::Purchase => PURCHASE_RECIPIENT,
            TransferKind::Bridge => BRIDGE_RECIPIENT,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TransferKind::Purchase => "Transfer",
            TransferKind::Bridge => "Bridging",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    pub recipient: Address,
    pub amount_native: String,
    pub value_wei: U256,
}

/// Body of an `eth_sendTransaction` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionPayload {
    pub from: Address,
    pub to: Address,
    pub value: U256,
    pub chain_id: U64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingHandle {
    pub tx_hash: B256,
    pub from: Address,
    pub recipient: Address,
    pub value_wei: U256,
    pub chain_id: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmationRecord {
    pub tx_hash: B256,
    pub block_number: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxReceipt {
    pub block_number: u64,
    pub succeeded: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderEventKind {
    AccountsChanged(Vec<Address>),
    ChainChanged(u64),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderEvent {
    pub sequence: u64,
    pub kind: ProviderEventKind,
}

/// Host facts the connect flow needs when no provider is injected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    pub is_mobile: bool,
    pub host: String,
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectOutcome {
    Connected {
        address: Address,
        chain_id: Option<u64>,
    },
    RedirectToWallet {
        url: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowSettings {
    pub default_network: NetworkType,
    pub confirmation_timeout_ms: u64,
    pub receipt_poll_interval_ms: u64,
    pub wallet_deep_link_base: String,
}

impl Default for FlowSettings {
    fn default() -> Self {
        Self {
            default_network: NetworkType::Mainnet,
            confirmation_timeout_ms: 180_000,
            receipt_poll_interval_ms: 1_500,
            wallet_deep_link_base: "https://metamask.app.link/dapp/".to_owned(),
        }
    }
}

impl FlowSettings {
    pub fn deep_link(&self, env: &Environment) -> String {
        format!("{}{}{}", self.wallet_deep_link_base, env.host, env.path)
    }
}
