use serde::Serialize;

use crate::domain::{NativeCurrency, NetworkDescriptor, NetworkType};

const HYPE: NativeCurrency = NativeCurrency {
    name: "HYPE",
    symbol: "HYPE",
    decimals: 18,
};

static HYPER_EVM_MAINNET: NetworkDescriptor = NetworkDescriptor {
    network_type: NetworkType::Mainnet,
    chain_id: 999,
    chain_name: "HyperEVM Mainnet",
    rpc_url: "https://rpc.hyperliquid.xyz/evm",
    explorer_url: "https://explorer.hyperliquid.xyz",
    native_currency: HYPE,
};

static HYPER_EVM_TESTNET: NetworkDescriptor = NetworkDescriptor {
    network_type: NetworkType::Testnet,
    chain_id: 998,
    chain_name: "HyperEVM Testnet",
    rpc_url: "https://rpc.hyperliquid-testnet.xyz/evm",
    explorer_url: "https://explorer.hyperliquid-testnet.xyz",
    native_currency: HYPE,
};

pub fn resolve(network_type: NetworkType) -> &'static NetworkDescriptor {
    match network_type {
        NetworkType::Mainnet => &HYPER_EVM_MAINNET,
        NetworkType::Testnet => &HYPER_EVM_TESTNET,
    }
}

pub fn resolve_by_chain_id(chain_id: u64) -> Option<&'static NetworkDescriptor> {
    NetworkType::ALL
        .into_iter()
        .map(resolve)
        .find(|network| network.chain_id == chain_id)
}

/// `0x`-prefixed chain id as wallets expect it on switch/add.
pub fn chain_id_hex(chain_id: u64) -> String {
    format!("{chain_id:#x}")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwitchChainParams {
    pub chain_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddChainParams {
    pub chain_id: String,
    pub chain_name: &'static str,
    pub native_currency: NativeCurrency,
    pub rpc_urls: Vec<&'static str>,
    pub block_explorer_urls: Vec<&'static str>,
}

impl NetworkDescriptor {
    pub fn switch_chain_params(&self) -> SwitchChainParams {
        SwitchChainParams {
            chain_id: chain_id_hex(self.chain_id),
        }
    }

    pub fn add_chain_params(&self) -> AddChainParams {
        AddChainParams {
            chain_id: chain_id_hex(self.chain_id),
            chain_name: self.chain_name,
            native_currency: self.native_currency.clone(),
            rpc_urls: vec![self.rpc_url],
            block_explorer_urls: vec![self.explorer_url],
        }
    }

    pub fn tx_explorer_url(&self, tx_hash: &alloy::primitives::B256) -> String {
        format!("{}/tx/{tx_hash}", self.explorer_url.trim_end_matches('/'))
    }
}
