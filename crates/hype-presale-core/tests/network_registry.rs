use std::collections::HashSet;

use hype_presale_core::{chain_id_hex, resolve, resolve_by_chain_id, NetworkType};

#[test]
fn every_network_type_resolves_to_a_unique_stable_chain() {
    let mut seen = HashSet::new();
    for network in NetworkType::ALL {
        let first = resolve(network);
        let second = resolve(network);
        assert_eq!(first, second);
        assert_eq!(first.network_type, network);
        assert!(seen.insert(first.chain_id), "duplicate chain id {}", first.chain_id);
    }
}

#[test]
fn hyperevm_descriptors_match_published_parameters() {
    let mainnet = resolve(NetworkType::Mainnet);
    assert_eq!(mainnet.chain_id, 999);
    assert_eq!(mainnet.chain_name, "HyperEVM Mainnet");
    assert_eq!(mainnet.rpc_url, "https://rpc.hyperliquid.xyz/evm");
    assert_eq!(mainnet.native_currency.symbol, "HYPE");
    assert_eq!(mainnet.native_currency.decimals, 18);

    let testnet = resolve(NetworkType::Testnet);
    assert_eq!(testnet.chain_id, 998);
    assert_eq!(testnet.explorer_url, "https://explorer.hyperliquid-testnet.xyz");
}

#[test]
fn lookup_by_chain_id_finds_registered_networks_only() {
    assert_eq!(
        resolve_by_chain_id(998).map(|n| n.network_type),
        Some(NetworkType::Testnet)
    );
    assert!(resolve_by_chain_id(1).is_none());
}

#[test]
fn network_type_parses_from_config_strings() {
    assert_eq!("mainnet".parse::<NetworkType>(), Ok(NetworkType::Mainnet));
    assert_eq!(" TestNet ".parse::<NetworkType>(), Ok(NetworkType::Testnet));
    assert!("devnet".parse::<NetworkType>().is_err());
    assert_eq!(NetworkType::default(), NetworkType::Mainnet);
}

#[test]
fn switch_params_use_hex_chain_id() {
    assert_eq!(chain_id_hex(999), "0x3e7");
    let json = serde_json::to_value(resolve(NetworkType::Mainnet).switch_chain_params())
        .expect("serialize switch params");
    assert_eq!(json, serde_json::json!({ "chainId": "0x3e7" }));
}

#[test]
fn add_params_carry_full_metadata_with_single_urls() {
    let json = serde_json::to_value(resolve(NetworkType::Testnet).add_chain_params())
        .expect("serialize add params");
    assert_eq!(
        json,
        serde_json::json!({
            "chainId": "0x3e6",
            "chainName": "HyperEVM Testnet",
            "nativeCurrency": { "name": "HYPE", "symbol": "HYPE", "decimals": 18 },
            "rpcUrls": ["https://rpc.hyperliquid-testnet.xyz/evm"],
            "blockExplorerUrls": ["https://explorer.hyperliquid-testnet.xyz"]
        })
    );
}
