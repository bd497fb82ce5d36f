use std::collections::HashMap;

use hype_presale_adapters::{PresaleConfig, RuntimeProfile};
use hype_presale_core::NetworkType;

fn config_from(vars: &[(&str, &str)]) -> PresaleConfig {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
        .collect();
    PresaleConfig::from_lookup(|key| vars.get(key).cloned())
}

#[test]
fn empty_environment_keeps_defaults() {
    let cfg = config_from(&[]);
    assert_eq!(cfg.runtime_profile, RuntimeProfile::Development);
    assert_eq!(cfg.default_network, NetworkType::Mainnet);
    assert_eq!(cfg.provider_request_timeout_ms, 120_000);
    assert_eq!(cfg.confirmation_timeout_ms, 180_000);
    assert_eq!(cfg.receipt_poll_interval_ms, 1_500);
    assert_eq!(cfg.wallet_deep_link_base, "https://metamask.app.link/dapp/");
    assert!(cfg.eip1193_proxy_url.is_none());
    assert!(!cfg.strict_runtime_required());
}

#[test]
fn valid_values_override_defaults() {
    let cfg = config_from(&[
        ("HYPE_RUNTIME_PROFILE", "Production"),
        ("HYPE_EIP1193_PROXY_URL", " http://127.0.0.1:8545 "),
        ("HYPE_DEFAULT_NETWORK", "testnet"),
        ("HYPE_PROVIDER_TIMEOUT_MS", "5000"),
        ("HYPE_CONFIRMATION_TIMEOUT_MS", "60000"),
        ("HYPE_RECEIPT_POLL_INTERVAL_MS", "250"),
        ("HYPE_SIMULATED_CHAIN_ID", "998"),
    ]);
    assert!(cfg.strict_runtime_required());
    assert_eq!(cfg.eip1193_proxy_url.as_deref(), Some("http://127.0.0.1:8545"));
    assert_eq!(cfg.default_network, NetworkType::Testnet);
    assert_eq!(cfg.provider_request_timeout_ms, 5_000);
    assert_eq!(cfg.simulated_chain_id, 998);

    let flow = cfg.flow_settings();
    assert_eq!(flow.default_network, NetworkType::Testnet);
    assert_eq!(flow.confirmation_timeout_ms, 60_000);
    assert_eq!(flow.receipt_poll_interval_ms, 250);
}

#[test]
fn invalid_values_fall_back_to_defaults() {
    let cfg = config_from(&[
        ("HYPE_RUNTIME_PROFILE", "staging"),
        ("HYPE_DEFAULT_NETWORK", "devnet"),
        ("HYPE_PROVIDER_TIMEOUT_MS", "soon"),
        ("HYPE_CONFIRMATION_TIMEOUT_MS", "0"),
        ("HYPE_EIP1193_PROXY_URL", "   "),
    ]);
    let defaults = PresaleConfig::default();
    assert_eq!(cfg.runtime_profile, defaults.runtime_profile);
    assert_eq!(cfg.default_network, defaults.default_network);
    assert_eq!(
        cfg.provider_request_timeout_ms,
        defaults.provider_request_timeout_ms
    );
    assert_eq!(cfg.confirmation_timeout_ms, defaults.confirmation_timeout_ms);
    assert!(cfg.eip1193_proxy_url.is_none());
}
