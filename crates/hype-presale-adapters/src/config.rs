use std::str::FromStr;

use hype_presale_core::{FlowSettings, NetworkType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RuntimeProfile {
    #[default]
    Development,
    Production,
}

impl FromStr for RuntimeProfile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            other => Err(format!("unknown runtime profile: {other}")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PresaleConfig {
    pub runtime_profile: RuntimeProfile,
    pub eip1193_proxy_url: Option<String>,
    pub default_network: NetworkType,
    pub provider_request_timeout_ms: u64,
    pub confirmation_timeout_ms: u64,
    pub receipt_poll_interval_ms: u64,
    pub wallet_deep_link_base: String,
    pub simulated_chain_id: u64,
}

impl Default for PresaleConfig {
    fn default() -> Self {
        let flow = FlowSettings::default();
        Self {
            runtime_profile: RuntimeProfile::Development,
            eip1193_proxy_url: None,
            default_network: flow.default_network,
            provider_request_timeout_ms: 120_000,
            confirmation_timeout_ms: flow.confirmation_timeout_ms,
            receipt_poll_interval_ms: flow.receipt_poll_interval_ms,
            wallet_deep_link_base: flow.wallet_deep_link_base,
            simulated_chain_id: 1,
        }
    }
}

impl PresaleConfig {
    /// Reads `HYPE_*` variables. Unset variables keep their defaults; invalid
    /// ones are logged and ignored. Always the defaults on wasm.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let read = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            runtime_profile: parse_or(
                "HYPE_RUNTIME_PROFILE",
                read("HYPE_RUNTIME_PROFILE"),
                defaults.runtime_profile,
            ),
            eip1193_proxy_url: read("HYPE_EIP1193_PROXY_URL").map(|v| v.trim().to_owned()),
            default_network: parse_or(
                "HYPE_DEFAULT_NETWORK",
                read("HYPE_DEFAULT_NETWORK"),
                defaults.default_network,
            ),
            provider_request_timeout_ms: positive_or(
                "HYPE_PROVIDER_TIMEOUT_MS",
                read("HYPE_PROVIDER_TIMEOUT_MS"),
                defaults.provider_request_timeout_ms,
            ),
            confirmation_timeout_ms: positive_or(
                "HYPE_CONFIRMATION_TIMEOUT_MS",
                read("HYPE_CONFIRMATION_TIMEOUT_MS"),
                defaults.confirmation_timeout_ms,
            ),
            receipt_poll_interval_ms: positive_or(
                "HYPE_RECEIPT_POLL_INTERVAL_MS",
                read("HYPE_RECEIPT_POLL_INTERVAL_MS"),
                defaults.receipt_poll_interval_ms,
            ),
            wallet_deep_link_base: read("HYPE_WALLET_DEEP_LINK_BASE")
                .map(|v| v.trim().to_owned())
                .unwrap_or(defaults.wallet_deep_link_base),
            simulated_chain_id: positive_or(
                "HYPE_SIMULATED_CHAIN_ID",
                read("HYPE_SIMULATED_CHAIN_ID"),
                defaults.simulated_chain_id,
            ),
        }
    }

    pub fn strict_runtime_required(&self) -> bool {
        self.runtime_profile == RuntimeProfile::Production
    }

    pub fn flow_settings(&self) -> FlowSettings {
        FlowSettings {
            default_network: self.default_network,
            confirmation_timeout_ms: self.confirmation_timeout_ms,
            receipt_poll_interval_ms: self.receipt_poll_interval_ms,
            wallet_deep_link_base: self.wallet_deep_link_base.clone(),
        }
    }
}

fn parse_or<T>(key: &str, raw: Option<String>, default: T) -> T
where
    T: FromStr + Copy,
    T::Err: std::fmt::Display,
{
    match raw {
        None => default,
        Some(raw) => raw.parse().unwrap_or_else(|e| {
            tracing::warn!(key, value = %raw, error = %e, "ignoring invalid config value");
            default
        }),
    }
}

fn positive_or(key: &str, raw: Option<String>, default: u64) -> u64 {
    match raw.as_deref().map(str::trim).map(str::parse::<u64>) {
        None => default,
        Some(Ok(value)) if value > 0 => value,
        Some(_) => {
            tracing::warn!(key, value = ?raw, "ignoring invalid config value");
            default
        }
    }
}
