use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use hype_presale_core::PortError;

/// Error object returned by an EIP-1193 provider or JSON-RPC endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RpcError {
    pub code: i64,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub data: Option<Value>,
}

impl RpcError {
    pub const USER_REJECTED: i64 = 4001;
    pub const UNAUTHORIZED: i64 = 4100;
    pub const UNSUPPORTED_METHOD: i64 = 4200;
    pub const DISCONNECTED: i64 = 4900;
    pub const CHAIN_DISCONNECTED: i64 = 4901;
    pub const UNRECOGNIZED_CHAIN: i64 = 4902;
    pub const INVALID_PARAMS: i64 = -32602;
    pub const REQUEST_PENDING: i64 = -32002;

    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    /// Some mobile wallets wrap the original error, e.g.
    /// `{ code: -32603, data: { originalError: { code: 4902 } } }`.
    pub fn effective_code(&self) -> i64 {
        self.data
            .as_ref()
            .and_then(|d| d.get("originalError"))
            .and_then(|e| e.get("code"))
            .and_then(Value::as_i64)
            .unwrap_or(self.code)
    }

    pub fn is_user_rejection(&self) -> bool {
        matches!(
            self.effective_code(),
            Self::USER_REJECTED | Self::UNAUTHORIZED
        )
    }

    pub fn is_disconnected(&self) -> bool {
        matches!(
            self.effective_code(),
            Self::DISCONNECTED | Self::CHAIN_DISCONNECTED
        )
    }

    pub fn reason(&self) -> String {
        if self.code == Self::REQUEST_PENDING {
            return format!(
                "a wallet request is already pending, check the wallet window (code {})",
                self.code
            );
        }
        format!("{} (code {})", self.message, self.code)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("{}", .0.reason())]
    Rpc(RpcError),
    #[error(transparent)]
    Port(PortError),
}

impl From<PortError> for RequestError {
    fn from(e: PortError) -> Self {
        RequestError::Port(e)
    }
}

impl RequestError {
    /// Maps a failed request onto the operation's error variant. Timeouts and
    /// a missing provider keep their own variants.
    pub fn into_port(
        self,
        rpc: impl FnOnce(&RpcError) -> PortError,
        other: impl FnOnce(String) -> PortError,
    ) -> PortError {
        match self {
            RequestError::Rpc(e) if e.is_disconnected() => {
                PortError::ProviderUnavailable(e.reason())
            }
            RequestError::Rpc(e) => rpc(&e),
            RequestError::Port(
                e @ (PortError::ProviderTimeout(_) | PortError::ProviderUnavailable(_)),
            ) => e,
            RequestError::Port(e) => other(e.to_string()),
        }
    }
}

pub fn parse_quantity(raw: &str) -> Result<u64, PortError> {
    if raw.starts_with("0x") || raw.starts_with("0X") {
        u64::from_str_radix(&raw[2..], 16)
            .map_err(|e| PortError::Validation(format!("invalid hex quantity {raw}: {e}")))
    } else {
        raw.parse()
            .map_err(|e| PortError::Validation(format!("invalid quantity {raw}: {e}")))
    }
}

pub fn json_quantity_to_u64(value: &Value) -> Result<u64, PortError> {
    if let Some(n) = value.as_u64() {
        return Ok(n);
    }
    let s = value
        .as_str()
        .ok_or_else(|| PortError::Validation("quantity must be string or number".to_owned()))?;
    parse_quantity(s)
}
