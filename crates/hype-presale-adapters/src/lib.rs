pub mod clock;
pub mod config;
pub mod eip1193;
pub mod rpc;
mod simulated;

pub use clock::SystemClockAdapter;
pub use config::{PresaleConfig, RuntimeProfile};
pub use eip1193::Eip1193Adapter;
pub use rpc::{RequestError, RpcError};
pub use simulated::SIMULATED_ACCOUNT;
