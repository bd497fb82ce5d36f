use std::sync::{Arc, Mutex};

use alloy::primitives::{Address, B256};
use async_trait::async_trait;
use serde_json::{json, Value};

use hype_presale_core::{
    chain_id_hex, NetworkDescriptor, PortError, ProviderEvent, ProviderEventKind, ProviderPort,
    TransactionPayload, TxReceipt,
};

use crate::rpc::{json_quantity_to_u64, RequestError, RpcError};
use crate::simulated::SimulatedWallet;
use crate::PresaleConfig;

#[derive(Debug, Clone)]
pub struct Eip1193Adapter {
    mode: ProviderMode,
    state: Arc<Mutex<ProviderState>>,
    #[cfg(target_arch = "wasm32")]
    request_timeout_ms: u64,
    #[cfg(target_arch = "wasm32")]
    hooks: Arc<Mutex<BrowserHooks>>,
}

#[derive(Debug, Clone)]
enum ProviderMode {
    Disabled(String),
    Deterministic,
    #[cfg(not(target_arch = "wasm32"))]
    Proxy(ProxyRuntime),
    #[cfg(target_arch = "wasm32")]
    Browser,
}

#[derive(Debug, Clone)]
#[cfg(not(target_arch = "wasm32"))]
struct ProxyRuntime {
    base_url: String,
    client: reqwest::Client,
    next_id: Arc<std::sync::atomic::AtomicU64>,
}

#[derive(Debug)]
struct ProviderState {
    wallet: SimulatedWallet,
    event_seq: u64,
    events: Vec<ProviderEvent>,
}

#[cfg(target_arch = "wasm32")]
#[derive(Debug, Default)]
struct BrowserHooks {
    accounts_changed: Option<wasm_bindgen::closure::Closure<dyn FnMut(wasm_bindgen::JsValue)>>,
    chain_changed: Option<wasm_bindgen::closure::Closure<dyn FnMut(wasm_bindgen::JsValue)>>,
}

impl Default for Eip1193Adapter {
    fn default() -> Self {
        Self::with_config(&PresaleConfig::from_env())
    }
}

impl Eip1193Adapter {
    pub fn with_config(config: &PresaleConfig) -> Self {
        // An absent window.ethereum is checked on every call, wallets may
        // inject after the page loads.
        #[cfg(target_arch = "wasm32")]
        let mode = ProviderMode::Browser;

        #[cfg(not(target_arch = "wasm32"))]
        let mode = if let Some(ref base_url) = config.eip1193_proxy_url {
            let timeout = std::time::Duration::from_millis(config.provider_request_timeout_ms);
            match reqwest::Client::builder().timeout(timeout).build() {
                Ok(client) => ProviderMode::Proxy(ProxyRuntime {
                    base_url: base_url.clone(),
                    client,
                    next_id: Arc::new(std::sync::atomic::AtomicU64::new(1)),
                }),
                Err(e) => ProviderMode::Disabled(format!(
                    "failed to initialize EIP-1193 proxy client: {e}"
                )),
            }
        } else if config.strict_runtime_required() {
            ProviderMode::Disabled(
                "EIP-1193 proxy URL not configured in production runtime profile".to_owned(),
            )
        } else {
            ProviderMode::Deterministic
        };

        tracing::info!(mode = mode.name(), "wallet provider adapter initialized");

        Self {
            mode,
            state: Arc::new(Mutex::new(ProviderState {
                wallet: SimulatedWallet::new(config.simulated_chain_id),
                event_seq: 0,
                events: Vec::new(),
            })),
            #[cfg(target_arch = "wasm32")]
            request_timeout_ms: config.provider_request_timeout_ms,
            #[cfg(target_arch = "wasm32")]
            hooks: Arc::new(Mutex::new(BrowserHooks::default())),
        }
    }

    /// Simulated wallet without consulting the environment.
    pub fn deterministic(chain_id: u64) -> Self {
        Self::with_config(&PresaleConfig {
            simulated_chain_id: chain_id,
            eip1193_proxy_url: None,
            ..PresaleConfig::default()
        })
    }

    pub fn mode_name(&self) -> &'static str {
        self.mode.name()
    }

    fn lock_state(&self) -> Result<std::sync::MutexGuard<'_, ProviderState>, PortError> {
        self.state
            .lock()
            .map_err(|e| PortError::Transport(format!("provider lock poisoned: {e}")))
    }

    fn record_event(&self, kind: ProviderEventKind) -> Result<(), PortError> {
        let mut g = self.lock_state()?;
        g.push_event(kind);
        Ok(())
    }

    /// Moves the simulated wallet to other accounts and queues the event a
    /// real wallet would emit.
    pub fn debug_inject_accounts_changed(&self, accounts: Vec<Address>) -> Result<(), PortError> {
        self.lock_state()?.wallet.accounts = accounts.clone();
        self.record_event(ProviderEventKind::AccountsChanged(accounts))
    }

    pub fn debug_inject_chain_changed(&self, chain_id: u64) -> Result<(), PortError> {
        {
            let mut g = self.lock_state()?;
            g.wallet.chain_id = chain_id;
            g.wallet.known_chains.insert(chain_id);
        }
        self.record_event(ProviderEventKind::ChainChanged(chain_id))
    }

    /// Makes the next simulated call to `method` fail with an EIP-1193 `code`.
    pub fn debug_reject_next(&self, method: &str, code: i64) -> Result<(), PortError> {
        self.lock_state()?.wallet.reject_next(method, code);
        Ok(())
    }

    pub fn debug_forget_chain(&self, chain_id: u64) -> Result<(), PortError> {
        self.lock_state()?.wallet.known_chains.remove(&chain_id);
        Ok(())
    }

    async fn request(&self, method: &str, params: Value) -> Result<Value, RequestError> {
        tracing::debug!(method, mode = self.mode.name(), "provider request");
        match &self.mode {
            ProviderMode::Disabled(reason) => {
                Err(PortError::ProviderUnavailable(reason.clone()).into())
            }
            ProviderMode::Deterministic => {
                let mut g = self.lock_state()?;
                let before = g.wallet.chain_id;
                let result = g.wallet.handle(method, &params).map_err(RequestError::Rpc)?;
                if g.wallet.chain_id != before {
                    let chain_id = g.wallet.chain_id;
                    g.push_event(ProviderEventKind::ChainChanged(chain_id));
                }
                Ok(result)
            }
            #[cfg(not(target_arch = "wasm32"))]
            ProviderMode::Proxy(proxy) => proxy.call(method, params).await,
            #[cfg(target_arch = "wasm32")]
            ProviderMode::Browser => self.wasm_request(method, params).await,
        }
    }

    #[cfg(target_arch = "wasm32")]
    async fn wasm_request(&self, method: &str, params: Value) -> Result<Value, RequestError> {
        use serde::Serialize;
        use wasm_bindgen::JsCast;

        let provider = browser_provider()?;
        let request_fn = get_prop(&provider, "request")
            .ok()
            .and_then(|v| v.dyn_into::<js_sys::Function>().ok())
            .ok_or_else(|| {
                PortError::ProviderUnavailable("window.ethereum.request is unavailable".to_owned())
            })?;

        // Plain objects, not ES Maps, or the provider cannot read the params.
        let request_js = json!({ "method": method, "params": params })
            .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
            .map_err(|e| PortError::Transport(format!("failed to encode wasm request: {e}")))?;
        let promise_js = request_fn.call1(&provider, &request_js).map_err(|e| {
            PortError::Transport(format!("provider request dispatch failed: {e:?}"))
        })?;
        let promise = promise_js.dyn_into::<js_sys::Promise>().map_err(|_| {
            PortError::Transport("provider request did not return Promise".to_owned())
        })?;

        let Some(result_js) = race_with_deadline(promise, self.request_timeout_ms).await? else {
            return Err(PortError::ProviderTimeout(method.to_owned()).into());
        };

        serde_wasm_bindgen::from_value(result_js).map_err(|e| {
            PortError::Transport(format!("failed to decode wasm response: {e}")).into()
        })
    }

    /// Registers `accountsChanged` / `chainChanged` listeners once the user
    /// has connected. Registering before the first `eth_requestAccounts` can
    /// leave that request pending without a wallet popup in some builds.
    #[cfg(target_arch = "wasm32")]
    fn register_browser_hooks(&self) -> Result<(), PortError> {
        use wasm_bindgen::{closure::Closure, JsCast, JsValue};

        let provider = browser_provider()?;
        let on_fn = get_prop(&provider, "on")
            .ok()
            .and_then(|v| v.dyn_into::<js_sys::Function>().ok())
            .or_else(|| {
                get_prop(&provider, "addListener")
                    .ok()
                    .and_then(|v| v.dyn_into::<js_sys::Function>().ok())
            })
            .ok_or(PortError::NotImplemented(
                "provider does not expose on/addListener",
            ))?;

        let mut hooks = self
            .hooks
            .lock()
            .map_err(|e| PortError::Transport(format!("provider hooks lock poisoned: {e}")))?;
        if hooks.accounts_changed.is_some() && hooks.chain_changed.is_some() {
            return Ok(());
        }

        let state_for_accounts = Arc::clone(&self.state);
        let accounts_cb = Closure::<dyn FnMut(JsValue)>::new(move |value: JsValue| {
            let mut accounts = Vec::new();
            if js_sys::Array::is_array(&value) {
                for item in js_sys::Array::from(&value).iter() {
                    if let Some(addr) = item.as_string().and_then(|raw| raw.parse().ok()) {
                        accounts.push(addr);
                    }
                }
            }
            if let Ok(mut g) = state_for_accounts.lock() {
                g.push_event(ProviderEventKind::AccountsChanged(accounts));
            }
        });

        let state_for_chain = Arc::clone(&self.state);
        let chain_cb = Closure::<dyn FnMut(JsValue)>::new(move |value: JsValue| {
            match js_chain_id_to_u64(value) {
                Ok(chain_id) => {
                    if let Ok(mut g) = state_for_chain.lock() {
                        g.push_event(ProviderEventKind::ChainChanged(chain_id));
                    }
                }
                Err(e) => tracing::warn!(error = %e, "ignoring malformed chainChanged payload"),
            }
        });

        on_fn
            .call2(
                &provider,
                &JsValue::from_str("accountsChanged"),
                accounts_cb.as_ref().unchecked_ref(),
            )
            .map_err(|e| PortError::Transport(format!("register accountsChanged failed: {e:?}")))?;
        on_fn
            .call2(
                &provider,
                &JsValue::from_str("chainChanged"),
                chain_cb.as_ref().unchecked_ref(),
            )
            .map_err(|e| PortError::Transport(format!("register chainChanged failed: {e:?}")))?;

        hooks.accounts_changed = Some(accounts_cb);
        hooks.chain_changed = Some(chain_cb);
        Ok(())
    }
}

impl ProviderMode {
    fn name(&self) -> &'static str {
        match self {
            ProviderMode::Disabled(_) => "disabled",
            ProviderMode::Deterministic => "deterministic",
            #[cfg(not(target_arch = "wasm32"))]
            ProviderMode::Proxy(_) => "proxy",
            #[cfg(target_arch = "wasm32")]
            ProviderMode::Browser => "browser",
        }
    }
}

impl ProviderState {
    fn push_event(&mut self, kind: ProviderEventKind) {
        self.event_seq = self.event_seq.saturating_add(1);
        let sequence = self.event_seq;
        self.events.push(ProviderEvent { sequence, kind });
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl ProxyRuntime {
    async fn call(&self, method: &str, params: Value) -> Result<Value, RequestError> {
        let id = self
            .next_id
            .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        let payload = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });
        let transport_error = |stage: &str, e: reqwest::Error| {
            if e.is_timeout() {
                PortError::ProviderTimeout(method.to_owned())
            } else {
                PortError::Transport(format!("eip1193 proxy {stage} failed: {e}"))
            }
        };

        let response = self
            .client
            .post(&self.base_url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| transport_error("request", e))?;
        let status = response.status();
        let body: Value = response
            .json()
            .await
            .map_err(|e| transport_error("json decode", e))?;

        if let Some(err) = body.get("error").filter(|e| !e.is_null()) {
            let rpc: RpcError = serde_json::from_value(err.clone()).map_err(|e| {
                PortError::Transport(format!("eip1193 proxy returned malformed error {err}: {e}"))
            })?;
            return Err(RequestError::Rpc(rpc));
        }
        if !status.is_success() {
            return Err(
                PortError::Transport(format!("eip1193 proxy status {status}: {body}")).into(),
            );
        }
        body.get("result")
            .cloned()
            .ok_or_else(|| PortError::Transport("eip1193 proxy missing result".to_owned()).into())
    }
}

#[async_trait(?Send)]
impl ProviderPort for Eip1193Adapter {
    fn is_available(&self) -> bool {
        match &self.mode {
            ProviderMode::Disabled(_) => false,
            ProviderMode::Deterministic => true,
            #[cfg(not(target_arch = "wasm32"))]
            ProviderMode::Proxy(_) => true,
            #[cfg(target_arch = "wasm32")]
            ProviderMode::Browser => browser_provider_available(),
        }
    }

    async fn request_accounts(&self) -> Result<Vec<Address>, PortError> {
        let result = self
            .request("eth_requestAccounts", json!([]))
            .await
            .map_err(|e| {
                e.into_port(
                    |rpc| {
                        if rpc.is_user_rejection() {
                            PortError::UserRejected(rpc.reason())
                        } else {
                            PortError::Transport(rpc.reason())
                        }
                    },
                    PortError::Transport,
                )
            })?;
        let accounts = parse_accounts(&result)?;

        #[cfg(target_arch = "wasm32")]
        if matches!(self.mode, ProviderMode::Browser) {
            if let Err(e) = self.register_browser_hooks() {
                tracing::warn!(error = %e, "wallet events unavailable");
            }
        }

        Ok(accounts)
    }

    async fn chain_id(&self) -> Result<u64, PortError> {
        let result = self
            .request("eth_chainId", json!([]))
            .await
            .map_err(|e| {
                e.into_port(
                    |rpc| PortError::QueryFailed(rpc.reason()),
                    PortError::QueryFailed,
                )
            })?;
        json_quantity_to_u64(&result).map_err(|e| PortError::QueryFailed(e.to_string()))
    }

    async fn switch_chain(&self, chain_id: u64) -> Result<(), PortError> {
        let params = json!([{ "chainId": chain_id_hex(chain_id) }]);
        self.request("wallet_switchEthereumChain", params)
            .await
            .map_err(|e| {
                e.into_port(
                    |rpc| {
                        if rpc.effective_code() == RpcError::UNRECOGNIZED_CHAIN {
                            PortError::ChainNotRegistered(chain_id)
                        } else {
                            PortError::SwitchRejectedOrFailed(rpc.reason())
                        }
                    },
                    PortError::SwitchRejectedOrFailed,
                )
            })?;
        Ok(())
    }

    async fn add_chain(&self, network: &NetworkDescriptor) -> Result<(), PortError> {
        let params = serde_json::to_value([network.add_chain_params()])
            .map_err(|e| PortError::Validation(format!("add chain params: {e}")))?;
        self.request("wallet_addEthereumChain", params)
            .await
            .map_err(|e| {
                e.into_port(
                    |rpc| PortError::AddChainRejectedOrFailed(rpc.reason()),
                    PortError::AddChainRejectedOrFailed,
                )
            })?;
        Ok(())
    }

    async fn send_transaction(&self, tx: &TransactionPayload) -> Result<B256, PortError> {
        let params = serde_json::to_value([tx])
            .map_err(|e| PortError::Validation(format!("transaction params: {e}")))?;
        let result = self
            .request("eth_sendTransaction", params)
            .await
            .map_err(|e| {
                e.into_port(
                    |rpc| PortError::SubmissionFailed(rpc.reason()),
                    PortError::SubmissionFailed,
                )
            })?;
        let hash = result.as_str().ok_or_else(|| {
            PortError::SubmissionFailed("eth_sendTransaction must return tx hash".to_owned())
        })?;
        hash.parse()
            .map_err(|e| PortError::Validation(format!("invalid tx hash: {e}")))
    }

    async fn transaction_receipt(&self, tx_hash: B256) -> Result<Option<TxReceipt>, PortError> {
        let result = self
            .request("eth_getTransactionReceipt", json!([tx_hash.to_string()]))
            .await
            .map_err(|e| {
                e.into_port(
                    |rpc| PortError::ReceiptLookupFailed(rpc.reason()),
                    PortError::ReceiptLookupFailed,
                )
            })?;
        parse_receipt(&result)
    }

    fn drain_events(&self) -> Result<Vec<ProviderEvent>, PortError> {
        let mut g = self.lock_state()?;
        Ok(std::mem::take(&mut g.events))
    }
}

fn parse_accounts(result: &Value) -> Result<Vec<Address>, PortError> {
    let arr = result.as_array().ok_or_else(|| {
        PortError::Transport("eth_requestAccounts result must be array".to_owned())
    })?;
    arr.iter()
        .map(|item| {
            let raw = item.as_str().ok_or_else(|| {
                PortError::Transport("eth_requestAccounts item must be string".to_owned())
            })?;
            raw.parse()
                .map_err(|e| PortError::Validation(format!("invalid account: {e}")))
        })
        .collect()
}

/// `null` means not mined yet. A receipt without `status` predates
/// Byzantium and counts as success.
fn parse_receipt(result: &Value) -> Result<Option<TxReceipt>, PortError> {
    if result.is_null() {
        return Ok(None);
    }
    let block_number = match result.get("blockNumber") {
        None | Some(Value::Null) => return Ok(None),
        Some(raw) => json_quantity_to_u64(raw)
            .map_err(|e| PortError::ReceiptLookupFailed(format!("blockNumber: {e}")))?,
    };
    let succeeded = match result.get("status") {
        None | Some(Value::Null) => true,
        Some(raw) => {
            json_quantity_to_u64(raw)
                .map_err(|e| PortError::ReceiptLookupFailed(format!("status: {e}")))?
                == 1
        }
    };
    Ok(Some(TxReceipt {
        block_number,
        succeeded,
    }))
}

#[cfg(target_arch = "wasm32")]
fn browser_provider_available() -> bool {
    browser_provider().is_ok()
}

#[cfg(target_arch = "wasm32")]
fn browser_provider() -> Result<wasm_bindgen::JsValue, PortError> {
    let window =
        web_sys::window().ok_or_else(|| PortError::Transport("missing window".to_owned()))?;
    let provider = get_prop(&window.into(), "ethereum")?;
    if provider.is_null() || provider.is_undefined() {
        return Err(PortError::ProviderUnavailable(
            "window.ethereum missing".to_owned(),
        ));
    }
    Ok(provider)
}

/// Waits for `promise`, or `None` once `timeout_ms` passes first. The timer
/// is cleared whichever side wins.
#[cfg(target_arch = "wasm32")]
async fn race_with_deadline(
    promise: js_sys::Promise,
    timeout_ms: u64,
) -> Result<Option<wasm_bindgen::JsValue>, RequestError> {
    let window =
        web_sys::window().ok_or_else(|| PortError::Transport("missing window".to_owned()))?;
    let marker = js_sys::Object::new();
    let delay = i32::try_from(timeout_ms).unwrap_or(i32::MAX);

    let mut armed = None;
    let timer = js_sys::Promise::new(&mut |resolve, _reject| {
        armed = Some(window.set_timeout_with_callback_and_timeout_and_arguments_1(
            &resolve, delay, &marker,
        ));
    });
    let handle = armed
        .transpose()
        .map_err(|e| PortError::Transport(format!("failed to arm request timeout: {e:?}")))?;

    let race = js_sys::Promise::race(&js_sys::Array::of2(&promise, &timer));
    let settled = wasm_bindgen_futures::JsFuture::from(race).await;
    if let Some(handle) = handle {
        window.clear_timeout_with_handle(handle);
    }

    let value = settled.map_err(|e| js_error_to_request(&e))?;
    if js_sys::Object::is(&value, &marker) {
        return Ok(None);
    }
    Ok(Some(value))
}

#[cfg(target_arch = "wasm32")]
fn get_prop(target: &wasm_bindgen::JsValue, key: &str) -> Result<wasm_bindgen::JsValue, PortError> {
    js_sys::Reflect::get(target, &wasm_bindgen::JsValue::from_str(key))
        .map_err(|e| PortError::Transport(format!("read provider property {key} failed: {e:?}")))
}

/// Provider rejections are objects carrying `code`, `message` and sometimes
/// `data`; anything else is a transport failure.
#[cfg(target_arch = "wasm32")]
fn js_error_to_request(err: &wasm_bindgen::JsValue) -> RequestError {
    let message = get_prop(err, "message")
        .ok()
        .and_then(|v| v.as_string())
        .unwrap_or_else(|| format!("{err:?}"));
    match get_prop(err, "code").ok().and_then(|v| v.as_f64()) {
        Some(code) => RequestError::Rpc(RpcError {
            code: code as i64,
            message,
            data: get_prop(err, "data")
                .ok()
                .and_then(|d| serde_wasm_bindgen::from_value(d).ok()),
        }),
        None => RequestError::Port(PortError::Transport(format!(
            "provider request rejected: {message}"
        ))),
    }
}

#[cfg(target_arch = "wasm32")]
fn js_chain_id_to_u64(value: wasm_bindgen::JsValue) -> Result<u64, PortError> {
    if let Some(s) = value.as_string() {
        return crate::rpc::parse_quantity(&s);
    }
    if let Some(num) = value.as_f64() {
        return Ok(num as u64);
    }
    Err(PortError::Validation("invalid JS chain id".to_owned()))
}
