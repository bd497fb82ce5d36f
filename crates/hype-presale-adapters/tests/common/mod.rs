#![allow(dead_code)]

use std::io::Read;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use async_trait::async_trait;
use serde_json::{json, Value};
use tiny_http::{Response, Server, StatusCode};

use hype_presale_adapters::{Eip1193Adapter, PresaleConfig};
use hype_presale_core::{ClockPort, FlowSettings, Orchestrator, PortError};

/// Virtual clock: sleeping advances time instantly.
#[derive(Debug, Default)]
pub struct TestClock {
    now: AtomicU64,
}

#[async_trait(?Send)]
impl ClockPort for TestClock {
    fn now_ms(&self) -> Result<u64, PortError> {
        Ok(self.now.load(Ordering::SeqCst) + 1_739_750_400_000)
    }

    async fn sleep_ms(&self, ms: u64) {
        self.now.fetch_add(ms, Ordering::SeqCst);
    }
}

pub type TestOrchestrator = Orchestrator<Eip1193Adapter, TestClock>;

pub fn new_orchestrator(adapter: Eip1193Adapter) -> TestOrchestrator {
    Orchestrator::new(
        adapter,
        TestClock::default(),
        FlowSettings {
            confirmation_timeout_ms: 10_000,
            receipt_poll_interval_ms: 1_000,
            ..FlowSettings::default()
        },
    )
}

pub fn proxy_config(base_url: String) -> PresaleConfig {
    PresaleConfig {
        eip1193_proxy_url: Some(base_url),
        provider_request_timeout_ms: 5_000,
        ..PresaleConfig::default()
    }
}

/// JSON-RPC request as seen by the mock proxy.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub id: Value,
    pub method: String,
    pub params: Value,
}

/// Answer for one request: either `result` or an `error` object.
pub type Reply = Result<Value, Value>;

/// Mock EIP-1193 proxy. `handler` answers each JSON-RPC call; requests are
/// recorded in arrival order.
pub fn spawn_mock_proxy<F>(handler: F) -> (String, Arc<Mutex<Vec<RecordedCall>>>)
where
    F: FnMut(&str, &Value) -> Reply + Send + 'static,
{
    spawn_mock_proxy_with_delay(0, handler)
}

pub fn spawn_mock_proxy_with_delay<F>(
    delay_ms: u64,
    mut handler: F,
) -> (String, Arc<Mutex<Vec<RecordedCall>>>)
where
    F: FnMut(&str, &Value) -> Reply + Send + 'static,
{
    let server = Server::http("127.0.0.1:0").expect("start server");
    let addr = format!("http://{}", server.server_addr());
    let calls = Arc::new(Mutex::new(Vec::new()));
    let recorded = Arc::clone(&calls);

    thread::spawn(move || {
        for mut req in server.incoming_requests() {
            let mut body = String::new();
            if req.as_reader().read_to_string(&mut body).is_err() {
                let _ = req.respond(Response::empty(StatusCode(400)));
                continue;
            }
            let parsed: Value = serde_json::from_str(&body).unwrap_or(Value::Null);
            let call = RecordedCall {
                id: parsed["id"].clone(),
                method: parsed["method"].as_str().unwrap_or_default().to_owned(),
                params: parsed["params"].clone(),
            };
            if let Ok(mut g) = recorded.lock() {
                g.push(call.clone());
            }

            let payload = match handler(&call.method, &call.params) {
                Ok(result) => json!({ "jsonrpc": "2.0", "id": call.id, "result": result }),
                Err(error) => json!({ "jsonrpc": "2.0", "id": call.id, "error": error }),
            };
            if delay_ms > 0 {
                thread::sleep(std::time::Duration::from_millis(delay_ms));
            }
            let _ = req.respond(Response::from_string(payload.to_string()));
        }
    });

    (addr, calls)
}

pub fn methods(calls: &Arc<Mutex<Vec<RecordedCall>>>) -> Vec<String> {
    calls
        .lock()
        .expect("calls lock")
        .iter()
        .map(|c| c.method.clone())
        .collect()
}

pub fn owner_hex() -> &'static str {
    "0x1000000000000000000000000000000000000001"
}
