use std::collections::{BTreeSet, HashMap};

use alloy::primitives::{address, keccak256, Address, B256};
use serde_json::{json, Value};

use hype_presale_core::chain_id_hex;

use crate::rpc::{json_quantity_to_u64, RpcError};

pub const SIMULATED_ACCOUNT: Address = address!("1000000000000000000000000000000000000001");

/// In-memory wallet answering EIP-1193 requests at the JSON level.
///
/// It starts with one account on `chain_id` and only knows chain 1 plus its
/// starting chain, so switching to anything else first yields code 4902.
/// Sent transactions are mined immediately, one block each.
#[derive(Debug, Clone)]
pub(crate) struct SimulatedWallet {
    pub accounts: Vec<Address>,
    pub chain_id: u64,
    pub known_chains: BTreeSet<u64>,
    block_number: u64,
    nonce: u64,
    receipts: HashMap<B256, Value>,
    rejections: HashMap<String, i64>,
}

impl SimulatedWallet {
    pub fn new(chain_id: u64) -> Self {
        Self {
            accounts: vec![SIMULATED_ACCOUNT],
            chain_id,
            known_chains: BTreeSet::from([1, chain_id]),
            block_number: 1_000,
            nonce: 0,
            receipts: HashMap::new(),
            rejections: HashMap::new(),
        }
    }

    /// The next call to `method` fails with `code` instead of running.
    pub fn reject_next(&mut self, method: &str, code: i64) {
        self.rejections.insert(method.to_owned(), code);
    }

    pub fn handle(&mut self, method: &str, params: &Value) -> Result<Value, RpcError> {
        if let Some(code) = self.rejections.remove(method) {
            let message = match code {
                RpcError::USER_REJECTED => "User rejected the request.",
                _ => "simulated wallet failure",
            };
            return Err(RpcError::new(code, message));
        }

        match method {
            "eth_requestAccounts" | "eth_accounts" => Ok(json!(self
                .accounts
                .iter()
                .map(|a| a.to_string())
                .collect::<Vec<_>>())),
            "eth_chainId" => Ok(json!(chain_id_hex(self.chain_id))),
            "wallet_switchEthereumChain" => {
                let chain_id = first_param_chain_id(params)?;
                if !self.known_chains.contains(&chain_id) {
                    return Err(RpcError::new(
                        RpcError::UNRECOGNIZED_CHAIN,
                        format!(
                            "Unrecognized chain ID \"{}\". Try adding the chain using wallet_addEthereumChain first.",
                            chain_id_hex(chain_id)
                        ),
                    ));
                }
                self.chain_id = chain_id;
                Ok(Value::Null)
            }
            "wallet_addEthereumChain" => {
                let chain_id = first_param_chain_id(params)?;
                let has_rpc = params[0]["rpcUrls"]
                    .as_array()
                    .is_some_and(|urls| urls.iter().any(Value::is_string));
                if !has_rpc || !params[0]["nativeCurrency"].is_object() {
                    return Err(RpcError::new(
                        RpcError::INVALID_PARAMS,
                        "Expected rpcUrls and nativeCurrency",
                    ));
                }
                self.known_chains.insert(chain_id);
                Ok(Value::Null)
            }
            "eth_sendTransaction" => self.send_transaction(&params[0]),
            "eth_getTransactionReceipt" => {
                let hash: B256 = params[0]
                    .as_str()
                    .and_then(|s| s.parse().ok())
                    .ok_or_else(|| {
                        RpcError::new(RpcError::INVALID_PARAMS, "Expected transaction hash")
                    })?;
                Ok(self.receipts.get(&hash).cloned().unwrap_or(Value::Null))
            }
            other => Err(RpcError::new(
                RpcError::UNSUPPORTED_METHOD,
                format!("The method \"{other}\" does not exist / is not available."),
            )),
        }
    }

    fn send_transaction(&mut self, tx: &Value) -> Result<Value, RpcError> {
        let from: Option<Address> = tx["from"].as_str().and_then(|s| s.parse().ok());
        if from.is_none() || from != self.accounts.first().copied() {
            return Err(RpcError::new(
                RpcError::UNAUTHORIZED,
                "The requested account has not been authorized by the user.",
            ));
        }
        if !tx["chainId"].is_null() {
            let requested = json_quantity_to_u64(&tx["chainId"])
                .map_err(|e| RpcError::new(RpcError::INVALID_PARAMS, e.to_string()))?;
            if requested != self.chain_id {
                return Err(RpcError::new(
                    RpcError::INVALID_PARAMS,
                    format!(
                        "Invalid chainId {} for the active chain {}",
                        chain_id_hex(requested),
                        chain_id_hex(self.chain_id)
                    ),
                ));
            }
        }

        self.nonce += 1;
        self.block_number += 1;
        let mut seed = tx.to_string().into_bytes();
        seed.extend_from_slice(&self.nonce.to_be_bytes());
        let hash = keccak256(seed);
        self.receipts.insert(
            hash,
            json!({
                "transactionHash": hash.to_string(),
                "blockNumber": format!("{:#x}", self.block_number),
                "status": "0x1",
            }),
        );
        Ok(json!(hash.to_string()))
    }
}

fn first_param_chain_id(params: &Value) -> Result<u64, RpcError> {
    json_quantity_to_u64(&params[0]["chainId"])
        .map_err(|e| RpcError::new(RpcError::INVALID_PARAMS, e.to_string()))
}
