//! JSON-RPC wallet.
//!
//! Talks to a node (or a wallet bridge) that manages the signing key, the
//! same way an injected browser wallet does: accounts come from
//! `eth_requestAccounts`, writes go through `eth_sendTransaction` and are
//! confirmed by polling `eth_getTransactionReceipt`, reads use `eth_call`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info};

use esg_types::{Address, ContentId, ReportStatus, TokenAmount, TxHash, TxRef};

use crate::abi;
use crate::error::{ChainError, ChainResult, METHOD_NOT_FOUND_CODE};
use crate::traits::{Governance, Token, Wallet};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Connection settings for [`RpcWallet`].
#[derive(Clone, Debug)]
pub struct RpcConfig {
    pub url: String,
    /// Delay between receipt polls.
    pub poll_interval: Duration,
    /// How long to wait for a sent transaction to be mined.
    pub confirmation_timeout: Duration,
}

impl RpcConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            poll_interval: Duration::from_secs(1),
            confirmation_timeout: Duration::from_secs(120),
        }
    }
}

#[derive(Deserialize)]
struct RpcResponse {
    result: Option<Value>,
    error: Option<RpcErrorObject>,
}

#[derive(Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReceiptView {
    status: Option<String>,
    block_number: Option<String>,
}

fn parse_quantity(s: &str) -> ChainResult<u64> {
    let digits = s.strip_prefix("0x").unwrap_or(s);
    u64::from_str_radix(digits, 16).map_err(|e| ChainError::Abi(format!("bad quantity {s:?}: {e}")))
}

fn decode_data(s: &str) -> ChainResult<Vec<u8>> {
    hex::decode(s.strip_prefix("0x").unwrap_or(s)).map_err(|e| ChainError::Abi(format!("bad hex data: {e}")))
}

struct RpcClient {
    http: reqwest::Client,
    config: RpcConfig,
    next_id: AtomicU64,
}

impl RpcClient {
    async fn request<T: DeserializeOwned>(&self, method: &str, params: Value) -> ChainResult<T> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        debug!(method, id, "rpc request");
        let body = json!({ "jsonrpc": "2.0", "id": id, "method": method, "params": params });
        let response: RpcResponse = self
            .http
            .post(&self.config.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ChainError::Transport(e.to_string()))?
            .json()
            .await
            .map_err(|e| ChainError::Transport(format!("invalid rpc response: {e}")))?;
        if let Some(err) = response.error {
            debug!(method, id, code = err.code, "rpc error");
            return Err(ChainError::from_rpc(err.code, err.message));
        }
        serde_json::from_value(response.result.unwrap_or(Value::Null))
            .map_err(|e| ChainError::Abi(format!("unexpected {method} result: {e}")))
    }

    async fn accounts(&self) -> ChainResult<Vec<String>> {
        match self.request("eth_requestAccounts", json!([])).await {
            Err(ChainError::Rpc { code, .. }) if code == METHOD_NOT_FOUND_CODE => {
                self.request("eth_accounts", json!([])).await
            }
            other => other,
        }
    }

    async fn send_transaction(&self, from: &Address, to: &Address, data: Vec<u8>) -> ChainResult<TxRef> {
        let tx = json!({
            "from": from.to_hex(),
            "to": to.to_hex(),
            "data": format!("0x{}", hex::encode(data)),
        });
        let hash: String = self.request("eth_sendTransaction", json!([tx])).await?;
        let hash = TxHash::from_hex(&hash).map_err(|e| ChainError::Abi(format!("bad transaction hash: {e}")))?;
        debug!(tx = %hash.short_hex(), "transaction sent");
        self.wait_for_receipt(hash).await
    }

    async fn wait_for_receipt(&self, hash: TxHash) -> ChainResult<TxRef> {
        let deadline = tokio::time::Instant::now() + self.config.confirmation_timeout;
        loop {
            let receipt: Option<ReceiptView> = self
                .request("eth_getTransactionReceipt", json!([hash.to_hex()]))
                .await?;
            if let Some(receipt) = receipt {
                if receipt.status.as_deref().map(parse_quantity).transpose()? == Some(0) {
                    return Err(ChainError::Reverted(hash.to_hex()));
                }
                let block = receipt.block_number.as_deref().map(parse_quantity).transpose()?;
                return Ok(TxRef::new(hash, block));
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(ChainError::Timeout(hash.to_hex()));
            }
            tokio::time::sleep(self.config.poll_interval).await;
        }
    }

    async fn call(&self, to: &Address, data: Vec<u8>) -> ChainResult<Vec<u8>> {
        let call = json!({ "to": to.to_hex(), "data": format!("0x{}", hex::encode(data)) });
        let result: String = self.request("eth_call", json!([call, "latest"])).await?;
        decode_data(&result)
    }
}

/// Wallet reached over JSON-RPC.
#[derive(Clone)]
pub struct RpcWallet {
    client: Arc<RpcClient>,
}

impl RpcWallet {
    pub fn new(config: RpcConfig) -> ChainResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| ChainError::Internal(format!("HTTP client build failed: {e}")))?;
        info!(url = %config.url, "rpc wallet configured");
        Ok(Self {
            client: Arc::new(RpcClient {
                http,
                config,
                next_id: AtomicU64::new(1),
            }),
        })
    }

    pub fn url(&self) -> &str {
        &self.client.config.url
    }
}

#[async_trait]
impl Wallet for RpcWallet {
    async fn request_accounts(&self) -> ChainResult<Address> {
        let accounts = self.client.accounts().await?;
        let first = accounts
            .first()
            .ok_or_else(|| ChainError::MissingCapability("wallet exposes no accounts".into()))?;
        Address::from_hex(first).map_err(|e| ChainError::Abi(format!("bad account {first:?}: {e}")))
    }

    fn governance(&self, contract: Address, signer: Address) -> Arc<dyn Governance> {
        Arc::new(RpcBinding {
            client: Arc::clone(&self.client),
            contract,
            signer,
        })
    }

    fn token(&self, contract: Address, signer: Address) -> Arc<dyn Token> {
        Arc::new(RpcBinding {
            client: Arc::clone(&self.client),
            contract,
            signer,
        })
    }
}

/// A contract bound to an address and a sending account.
struct RpcBinding {
    client: Arc<RpcClient>,
    contract: Address,
    signer: Address,
}

#[async_trait]
impl Governance for RpcBinding {
    async fn register_content(&self, id: &ContentId) -> ChainResult<TxRef> {
        self.client
            .send_transaction(&self.signer, &self.contract, abi::encode_register_content(id))
            .await
    }

    async fn attest_report(&self, id: &ContentId, passed: bool, reason: &str) -> ChainResult<TxRef> {
        self.client
            .send_transaction(&self.signer, &self.contract, abi::encode_attest_report(id, passed, reason))
            .await
    }

    async fn report_status(&self, id: &ContentId) -> ChainResult<ReportStatus> {
        let data = self.client.call(&self.contract, abi::encode_get_report_status(id)).await?;
        abi::decode_report_status(&data)
    }
}

#[async_trait]
impl Token for RpcBinding {
    async fn balance_of(&self, owner: &Address) -> ChainResult<TokenAmount> {
        let data = self.client.call(&self.contract, abi::encode_balance_of(owner)).await?;
        abi::decode_uint256(&data)
    }
}
