//! Solana JSON-RPC 2.0 client over HTTP.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::config::{Commitment, LaunchpadConfig};
use crate::connection::ChainConnection;
use crate::error::LaunchpadError;

#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct WithContext<T> {
    value: T,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BlockhashInfo {
    blockhash: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignatureStatus {
    confirmation_status: Option<String>,
    err: Option<Value>,
}

/// A [`ChainConnection`] talking to a cluster's JSON-RPC endpoint.
pub struct RpcConnection {
    client: reqwest::Client,
    url: String,
    commitment: Commitment,
    confirm_timeout: Duration,
    poll_interval: Duration,
    next_id: AtomicU64,
}

impl RpcConnection {
    pub fn new(config: &LaunchpadConfig) -> Result<Self, LaunchpadError> {
        config.validate()?;
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self {
            client,
            url: config.rpc_url.clone(),
            commitment: config.commitment,
            confirm_timeout: config.confirm_timeout(),
            poll_interval: config.confirm_poll_interval(),
            next_id: AtomicU64::new(1),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
    ) -> Result<T, LaunchpadError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });
        debug!(method, id, "rpc request");

        let response = self.client.post(&self.url).json(&request).send().await?;
        let status = response.status();
        let body: Value = response.json().await?;
        if !status.is_success() && body.get("error").is_none() {
            return Err(LaunchpadError::Http(format!("{method}: HTTP {status}")));
        }
        decode_response(body)
    }

    async fn signature_status(
        &self,
        signature: &str,
    ) -> Result<Option<SignatureStatus>, LaunchpadError> {
        let statuses: WithContext<Vec<Option<SignatureStatus>>> = self
            .call(
                "getSignatureStatuses",
                json!([[signature], { "searchTransactionHistory": false }]),
            )
            .await?;
        Ok(statuses.value.into_iter().next().flatten())
    }
}

/// Unwrap a JSON-RPC envelope into its result, or the server's error.
fn decode_response<T: DeserializeOwned>(body: Value) -> Result<T, LaunchpadError> {
    let parsed: RpcResponse<T> = serde_json::from_value(body)
        .map_err(|e| LaunchpadError::Http(format!("malformed RPC response: {e}")))?;
    if let Some(err) = parsed.error {
        return Err(LaunchpadError::Rpc {
            code: err.code,
            message: err.message,
        });
    }
    parsed
        .result
        .ok_or_else(|| LaunchpadError::Http("RPC response has no result".into()))
}

fn decode_blockhash(text: &str) -> Result<[u8; 32], LaunchpadError> {
    let bytes = bs58::decode(text)
        .into_vec()
        .map_err(|e| LaunchpadError::Http(format!("invalid blockhash {text}: {e}")))?;
    bytes
        .try_into()
        .map_err(|_| LaunchpadError::Http(format!("invalid blockhash length: {text}")))
}

#[async_trait]
impl ChainConnection for RpcConnection {
    async fn get_balance(&self, address: &[u8; 32]) -> Result<u64, LaunchpadError> {
        let balance: WithContext<u64> = self
            .call(
                "getBalance",
                json!([
                    chain_sol::bytes_to_address(address),
                    { "commitment": self.commitment.as_str() }
                ]),
            )
            .await?;
        Ok(balance.value)
    }

    async fn get_latest_blockhash(&self) -> Result<[u8; 32], LaunchpadError> {
        let info: WithContext<BlockhashInfo> = self
            .call(
                "getLatestBlockhash",
                json!([{ "commitment": self.commitment.as_str() }]),
            )
            .await?;
        decode_blockhash(&info.value.blockhash)
    }

    async fn get_minimum_balance_for_rent_exemption(
        &self,
        data_len: usize,
    ) -> Result<u64, LaunchpadError> {
        self.call("getMinimumBalanceForRentExemption", json!([data_len]))
            .await
    }

    async fn request_airdrop(
        &self,
        address: &[u8; 32],
        lamports: u64,
    ) -> Result<String, LaunchpadError> {
        self.call(
            "requestAirdrop",
            json!([
                chain_sol::bytes_to_address(address),
                lamports,
                { "commitment": self.commitment.as_str() }
            ]),
        )
        .await
    }

    async fn send_raw_transaction(&self, wire: &[u8]) -> Result<String, LaunchpadError> {
        let encoded = base64::engine::general_purpose::STANDARD.encode(wire);
        self.call(
            "sendTransaction",
            json!([
                encoded,
                {
                    "encoding": "base64",
                    "preflightCommitment": self.commitment.as_str()
                }
            ]),
        )
        .await
    }

    async fn confirm_transaction(&self, signature: &str) -> Result<(), LaunchpadError> {
        poll_confirmation(
            signature,
            self.commitment,
            self.confirm_timeout,
            self.poll_interval,
            || self.signature_status(signature),
        )
        .await
    }
}

/// What a single status read says about a submitted transaction.
#[derive(Debug, PartialEq, Eq)]
enum StatusCheck {
    Confirmed,
    Failed(String),
    Pending,
}

fn check_status(status: Option<&SignatureStatus>, commitment: Commitment) -> StatusCheck {
    let Some(status) = status else {
        return StatusCheck::Pending;
    };
    if let Some(err) = &status.err {
        return StatusCheck::Failed(err.to_string());
    }
    match status.confirmation_status.as_deref() {
        Some(reported) if commitment.is_satisfied_by(reported) => StatusCheck::Confirmed,
        _ => StatusCheck::Pending,
    }
}

/// Poll `fetch` until the transaction reaches `commitment`, fails on chain,
/// or `timeout` elapses.
async fn poll_confirmation<F, Fut>(
    signature: &str,
    commitment: Commitment,
    timeout: Duration,
    interval: Duration,
    mut fetch: F,
) -> Result<(), LaunchpadError>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<Option<SignatureStatus>, LaunchpadError>>,
{
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        let status = fetch().await?;
        match check_status(status.as_ref(), commitment) {
            StatusCheck::Confirmed => {
                debug!(signature, "transaction confirmed");
                return Ok(());
            }
            StatusCheck::Failed(reason) => {
                warn!(signature, %reason, "transaction failed on chain");
                return Err(LaunchpadError::TransactionFailed {
                    signature: signature.to_string(),
                    reason,
                });
            }
            StatusCheck::Pending => {}
        }

        if tokio::time::Instant::now() >= deadline {
            return Err(LaunchpadError::ConfirmationTimeout(signature.to_string()));
        }
        tokio::time::sleep(interval).await;
    }
}
