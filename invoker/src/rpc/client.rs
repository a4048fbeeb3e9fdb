use std::sync::atomic::{AtomicU64, Ordering};

use reqwest::header::{HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::error::{Error, ErrorKind};
use crate::result::{CallOutcomeView, ExecutionFinalResult, Result};
use crate::rpc::types::{JsonRpcRequest, JsonRpcResponse, NodeInfo, RpcErrorObject, SignedCall};

const API_KEY_HEADER: &str = "x-api-key";

/// Everything that can go wrong with a single JSON-RPC round trip. Which
/// [`ErrorKind`] each of these becomes depends on the request being made.
#[derive(Debug)]
enum RpcFailure {
    Transport(reqwest::Error),
    Status(reqwest::StatusCode, String),
    Malformed(String),
    Remote(RpcErrorObject),
}

impl RpcFailure {
    /// During the handshake every failure means we have no usable connection.
    fn into_handshake_error(self, url: &Url) -> Error {
        let msg = format!("handshake with {url} failed");
        match self {
            RpcFailure::Transport(err) => ErrorKind::Connection.full(msg, err),
            RpcFailure::Status(status, _) => {
                ErrorKind::Connection.message(format!("{msg}: HTTP {status}"))
            }
            RpcFailure::Malformed(reason) => {
                ErrorKind::Connection.message(format!("{msg}: malformed response: {reason}"))
            }
            RpcFailure::Remote(err) => ErrorKind::Connection.full(msg, err),
        }
    }

    /// Once connected, the node speaking up means the call itself was refused.
    fn into_call_error(self, method: &str) -> Error {
        match self {
            RpcFailure::Transport(err) => {
                ErrorKind::Connection.full(format!("lost connection during `{method}`"), err)
            }
            RpcFailure::Status(status, body) => ErrorKind::Connection
                .message(format!("`{method}` answered with HTTP {status}: {body}")),
            RpcFailure::Malformed(reason) => ErrorKind::DataConversion
                .message(format!("malformed `{method}` response: {reason}")),
            RpcFailure::Remote(err) => ErrorKind::Execution.full("node rejected the call", err),
        }
    }
}

/// A client for talking to a node over JSON-RPC. No timeout or retry policy is
/// layered on top of the HTTP client's own defaults.
pub struct Client {
    http: reqwest::Client,
    rpc_url: Url,
    request_id: AtomicU64,
}

impl Client {
    pub(crate) fn new(rpc_addr: &str, api_key: Option<String>) -> Result<Self> {
        let rpc_url = Url::parse(rpc_addr).map_err(|err| {
            ErrorKind::Connection.full(format!("invalid endpoint `{rpc_addr}`"), err)
        })?;

        let mut headers = HeaderMap::new();
        if let Some(api_key) = api_key {
            let mut value = HeaderValue::from_str(&api_key)
                .map_err(|err| ErrorKind::Configuration.full("invalid api key", err))?;
            value.set_sensitive(true);
            headers.insert(API_KEY_HEADER, value);
        }
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|err| ErrorKind::Connection.full("unable to build HTTP client", err))?;

        Ok(Self {
            http,
            rpc_url,
            request_id: AtomicU64::new(0),
        })
    }

    pub(crate) fn rpc_url(&self) -> &Url {
        &self.rpc_url
    }

    async fn request<P, R>(&self, method: &str, params: P) -> Result<R, RpcFailure>
    where
        P: Serialize,
        R: DeserializeOwned,
    {
        let id = self.request_id.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(target: "contract_invoker::rpc", method, id, "sending request");

        let response = self
            .http
            .post(self.rpc_url.clone())
            .json(&JsonRpcRequest {
                jsonrpc: "2.0",
                id,
                method,
                params,
            })
            .send()
            .await
            .map_err(RpcFailure::Transport)?;

        let status = response.status();
        let body = response.text().await.map_err(RpcFailure::Transport)?;
        let parsed = match serde_json::from_str::<JsonRpcResponse>(&body) {
            Ok(parsed) => parsed,
            Err(_) if !status.is_success() => return Err(RpcFailure::Status(status, body)),
            Err(err) => return Err(RpcFailure::Malformed(err.to_string())),
        };

        if let Some(resp_id) = parsed.id.filter(|resp_id| *resp_id != Value::from(id)) {
            return Err(RpcFailure::Malformed(format!(
                "response id {resp_id} does not match request id {id}"
            )));
        }
        if let Some(err) = parsed.error {
            return Err(RpcFailure::Remote(err));
        }
        let result = parsed
            .result
            .ok_or_else(|| RpcFailure::Malformed("response has neither result nor error".into()))?;
        serde_json::from_value(result).map_err(|err| RpcFailure::Malformed(err.to_string()))
    }

    /// Handshake with the node. Any failure here is a [`ErrorKind::Connection`] error.
    pub(crate) async fn node_info(&self) -> Result<NodeInfo> {
        self.request("node_info", [(); 0])
            .await
            .map_err(|err| err.into_handshake_error(&self.rpc_url))
    }

    pub(crate) async fn submit_call(&self, call: &SignedCall) -> Result<ExecutionFinalResult> {
        self.call_method("submit_call", call).await
    }

    pub(crate) async fn dry_run_call(&self, call: &SignedCall) -> Result<ExecutionFinalResult> {
        self.call_method("dry_run_call", call).await
    }

    async fn call_method(&self, method: &str, call: &SignedCall) -> Result<ExecutionFinalResult> {
        self.request::<_, CallOutcomeView>(method, [call])
            .await
            .map(ExecutionFinalResult::from)
            .map_err(|err| err.into_call_error(method))
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("rpc_url", &self.rpc_url)
            .finish()
    }
}
