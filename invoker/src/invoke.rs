//! One complete invocation: connect, derive the signer, load the ABI, call a
//! single method and print what came back.

use std::io::Write;
use std::sync::Arc;

use secrecy::ExposeSecret;
use serde_json::Value;

use crate::abi::AbiDescriptor;
use crate::config::InvokerConfig;
use crate::error::ErrorKind;
use crate::network::{FromNetworkBuilder, NetworkBuilder};
use crate::operations::CallParameters;
use crate::result::{ExecutionSuccess, Result};
use crate::{Network, Worker};

/// Whether the call is committed to the chain or only executed by the node.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Submit,
    Simulate,
}

/// The method to call and everything that goes with it.
#[derive(Clone, Debug, PartialEq)]
pub struct Invocation {
    pub method: String,
    pub args: Vec<Value>,
    pub params: CallParameters,
    pub mode: Mode,
}

impl Invocation {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            args: Vec::new(),
            params: CallParameters::default(),
            mode: Mode::default(),
        }
    }

    pub fn args(mut self, args: Vec<Value>) -> Self {
        self.args = args;
        self
    }

    pub fn call_params(mut self, params: CallParameters) -> Self {
        self.params = params;
        self
    }

    pub fn mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }
}

/// Connect to the endpoint in `config` as network `N` and run `invocation` on it.
///
/// On success the outcome is written to `out` as pretty printed JSON followed by
/// a newline, and returned. Nothing is written to `out` on failure.
pub async fn invoke<N, W>(
    config: &InvokerConfig,
    invocation: Invocation,
    out: &mut W,
) -> Result<ExecutionSuccess>
where
    N: FromNetworkBuilder + Network + 'static,
    W: Write,
{
    let mut builder = NetworkBuilder::<N>::new("custom").rpc_addr(&config.endpoint);
    if let Some(api_key) = &config.api_key {
        builder = builder.api_key(api_key.expose_secret());
    }
    let worker = builder.await?;

    invoke_on(&worker, config, invocation, out).await
}

/// Same as [`invoke`], over a connection that is already established.
pub async fn invoke_on<N, W>(
    worker: &Worker<N>,
    config: &InvokerConfig,
    invocation: Invocation,
    out: &mut W,
) -> Result<ExecutionSuccess>
where
    N: Network + ?Sized,
    W: Write,
{
    let signer = config.credential.load()?;
    let account = worker.account(signer);
    tracing::debug!(target: "contract_invoker", signer = %account.address(), "derived signer");

    let abi = Arc::new(AbiDescriptor::from_file(&config.abi_path)?);
    let contract = account.contract(config.contract_id, abi);

    let call = contract
        .call(&invocation.method)
        .args(invocation.args)
        .call_params(invocation.params);
    let outcome = match invocation.mode {
        Mode::Submit => call.transact().await?,
        Mode::Simulate => call.simulate().await?,
    };
    let success = outcome.into_result()?;

    let rendered = serde_json::to_string_pretty(&success)
        .map_err(|e| ErrorKind::DataConversion.custom(e))?;
    writeln!(out, "{rendered}")?;

    Ok(success)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_invocation_builder() {
        let invocation = Invocation::new("claim")
            .args(vec![json!(1), json!({"Address": {"value": "0x00"}})])
            .call_params(CallParameters::default().forward(5))
            .mode(Mode::Simulate);

        assert_eq!(invocation.method, "claim");
        assert_eq!(invocation.args.len(), 2);
        assert_eq!(invocation.params.forward_amount, Some(5));
        assert_eq!(invocation.mode, Mode::Simulate);
        assert_eq!(Invocation::new("clawback").mode, Mode::Submit);
    }
}
