use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use contract_invoker::network::{
    FromNetworkBuilder, Info, NetworkBuilder, NetworkClient, NetworkInfo,
};
use contract_invoker::abi::AbiDescriptor;
use contract_invoker::operations::CallParameters;
use contract_invoker::result::{ExecutionFinalResult, ExecutionStatus};
use contract_invoker::rpc::types::{NodeInfo, SignedCall};
use contract_invoker::types::{AssetId, TxId};
use contract_invoker::{
    invoke, invoke_on, CredentialSource, Error, ErrorKind, InMemorySigner, Invocation,
    InvokerConfig, Mode, SecretKey, Worker,
};
use secrecy::SecretString;
use serde_json::{json, Value};
use test_log::test;

const CONTRACT: &str = "0x7777777777777777777777777777777777777777777777777777777777777777";

/// Stands in for a node: records every call it receives and answers with a
/// fixed status.
struct MockNode {
    info: Info,
    status: ExecutionStatus,
    calls: Arc<Mutex<Vec<SignedCall>>>,
    dry_runs: Arc<AtomicUsize>,
}

impl MockNode {
    fn new(status: ExecutionStatus) -> Self {
        let node = node_info();
        Self {
            info: Info::new("mock", "http://mock.invalid/".parse().unwrap(), &node),
            status,
            calls: Arc::default(),
            dry_runs: Arc::default(),
        }
    }

    fn outcome(&self, call: &SignedCall) -> ExecutionFinalResult {
        // Derive a distinct transaction id per call from its salt.
        let id = TxId::new(*call.request.salt.as_bytes());
        ExecutionFinalResult::new(id, self.status.clone())
            .with_logs(vec![json!({ "method": call.request.method })])
            .with_gas_used(21_000)
    }
}

fn node_info() -> NodeInfo {
    NodeInfo {
        name: "mocknet".into(),
        chain_id: 9889,
        node_version: "0.0.0-mock".into(),
        base_asset_id: AssetId::new([0xba; 32]),
        latest_block_height: 100,
    }
}

#[async_trait]
impl NetworkClient for MockNode {
    async fn status(&self) -> contract_invoker::Result<NodeInfo> {
        Ok(node_info())
    }

    async fn submit_call(&self, call: &SignedCall) -> contract_invoker::Result<ExecutionFinalResult> {
        call.verify()?;
        self.calls.lock().unwrap().push(call.clone());
        Ok(self.outcome(call).with_block_height(node_info().latest_block_height + 1))
    }

    async fn dry_run_call(&self, call: &SignedCall) -> contract_invoker::Result<ExecutionFinalResult> {
        call.verify()?;
        self.dry_runs.fetch_add(1, Ordering::SeqCst);
        Ok(self.outcome(call))
    }
}

impl NetworkInfo for MockNode {
    fn info(&self) -> &Info {
        &self.info
    }
}

/// A node that can never be reached.
struct Unreachable;

#[async_trait]
impl FromNetworkBuilder for Unreachable {
    async fn from_builder<'a>(build: NetworkBuilder<'a, Self>) -> contract_invoker::Result<Self> {
        Err(Error::message(
            ErrorKind::Connection,
            format!("no route to {}", build.rpc_addr.unwrap_or_default()),
        ))
    }
}

#[async_trait]
impl NetworkClient for Unreachable {
    async fn status(&self) -> contract_invoker::Result<NodeInfo> {
        unreachable!()
    }

    async fn submit_call(&self, _: &SignedCall) -> contract_invoker::Result<ExecutionFinalResult> {
        unreachable!()
    }

    async fn dry_run_call(&self, _: &SignedCall) -> contract_invoker::Result<ExecutionFinalResult> {
        unreachable!()
    }
}

impl NetworkInfo for Unreachable {
    fn info(&self) -> &Info {
        unreachable!()
    }
}

fn abi_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/airdrop-abi.json")
}

fn config() -> InvokerConfig {
    let key = hex::encode(rand::random::<[u8; 32]>());
    InvokerConfig {
        endpoint: "http://127.0.0.1:4000".into(),
        api_key: None,
        credential: CredentialSource::Inline(SecretString::new(key)),
        contract_id: CONTRACT.parse().unwrap(),
        abi_path: abi_path(),
    }
}

fn recipient() -> Value {
    json!({ "Address": { "value": format!("0x{}", "cd".repeat(32)) } })
}

#[test(tokio::test)]
async fn test_claim_round_trip() -> anyhow::Result<()> {
    let node = MockNode::new(ExecutionStatus::Success(Value::Null));
    let calls = Arc::clone(&node.calls);
    let worker = Worker::new(node);
    let config = config();

    let mut out = Vec::new();
    let success = invoke_on(
        &worker,
        &config,
        Invocation::new("claim").args(vec![json!(1), recipient()]),
        &mut out,
    )
    .await?;

    let calls = calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    let call = &calls[0].request;
    assert_eq!(call.method, "claim");
    assert_eq!(call.args, vec![json!(1), recipient()]);
    assert_eq!(call.contract_id.to_string(), CONTRACT);
    assert_eq!(call.signer, config.credential.load()?.address());
    assert_eq!(call.forward, None);

    let printed: Value = serde_json::from_slice(&out)?;
    assert_eq!(printed["transaction_id"], json!(success.transaction_id.to_string()));
    assert_eq!(printed["value"], Value::Null);
    assert_eq!(printed["gas_used"], json!(21_000));
    assert_eq!(printed["logs"], json!([{ "method": "claim" }]));
    assert!(out.ends_with(b"\n"));

    Ok(())
}

#[test(tokio::test)]
async fn test_unknown_method_sends_nothing() -> anyhow::Result<()> {
    let node = MockNode::new(ExecutionStatus::Success(Value::Null));
    let calls = Arc::clone(&node.calls);
    let worker = Worker::new(node);

    let mut out = Vec::new();
    let err = invoke_on(&worker, &config(), Invocation::new("claim_all"), &mut out)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), &ErrorKind::MethodNotFound);
    assert!(calls.lock().unwrap().is_empty());
    assert!(out.is_empty());
    Ok(())
}

#[test(tokio::test)]
async fn test_wrong_arity_sends_nothing() -> anyhow::Result<()> {
    let node = MockNode::new(ExecutionStatus::Success(Value::Null));
    let calls = Arc::clone(&node.calls);
    let worker = Worker::new(node);

    let mut out = Vec::new();
    let err = invoke_on(
        &worker,
        &config(),
        Invocation::new("claim").args(vec![json!(1)]),
        &mut out,
    )
    .await
    .unwrap_err();

    assert_eq!(err.kind(), &ErrorKind::ArgumentMismatch);
    assert!(calls.lock().unwrap().is_empty());
    assert!(out.is_empty());
    Ok(())
}

#[test(tokio::test)]
async fn test_connect_failure() -> anyhow::Result<()> {
    let mut out = Vec::new();
    let err = invoke::<Unreachable, _>(&config(), Invocation::new("clawback"), &mut out)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), &ErrorKind::Connection);
    assert!(err.to_string().contains("127.0.0.1:4000"));
    assert!(out.is_empty());
    Ok(())
}

#[test(tokio::test)]
async fn test_forward_amount_is_passed_through() -> anyhow::Result<()> {
    let node = MockNode::new(ExecutionStatus::Success(Value::Null));
    let calls = Arc::clone(&node.calls);
    let worker = Worker::new(node);

    let invocation = Invocation::new("constructor")
        .args(vec![recipient(), json!(86_400)])
        .call_params(CallParameters::default().forward(1_000));
    invoke_on(&worker, &config(), invocation, &mut Vec::new()).await?;

    let calls = calls.lock().unwrap();
    let forward = calls[0].request.forward.expect("forward was requested");
    assert_eq!(forward.amount, 1_000);
    assert_eq!(forward.asset_id, AssetId::new([0xba; 32]));
    Ok(())
}

#[test(tokio::test)]
async fn test_forward_to_non_payable_is_rejected() -> anyhow::Result<()> {
    let node = MockNode::new(ExecutionStatus::Success(Value::Null));
    let calls = Arc::clone(&node.calls);
    let worker = Worker::new(node);

    let invocation = Invocation::new("claim")
        .args(vec![json!(1), recipient()])
        .call_params(CallParameters::default().forward(5));
    let err = invoke_on(&worker, &config(), invocation, &mut Vec::new())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), &ErrorKind::ArgumentMismatch);
    assert!(calls.lock().unwrap().is_empty());
    Ok(())
}

#[test(tokio::test)]
async fn test_repeated_invocations_are_not_deduplicated() -> anyhow::Result<()> {
    let node = MockNode::new(ExecutionStatus::Success(Value::Null));
    let calls = Arc::clone(&node.calls);
    let worker = Worker::new(node);
    let config = config();

    let first = invoke_on(&worker, &config, Invocation::new("clawback"), &mut Vec::new()).await?;
    let second = invoke_on(&worker, &config, Invocation::new("clawback"), &mut Vec::new()).await?;

    let calls = calls.lock().unwrap();
    assert_eq!(calls.len(), 2);
    assert_ne!(calls[0].request.salt, calls[1].request.salt);
    assert_ne!(calls[0].signature, calls[1].signature);
    assert_ne!(first.transaction_id, second.transaction_id);
    Ok(())
}

#[test(tokio::test)]
async fn test_revert_is_execution_error() -> anyhow::Result<()> {
    let node = MockNode::new(ExecutionStatus::Revert("NotEligible".into()));
    let worker = Worker::new(node);

    let mut out = Vec::new();
    let err = invoke_on(
        &worker,
        &config(),
        Invocation::new("claim").args(vec![json!(1), recipient()]),
        &mut out,
    )
    .await
    .unwrap_err();

    assert_eq!(err.kind(), &ErrorKind::Execution);
    assert_eq!(err.details().map(|d| d.value.as_str()), Some("NotEligible"));
    assert!(out.is_empty());
    Ok(())
}

#[test(tokio::test)]
async fn test_simulate_uses_dry_run() -> anyhow::Result<()> {
    let node = MockNode::new(ExecutionStatus::Success(json!(3)));
    let calls = Arc::clone(&node.calls);
    let dry_runs = Arc::clone(&node.dry_runs);
    let worker = Worker::new(node);

    let invocation = Invocation::new("eligible")
        .args(vec![json!([recipient(), recipient(), recipient()])])
        .mode(Mode::Simulate);
    let success = invoke_on(&worker, &config(), invocation, &mut Vec::new()).await?;

    assert_eq!(success.json::<u64>()?, 3);
    assert_eq!(dry_runs.load(Ordering::SeqCst), 1);
    assert!(calls.lock().unwrap().is_empty());
    Ok(())
}

#[test(tokio::test)]
async fn test_only_submitted_calls_land_in_a_block() -> anyhow::Result<()> {
    let worker = Worker::new(MockNode::new(ExecutionStatus::Success(Value::Null)));
    let abi = Arc::new(AbiDescriptor::from_file(&abi_path())?);
    let contract = worker
        .account(InMemorySigner::from_secret_key(SecretKey::from_random()))
        .contract(CONTRACT.parse()?, abi);

    let submitted = contract.call("clawback").transact().await?;
    assert_eq!(submitted.block_height, Some(101));

    let simulated = contract.call("clawback").simulate().await?;
    assert_eq!(simulated.block_height, None);
    assert_ne!(submitted.transaction_id, simulated.transaction_id);
    Ok(())
}

#[test(tokio::test)]
async fn test_bad_credential_sends_nothing() -> anyhow::Result<()> {
    let node = MockNode::new(ExecutionStatus::Success(Value::Null));
    let calls = Arc::clone(&node.calls);
    let worker = Worker::new(node);
    let config = InvokerConfig {
        credential: CredentialSource::Inline(SecretString::new("PRIVATE_KEY".into())),
        ..config()
    };

    let err = invoke_on(&worker, &config, Invocation::new("clawback"), &mut Vec::new())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), &ErrorKind::Credential);
    assert!(!err.to_string().contains("PRIVATE_KEY"));
    assert!(calls.lock().unwrap().is_empty());
    Ok(())
}
