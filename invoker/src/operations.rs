//! All operation types that are generated/used when making calls into a contract.

use serde_json::Value;

use crate::error::ErrorKind;
use crate::network::Contract;
use crate::result::{ExecutionFinalResult, Result};
use crate::rpc::types::{CallRequest, Forward, SignedCall};
use crate::types::{AssetId, Balance, Bits256, Gas};
use crate::Network;

/// Parameters attached to a call, on top of the method arguments.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CallParameters {
    /// Amount to transfer to the contract as part of the call.
    pub forward_amount: Option<Balance>,
    /// Asset the forwarded amount is denominated in. Defaults to the network's base asset.
    pub forward_asset: Option<AssetId>,
    pub gas_limit: Option<Gas>,
}

impl CallParameters {
    pub fn forward(mut self, amount: Balance) -> Self {
        self.forward_amount = Some(amount);
        self
    }

    pub fn forward_asset(mut self, asset_id: AssetId) -> Self {
        self.forward_asset = Some(asset_id);
        self
    }

    pub fn gas_limit(mut self, gas: Gas) -> Self {
        self.gas_limit = Some(gas);
        self
    }
}

/// A set of arguments we can provide to a call, containing the function name,
/// its positional arguments and the call parameters.
#[derive(Debug)]
pub struct Function<'a> {
    pub(crate) name: &'a str,
    // Result used to defer errors in argument serialization to later when calling into transact
    pub(crate) args: Result<Vec<Value>>,
    pub(crate) params: CallParameters,
}

impl<'a> Function<'a> {
    pub fn new(name: &'a str) -> Self {
        Self {
            name,
            args: Ok(Vec::new()),
            params: CallParameters::default(),
        }
    }

    /// Provide the positional arguments for the call, one JSON value per ABI parameter.
    pub fn args(mut self, args: Vec<Value>) -> Self {
        if self.args.is_err() {
            return self;
        }
        self.args = Ok(args);
        self
    }

    /// Similar to `args`, but takes anything that serializes to a JSON array,
    /// such as a tuple or the output of `serde_json::json!([..])`.
    pub fn args_json<U: serde::Serialize>(mut self, args: U) -> Self {
        self.args = match serde_json::to_value(&args) {
            Ok(Value::Array(args)) => Ok(args),
            Ok(Value::Null) => Ok(Vec::new()),
            Ok(other) => Err(ErrorKind::DataConversion.message(format!(
                "call arguments must serialize to a JSON array, got {other}"
            ))),
            Err(e) => Err(ErrorKind::DataConversion.custom(e)),
        };
        self
    }

    pub fn call_params(mut self, params: CallParameters) -> Self {
        self.params = params;
        self
    }
}

/// A call into a single contract method. Built from [`Contract::call`]; nothing is
/// checked or sent until [`CallTransaction::transact`] or
/// [`CallTransaction::simulate`] is awaited.
pub struct CallTransaction<'a, T: ?Sized> {
    contract: &'a Contract<T>,
    function: Function<'a>,
}

impl<'a, T> CallTransaction<'a, T>
where
    T: Network + ?Sized,
{
    pub(crate) fn new(contract: &'a Contract<T>, function: &'a str) -> Self {
        Self {
            contract,
            function: Function::new(function),
        }
    }

    /// Provide the positional arguments for the call, one JSON value per ABI parameter.
    pub fn args(mut self, args: Vec<Value>) -> Self {
        self.function = self.function.args(args);
        self
    }

    /// Similar to `args`, but takes anything that serializes to a JSON array.
    pub fn args_json<U: serde::Serialize>(mut self, args: U) -> Self {
        self.function = self.function.args_json(args);
        self
    }

    /// Forward `amount` of an asset to the contract along with the call.
    pub fn forward(mut self, amount: Balance) -> Self {
        self.function.params.forward_amount = Some(amount);
        self
    }

    /// Forward a different asset than the network's base asset.
    pub fn forward_asset(mut self, asset_id: AssetId) -> Self {
        self.function.params.forward_asset = Some(asset_id);
        self
    }

    pub fn gas_limit(mut self, gas: Gas) -> Self {
        self.function.params.gas_limit = Some(gas);
        self
    }

    /// Replace all call parameters at once.
    pub fn call_params(mut self, params: CallParameters) -> Self {
        self.function = self.function.call_params(params);
        self
    }

    /// Resolve the method against the ABI, apply the call parameters and sign.
    /// Nothing here touches the network.
    fn prepare(self) -> Result<SignedCall> {
        let args = self.function.args?;
        let abi_fn = self.contract.abi().resolve(self.function.name, &args)?;
        tracing::debug!(
            target: "contract_invoker",
            method = %abi_fn.name,
            args = args.len(),
            "resolved method"
        );

        let params = self.function.params;
        let account = self.contract.as_account();
        let forward = match (params.forward_amount, params.forward_asset) {
            (Some(amount), asset_id) => Some(Forward {
                amount,
                asset_id: asset_id.unwrap_or(account.network().info().base_asset_id),
            }),
            (None, Some(asset_id)) => {
                return Err(ErrorKind::ArgumentMismatch.message(format!(
                    "forward asset {asset_id} given without an amount"
                )))
            }
            (None, None) => None,
        };
        if let Some(forward) = &forward {
            if forward.amount > 0 && abi_fn.is_payable() == Some(false) {
                return Err(ErrorKind::ArgumentMismatch.message(format!(
                    "method `{}` is not payable, refusing to forward {}",
                    abi_fn.name, forward.amount
                )));
            }
        }

        let signer = account.signer();
        CallRequest {
            contract_id: *self.contract.id(),
            method: abi_fn.name.clone(),
            args,
            forward,
            gas_limit: params.gas_limit,
            signer: signer.address(),
            public_key: signer.public_key(),
            salt: Bits256(rand::random()),
        }
        .sign(signer)
    }

    /// Finally, send the call to the network as a transaction. This will consume the
    /// `CallTransaction` and return the execution details, whether the contract
    /// succeeded or reverted. Use [`ExecutionFinalResult::into_result`] to tell.
    pub async fn transact(self) -> Result<ExecutionFinalResult> {
        let contract = self.contract;
        let call = self.prepare()?;
        tracing::info!(
            target: "contract_invoker",
            contract = %contract.id(),
            method = %call.request.method,
            forward = ?call.request.forward,
            signer = %call.request.signer,
            "submitting call"
        );

        let outcome = contract.as_account().network().submit_call(&call).await?;
        log_outcome(&outcome);
        Ok(outcome)
    }

    /// Instead of transacting, ask the node to execute the call without committing it.
    pub async fn simulate(self) -> Result<ExecutionFinalResult> {
        let contract = self.contract;
        let call = self.prepare()?;
        tracing::info!(
            target: "contract_invoker",
            contract = %contract.id(),
            method = %call.request.method,
            "simulating call"
        );

        let outcome = contract.as_account().network().dry_run_call(&call).await?;
        log_outcome(&outcome);
        Ok(outcome)
    }
}

fn log_outcome(outcome: &ExecutionFinalResult) {
    tracing::info!(
        target: "contract_invoker",
        transaction_id = %outcome.transaction_id,
        success = outcome.is_success(),
        gas_used = outcome.gas_used,
        "call executed"
    );
}
