//! Result and execution types from results of calls made to the network.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ErrorKind;
use crate::types::{BlockHeight, Gas, TxId};

pub type Result<T, E = crate::error::Error> = core::result::Result<T, E>;

/// Execution related info as a result of performing a successful call. The
/// `value` is whatever the contract method returned, untouched.
pub type ExecutionSuccess = ExecutionResult<Value>;

/// Execution related info as a result of performing a failed call. The
/// `value` is the revert reason reported by the node.
pub type ExecutionFailure = ExecutionResult<String>;

/// Struct to hold a type we want to return along w/ the execution result view.
/// This view has extra info about the execution, such as gas usage and the logs
/// emitted while the call ran.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[non_exhaustive]
pub struct ExecutionResult<T> {
    /// Transaction the call was executed in.
    pub transaction_id: TxId,
    /// The value that we're returning in the case of a success or failure.
    pub value: T,
    /// Logs emitted by the contract during the call.
    pub logs: Vec<Value>,
    /// Total gas consumed by the call.
    pub gas_used: Gas,
}

impl<T> ExecutionResult<T> {
    /// Deserialize an instance of type `U` from the value of this result.
    pub fn json<U: serde::de::DeserializeOwned>(&self) -> Result<U>
    where
        T: Serialize,
    {
        let value = serde_json::to_value(&self.value)
            .map_err(|e| ErrorKind::DataConversion.custom(e))?;
        serde_json::from_value(value).map_err(|e| ErrorKind::DataConversion.custom(e))
    }
}

/// Status of a call as reported by the node.
#[derive(Clone, Debug, PartialEq)]
pub enum ExecutionStatus {
    /// The call ran to completion and returned this value.
    Success(Value),
    /// The contract reverted, with the reason given by the node.
    Revert(String),
}

/// The complete result of executing a call on the network: what happened and
/// all the metadata that came with it. Whether the call succeeded is only known
/// once [`ExecutionFinalResult::into_result`] is consulted.
#[derive(Clone, Debug, PartialEq)]
#[non_exhaustive]
pub struct ExecutionFinalResult {
    pub transaction_id: TxId,
    pub status: ExecutionStatus,
    pub logs: Vec<Value>,
    pub gas_used: Gas,
    /// Block the transaction landed in. Absent for dry runs.
    pub block_height: Option<BlockHeight>,
}

impl ExecutionFinalResult {
    pub fn new(transaction_id: TxId, status: ExecutionStatus) -> Self {
        Self {
            transaction_id,
            status,
            logs: Vec::new(),
            gas_used: 0,
            block_height: None,
        }
    }

    pub fn with_logs(mut self, logs: Vec<Value>) -> Self {
        self.logs = logs;
        self
    }

    pub fn with_gas_used(mut self, gas_used: Gas) -> Self {
        self.gas_used = gas_used;
        self
    }

    pub fn with_block_height(mut self, height: BlockHeight) -> Self {
        self.block_height = Some(height);
        self
    }

    /// Checks whether the call was successful.
    pub fn is_success(&self) -> bool {
        matches!(self.status, ExecutionStatus::Success(_))
    }

    /// Checks whether the call was reverted by the contract.
    pub fn is_failure(&self) -> bool {
        matches!(self.status, ExecutionStatus::Revert(_))
    }

    /// Split the result into an [`ExecutionSuccess`] or an [`ExecutionFailure`],
    /// the latter of which converts into an error of kind [`ErrorKind::Execution`].
    pub fn into_result(self) -> Result<ExecutionSuccess, ExecutionFailure> {
        match self.status {
            ExecutionStatus::Success(value) => Ok(ExecutionResult {
                transaction_id: self.transaction_id,
                value,
                logs: self.logs,
                gas_used: self.gas_used,
            }),
            ExecutionStatus::Revert(reason) => Err(ExecutionResult {
                transaction_id: self.transaction_id,
                value: reason,
                logs: self.logs,
                gas_used: self.gas_used,
            }),
        }
    }

    /// Deserialize the returned value into `T`, failing if the call reverted.
    pub fn json<T: serde::de::DeserializeOwned>(self) -> Result<T> {
        self.into_result()?.json()
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum OutcomeStatusView {
    Success,
    Revert,
}

/// The call outcome as it comes over the wire from the node.
#[derive(Deserialize)]
pub(crate) struct CallOutcomeView {
    pub transaction_id: TxId,
    pub status: OutcomeStatusView,
    #[serde(default)]
    pub value: Value,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub logs: Vec<Value>,
    #[serde(default)]
    pub gas_used: Gas,
    #[serde(default)]
    pub block_height: Option<BlockHeight>,
}

impl From<CallOutcomeView> for ExecutionFinalResult {
    fn from(view: CallOutcomeView) -> Self {
        let status = match view.status {
            OutcomeStatusView::Success => ExecutionStatus::Success(view.value),
            OutcomeStatusView::Revert => ExecutionStatus::Revert(
                view.reason
                    .unwrap_or_else(|| "reverted without a reason".to_string()),
            ),
        };
        ExecutionFinalResult {
            transaction_id: view.transaction_id,
            status,
            logs: view.logs,
            gas_used: view.gas_used,
            block_height: view.block_height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_revert_becomes_execution_error() {
        let id = TxId::new([3; 32]);
        let result = ExecutionFinalResult::new(id, ExecutionStatus::Revert("NotEligible".into()))
            .with_gas_used(1_200);
        assert!(result.is_failure());

        let failure = result.into_result().unwrap_err();
        assert_eq!(failure.gas_used, 1_200);

        let err = Error::from(failure);
        assert_eq!(err.kind(), &ErrorKind::Execution);
        assert!(err.to_string().contains("NotEligible"));
        assert_eq!(err.details().map(|d| d.value.as_str()), Some("NotEligible"));
    }

    #[test]
    fn test_outcome_view_conversion() -> anyhow::Result<()> {
        let view: CallOutcomeView = serde_json::from_value(serde_json::json!({
            "transaction_id": format!("0x{}", "aa".repeat(32)),
            "status": "success",
            "value": { "claimed": 100 },
            "logs": ["ClaimEvent"],
            "gas_used": 42,
            "block_height": 9,
        }))?;
        let result = ExecutionFinalResult::from(view);
        assert!(result.is_success());
        assert_eq!(result.block_height, Some(9));

        #[derive(Deserialize)]
        struct Claimed {
            claimed: u64,
        }
        assert_eq!(result.json::<Claimed>()?.claimed, 100);
        Ok(())
    }
}
