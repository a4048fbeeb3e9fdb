//! All builtin network types and traits.
//!
//! Currently the builtin network is [`Custom`], a node reached through a user
//! supplied endpoint. Anything implementing [`Network`] can be driven by a
//! [`Worker`](crate::Worker), which is how tests substitute an in-process node.

mod account;
mod builder;
mod custom;

use async_trait::async_trait;
use url::Url;

use crate::result::{ExecutionFinalResult, Result};
use crate::rpc::types::{NodeInfo, SignedCall};
use crate::types::AssetId;

pub use self::account::{Account, Contract};
pub use self::builder::{FromNetworkBuilder, NetworkBuilder};
pub use self::custom::Custom;

/// Static information about a network, captured when the connection was made.
#[derive(Clone, Debug)]
pub struct Info {
    /// Name of the network itself
    pub name: String,
    /// Chain identifier reported by the node.
    pub chain_id: u64,
    /// Asset forwarded by default when a call does not name one.
    pub base_asset_id: AssetId,
    /// Rpc endpoint to point our client to
    pub rpc_url: Url,
}

impl Info {
    pub fn new(name: impl Into<String>, rpc_url: Url, node: &NodeInfo) -> Self {
        Self {
            name: name.into(),
            chain_id: node.chain_id,
            base_asset_id: node.base_asset_id,
            rpc_url,
        }
    }
}

/// The transport a network uses to reach its node. Signing and ABI checks have
/// already happened by the time anything here is called.
#[async_trait]
pub trait NetworkClient {
    /// Ask the node about itself.
    async fn status(&self) -> Result<NodeInfo>;

    /// Submit a call as a transaction, waiting for its outcome.
    async fn submit_call(&self, call: &SignedCall) -> Result<ExecutionFinalResult>;

    /// Execute a call without committing anything to the chain.
    async fn dry_run_call(&self, call: &SignedCall) -> Result<ExecutionFinalResult>;
}

pub trait NetworkInfo {
    fn info(&self) -> &Info;
}

/// Network trait specifies the functionality of a network type such as a public
/// testnet, a local node, or a test double.
pub trait Network: NetworkInfo + NetworkClient + Send + Sync {}

impl<T> Network for T where T: NetworkInfo + NetworkClient + Send + Sync {}
