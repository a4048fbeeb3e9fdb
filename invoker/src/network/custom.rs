use async_trait::async_trait;

use crate::error::ErrorKind;
use crate::network::{Info, NetworkClient, NetworkInfo};
use crate::result::{ExecutionFinalResult, Result};
use crate::rpc::client::Client;
use crate::rpc::types::{NodeInfo, SignedCall};

use super::builder::{FromNetworkBuilder, NetworkBuilder};

/// Holds information about a node reached through a user supplied endpoint.
pub struct Custom {
    client: Client,
    info: Info,
}

#[async_trait]
impl FromNetworkBuilder for Custom {
    async fn from_builder<'a>(build: NetworkBuilder<'a, Self>) -> Result<Self> {
        let rpc_addr = build.rpc_addr.ok_or_else(|| {
            ErrorKind::Configuration.message("rpc address should be provided for custom network")
        })?;
        let client = Client::new(&rpc_addr, build.api_key)?;
        let node = client.node_info().await?;

        tracing::info!(
            target: "contract_invoker",
            endpoint = %client.rpc_url(),
            chain = %node.name,
            chain_id = node.chain_id,
            node_version = %node.node_version,
            height = node.latest_block_height,
            "connected"
        );

        Ok(Self {
            info: Info::new(build.name, client.rpc_url().clone(), &node),
            client,
        })
    }
}

impl std::fmt::Debug for Custom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Custom")
            .field("name", &self.info.name)
            .field("rpc_url", &self.info.rpc_url)
            .finish()
    }
}

#[async_trait]
impl NetworkClient for Custom {
    async fn status(&self) -> Result<NodeInfo> {
        self.client.node_info().await
    }

    async fn submit_call(&self, call: &SignedCall) -> Result<ExecutionFinalResult> {
        self.client.submit_call(call).await
    }

    async fn dry_run_call(&self, call: &SignedCall) -> Result<ExecutionFinalResult> {
        self.client.dry_run_call(call).await
    }
}

impl NetworkInfo for Custom {
    fn info(&self) -> &Info {
        &self.info
    }
}
