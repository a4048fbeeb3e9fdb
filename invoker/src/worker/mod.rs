use std::sync::Arc;

use crate::network::{Account, Custom, Info, NetworkBuilder};
use crate::result::Result;
use crate::rpc::types::NodeInfo;
use crate::types::InMemorySigner;
use crate::Network;

/// The `Worker` type allows us to interact with any network that implements
/// [`Network`]. It holds the single connection used for a run and hands out
/// accounts bound to it.
pub struct Worker<T: ?Sized> {
    pub(crate) workspace: Arc<T>,
}

impl<T> Worker<T>
where
    T: Network,
{
    /// Wrap an already connected network. Custom networks and test doubles can
    /// construct themselves however they want and start from here.
    pub fn new(network: T) -> Self {
        Self {
            workspace: Arc::new(network),
        }
    }
}

impl<T> Worker<T>
where
    T: Network + ?Sized,
{
    pub fn info(&self) -> &Info {
        self.workspace.info()
    }

    /// Query the node this worker is connected to.
    pub async fn status(&self) -> Result<NodeInfo> {
        self.workspace.status().await
    }

    /// Bind a signing identity to this worker's connection.
    pub fn account(&self, signer: InMemorySigner) -> Account<T> {
        Account::new(Arc::clone(&self.workspace), signer)
    }
}

impl<T: ?Sized> Clone for Worker<T> {
    fn clone(&self) -> Self {
        Self {
            workspace: Arc::clone(&self.workspace),
        }
    }
}

impl<T> std::fmt::Debug for Worker<T>
where
    T: std::fmt::Debug + ?Sized,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Worker")
            .field("workspace", &self.workspace)
            .finish()
    }
}

/// Connect to a node at `rpc_url`. Await the returned builder (optionally after
/// setting an API key) to perform the handshake and get a [`Worker`].
///
/// ```no_run
/// # async fn run() -> contract_invoker::Result<()> {
/// let worker = contract_invoker::custom("http://127.0.0.1:4000/rpc").await?;
/// println!("connected to chain {}", worker.info().chain_id);
/// # Ok(())
/// # }
/// ```
pub fn custom<'a>(rpc_url: &str) -> NetworkBuilder<'a, Custom> {
    NetworkBuilder::new("custom").rpc_addr(rpc_url)
}
