use std::future::{Future, IntoFuture};
use std::marker::PhantomData;

use crate::{Network, Worker};

pub(crate) type BoxFuture<'a, T> = std::pin::Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// This trait provides a way to construct Networks out of a single builder. Networks
/// defined outside of this crate (test doubles included) implement it to be usable
/// with [`crate::invoke`].
#[async_trait::async_trait]
pub trait FromNetworkBuilder: Sized {
    async fn from_builder<'a>(build: NetworkBuilder<'a, Self>) -> crate::result::Result<Self>;
}

/// Builder for Networks. Awaiting it connects to the network and hands back a [`Worker`].
pub struct NetworkBuilder<'a, T> {
    pub name: &'a str,
    pub rpc_addr: Option<String>,
    pub api_key: Option<String>,
    _network: PhantomData<T>,
}

impl<'a, T> IntoFuture for NetworkBuilder<'a, T>
where
    T: FromNetworkBuilder + Network + Send + 'a,
{
    type Output = crate::result::Result<Worker<T>>;
    type IntoFuture = BoxFuture<'a, Self::Output>;

    fn into_future(self) -> Self::IntoFuture {
        let fut = async {
            let network = FromNetworkBuilder::from_builder(self).await?;
            Ok(Worker::new(network))
        };
        Box::pin(fut)
    }
}

impl<'a, T> NetworkBuilder<'a, T> {
    pub fn new(name: &'a str) -> Self {
        Self {
            name,
            rpc_addr: None,
            api_key: None,
            _network: PhantomData,
        }
    }

    /// Sets the RPC addr for this network.
    pub fn rpc_addr(mut self, addr: &str) -> Self {
        self.rpc_addr = Some(addr.into());
        self
    }

    /// Sets the API key for this network. Useful for setting the API key to an RPC
    /// server that requires it.
    pub fn api_key(mut self, api_key: &str) -> Self {
        self.api_key = Some(api_key.into());
        self
    }
}
