//! Sign and send a single call into a deployed contract.
//!
//! The usual flow is [`PartialConfig`] layers finished into an [`InvokerConfig`],
//! then [`invoke`] with an [`Invocation`]. The pieces underneath are usable on
//! their own: [`custom`] connects to a node and hands back a [`Worker`], which
//! binds a signer into an [`Account`], which hands out [`Contract`] handles.

pub mod abi;
mod config;
mod error;
mod invoke;
pub mod network;
pub mod operations;
pub mod result;
pub mod rpc;
pub mod types;
mod worker;

pub use config::{CredentialSource, InvokerConfig, PartialConfig};
pub use error::{Error, ErrorKind};
pub use invoke::{invoke, invoke_on, Invocation, Mode};
pub use network::{Account, Contract, Network};
pub use result::Result;
pub use types::{ContractId, InMemorySigner, SecretKey};
pub use worker::{custom, Worker};
