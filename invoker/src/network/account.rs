use std::sync::Arc;

use crate::abi::AbiDescriptor;
use crate::operations::CallTransaction;
use crate::types::{Address, ContractId, InMemorySigner};
use crate::Network;

/// A wallet on the network, able to sign calls through the connection it is
/// bound to.
pub struct Account<T: ?Sized> {
    network: Arc<T>,
    signer: InMemorySigner,
}

impl<T: ?Sized> Clone for Account<T> {
    fn clone(&self) -> Self {
        Self {
            network: Arc::clone(&self.network),
            signer: self.signer.clone(),
        }
    }
}

impl<T> Account<T>
where
    T: Network + ?Sized,
{
    pub(crate) fn new(network: Arc<T>, signer: InMemorySigner) -> Self {
        Self { network, signer }
    }

    /// Grab the address this account signs for.
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    pub fn signer(&self) -> &InMemorySigner {
        &self.signer
    }

    pub(crate) fn network(&self) -> &T {
        &self.network
    }

    /// Get a handle to the contract at `id`, described by `abi`, that calls into it
    /// as this account.
    pub fn contract(&self, id: ContractId, abi: Arc<AbiDescriptor>) -> Contract<T> {
        Contract {
            account: self.clone(),
            id,
            abi,
        }
    }
}

impl<T: ?Sized> std::fmt::Debug for Account<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Account")
            .field("address", &self.signer.address())
            .finish()
    }
}

/// `Contract` is a handle to a deployed contract, bound to the account whose
/// signer pays for and authorizes the calls made through it.
pub struct Contract<T: ?Sized> {
    account: Account<T>,
    id: ContractId,
    abi: Arc<AbiDescriptor>,
}

impl<T: ?Sized> Clone for Contract<T> {
    fn clone(&self) -> Self {
        Self {
            account: self.account.clone(),
            id: self.id,
            abi: Arc::clone(&self.abi),
        }
    }
}

impl<T> Contract<T>
where
    T: Network + ?Sized,
{
    pub fn id(&self) -> &ContractId {
        &self.id
    }

    pub fn abi(&self) -> &AbiDescriptor {
        &self.abi
    }

    /// Treat this contract handle as the account that makes the calls.
    pub fn as_account(&self) -> &Account<T> {
        &self.account
    }

    /// Call a method of this contract. Returns a [`CallTransaction`] used to set
    /// the arguments and call parameters before sending it off with
    /// [`CallTransaction::transact`].
    pub fn call<'a>(&'a self, function: &'a str) -> CallTransaction<'a, T> {
        CallTransaction::new(self, function)
    }
}

impl<T: ?Sized> std::fmt::Debug for Contract<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Contract")
            .field("id", &self.id)
            .field("account", &self.account)
            .finish()
    }
}
