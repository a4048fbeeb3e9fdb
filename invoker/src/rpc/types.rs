//! Payloads exchanged with the node.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ErrorKind;
use crate::result::Result;
use crate::types::{
    verify_signature, Address, AssetId, Balance, Bits256, BlockHeight, ContractId, Gas,
    InMemorySigner, PublicKey,
};

/// What the node reports about itself during the connection handshake.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeInfo {
    pub name: String,
    pub chain_id: u64,
    pub node_version: String,
    /// The chain's native asset; forwarded amounts default to it.
    pub base_asset_id: AssetId,
    pub latest_block_height: BlockHeight,
}

/// An amount of an asset sent along with a call.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Forward {
    pub amount: Balance,
    pub asset_id: AssetId,
}

/// The unsigned body of a contract call. Its JSON encoding, in field order, is
/// what gets signed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CallRequest {
    pub contract_id: ContractId,
    pub method: String,
    pub args: Vec<Value>,
    pub forward: Option<Forward>,
    pub gas_limit: Option<Gas>,
    pub signer: Address,
    pub public_key: PublicKey,
    /// Random per call, so that repeating an identical call is a new transaction.
    pub salt: Bits256,
}

impl CallRequest {
    pub fn signing_bytes(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| ErrorKind::DataConversion.custom(e))
    }

    pub fn sign(self, signer: &InMemorySigner) -> Result<SignedCall> {
        let signature = signer.sign(&self.signing_bytes()?)?;
        Ok(SignedCall {
            request: self,
            signature: hex::encode(signature),
        })
    }
}

/// A call ready to be submitted: the request and the signer's signature over it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SignedCall {
    #[serde(flatten)]
    pub request: CallRequest,
    /// Hex encoded 64 byte compact secp256k1 signature.
    pub signature: String,
}

impl SignedCall {
    /// Check the signature against the embedded public key, and that the key
    /// owns the claimed signer address.
    pub fn verify(&self) -> Result<()> {
        if self.request.public_key.address() != self.request.signer {
            return Err(ErrorKind::Credential.message("public key does not own the signer address"));
        }
        let signature =
            hex::decode(&self.signature).map_err(|e| ErrorKind::DataConversion.custom(e))?;
        verify_signature(
            &self.request.public_key,
            &self.request.signing_bytes()?,
            &signature,
        )
    }
}

#[derive(Serialize)]
pub(crate) struct JsonRpcRequest<'a, P> {
    pub jsonrpc: &'static str,
    pub id: u64,
    pub method: &'a str,
    pub params: P,
}

#[derive(Deserialize)]
pub(crate) struct JsonRpcResponse {
    /// Null when the node could not read the request id.
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<RpcErrorObject>,
}

/// Error object returned by the node in place of a result.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct RpcErrorObject {
    pub code: i64,
    pub message: String,
    #[serde(default)]
    pub data: Option<Value>,
}

impl std::fmt::Display for RpcErrorObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (code {})", self.message, self.code)?;
        if let Some(data) = &self.data {
            write!(f, ": {data}")?;
        }
        Ok(())
    }
}

impl std::error::Error for RpcErrorObject {}
