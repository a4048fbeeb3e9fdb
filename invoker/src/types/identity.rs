use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{Address, ContractId};
use crate::error::{Error, ErrorKind};

/// Either a wallet or a contract; the party a contract method acts on behalf of.
///
/// Serializes the way contract ABIs lay the `Identity` enum out, e.g.
/// `{"Address": {"value": "0x…"}}`, so it can be dropped straight into call arguments.
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(from = "IdentityRepr", into = "IdentityRepr")]
pub enum Identity {
    Address(Address),
    ContractId(ContractId),
}

#[derive(Serialize, Deserialize)]
enum IdentityRepr {
    Address { value: Address },
    ContractId { value: ContractId },
}

impl From<IdentityRepr> for Identity {
    fn from(repr: IdentityRepr) -> Self {
        match repr {
            IdentityRepr::Address { value } => Identity::Address(value),
            IdentityRepr::ContractId { value } => Identity::ContractId(value),
        }
    }
}

impl From<Identity> for IdentityRepr {
    fn from(identity: Identity) -> Self {
        match identity {
            Identity::Address(value) => IdentityRepr::Address { value },
            Identity::ContractId(value) => IdentityRepr::ContractId { value },
        }
    }
}

impl From<Address> for Identity {
    fn from(address: Address) -> Self {
        Identity::Address(address)
    }
}

impl From<ContractId> for Identity {
    fn from(id: ContractId) -> Self {
        Identity::ContractId(id)
    }
}

/// Accepts `address:0x…`, `contract:0x…` or a bare hex value, which is taken as an address.
impl FromStr for Identity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let identity = match s.split_once(':') {
            Some(("address", hex)) => Identity::Address(hex.parse()?),
            Some(("contract", hex)) => Identity::ContractId(hex.parse()?),
            Some((prefix, _)) => {
                return Err(ErrorKind::DataConversion.message(format!(
                    "unknown identity prefix `{prefix}`, expected `address` or `contract`"
                )))
            }
            None => Identity::Address(s.parse()?),
        };
        Ok(identity)
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identity::Address(address) => write!(f, "address:{address}"),
            Identity::ContractId(id) => write!(f, "contract:{id}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_json_layout() -> anyhow::Result<()> {
        let address = Address::new([7; 32]);
        let value = serde_json::to_value(Identity::from(address))?;
        assert_eq!(
            value,
            serde_json::json!({ "Address": { "value": format!("0x{}", "07".repeat(32)) } })
        );

        let back: Identity = serde_json::from_value(value)?;
        assert_eq!(back, Identity::Address(address));
        Ok(())
    }

    #[test]
    fn test_identity_from_str() -> anyhow::Result<()> {
        let hex = format!("0x{}", "11".repeat(32));

        let bare: Identity = hex.parse()?;
        assert!(matches!(bare, Identity::Address(_)));

        let contract: Identity = format!("contract:{hex}").parse()?;
        assert_eq!(contract, Identity::ContractId(hex.parse()?));
        assert_eq!(contract.to_string(), format!("contract:{hex}"));

        let err = format!("wallet:{hex}").parse::<Identity>().unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::DataConversion);
        Ok(())
    }
}
