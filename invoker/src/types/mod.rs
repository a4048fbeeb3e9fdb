//! Types used in the invoker crate. Identifiers on chain are all 32 byte values and are
//! rendered as `0x` prefixed hex, which is also the form every API here accepts.

mod identity;

use std::fmt::{self, Debug, Display};
use std::path::Path;
use std::str::FromStr;

use secp256k1::ecdsa::Signature;
use secp256k1::{Message, SECP256K1};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

use crate::error::{Error, ErrorKind};
use crate::result::Result;

pub use self::identity::Identity;

/// Balance is type for storing amounts of the chain's assets, in the asset's base unit.
pub type Balance = u64;

/// Gas units a call is allowed to consume.
pub type Gas = u64;

/// Height of a specific block
pub type BlockHeight = u64;

fn decode_hex(s: &str) -> Result<Vec<u8>> {
    let s = s.strip_prefix("0x").unwrap_or(s);
    hex::decode(s).map_err(|e| ErrorKind::DataConversion.custom(e))
}

/// Raw 32 byte value shared by every identifier type.
#[derive(Copy, Clone, Default, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct Bits256(pub [u8; 32]);

impl Bits256 {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl FromStr for Bits256 {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = decode_hex(s)?;
        Self::try_from(bytes.as_slice())
    }
}

impl TryFrom<&[u8]> for Bits256 {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        if bytes.len() != 32 {
            return Err(ErrorKind::DataConversion.message(format!(
                "incorrect length (expected 32 bytes, but {} was given)",
                bytes.len()
            )));
        }
        let mut buf = [0; 32];
        buf.copy_from_slice(bytes);
        Ok(Bits256(buf))
    }
}

impl Display for Bits256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl Debug for Bits256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

impl Serialize for Bits256 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Bits256 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// Every identifier is its own type so that an `Address` can never be passed where a
// `ContractId` was expected, but they all share the hex representation of `Bits256`.
macro_rules! bits256_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Default, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Bits256);

        impl $name {
            pub const fn new(bytes: [u8; 32]) -> Self {
                Self(Bits256(bytes))
            }

            pub fn as_bytes(&self) -> &[u8; 32] {
                self.0.as_bytes()
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(s.parse()?))
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                Display::fmt(&self.0, f)
            }
        }

        impl Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }
    };
}

bits256_id!(
    /// Address of a deployed contract.
    ContractId
);
bits256_id!(
    /// Address of a wallet, derived from the wallet's public key.
    Address
);
bits256_id!(
    /// Identifier of an asset that can be forwarded along with a call.
    AssetId
);
bits256_id!(
    /// Identifier of a transaction as reported by the node.
    TxId
);

impl AssetId {
    /// The chain's native asset.
    pub const BASE: AssetId = AssetId::new([0; 32]);
}

/// Secret key of a wallet. The bytes of the key never show up in `Debug` or
/// `Display` output, so a signer can be logged without leaking it.
#[derive(Clone, Eq, PartialEq)]
pub struct SecretKey(pub(crate) secp256k1::SecretKey);

impl SecretKey {
    /// Get the [`PublicKey`] associated to this secret key.
    pub fn public_key(&self) -> PublicKey {
        PublicKey(secp256k1::PublicKey::from_secret_key(SECP256K1, &self.0))
    }

    /// Generate a new secret key using OS provided entropy.
    pub fn from_random() -> Self {
        loop {
            // Out of range scalars are astronomically unlikely, but still rejected.
            let bytes: [u8; 32] = rand::random();
            if let Ok(sk) = secp256k1::SecretKey::from_slice(&bytes) {
                return Self(sk);
            }
        }
    }

    /// Read a hex encoded secret key out of `path`. Surrounding whitespace is ignored.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|err| {
            ErrorKind::Io.full(
                format!("unable to read key file {}", path.display()),
                err,
            )
        })?;
        contents.trim().parse()
    }
}

impl FromStr for SecretKey {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        let value = value.strip_prefix("0x").unwrap_or(value);
        let bytes = hex::decode(value)
            .map_err(|e| ErrorKind::Credential.full("private key is not valid hex", e))?;
        let sk = secp256k1::SecretKey::from_slice(&bytes)
            .map_err(|e| ErrorKind::Credential.full("private key is malformed", e))?;

        Ok(Self(sk))
    }
}

impl Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(<redacted>)")
    }
}

impl Display for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<redacted>")
    }
}

/// Public key of a wallet. Usually obtained from [`SecretKey::public_key`].
#[derive(Copy, Clone, Hash, Eq, PartialEq)]
pub struct PublicKey(pub(crate) secp256k1::PublicKey);

impl PublicKey {
    /// The 64 byte uncompressed point, without the leading SEC1 tag.
    pub fn key_data(&self) -> [u8; 64] {
        let mut out = [0; 64];
        out.copy_from_slice(&self.0.serialize_uncompressed()[1..]);
        out
    }

    /// The wallet [`Address`] owned by this key: the SHA-256 digest of [`PublicKey::key_data`].
    pub fn address(&self) -> Address {
        Address::new(Sha256::digest(self.key_data()).into())
    }
}

impl Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.key_data()))
    }
}

impl Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", self)
    }
}

impl FromStr for PublicKey {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let mut bytes = vec![0x04];
        bytes.extend(decode_hex(value)?);
        let pk = secp256k1::PublicKey::from_slice(&bytes)
            .map_err(|e| ErrorKind::DataConversion.custom(e))?;
        Ok(Self(pk))
    }
}

impl Serialize for PublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Signing identity of a wallet: its secret key together with the address it controls.
#[derive(Clone, Debug)]
pub struct InMemorySigner {
    pub(crate) address: Address,
    pub(crate) secret_key: SecretKey,
}

impl InMemorySigner {
    pub fn from_secret_key(secret_key: SecretKey) -> Self {
        Self {
            address: secret_key.public_key().address(),
            secret_key,
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        SecretKey::from_file(path).map(Self::from_secret_key)
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn public_key(&self) -> PublicKey {
        self.secret_key.public_key()
    }

    /// Sign the SHA-256 digest of `data`, returning the 64 byte compact signature.
    pub fn sign(&self, data: &[u8]) -> Result<[u8; 64]> {
        let msg = digest_message(data)?;
        let sig = SECP256K1.sign_ecdsa(&msg, &self.secret_key.0);
        Ok(sig.serialize_compact())
    }
}

/// Check a compact signature produced by [`InMemorySigner::sign`] over `data`.
pub fn verify_signature(public_key: &PublicKey, data: &[u8], signature: &[u8]) -> Result<()> {
    let msg = digest_message(data)?;
    let sig =
        Signature::from_compact(signature).map_err(|e| ErrorKind::DataConversion.custom(e))?;
    SECP256K1
        .verify_ecdsa(&msg, &sig, &public_key.0)
        .map_err(|e| ErrorKind::Credential.full("signature does not match public key", e))
}

fn digest_message(data: &[u8]) -> Result<Message> {
    let digest: [u8; 32] = Sha256::digest(data).into();
    Message::from_digest_slice(&digest).map_err(|e| ErrorKind::Credential.custom(e))
}
