//! Startup configuration for an invocation: where the node is, which key signs,
//! and which contract is called.
//!
//! Settings come in layers ([`PartialConfig`]) that are merged and then checked
//! for completeness with [`PartialConfig::finish`]. A TOML file is the bottom
//! layer; command line flags and environment variables go on top of it.

use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::error::ErrorKind;
use crate::result::Result;
use crate::types::{ContractId, InMemorySigner, SecretKey};

/// One layer of settings. Every field is optional; later layers override earlier ones.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PartialConfig {
    pub endpoint: Option<String>,
    pub api_key: Option<SecretString>,
    pub private_key: Option<SecretString>,
    pub private_key_file: Option<PathBuf>,
    pub contract_address: Option<String>,
    pub abi_path: Option<PathBuf>,
}

impl PartialConfig {
    /// Read a layer from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|err| {
            ErrorKind::Io.full(format!("unable to read config file {}", path.display()), err)
        })?;
        toml::from_str(&contents).map_err(|err| {
            ErrorKind::Configuration.full(format!("invalid config file {}", path.display()), err)
        })
    }

    /// Put `overrides` on top of `self`. Relative paths in a config file are
    /// taken as-is, relative to the working directory.
    pub fn merge(self, overrides: PartialConfig) -> PartialConfig {
        // A key given on top replaces both key sources underneath it.
        let key_overridden = overrides.private_key.is_some() || overrides.private_key_file.is_some();
        let (private_key, private_key_file) = if key_overridden {
            (overrides.private_key, overrides.private_key_file)
        } else {
            (self.private_key, self.private_key_file)
        };

        PartialConfig {
            endpoint: overrides.endpoint.or(self.endpoint),
            api_key: overrides.api_key.or(self.api_key),
            private_key,
            private_key_file,
            contract_address: overrides.contract_address.or(self.contract_address),
            abi_path: overrides.abi_path.or(self.abi_path),
        }
    }

    /// Check that every required setting is present and well formed.
    pub fn finish(self) -> Result<InvokerConfig> {
        let endpoint = self.endpoint.ok_or_else(|| missing("endpoint"))?;
        let credential = match (self.private_key, self.private_key_file) {
            (Some(key), None) => CredentialSource::Inline(key),
            (None, Some(path)) => CredentialSource::File(path),
            (Some(_), Some(_)) => {
                return Err(ErrorKind::Configuration
                    .message("both a private key and a private key file were given, pick one"))
            }
            (None, None) => return Err(missing("private key (or private key file)")),
        };
        let contract_address = self
            .contract_address
            .ok_or_else(|| missing("contract address"))?;
        let contract_id = contract_address.parse().map_err(|err| {
            ErrorKind::Configuration.full(format!("invalid contract address `{contract_address}`"), err)
        })?;
        let abi_path = self.abi_path.ok_or_else(|| missing("ABI path"))?;

        Ok(InvokerConfig {
            endpoint,
            api_key: self.api_key,
            credential,
            contract_id,
            abi_path,
        })
    }
}

fn missing(what: &'static str) -> crate::error::Error {
    ErrorKind::Configuration.message(format!("no {what} configured"))
}

/// Where the private key comes from. The key material itself is only parsed
/// when the signer is derived.
#[derive(Clone, Debug)]
pub enum CredentialSource {
    Inline(SecretString),
    File(PathBuf),
}

impl CredentialSource {
    /// Derive the signing identity. Malformed keys fail with [`ErrorKind::Credential`].
    pub fn load(&self) -> Result<InMemorySigner> {
        match self {
            CredentialSource::Inline(key) => key
                .expose_secret()
                .parse::<SecretKey>()
                .map(InMemorySigner::from_secret_key),
            CredentialSource::File(path) => InMemorySigner::from_file(path),
        }
    }
}

/// A complete configuration for one invocation.
#[derive(Clone, Debug)]
pub struct InvokerConfig {
    /// Node endpoint. Only parsed when connecting, so a bad URL is a connection error.
    pub endpoint: String,
    pub api_key: Option<SecretString>,
    pub credential: CredentialSource,
    pub contract_id: ContractId,
    pub abi_path: PathBuf,
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const CONTRACT: &str = "0x1111111111111111111111111111111111111111111111111111111111111111";

    fn complete() -> PartialConfig {
        PartialConfig {
            endpoint: Some("http://127.0.0.1:4000".into()),
            api_key: None,
            private_key: Some(SecretString::new("01".repeat(32))),
            private_key_file: None,
            contract_address: Some(CONTRACT.into()),
            abi_path: Some("abi.json".into()),
        }
    }

    #[test]
    fn test_missing_fields() {
        let err = PartialConfig::default().finish().unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::Configuration);
        assert!(err.to_string().contains("endpoint"));

        let err = PartialConfig {
            abi_path: None,
            ..complete()
        }
        .finish()
        .unwrap_err();
        assert!(err.to_string().contains("ABI path"));

        let err = PartialConfig {
            private_key_file: Some("key.txt".into()),
            ..complete()
        }
        .finish()
        .unwrap_err();
        assert!(err.to_string().contains("pick one"));
    }

    #[test]
    fn test_invalid_contract_address() {
        let err = PartialConfig {
            contract_address: Some("CONTRACT_ADDRESS".into()),
            ..complete()
        }
        .finish()
        .unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::Configuration);
    }

    #[test]
    fn test_merge_prefers_overrides() -> Result<()> {
        let base = complete();
        let top = PartialConfig {
            endpoint: Some("http://node.example:4000".into()),
            private_key_file: Some("key.txt".into()),
            ..PartialConfig::default()
        };

        let config = base.merge(top).finish()?;
        assert_eq!(config.endpoint, "http://node.example:4000");
        assert!(matches!(config.credential, CredentialSource::File(ref p) if p == Path::new("key.txt")));
        assert_eq!(config.contract_id.to_string(), CONTRACT);
        Ok(())
    }

    #[test]
    fn test_from_toml_file() -> anyhow::Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        writeln!(
            file,
            r#"
endpoint = "http://127.0.0.1:4000/rpc"
private_key_file = "/run/secrets/invoker.key"
contract_address = "{CONTRACT}"
abi_path = "out/airdrop-abi.json"
"#
        )?;

        let config = PartialConfig::from_file(file.path())?.finish()?;
        assert_eq!(config.endpoint, "http://127.0.0.1:4000/rpc");
        assert_eq!(config.abi_path, PathBuf::from("out/airdrop-abi.json"));

        let mut bad = tempfile::NamedTempFile::new()?;
        writeln!(bad, "endpont = \"typo\"")?;
        let err = PartialConfig::from_file(bad.path()).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::Configuration);
        Ok(())
    }

    #[test]
    fn test_credential_source_load() -> anyhow::Result<()> {
        let key = SecretKey::from_random();
        let encoded = hex::encode(key.0.secret_bytes());

        let mut file = tempfile::NamedTempFile::new()?;
        writeln!(file, "0x{encoded}")?;

        let from_file = CredentialSource::File(file.path().to_path_buf()).load()?;
        let inline = CredentialSource::Inline(SecretString::new(encoded)).load()?;
        assert_eq!(from_file.address(), inline.address());

        let err = CredentialSource::Inline(SecretString::new("PRIVATE_KEY".into()))
            .load()
            .unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::Credential);

        let err = CredentialSource::File("/definitely/not/here.key".into())
            .load()
            .unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::Io);
        Ok(())
    }
}
