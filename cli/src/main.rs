mod command;

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use contract_invoker::network::Custom;
use contract_invoker::operations::CallParameters;
use contract_invoker::types::{AssetId, Balance, Gas};
use contract_invoker::{invoke, Error, ErrorKind, Mode, PartialConfig};
use secrecy::SecretString;
use tracing::metadata::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::command::Command;

/// Sign and send a single call into a deployed contract, then print the outcome
/// as JSON.
#[derive(Parser, Debug)]
#[command(name = "invoke", version)]
struct Cli {
    /// TOML file with default settings. Flags and environment variables override it.
    #[arg(long, env = "INVOKER_CONFIG", value_name = "PATH")]
    config: Option<PathBuf>,

    /// Node JSON-RPC endpoint.
    #[arg(long, env = "INVOKER_ENDPOINT", value_name = "URL")]
    endpoint: Option<String>,

    /// API key sent to the endpoint.
    #[arg(long, env = "INVOKER_API_KEY", hide_env_values = true, value_name = "KEY")]
    api_key: Option<SecretString>,

    /// Hex encoded secp256k1 private key of the signer.
    #[arg(long, env = "INVOKER_PRIVATE_KEY", hide_env_values = true, value_name = "HEX")]
    private_key: Option<SecretString>,

    /// File holding the hex encoded private key.
    #[arg(long, env = "INVOKER_PRIVATE_KEY_FILE", value_name = "PATH")]
    private_key_file: Option<PathBuf>,

    /// Id of the contract to call.
    #[arg(long, env = "INVOKER_CONTRACT_ADDRESS", value_name = "HEX")]
    contract_address: Option<String>,

    /// JSON ABI of the contract.
    #[arg(long, env = "INVOKER_ABI_PATH", value_name = "PATH")]
    abi_path: Option<PathBuf>,

    /// Amount to forward to the contract with the call.
    #[arg(long, value_name = "AMOUNT")]
    forward_amount: Option<Balance>,

    /// Asset of the forwarded amount. Defaults to the chain's base asset.
    #[arg(long, value_name = "HEX", requires = "forward_amount")]
    forward_asset: Option<AssetId>,

    #[arg(long, value_name = "GAS")]
    gas_limit: Option<Gas>,

    /// Execute the call on the node without committing it.
    #[arg(long)]
    simulate: bool,

    #[command(subcommand)]
    command: Command,
}

impl Cli {
    fn overrides(&self) -> PartialConfig {
        PartialConfig {
            endpoint: self.endpoint.clone(),
            api_key: self.api_key.clone(),
            private_key: self.private_key.clone(),
            private_key_file: self.private_key_file.clone(),
            contract_address: self.contract_address.clone(),
            abi_path: self.abi_path.clone(),
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let base = match &cli.config {
        Some(path) => PartialConfig::from_file(path)?,
        None => PartialConfig::default(),
    };
    let config = base.merge(cli.overrides()).finish()?;

    let params = CallParameters {
        forward_amount: cli.forward_amount,
        forward_asset: cli.forward_asset,
        gas_limit: cli.gas_limit,
    };
    let mode = if cli.simulate {
        Mode::Simulate
    } else {
        Mode::Submit
    };
    let invocation = cli.command.into_invocation()?.call_params(params).mode(mode);

    invoke::<Custom, _>(&config, invocation, &mut std::io::stdout()).await?;
    Ok(())
}

fn exit_code(err: &anyhow::Error) -> u8 {
    let Some(err) = err.downcast_ref::<Error>() else {
        return 1;
    };
    match err.kind() {
        ErrorKind::Connection => 2,
        ErrorKind::Credential => 3,
        ErrorKind::MethodNotFound | ErrorKind::ArgumentMismatch => 4,
        ErrorKind::Execution => 5,
        _ => 1,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let filter = if env::var(EnvFilter::DEFAULT_ENV).is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::default().add_directive(LevelFilter::WARN.into())
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // Usage errors exit with 1; clap's own default of 2 is the connection code.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return match err.kind() {
                clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => {
                    ExitCode::SUCCESS
                }
                _ => ExitCode::FAILURE,
            };
        }
    };
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::from(exit_code(&err))
        }
    }
}

#[cfg(test)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;

    #[test]
    fn test_parse_global_flags() {
        let cli = Cli::try_parse_from([
            "invoke",
            "--endpoint",
            "http://127.0.0.1:4000",
            "--private-key",
            "0x01",
            "--forward-amount",
            "250",
            "--simulate",
            "clawback",
        ])
        .unwrap();

        assert_eq!(cli.endpoint.as_deref(), Some("http://127.0.0.1:4000"));
        assert_eq!(cli.forward_amount, Some(250));
        assert!(cli.simulate);
        assert_eq!(cli.command, Command::Clawback);

        let overrides = cli.overrides();
        assert_eq!(
            overrides.private_key.as_ref().map(|k| k.expose_secret().as_str()),
            Some("0x01")
        );
        assert!(overrides.contract_address.is_none());
    }

    #[test]
    fn test_forward_asset_requires_amount() {
        let asset = format!("0x{}", "00".repeat(32));
        assert!(Cli::try_parse_from(["invoke", "--forward-asset", &asset, "clawback"]).is_err());
        assert!(Cli::try_parse_from(["invoke", "clawback", "--unknown"]).is_err());
    }

    #[test]
    fn test_exit_codes() {
        let code = |kind| exit_code(&anyhow::Error::from(Error::message(kind, "boom")));
        assert_eq!(code(ErrorKind::Connection), 2);
        assert_eq!(code(ErrorKind::Credential), 3);
        assert_eq!(code(ErrorKind::MethodNotFound), 4);
        assert_eq!(code(ErrorKind::ArgumentMismatch), 4);
        assert_eq!(code(ErrorKind::Execution), 5);
        assert_eq!(code(ErrorKind::Configuration), 1);
        assert_eq!(exit_code(&anyhow::anyhow!("other")), 1);
    }
}
