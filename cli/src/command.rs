use clap::Subcommand;
use contract_invoker::types::Identity;
use contract_invoker::Invocation;
use serde_json::Value;

/// The contract method to invoke.
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Claim an allocation: `claim(index, recipient)`.
    Claim {
        /// First argument of `claim`, passed through unchanged.
        #[arg(long, value_name = "U64")]
        index: u64,
        /// Who receives the claimed amount, e.g. `address:0x..` or `contract:0x..`.
        #[arg(long, value_name = "IDENTITY")]
        recipient: Identity,
    },
    /// Initialize a freshly deployed contract: `constructor(admin, duration)`.
    /// Usually combined with `--forward-amount` to fund it.
    Deploy {
        #[arg(long, value_name = "IDENTITY")]
        admin: Identity,
        /// Length of the claim period.
        #[arg(long, value_name = "U64")]
        duration: u64,
    },
    /// Return unclaimed funds to the admin: `clawback()`.
    Clawback,
    /// Call any method by name.
    Call {
        #[arg(long, value_name = "NAME")]
        method: String,
        /// One positional argument as JSON. Text that is not valid JSON is sent
        /// as a JSON string. Repeat for each argument.
        #[arg(long = "args", value_name = "JSON")]
        args: Vec<String>,
    },
}

impl Command {
    /// The method name and its positional arguments.
    pub fn into_invocation(self) -> anyhow::Result<Invocation> {
        let invocation = match self {
            Command::Claim { index, recipient } => Invocation::new("claim")
                .args(vec![Value::from(index), serde_json::to_value(recipient)?]),
            Command::Deploy { admin, duration } => Invocation::new("constructor")
                .args(vec![serde_json::to_value(admin)?, Value::from(duration)]),
            Command::Clawback => Invocation::new("clawback"),
            Command::Call { method, args } => {
                let args = args.into_iter().map(|arg| parse_arg(&arg)).collect();
                Invocation::new(method).args(args)
            }
        };
        Ok(invocation)
    }
}

fn parse_arg(arg: &str) -> Value {
    serde_json::from_str(arg).unwrap_or_else(|_| Value::String(arg.to_string()))
}
