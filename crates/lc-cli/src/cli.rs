use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "lc",
    about = "Luggage credit ledger: register, transfer, verify, and execute credits",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Configuration file (defaults to ./lc.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Ledger file, overriding the configured path
    #[arg(long, global = true)]
    pub ledger: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Register a new luggage credit
    Register(RegisterArgs),
    /// Show the current state of a credit
    Read(CreditArgs),
    /// Transfer a credit to a new owner
    Transfer(TransferArgs),
    /// Mark a credit as verified
    Verify(CreditArgs),
    /// Mark a credit as executed
    Execute(CreditArgs),
    /// Show every recorded version of a credit
    History(CreditArgs),
    /// Call a contract function by name with raw string arguments
    Invoke(InvokeArgs),
    /// Start the HTTP gateway
    Serve(ServeArgs),
    /// Print the effective configuration
    Config(ConfigArgs),
}

#[derive(Args)]
pub struct RegisterArgs {
    pub credit_id: String,
    pub owner: String,
    pub flight_id: String,
    #[arg(allow_negative_numbers = true)]
    pub weight: i64,
    #[arg(allow_negative_numbers = true)]
    pub price: i64,
}

#[derive(Args)]
pub struct CreditArgs {
    pub credit_id: String,
}

#[derive(Args)]
pub struct TransferArgs {
    pub credit_id: String,
    pub new_owner: String,
}

#[derive(Args)]
pub struct InvokeArgs {
    pub function: String,
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

#[derive(Args)]
pub struct ServeArgs {
    /// Listen address, overriding the configured one
    #[arg(long)]
    pub bind: Option<SocketAddr>,
}

#[derive(Args)]
pub struct ConfigArgs {}
