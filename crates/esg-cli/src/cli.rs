use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use esg_workflow::Role;

#[derive(Parser)]
#[command(
    name = "esg",
    about = "ESG content registry: register, attest, and query reports on-chain",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// TOML configuration file
    #[arg(long, global = true, env = "ESG_CONFIG")]
    pub config: Option<PathBuf>,

    /// JSON-RPC endpoint (overrides the config file)
    #[arg(long, global = true)]
    pub rpc_url: Option<String>,

    /// Acting role: submitter, auditor, or viewer
    #[arg(long, global = true)]
    pub role: Option<Role>,

    /// Run against an in-process simulated chain
    #[arg(long, global = true)]
    pub simulate: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Connect a wallet and show the account
    Connect,
    /// Compute a content identifier without touching the chain
    Fingerprint(FingerprintArgs),
    /// Register a report by file name
    Register(RegisterArgs),
    /// Register telemetry samples on a timer
    Feed(FeedArgs),
    /// Record an auditor's decision on a report
    Attest(AttestArgs),
    /// Show the on-chain status of a report
    Status(StatusArgs),
    /// Show the token balance and finance eligibility
    Balance,
    /// Show finance eligibility for a given balance
    Tiers(TiersArgs),
    /// Upload a report to the registration backend
    Upload(UploadArgs),
}

#[derive(Args)]
pub struct FingerprintArgs {
    /// Text to fingerprint (a file name, for instance)
    pub text: Option<String>,
    /// Fingerprint this report's name, the key `register` uses
    #[arg(long, conflicts_with_all = ["text", "json", "contents"])]
    pub file: Option<PathBuf>,
    /// Fingerprint the bytes of this file (not a registry key)
    #[arg(long, conflicts_with_all = ["text", "json"])]
    pub contents: Option<PathBuf>,
    /// Fingerprint this JSON document in canonical form
    #[arg(long, conflicts_with = "text")]
    pub json: Option<String>,
    /// Sort object keys before hashing JSON
    #[arg(long, requires = "json")]
    pub sorted: bool,
}

#[derive(Args)]
pub struct RegisterArgs {
    /// Report file; only its name is hashed
    pub file: PathBuf,
}

#[derive(Args)]
pub struct FeedArgs {
    /// Stop after this many registrations (default: run until Ctrl-C)
    #[arg(short = 'n', long, value_parser = clap::value_parser!(u64).range(1..))]
    pub count: Option<u64>,
    /// Seconds between samples (overrides the config file)
    #[arg(long)]
    pub interval: Option<u64>,
}

#[derive(Args)]
pub struct AttestArgs {
    /// Content hash (0x-prefixed, 64 hex digits)
    pub hash: String,
    #[arg(long, conflicts_with = "fail", required_unless_present = "fail")]
    pub pass: bool,
    #[arg(long)]
    pub fail: bool,
    #[arg(short, long)]
    pub reason: String,
}

#[derive(Args)]
pub struct StatusArgs {
    pub hash: String,
}

#[derive(Args)]
pub struct TiersArgs {
    /// Balance in whole tokens
    pub balance: f64,
}

#[derive(Args)]
pub struct UploadArgs {
    pub file: PathBuf,
    /// Write the returned QR code image here
    #[arg(long)]
    pub qr_out: Option<PathBuf>,
}
