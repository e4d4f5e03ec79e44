//! # Umbra CLI
//!
//! Local tooling for confidential balances: key generation, encryption and
//! recovery of balances, proof generation and verification, and contract
//! calldata encoding.

mod balance;
mod keys;
mod prove;
mod settings;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use umbra_config::UmbraConfig;

#[derive(Parser, Debug)]
#[command(name = "umbra")]
#[command(about = "Confidential balance tooling for Umbra", long_about = None)]
struct Args {
    /// Config file (otherwise UMBRA_CONFIG, ./umbra.toml, ~/.umbra/umbra.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a key pair and print its registration bytes
    Keygen(keys::KeygenArgs),

    /// Encrypt an amount under a public key
    Encrypt(balance::EncryptArgs),

    /// Decrypt an on-chain balance for display
    Recover(balance::RecoverArgs),

    /// Split a 128-byte balance into circuit points
    Decode(balance::DecodeArgs),

    /// Generate a proof from a JSON parameters file
    #[command(subcommand)]
    Prove(prove::ProveCommand),

    /// Check a proof bundle against its circuit's verification key
    Verify(prove::VerifyArgs),

    /// Encode proof public inputs as contract calldata
    #[command(subcommand)]
    Encode(prove::EncodeCommand),

    /// Print a sample config file
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    match args.command {
        Command::Keygen(cmd) => keys::keygen(cmd),
        Command::Encrypt(cmd) => balance::encrypt(cmd),
        Command::Recover(cmd) => balance::recover(cmd, &load_config(args.config)?),
        Command::Decode(cmd) => balance::decode(cmd),
        Command::Prove(cmd) => prove::prove(cmd, &load_config(args.config)?).await,
        Command::Verify(cmd) => prove::verify(cmd, &load_config(args.config)?).await,
        Command::Encode(cmd) => prove::encode(cmd),
        Command::Config => {
            print!("{}", UmbraConfig::generate_sample());
            Ok(())
        }
    }
}

fn load_config(path: Option<PathBuf>) -> Result<UmbraConfig> {
    match path {
        Some(path) => UmbraConfig::load_from(&path),
        None => UmbraConfig::load(),
    }
}
