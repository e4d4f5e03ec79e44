//! Proof generation, verification and calldata encoding

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, Subcommand};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::info;
use umbra_balance::{DepositLayout, TransferLayout, encode_withdraw_layout};
use umbra_config::UmbraConfig;
use umbra_prover::{
    BackendLoader, CircuitId, MockLoader, NargoLoader, ProofBundle, ProofOrchestrator,
    ProofRequest,
};

use crate::settings::{nargo_config, proof_options};

#[derive(Subcommand, Debug)]
pub enum ProveCommand {
    /// Credit an account
    Deposit(ProveArgs),
    /// Debit an account
    Withdraw(ProveArgs),
    /// Move an amount between two accounts
    Transfer(ProveArgs),
}

#[derive(Args, Debug)]
pub struct ProveArgs {
    /// JSON parameters file
    #[arg(long)]
    params: PathBuf,

    /// Evaluate with the mock backend instead of nargo and bb
    #[arg(long)]
    mock: bool,

    /// Discrete-log bound of the mock backend
    #[arg(long, default_value_t = 10_000_000)]
    mock_bound: u64,

    /// Write the proof bundle JSON here instead of stdout
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Proof bundle JSON written by `umbra prove`
    #[arg(long)]
    bundle: PathBuf,

    /// Check against the mock backend instead of bb
    #[arg(long)]
    mock: bool,

    /// Discrete-log bound of the mock backend
    #[arg(long, default_value_t = 10_000_000)]
    mock_bound: u64,
}

#[derive(Subcommand, Debug)]
pub enum EncodeCommand {
    /// 416-byte deposit or withdraw calldata
    Deposit(EncodeArgs),
    /// 704-byte transfer calldata
    Transfer(EncodeArgs),
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Proof bundle JSON, or a JSON array of public inputs
    public_inputs: PathBuf,
}

/// Either shape `encode` accepts
#[derive(Deserialize)]
#[serde(untagged)]
enum PublicInputsFile {
    Bundle(ProofBundle),
    Inputs(Vec<String>),
}

impl PublicInputsFile {
    fn into_inputs(self) -> Vec<String> {
        match self {
            Self::Bundle(bundle) => bundle.public_inputs,
            Self::Inputs(inputs) => inputs,
        }
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Failed to parse {}", path.display()))
}

pub async fn prove(command: ProveCommand, config: &UmbraConfig) -> Result<()> {
    let (request, args) = match command {
        ProveCommand::Deposit(args) => (ProofRequest::Deposit(read_json(&args.params)?), args),
        ProveCommand::Withdraw(args) => (ProofRequest::Withdraw(read_json(&args.params)?), args),
        ProveCommand::Transfer(args) => (ProofRequest::Transfer(read_json(&args.params)?), args),
    };
    let options = proof_options(config);

    let bundle = if args.mock {
        info!(bound = args.mock_bound, "using mock backend");
        run(ProofOrchestrator::with_options(MockLoader::new(args.mock_bound), options), &request)
            .await?
    } else {
        run(
            ProofOrchestrator::with_options(NargoLoader::new(nargo_config(config)), options),
            &request,
        )
        .await?
    };

    let json = serde_json::to_string_pretty(&bundle)?;
    match &args.out {
        Some(path) => {
            fs::write(path, &json).with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Wrote proof bundle to {}", path.display());
        }
        None => println!("{json}"),
    }
    println!("calldata: {}", calldata(&bundle)?);
    Ok(())
}

pub async fn verify(args: VerifyArgs, config: &UmbraConfig) -> Result<()> {
    let bundle: ProofBundle = read_json(&args.bundle)?;
    let options = proof_options(config);

    let valid = if args.mock {
        info!(bound = args.mock_bound, "using mock backend");
        check(ProofOrchestrator::with_options(MockLoader::new(args.mock_bound), options), &bundle)
            .await?
    } else {
        check(
            ProofOrchestrator::with_options(NargoLoader::new(nargo_config(config)), options),
            &bundle,
        )
        .await?
    };

    if !valid {
        bail!("{} proof in {} did not verify", bundle.circuit, args.bundle.display());
    }
    println!("{} proof is valid", bundle.circuit);
    Ok(())
}

async fn check<L: BackendLoader>(
    orchestrator: ProofOrchestrator<L>,
    bundle: &ProofBundle,
) -> Result<bool> {
    Ok(orchestrator.verify_proof(bundle).await?)
}

async fn run<L: BackendLoader>(
    orchestrator: ProofOrchestrator<L>,
    request: &ProofRequest,
) -> Result<ProofBundle> {
    Ok(orchestrator.prove(request).await?)
}

fn calldata(bundle: &ProofBundle) -> Result<String> {
    let hex = match bundle.circuit {
        CircuitId::Deposit => DepositLayout::encode(&bundle.public_inputs)?.to_hex(),
        CircuitId::Withdraw => {
            format!("0x{}", hex::encode(encode_withdraw_layout(&bundle.public_inputs)?))
        }
        CircuitId::Transfer => TransferLayout::encode(&bundle.public_inputs)?.to_hex(),
    };
    Ok(hex)
}

pub fn encode(command: EncodeCommand) -> Result<()> {
    let hex = match command {
        EncodeCommand::Deposit(args) => {
            let inputs = read_json::<PublicInputsFile>(&args.public_inputs)?.into_inputs();
            DepositLayout::encode(&inputs)?.to_hex()
        }
        EncodeCommand::Transfer(args) => {
            let inputs = read_json::<PublicInputsFile>(&args.public_inputs)?.into_inputs();
            TransferLayout::encode(&inputs)?.to_hex()
        }
    };
    println!("{hex}");
    Ok(())
}
