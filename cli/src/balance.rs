//! Encrypted balance commands

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Args;
use umbra_balance::{BalanceRecovery, EncryptedBalance, truncate_amount};
use umbra_config::UmbraConfig;
use umbra_elgamal::{POINT_BYTES, PrivateKey, PublicKey, Scalar, encrypt as elgamal_encrypt, generate_randomness};

use crate::keys::KeyFile;

#[derive(Args, Debug)]
pub struct EncryptArgs {
    /// Registered public key, `0x` + 128 hex digits (`x || y`)
    #[arg(long)]
    public_key: String,

    /// Amount in token base units; the low six digits are dropped
    #[arg(long)]
    amount: String,

    /// Encryption randomness (fresh if omitted)
    #[arg(long)]
    randomness: Option<String>,
}

#[derive(Args, Debug)]
pub struct RecoverArgs {
    /// Encrypted balance, `0x` + 256 hex digits
    #[arg(long)]
    balance: String,

    /// Private key (decimal or `0x` hex)
    #[arg(long, env = "UMBRA_PRIVATE_KEY", hide_env_values = true, conflicts_with = "key_file")]
    private_key: Option<String>,

    /// Key file written by `umbra keygen --out`
    #[arg(long)]
    key_file: Option<PathBuf>,

    /// Discrete-log search bound (defaults to the configured one)
    #[arg(long)]
    bound: Option<u64>,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Encrypted balance, `0x` + 256 hex digits
    balance: String,
}

pub fn parse_public_key(s: &str) -> Result<PublicKey> {
    let s = s.trim();
    let hex_str = s.strip_prefix("0x").unwrap_or(s);
    let bytes: [u8; POINT_BYTES] = hex::decode(hex_str)
        .context("public key is not hex")?
        .try_into()
        .map_err(|b: Vec<u8>| anyhow::anyhow!("public key must be {POINT_BYTES} bytes, got {}", b.len()))?;
    Ok(PublicKey::from_bytes(&bytes)?)
}

pub fn encrypt(args: EncryptArgs) -> Result<()> {
    let pk = parse_public_key(&args.public_key)?;
    if pk.is_zero() {
        bail!("public key is not registered");
    }
    let amount = truncate_amount(&args.amount)?;
    let randomness = match &args.randomness {
        Some(r) => Scalar::parse(r)?,
        None => generate_randomness(),
    };
    let ciphertext = elgamal_encrypt(&pk, amount, &randomness)?;
    println!("{}", EncryptedBalance::from_ciphertext(&ciphertext).to_hex());
    Ok(())
}

pub fn recover(args: RecoverArgs, config: &UmbraConfig) -> Result<()> {
    let private_key: PrivateKey = match (&args.private_key, &args.key_file) {
        (Some(sk), _) => sk.parse()?,
        (None, Some(path)) => KeyFile::read(path)?.private_key,
        (None, None) => bail!("pass --private-key or --key-file"),
    };
    let balance = EncryptedBalance::from_hex(&args.balance)?;
    let recovery = BalanceRecovery::with_bound(args.bound.unwrap_or(config.recovery.dlog_bound));
    println!("{}", recovery.recover_balance(&balance, &private_key)?);
    Ok(())
}

pub fn decode(args: DecodeArgs) -> Result<()> {
    let balance = EncryptedBalance::from_hex(&args.balance)?;
    println!("{}", serde_json::to_string_pretty(&balance.points())?);
    Ok(())
}
