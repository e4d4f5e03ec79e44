//! Key generation and key files

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::Args;
use serde::{Deserialize, Serialize};
use umbra_elgamal::{KeyPair, PrivateKey, PublicKey, derive_key_pair};

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

#[derive(Args, Debug)]
pub struct KeygenArgs {
    /// Derive deterministically from a seed (fixtures only)
    #[arg(long)]
    seed: Option<String>,

    /// Write the key pair to this file (created with mode 600)
    #[arg(long)]
    out: Option<PathBuf>,
}

/// On-disk key pair
#[derive(Serialize, Deserialize)]
pub struct KeyFile {
    pub private_key: String,
    pub public_key: PublicKey,
}

impl KeyFile {
    pub fn read(path: &Path) -> Result<KeyPair> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read key file: {}", path.display()))?;
        let file: KeyFile = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse key file: {}", path.display()))?;
        let private_key: PrivateKey = file.private_key.parse()?;
        let pair = KeyPair::from_private_key(private_key)?;
        if pair.public_key != file.public_key {
            bail!("{}: public key does not match the private key", path.display());
        }
        Ok(pair)
    }
}

pub fn keygen(args: KeygenArgs) -> Result<()> {
    let pair = derive_key_pair(args.seed.as_deref().map(str::as_bytes))?;
    let pk = &pair.public_key;

    match &args.out {
        Some(path) => {
            write_key_file(path, &pair)?;
            println!("Wrote key pair to {}", path.display());
        }
        None => println!("private key:  {}", pair.private_key.expose_hex()),
    }
    println!("public key x: {}", pk.x_decimal());
    println!("public key y: {}", pk.y_decimal());
    println!("registration: 0x{}", hex::encode(pk.to_bytes()));
    Ok(())
}

fn write_key_file(path: &Path, pair: &KeyPair) -> Result<()> {
    if path.exists() {
        bail!(
            "File {} already exists. Remove it first or use a different filename.",
            path.display()
        );
    }
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }

    let json = serde_json::to_string_pretty(&KeyFile {
        private_key: pair.private_key.expose_hex(),
        public_key: pair.public_key,
    })?;

    let mut f = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;

    #[cfg(unix)]
    {
        // chmod 600 (rw-------)
        let mut perms = f.metadata()?.permissions();
        perms.set_mode(0o600);
        fs::set_permissions(path, perms)?;
    }

    f.write_all(json.as_bytes())?;
    Ok(())
}
