//! Noir backend
//!
//! Wraps the `nargo` and `bb` CLI tools. Each circuit is a Noir package under
//! a common circuits directory, compiled ahead of time:
//!
//! ```text
//! <circuits_dir>/<package>/
//!   Nargo.toml
//!   target/<package>.json      compiled artifact (ABI + bytecode)
//! ```
//!
//! Witness execution writes a uniquely named prover TOML next to `Nargo.toml`
//! and runs `nargo execute`; proof generation runs `bb prove` on the witness.
//! Verification writes a bundle back out in bb's layout and runs `bb verify`,
//! using `target/vk` when present and `bb write_vk` otherwise. Every
//! temporary file is removed once it has been consumed.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use serde::Deserialize;
use sha2::{Digest, Sha256};
use tokio::process::Command;
use tracing::{debug, error, info, warn};
use umbra_elgamal::field::{biguint_to_be_bytes, parse_field_element};

use super::{BackendLoader, ProvingBackend};
use crate::circuit::{CircuitId, ProofBundle, ProofOptions};
use crate::error::{ProverError, Result};
use crate::inputs::CircuitInputs;

/// Width of one public input in bb's `public_inputs` file
const FIELD_BYTES: usize = 32;

// ============================================================================
// Configuration
// ============================================================================

/// Where the circuits live and which binaries drive them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NargoConfig {
    pub circuits_dir: PathBuf,
    pub nargo_bin: PathBuf,
    pub bb_bin: PathBuf,
    pub deposit_package: String,
    pub withdraw_package: String,
    pub transfer_package: String,
}

impl Default for NargoConfig {
    fn default() -> Self {
        Self {
            circuits_dir: PathBuf::from("circuits"),
            nargo_bin: PathBuf::from("nargo"),
            bb_bin: PathBuf::from("bb"),
            deposit_package: "deposit".to_string(),
            withdraw_package: "withdraw".to_string(),
            transfer_package: "transfer".to_string(),
        }
    }
}

impl NargoConfig {
    pub fn package(&self, circuit: CircuitId) -> &str {
        match circuit {
            CircuitId::Deposit => &self.deposit_package,
            CircuitId::Withdraw => &self.withdraw_package,
            CircuitId::Transfer => &self.transfer_package,
        }
    }

    pub fn package_dir(&self, circuit: CircuitId) -> PathBuf {
        self.circuits_dir.join(self.package(circuit))
    }
}

// ============================================================================
// Artifact
// ============================================================================

/// The subset of a compiled Noir artifact the backend reads
#[derive(Debug, Deserialize)]
struct CircuitArtifact {
    bytecode: String,
    abi: Abi,
}

#[derive(Debug, Deserialize)]
struct Abi {
    parameters: Vec<AbiParameter>,
}

#[derive(Debug, Deserialize)]
struct AbiParameter {
    name: String,
}

// ============================================================================
// Loader
// ============================================================================

#[derive(Debug, Clone)]
pub struct NargoLoader {
    config: NargoConfig,
}

impl NargoLoader {
    pub fn new(config: NargoConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &NargoConfig {
        &self.config
    }
}

impl BackendLoader for NargoLoader {
    type Backend = NargoBackend;

    async fn load(&self, circuit: CircuitId) -> Result<NargoBackend> {
        NargoBackend::load(&self.config, circuit).await
    }
}

// ============================================================================
// Backend
// ============================================================================

/// A compiled circuit package driven through `nargo` and `bb`
#[derive(Debug)]
pub struct NargoBackend {
    circuit: CircuitId,
    package_dir: PathBuf,
    artifact_path: PathBuf,
    parameters: Vec<String>,
    bytecode_hash: [u8; 32],
    nargo_bin: PathBuf,
    bb_bin: PathBuf,
}

/// Witness file produced by `nargo execute`; deleted when dropped
#[derive(Debug)]
pub struct NargoWitness {
    path: PathBuf,
}

impl NargoWitness {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for NargoWitness {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

impl NargoBackend {
    /// Read the compiled artifact of `circuit`'s package
    pub async fn load(config: &NargoConfig, circuit: CircuitId) -> Result<Self> {
        let package = config.package(circuit);
        let package_dir = config.package_dir(circuit);
        if !package_dir.exists() {
            return Err(ProverError::CircuitNotFound(package_dir));
        }
        // Absolute paths keep child processes independent of our cwd
        let package_dir = package_dir.canonicalize().unwrap_or(package_dir);

        let artifact_path = package_dir.join("target").join(format!("{package}.json"));
        if !artifact_path.exists() {
            return Err(ProverError::CircuitNotFound(artifact_path));
        }

        let raw = tokio::fs::read(&artifact_path).await?;
        let artifact: CircuitArtifact = serde_json::from_slice(&raw)?;
        let bytecode_hash: [u8; 32] = Sha256::digest(artifact.bytecode.as_bytes()).into();
        let parameters: Vec<String> = artifact.abi.parameters.into_iter().map(|p| p.name).collect();

        info!(
            circuit = %circuit,
            package,
            parameters = parameters.len(),
            bytecode = %hex::encode(&bytecode_hash[..8]),
            "loaded circuit artifact"
        );

        Ok(Self {
            circuit,
            package_dir,
            artifact_path,
            parameters,
            bytecode_hash,
            nargo_bin: config.nargo_bin.clone(),
            bb_bin: config.bb_bin.clone(),
        })
    }

    /// ABI parameter names, in declaration order
    pub fn parameters(&self) -> &[String] {
        &self.parameters
    }

    /// SHA-256 of the artifact bytecode
    pub fn bytecode_hash(&self) -> [u8; 32] {
        self.bytecode_hash
    }

    fn check_parameters(&self, inputs: &CircuitInputs) -> Result<()> {
        if inputs.circuit() != self.circuit {
            return Err(ProverError::InvalidWitness(format!(
                "{} inputs given to the {} circuit",
                inputs.circuit(),
                self.circuit
            )));
        }
        let provided = inputs.parameter_names()?;
        let missing: Vec<&str> = self
            .parameters
            .iter()
            .filter(|name| !provided.contains(*name))
            .map(String::as_str)
            .collect();
        if !missing.is_empty() {
            return Err(ProverError::InvalidWitness(format!(
                "missing circuit parameters: {}",
                missing.join(", ")
            )));
        }
        Ok(())
    }
}

impl ProvingBackend for NargoBackend {
    type Witness = NargoWitness;

    fn circuit(&self) -> CircuitId {
        self.circuit
    }

    async fn execute_witness(&self, inputs: &CircuitInputs) -> Result<NargoWitness> {
        self.check_parameters(inputs)?;

        // Step 1: Write a prover TOML unique to this request
        let id = uuid::Uuid::new_v4().simple();
        let prover_name = format!("Prover_{id}");
        let witness_name = format!("witness_{id}");
        let prover_toml_path = self.package_dir.join(format!("{prover_name}.toml"));
        let toml_content = inputs.to_prover_toml()?;

        debug!("Writing {}.toml ({} bytes)", prover_name, toml_content.len());
        tokio::fs::write(&prover_toml_path, &toml_content).await?;

        // Step 2: Execute nargo to solve the witness
        info!(circuit = %self.circuit, "executing nargo execute {}", witness_name);
        let output = Command::new(&self.nargo_bin)
            .args(["execute", "--prover-name", &prover_name, &witness_name])
            .current_dir(&self.package_dir)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await;

        let _ = tokio::fs::remove_file(&prover_toml_path).await;
        let output = output?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            error!(circuit = %self.circuit, "nargo execute failed: {}", stderr.trim());
            return Err(ProverError::InvalidWitness(stderr.trim().to_string()));
        }
        debug!("nargo output: {}", String::from_utf8_lossy(&output.stdout));

        let path = self
            .package_dir
            .join("target")
            .join(format!("{witness_name}.gz"));
        if !path.exists() {
            return Err(ProverError::ProofFileNotFound(path));
        }
        Ok(NargoWitness { path })
    }

    async fn generate_proof(
        &self,
        witness: NargoWitness,
        options: ProofOptions,
    ) -> Result<ProofBundle> {
        let out_dir = self
            .package_dir
            .join("target")
            .join(format!("proof_{}", uuid::Uuid::new_v4().simple()));
        tokio::fs::create_dir_all(&out_dir).await?;

        // Step 3: bb prove --scheme ultra_honk -b <artifact> -w <witness> -o <dir>
        info!(circuit = %self.circuit, hashing = %options.hashing, "executing bb prove");
        let output = self
            .bb(["prove", "--scheme", "ultra_honk"])
            .arg("-b")
            .arg(&self.artifact_path)
            .arg("-w")
            .arg(witness.path())
            .arg("-o")
            .arg(&out_dir)
            .args(["--oracle_hash", options.hashing.as_str()])
            .output()
            .await;

        drop(witness);
        let result = match output {
            Ok(output) if output.status.success() => read_proof_output(self.circuit, &out_dir).await,
            Ok(output) => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                error!(circuit = %self.circuit, "bb prove failed: {}", stderr.trim());
                Err(ProverError::Backend {
                    tool: "bb".into(),
                    message: stderr.trim().to_string(),
                })
            }
            Err(e) => Err(e.into()),
        };
        let _ = tokio::fs::remove_dir_all(&out_dir).await;
        result
    }

    async fn verify_proof(&self, bundle: &ProofBundle, options: ProofOptions) -> Result<bool> {
        if bundle.circuit != self.circuit {
            warn!(
                circuit = %self.circuit,
                "{} proof given to the {} circuit",
                bundle.circuit,
                self.circuit
            );
            return Ok(false);
        }
        let work_dir = self
            .package_dir
            .join("target")
            .join(format!("verify_{}", uuid::Uuid::new_v4().simple()));
        tokio::fs::create_dir_all(&work_dir).await?;

        let result = self.run_verify(bundle, options, &work_dir).await;
        let _ = tokio::fs::remove_dir_all(&work_dir).await;
        result
    }
}

impl NargoBackend {
    async fn run_verify(
        &self,
        bundle: &ProofBundle,
        options: ProofOptions,
        work_dir: &Path,
    ) -> Result<bool> {
        let proof_path = work_dir.join("proof");
        let public_inputs_path = work_dir.join("public_inputs");
        tokio::fs::write(&proof_path, &bundle.proof).await?;
        tokio::fs::write(&public_inputs_path, encode_public_inputs(&bundle.public_inputs)?).await?;

        let vk_path = self.verification_key(options, work_dir).await?;

        // bb verify --scheme ultra_honk -k <vk> -p <proof> -i <public_inputs>
        info!(circuit = %self.circuit, hashing = %options.hashing, "executing bb verify");
        let output = self
            .bb(["verify", "--scheme", "ultra_honk"])
            .arg("-k")
            .arg(&vk_path)
            .arg("-p")
            .arg(&proof_path)
            .arg("-i")
            .arg(&public_inputs_path)
            .args(["--oracle_hash", options.hashing.as_str()])
            .output()
            .await?;

        let valid = output.status.success();
        if !valid {
            warn!(
                circuit = %self.circuit,
                "proof rejected: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        Ok(valid)
    }

    /// `target/vk` if the package ships one, else a key written into `work_dir`
    async fn verification_key(&self, options: ProofOptions, work_dir: &Path) -> Result<PathBuf> {
        let shipped = self.package_dir.join("target").join("vk");
        if shipped.exists() {
            return Ok(shipped);
        }

        // bb write_vk --scheme ultra_honk -b <artifact> -o <dir>
        info!(circuit = %self.circuit, "executing bb write_vk");
        let output = self
            .bb(["write_vk", "--scheme", "ultra_honk"])
            .arg("-b")
            .arg(&self.artifact_path)
            .arg("-o")
            .arg(work_dir)
            .args(["--oracle_hash", options.hashing.as_str()])
            .output()
            .await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            error!(circuit = %self.circuit, "bb write_vk failed: {}", stderr.trim());
            return Err(ProverError::Backend {
                tool: "bb".into(),
                message: stderr.trim().to_string(),
            });
        }

        let vk_path = work_dir.join("vk");
        if !vk_path.exists() {
            return Err(ProverError::ProofFileNotFound(vk_path));
        }
        Ok(vk_path)
    }

    fn bb<const N: usize>(&self, args: [&str; N]) -> Command {
        let mut command = Command::new(&self.bb_bin);
        command
            .args(args)
            .current_dir(&self.package_dir)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        command
    }
}

/// Step 4: read `proof` and `public_inputs` from bb's output directory
async fn read_proof_output(circuit: CircuitId, out_dir: &Path) -> Result<ProofBundle> {
    let proof_path = out_dir.join("proof");
    let public_inputs_path = out_dir.join("public_inputs");
    if !proof_path.exists() {
        return Err(ProverError::ProofFileNotFound(proof_path));
    }
    if !public_inputs_path.exists() {
        return Err(ProverError::ProofFileNotFound(public_inputs_path));
    }

    let proof = tokio::fs::read(&proof_path).await?;
    let public_inputs = parse_public_inputs(&tokio::fs::read(&public_inputs_path).await?)?;

    info!(
        circuit = %circuit,
        "Proof generated: {} bytes proof, {} public inputs",
        proof.len(),
        public_inputs.len()
    );

    Ok(ProofBundle {
        circuit,
        proof,
        public_inputs,
    })
}

/// Split bb's concatenated 32-byte big-endian fields into `0x` hex strings
pub fn parse_public_inputs(bytes: &[u8]) -> Result<Vec<String>> {
    if bytes.len() % FIELD_BYTES != 0 {
        return Err(ProverError::Backend {
            tool: "bb".into(),
            message: format!(
                "public_inputs is {} bytes, not a multiple of {FIELD_BYTES}",
                bytes.len()
            ),
        });
    }
    Ok(bytes
        .chunks_exact(FIELD_BYTES)
        .map(|field| format!("0x{}", hex::encode(field)))
        .collect())
}

/// Join public inputs back into bb's `public_inputs` file
pub fn encode_public_inputs(inputs: &[String]) -> Result<Vec<u8>> {
    let mut bytes = Vec::with_capacity(inputs.len() * FIELD_BYTES);
    for input in inputs {
        bytes.extend_from_slice(&biguint_to_be_bytes(&parse_field_element(input)?));
    }
    Ok(bytes)
}
