//! Proof orchestration
//!
//! ```text
//! ProofRequest ──to_inputs──▶ CircuitInputs
//!                                  │
//!        ┌─────────────────────────┘
//!        ▼
//!  [Executing]  backend = cache.get_or_init(circuit, loader.load)
//!               witness = backend.execute_witness(inputs)
//!        │
//!        ▼
//!  [Proving]    bundle  = backend.generate_proof(witness, options)
//!        │
//!        ▼
//!  [Done] / [Failed]
//! ```
//!
//! Verification goes through the same cached backend as proving.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::backend::{BackendLoader, ProvingBackend};
use crate::cache::BackendCache;
use crate::circuit::{CircuitId, ProofBundle, ProofOptions};
use crate::error::{ProverError, Result};
use crate::inputs::{DepositParams, ProofRequest, TransferParams, WithdrawParams};

// ============================================================================
// Job State
// ============================================================================

/// Where a proof job stands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProofStage {
    Idle,
    /// Loading the backend and solving the witness
    Executing,
    /// Generating the proof from a solved witness
    Proving,
    Done,
    Failed(String),
}

impl ProofStage {
    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Done | Self::Failed(_))
    }
}

/// Handle to a spawned proof.
///
/// Dropping the handle abandons the result; the proof itself runs to
/// completion.
#[derive(Debug)]
pub struct ProofJob {
    circuit: CircuitId,
    stage: watch::Receiver<ProofStage>,
    handle: JoinHandle<Result<ProofBundle>>,
}

impl ProofJob {
    pub fn circuit(&self) -> CircuitId {
        self.circuit
    }

    /// The current stage
    pub fn stage(&self) -> ProofStage {
        self.stage.borrow().clone()
    }

    /// A receiver that observes every stage change
    pub fn subscribe(&self) -> watch::Receiver<ProofStage> {
        self.stage.clone()
    }

    /// Wait for the proof
    pub async fn wait(self) -> Result<ProofBundle> {
        self.handle.await.map_err(|e| ProverError::Backend {
            tool: "proof task".into(),
            message: e.to_string(),
        })?
    }
}

// ============================================================================
// Orchestrator
// ============================================================================

/// Generates deposit, withdraw and transfer proofs.
///
/// Backends are loaded through `L` on first use of each circuit and kept for
/// the orchestrator's lifetime.
pub struct ProofOrchestrator<L: BackendLoader> {
    loader: L,
    cache: BackendCache<L::Backend>,
    options: ProofOptions,
}

impl<L: BackendLoader> ProofOrchestrator<L> {
    pub fn new(loader: L) -> Self {
        Self::with_options(loader, ProofOptions::default())
    }

    pub fn with_options(loader: L, options: ProofOptions) -> Self {
        Self {
            loader,
            cache: BackendCache::new(),
            options,
        }
    }

    pub fn options(&self) -> ProofOptions {
        self.options
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    /// The backend for `circuit`, loading it on first use
    pub async fn backend(&self, circuit: CircuitId) -> Result<Arc<L::Backend>> {
        self.cache
            .get_or_init(circuit, || self.loader.load(circuit))
            .await
    }

    /// Circuits with a loaded backend
    pub async fn cached_backends(&self) -> Vec<CircuitId> {
        self.cache.cached().await
    }

    pub async fn generate_deposit_proof(&self, params: &DepositParams) -> Result<ProofBundle> {
        self.prove(&ProofRequest::Deposit(params.clone())).await
    }

    pub async fn generate_withdraw_proof(&self, params: &WithdrawParams) -> Result<ProofBundle> {
        self.prove(&ProofRequest::Withdraw(params.clone())).await
    }

    pub async fn generate_transfer_proof(&self, params: &TransferParams) -> Result<ProofBundle> {
        self.prove(&ProofRequest::Transfer(params.clone())).await
    }

    pub async fn prove(&self, request: &ProofRequest) -> Result<ProofBundle> {
        self.run(request, None).await
    }

    /// Check a bundle with the backend of the circuit it claims
    pub async fn verify_proof(&self, bundle: &ProofBundle) -> Result<bool> {
        let backend = self.backend(bundle.circuit).await?;
        let valid = backend.verify_proof(bundle, self.options).await?;
        info!(circuit = %bundle.circuit, valid, "proof verified");
        Ok(valid)
    }

    /// Run `request` on its own task and return a handle to observe it
    pub fn spawn(self: &Arc<Self>, request: ProofRequest) -> ProofJob {
        let circuit = request.circuit();
        let (tx, rx) = watch::channel(ProofStage::Idle);
        let this = Arc::clone(self);
        let handle = tokio::spawn(async move { this.run(&request, Some(&tx)).await });
        ProofJob {
            circuit,
            stage: rx,
            handle,
        }
    }

    async fn run(
        &self,
        request: &ProofRequest,
        stage: Option<&watch::Sender<ProofStage>>,
    ) -> Result<ProofBundle> {
        let circuit = request.circuit();
        let set = |s: ProofStage| {
            if let Some(tx) = stage {
                // no receivers left is fine; the job was abandoned
                let _ = tx.send(s);
            }
        };

        let result = self.run_stages(request, &set).await;
        match &result {
            Ok(bundle) => {
                info!(
                    circuit = %circuit,
                    proof_bytes = bundle.proof.len(),
                    public_inputs = bundle.public_inputs.len(),
                    "proof generated"
                );
                set(ProofStage::Done);
            }
            Err(e) => {
                error!(circuit = %circuit, "proof failed: {e}");
                set(ProofStage::Failed(e.to_string()));
            }
        }
        result
    }

    async fn run_stages(
        &self,
        request: &ProofRequest,
        set: &(impl Fn(ProofStage) + Sync),
    ) -> Result<ProofBundle> {
        let circuit = request.circuit();
        info!(circuit = %circuit, "generating proof");

        set(ProofStage::Executing);
        let inputs = request.to_inputs()?;
        let backend = self.backend(circuit).await?;
        let witness = backend.execute_witness(&inputs).await?;

        set(ProofStage::Proving);
        let bundle = backend.generate_proof(witness, self.options).await?;

        let expected = circuit.public_input_count();
        if bundle.public_inputs.len() < expected {
            return Err(ProverError::Backend {
                tool: circuit.to_string(),
                message: format!(
                    "expected {expected} public inputs, got {}",
                    bundle.public_inputs.len()
                ),
            });
        }
        Ok(bundle)
    }
}
