//! Proving backends
//!
//! A backend is bound to one circuit. Proving is strictly two-phase: witness
//! execution against concrete inputs, then proof generation from that
//! witness. A finished proof can be checked against the same circuit with
//! [`ProvingBackend::verify_proof`]. A [`BackendLoader`] creates backends on
//! demand; the orchestrator caches what it loads.

use std::future::Future;

use crate::circuit::{CircuitId, ProofBundle, ProofOptions};
use crate::error::Result;
use crate::inputs::CircuitInputs;

pub mod mock;
pub mod nargo;

pub use mock::{MockLoader, MockProvingBackend};
pub use nargo::{NargoBackend, NargoConfig, NargoLoader};

/// One loaded circuit able to execute witnesses and prove them
pub trait ProvingBackend: Send + Sync + 'static {
    /// Output of witness execution, consumed by proof generation
    type Witness: Send;

    fn circuit(&self) -> CircuitId;

    /// Solve the circuit for `inputs`. A transition the circuit rejects
    /// fails with `InvalidWitness`.
    fn execute_witness(
        &self,
        inputs: &CircuitInputs,
    ) -> impl Future<Output = Result<Self::Witness>> + Send;

    fn generate_proof(
        &self,
        witness: Self::Witness,
        options: ProofOptions,
    ) -> impl Future<Output = Result<ProofBundle>> + Send;

    /// Check `bundle` against this circuit's verification key. A proof that
    /// does not verify is `Ok(false)`; `Err` means verification could not run.
    fn verify_proof(
        &self,
        bundle: &ProofBundle,
        options: ProofOptions,
    ) -> impl Future<Output = Result<bool>> + Send;
}

/// Creates the backend for a circuit identity
pub trait BackendLoader: Send + Sync + 'static {
    type Backend: ProvingBackend;

    fn load(&self, circuit: CircuitId) -> impl Future<Output = Result<Self::Backend>> + Send;
}
