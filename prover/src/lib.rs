//! Umbra prover
//!
//! Turns typed deposit, withdraw and transfer parameters into proofs of the
//! matching balance circuit.
//!
//! ```text
//! ProofRequest ─▶ CircuitInputs ─▶ ProofOrchestrator ─▶ ProofBundle
//!                                        │                  │
//!                          BackendCache (one per circuit)   └─▶ umbra_balance layouts
//!                                        │
//!                   ┌────────────────────┴──────────────┐
//!              NargoBackend (nargo + bb)        MockProvingBackend
//! ```

pub mod backend;
pub mod cache;
pub mod circuit;
pub mod error;
pub mod inputs;
pub mod orchestrator;

pub use backend::{
    BackendLoader, MockLoader, MockProvingBackend, NargoBackend, NargoConfig, NargoLoader,
    ProvingBackend,
};
pub use cache::BackendCache;
pub use circuit::{CircuitId, HashingScheme, ProofBundle, ProofOptions};
pub use error::{ProverError, Result};
pub use inputs::{
    BalanceChangeInputs, BalanceChangeParams, CircuitInputs, DepositParams, ProofRequest,
    TransferInputs, TransferParams, WithdrawParams,
};
pub use orchestrator::{ProofJob, ProofOrchestrator, ProofStage};
