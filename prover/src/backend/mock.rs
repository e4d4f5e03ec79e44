//! Mock backend (for testing)
//!
//! Evaluates each balance transition with real ElGamal arithmetic instead of
//! running a circuit, then stands in a deterministic hash for the proof. The
//! public inputs it emits match the real circuits value for value, so they
//! drive the contract layouts and balance recovery exactly as a real proof
//! would. Nothing selects this backend implicitly.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use sha2::{Digest, Sha256};
use tracing::{debug, info};
use umbra_balance::CircuitPoint;
use umbra_elgamal::field::{biguint_to_be_bytes, parse_field_element};
use umbra_elgamal::{
    Ciphertext, DiscreteLog, Point, PrivateKey, Scalar, decrypt, encrypt, homomorphic_add,
    homomorphic_subtract,
};

use super::{BackendLoader, ProvingBackend};
use crate::circuit::{CircuitId, ProofBundle, ProofOptions};
use crate::error::{ProverError, Result};
use crate::inputs::{BalanceChangeInputs, CircuitInputs, TransferInputs};

/// Size of the mock proof blob
pub const MOCK_PROOF_LEN: usize = 14 * 32;

// ============================================================================
// Loader
// ============================================================================

/// Hands out mock backends that share one discrete-log table
#[derive(Debug, Clone)]
pub struct MockLoader {
    table: Arc<DiscreteLog>,
    load_delay: Duration,
    loads: Arc<AtomicUsize>,
    failures: Arc<AtomicUsize>,
}

impl MockLoader {
    /// `bound` caps the balances the mock can decrypt
    pub fn new(bound: u64) -> Self {
        Self::with_table(Arc::new(DiscreteLog::new(bound)))
    }

    pub fn with_table(table: Arc<DiscreteLog>) -> Self {
        Self {
            table,
            load_delay: Duration::ZERO,
            loads: Arc::new(AtomicUsize::new(0)),
            failures: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Simulated initialization time
    pub fn with_load_delay(mut self, delay: Duration) -> Self {
        self.load_delay = delay;
        self
    }

    /// Make the next `n` loads fail
    pub fn fail_next_loads(&self, n: usize) {
        self.failures.store(n, Ordering::SeqCst);
    }

    /// Number of loads attempted so far
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

impl BackendLoader for MockLoader {
    type Backend = MockProvingBackend;

    async fn load(&self, circuit: CircuitId) -> Result<MockProvingBackend> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        if !self.load_delay.is_zero() {
            tokio::time::sleep(self.load_delay).await;
        }
        let failed = self
            .failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failed {
            return Err(ProverError::Backend {
                tool: "mock".into(),
                message: format!("simulated load failure for {circuit}"),
            });
        }
        info!(circuit = %circuit, "loaded mock proving backend");
        Ok(MockProvingBackend {
            circuit,
            table: Arc::clone(&self.table),
        })
    }
}

// ============================================================================
// Backend
// ============================================================================

#[derive(Debug)]
pub struct MockProvingBackend {
    circuit: CircuitId,
    table: Arc<DiscreteLog>,
}

/// Public inputs of an evaluated transition
#[derive(Debug, Clone)]
pub struct MockWitness {
    circuit: CircuitId,
    public_inputs: Vec<String>,
}

impl ProvingBackend for MockProvingBackend {
    type Witness = MockWitness;

    fn circuit(&self) -> CircuitId {
        self.circuit
    }

    async fn execute_witness(&self, inputs: &CircuitInputs) -> Result<MockWitness> {
        if inputs.circuit() != self.circuit {
            return Err(ProverError::InvalidWitness(format!(
                "{} inputs given to the {} circuit",
                inputs.circuit(),
                self.circuit
            )));
        }
        let public_inputs = match inputs {
            CircuitInputs::Deposit(i) => self.balance_change(i, Direction::Credit)?,
            CircuitInputs::Withdraw(i) => self.balance_change(i, Direction::Debit)?,
            CircuitInputs::Transfer(i) => self.transfer(i)?,
        };
        debug!(circuit = %self.circuit, outputs = public_inputs.len(), "mock witness solved");
        Ok(MockWitness {
            circuit: self.circuit,
            public_inputs,
        })
    }

    async fn generate_proof(&self, witness: MockWitness, options: ProofOptions) -> Result<ProofBundle> {
        Ok(ProofBundle {
            circuit: witness.circuit,
            proof: mock_proof(witness.circuit, options, &witness.public_inputs),
            public_inputs: witness.public_inputs,
        })
    }

    async fn verify_proof(&self, bundle: &ProofBundle, options: ProofOptions) -> Result<bool> {
        if bundle.circuit != self.circuit {
            return Ok(false);
        }
        let valid = bundle.proof == mock_proof(bundle.circuit, options, &bundle.public_inputs);
        debug!(circuit = %self.circuit, valid, "mock proof checked");
        Ok(valid)
    }
}

/// SHA-256 over the circuit, the hashing scheme and the public inputs,
/// repeated out to [`MOCK_PROOF_LEN`]
fn mock_proof(circuit: CircuitId, options: ProofOptions, public_inputs: &[String]) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(circuit.as_str().as_bytes());
    hasher.update(options.hashing.as_str().as_bytes());
    for input in public_inputs {
        hasher.update(input.as_bytes());
    }
    let hash = hasher.finalize();

    let mut proof = Vec::with_capacity(MOCK_PROOF_LEN);
    while proof.len() < MOCK_PROOF_LEN {
        proof.extend_from_slice(&hash);
    }
    proof.truncate(MOCK_PROOF_LEN);
    proof
}

#[derive(Clone, Copy)]
enum Direction {
    Credit,
    Debit,
}

impl MockProvingBackend {
    /// Deposit or withdraw:
    /// `[pk(2), old(4), sender_address, token, amount, new(4)]`
    fn balance_change(&self, i: &BalanceChangeInputs, direction: Direction) -> Result<Vec<String>> {
        let sk = private_key(&i.sender_priv_key)?;
        let pk = point("sender_pubkey", &i.sender_pubkey)?;
        check_owner(&sk, &pk)?;

        let old = ciphertext("old_balance", &i.old_balance_x1, &i.old_balance_x2)?;
        let amount = amount(&i.amount)?;

        let delta = encrypt(&pk, amount, &scalar("r_amount", &i.r_amount)?)?;
        let new = match direction {
            Direction::Credit => homomorphic_add(&old, &delta)?,
            Direction::Debit => {
                if self.balance(&old, &sk)? < amount {
                    return Err(ProverError::InvalidWitness(
                        "insufficient balance for withdrawal".into(),
                    ));
                }
                homomorphic_subtract(&old, &delta)?
            }
        };

        let mut fields = Vec::with_capacity(13);
        push_point(&mut fields, &pk);
        push_ciphertext(&mut fields, &old);
        fields.push(i.sender_address.clone());
        fields.push(i.token.clone());
        fields.push(i.amount.clone());
        push_ciphertext(&mut fields, &new);
        to_hex_words(&fields)
    }

    /// Transfer:
    /// `[receiver_address, receiver_pk(2), receiver_old(4), sender_pk(2),
    ///   sender_old(4), token, sender_new(4), receiver_new(4)]`
    fn transfer(&self, i: &TransferInputs) -> Result<Vec<String>> {
        let sk = private_key(&i.sender_priv_key)?;
        let sender_pk = point("sender_pubkey", &i.sender_pubkey)?;
        check_owner(&sk, &sender_pk)?;
        let receiver_pk = point("receiver_pubkey", &i.receiver_pubkey)?;
        if receiver_pk.is_zero() {
            return Err(ProverError::InvalidWitness("receiver is not registered".into()));
        }

        let r_sender = scalar("r_amount_sender", &i.r_amount_sender)?;
        let r_receiver = scalar("r_amount_receiver", &i.r_amount_receiver)?;
        if r_sender == r_receiver {
            return Err(ProverError::InvalidWitness(
                "sender and receiver randomness must differ".into(),
            ));
        }

        let sender_old = ciphertext(
            "sender_old_balance",
            &i.sender_old_balance_x1,
            &i.sender_old_balance_x2,
        )?;
        let receiver_old = ciphertext(
            "receiver_old_balance",
            &i.receiver_old_balance_x1,
            &i.receiver_old_balance_x2,
        )?;
        let amount = amount(&i.transfer_amount)?;
        if self.balance(&sender_old, &sk)? < amount {
            return Err(ProverError::InvalidWitness(
                "insufficient balance for transfer".into(),
            ));
        }

        let sender_new = homomorphic_subtract(&sender_old, &encrypt(&sender_pk, amount, &r_sender)?)?;
        let receiver_new =
            homomorphic_add(&receiver_old, &encrypt(&receiver_pk, amount, &r_receiver)?)?;

        let mut fields = Vec::with_capacity(22);
        fields.push(i.receiver_address.clone());
        push_point(&mut fields, &receiver_pk);
        push_ciphertext(&mut fields, &receiver_old);
        push_point(&mut fields, &sender_pk);
        push_ciphertext(&mut fields, &sender_old);
        fields.push(i.token.clone());
        push_ciphertext(&mut fields, &sender_new);
        push_ciphertext(&mut fields, &receiver_new);
        to_hex_words(&fields)
    }

    /// The circuit proves ownership by decrypting; so does the mock
    fn balance(&self, ciphertext: &Ciphertext, sk: &PrivateKey) -> Result<u64> {
        decrypt(ciphertext, sk, &self.table).map_err(|_| {
            ProverError::InvalidWitness("old balance does not decrypt under the sender key".into())
        })
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn invalid(what: &str, err: impl std::fmt::Display) -> ProverError {
    ProverError::InvalidWitness(format!("{what}: {err}"))
}

fn scalar(what: &str, value: &str) -> Result<Scalar> {
    Scalar::parse(value).map_err(|e| invalid(what, e))
}

fn private_key(value: &str) -> Result<PrivateKey> {
    value.parse().map_err(|e| invalid("sender_priv_key", e))
}

fn point(what: &str, p: &CircuitPoint) -> Result<Point> {
    Point::from_decimal(&p.x, &p.y).map_err(|e| invalid(what, e))
}

fn ciphertext(what: &str, x1: &CircuitPoint, x2: &CircuitPoint) -> Result<Ciphertext> {
    Ok(Ciphertext {
        c1: point(what, x1)?,
        c2: point(what, x2)?,
    })
}

fn amount(value: &str) -> Result<u64> {
    value.parse().map_err(|e| invalid("amount", e))
}

fn check_owner(sk: &PrivateKey, pk: &Point) -> Result<()> {
    if sk.public_key()? != *pk {
        return Err(ProverError::InvalidWitness(
            "sender public key does not match the private key".into(),
        ));
    }
    Ok(())
}

fn push_point(fields: &mut Vec<String>, p: &Point) {
    fields.push(p.x_decimal());
    fields.push(p.y_decimal());
}

fn push_ciphertext(fields: &mut Vec<String>, ct: &Ciphertext) {
    push_point(fields, &ct.c1);
    push_point(fields, &ct.c2);
}

/// Decimal field text → `0x` + 64 hex digits, the form bb emits
fn to_hex_words(fields: &[String]) -> Result<Vec<String>> {
    fields
        .iter()
        .map(|f| -> Result<String> {
            let value = parse_field_element(f)?;
            Ok(format!("0x{}", hex::encode(biguint_to_be_bytes(&value))))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inputs::{BalanceChangeParams, ProofRequest};
    use umbra_balance::{Address, EncryptedBalance};
    use umbra_elgamal::KeyPair;

    fn alice() -> KeyPair {
        KeyPair::from_private_key("42".parse().unwrap()).unwrap()
    }

    fn deposit(kp: &KeyPair, old: EncryptedBalance, amount: &str) -> ProofRequest {
        ProofRequest::Deposit(BalanceChangeParams {
            sender_private_key: kp.private_key.clone(),
            randomness: umbra_elgamal::generate_randomness(),
            sender_public_key: kp.public_key,
            old_balance: old,
            sender_address: Address([0xaa; 20]),
            token: Address([0xbb; 20]),
            amount: amount.into(),
        })
    }

    async fn backend(circuit: CircuitId) -> MockProvingBackend {
        MockLoader::new(100_000).load(circuit).await.unwrap()
    }

    #[tokio::test]
    async fn test_deposit_public_inputs_in_circuit_order() {
        let kp = alice();
        let backend = backend(CircuitId::Deposit).await;
        let inputs = deposit(&kp, EncryptedBalance::zero(), "7000000").to_inputs().unwrap();
        let witness = backend.execute_witness(&inputs).await.unwrap();
        let bundle = backend.generate_proof(witness, ProofOptions::default()).await.unwrap();

        assert_eq!(bundle.public_inputs.len(), 13);
        assert!(bundle.public_inputs.iter().all(|f| f.len() == 66));
        assert_eq!(bundle.public_inputs[8], format!("0x{}07", "00".repeat(31)));
        assert_eq!(bundle.proof.len(), MOCK_PROOF_LEN);
    }

    #[tokio::test]
    async fn test_wrong_owner_is_invalid_witness() {
        let kp = alice();
        let other = KeyPair::from_private_key("43".parse().unwrap()).unwrap();
        let mut request = deposit(&kp, EncryptedBalance::zero(), "1000000");
        if let ProofRequest::Deposit(p) = &mut request {
            p.sender_public_key = other.public_key;
        }
        let backend = backend(CircuitId::Deposit).await;
        let err = backend
            .execute_witness(&request.to_inputs().unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, ProverError::InvalidWitness(_)));
    }

    #[tokio::test]
    async fn test_circuit_mismatch_rejected() {
        let backend = backend(CircuitId::Withdraw).await;
        let inputs = deposit(&alice(), EncryptedBalance::zero(), "1000000")
            .to_inputs()
            .unwrap();
        assert!(matches!(
            backend.execute_witness(&inputs).await,
            Err(ProverError::InvalidWitness(_))
        ));
    }

    #[tokio::test]
    async fn test_proof_is_deterministic() {
        let backend = backend(CircuitId::Deposit).await;
        let witness = MockWitness {
            circuit: CircuitId::Deposit,
            public_inputs: vec!["0x01".into()],
        };
        let a = backend
            .generate_proof(witness.clone(), ProofOptions::default())
            .await
            .unwrap();
        let b = backend.generate_proof(witness, ProofOptions::default()).await.unwrap();
        assert_eq!(a.proof, b.proof);
    }

    #[tokio::test]
    async fn test_verify_rejects_altered_bundle() {
        let backend = backend(CircuitId::Deposit).await;
        let inputs = deposit(&alice(), EncryptedBalance::zero(), "2000000").to_inputs().unwrap();
        let witness = backend.execute_witness(&inputs).await.unwrap();
        let options = ProofOptions::default();
        let bundle = backend.generate_proof(witness, options).await.unwrap();
        assert!(backend.verify_proof(&bundle, options).await.unwrap());

        let mut altered = bundle.clone();
        altered.public_inputs[8] = format!("0x{}09", "00".repeat(31));
        assert!(!backend.verify_proof(&altered, options).await.unwrap());

        let mut relabelled = bundle;
        relabelled.circuit = CircuitId::Withdraw;
        assert!(!backend.verify_proof(&relabelled, options).await.unwrap());
    }

    #[tokio::test]
    async fn test_simulated_failures_are_consumed() {
        let loader = MockLoader::new(10);
        loader.fail_next_loads(1);
        assert!(loader.load(CircuitId::Deposit).await.is_err());
        assert!(loader.load(CircuitId::Deposit).await.is_ok());
        assert_eq!(loader.load_count(), 2);
    }
}
