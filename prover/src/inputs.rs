//! Witness inputs for the balance circuits
//!
//! Callers hand over typed parameters (keys, points, addresses, base-unit
//! amounts). They are converted here, and only here, into the decimal text
//! nargo reads from a prover TOML file, under the parameter names the
//! circuits declare.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use umbra_balance::{Address, CircuitPoint, EncryptedBalance, truncate_amount};
use umbra_elgamal::{PrivateKey, PublicKey, Scalar};

use crate::circuit::CircuitId;
use crate::error::{ProverError, Result};

// ============================================================================
// Caller Parameters
// ============================================================================

/// Parameters of a deposit or withdraw: one account, one amount
#[derive(Clone, Deserialize)]
pub struct BalanceChangeParams {
    pub sender_private_key: PrivateKey,
    /// Fresh encryption randomness for the amount ciphertext
    pub randomness: Scalar,
    pub sender_public_key: PublicKey,
    pub old_balance: EncryptedBalance,
    pub sender_address: Address,
    pub token: Address,
    /// Decimal token base units
    pub amount: String,
}

pub type DepositParams = BalanceChangeParams;
pub type WithdrawParams = BalanceChangeParams;

impl BalanceChangeParams {
    pub fn to_inputs(&self) -> Result<BalanceChangeInputs> {
        let amount = truncate_amount(&self.amount)?;
        let old = self.old_balance.points();
        Ok(BalanceChangeInputs {
            sender_priv_key: self.sender_private_key.scalar().to_decimal_string(),
            r_amount: self.randomness.to_decimal_string(),
            sender_pubkey: CircuitPoint::from(&self.sender_public_key),
            old_balance_x1: old.x1,
            old_balance_x2: old.x2,
            sender_address: self.sender_address.to_decimal(),
            token: self.token.to_decimal(),
            amount: amount.to_string(),
        })
    }
}

impl fmt::Debug for BalanceChangeParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BalanceChangeParams")
            .field("sender_public_key", &self.sender_public_key)
            .field("old_balance", &self.old_balance)
            .field("sender_address", &self.sender_address)
            .field("token", &self.token)
            .field("amount", &self.amount)
            .finish_non_exhaustive()
    }
}

/// Parameters of a transfer between two registered accounts
#[derive(Clone, Deserialize)]
pub struct TransferParams {
    pub sender_private_key: PrivateKey,
    /// Decimal token base units
    pub transfer_amount: String,
    pub randomness_sender: Scalar,
    pub randomness_receiver: Scalar,
    pub receiver_address: Address,
    pub receiver_public_key: PublicKey,
    pub receiver_old_balance: EncryptedBalance,
    pub sender_public_key: PublicKey,
    pub sender_old_balance: EncryptedBalance,
    pub token: Address,
}

impl TransferParams {
    /// Fails `InvalidWitness` when both sides share randomness: the two
    /// amount ciphertexts would share `c1` and link sender to receiver.
    pub fn to_inputs(&self) -> Result<TransferInputs> {
        if self.randomness_sender == self.randomness_receiver {
            return Err(ProverError::InvalidWitness(
                "sender and receiver randomness must differ".into(),
            ));
        }
        let amount = truncate_amount(&self.transfer_amount)?;
        let receiver_old = self.receiver_old_balance.points();
        let sender_old = self.sender_old_balance.points();
        Ok(TransferInputs {
            sender_priv_key: self.sender_private_key.scalar().to_decimal_string(),
            transfer_amount: amount.to_string(),
            r_amount_sender: self.randomness_sender.to_decimal_string(),
            r_amount_receiver: self.randomness_receiver.to_decimal_string(),
            receiver_address: self.receiver_address.to_decimal(),
            receiver_pubkey: CircuitPoint::from(&self.receiver_public_key),
            receiver_old_balance_x1: receiver_old.x1,
            receiver_old_balance_x2: receiver_old.x2,
            sender_pubkey: CircuitPoint::from(&self.sender_public_key),
            sender_old_balance_x1: sender_old.x1,
            sender_old_balance_x2: sender_old.x2,
            token: self.token.to_decimal(),
        })
    }
}

impl fmt::Debug for TransferParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransferParams")
            .field("transfer_amount", &self.transfer_amount)
            .field("receiver_address", &self.receiver_address)
            .field("receiver_public_key", &self.receiver_public_key)
            .field("sender_public_key", &self.sender_public_key)
            .field("token", &self.token)
            .finish_non_exhaustive()
    }
}

/// A proof to generate
#[derive(Debug, Clone)]
pub enum ProofRequest {
    Deposit(DepositParams),
    Withdraw(WithdrawParams),
    Transfer(TransferParams),
}

impl ProofRequest {
    pub fn circuit(&self) -> CircuitId {
        match self {
            Self::Deposit(_) => CircuitId::Deposit,
            Self::Withdraw(_) => CircuitId::Withdraw,
            Self::Transfer(_) => CircuitId::Transfer,
        }
    }

    pub fn to_inputs(&self) -> Result<CircuitInputs> {
        Ok(match self {
            Self::Deposit(p) => CircuitInputs::Deposit(p.to_inputs()?),
            Self::Withdraw(p) => CircuitInputs::Withdraw(p.to_inputs()?),
            Self::Transfer(p) => CircuitInputs::Transfer(p.to_inputs()?),
        })
    }
}

// ============================================================================
// Circuit Inputs (names match the Noir `main` parameters)
// ============================================================================

/// Deposit and withdraw circuit inputs
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceChangeInputs {
    pub sender_priv_key: String,
    pub r_amount: String,
    pub sender_pubkey: CircuitPoint,
    pub old_balance_x1: CircuitPoint,
    pub old_balance_x2: CircuitPoint,
    pub sender_address: String,
    pub token: String,
    pub amount: String,
}

/// Transfer circuit inputs
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferInputs {
    pub sender_priv_key: String,
    pub transfer_amount: String,
    pub r_amount_sender: String,
    pub r_amount_receiver: String,
    pub receiver_address: String,
    pub receiver_pubkey: CircuitPoint,
    pub receiver_old_balance_x1: CircuitPoint,
    pub receiver_old_balance_x2: CircuitPoint,
    pub sender_pubkey: CircuitPoint,
    pub sender_old_balance_x1: CircuitPoint,
    pub sender_old_balance_x2: CircuitPoint,
    pub token: String,
}

/// Inputs ready for witness execution
#[derive(Clone, PartialEq, Eq)]
pub enum CircuitInputs {
    Deposit(BalanceChangeInputs),
    Withdraw(BalanceChangeInputs),
    Transfer(TransferInputs),
}

impl CircuitInputs {
    pub fn circuit(&self) -> CircuitId {
        match self {
            Self::Deposit(_) => CircuitId::Deposit,
            Self::Withdraw(_) => CircuitId::Withdraw,
            Self::Transfer(_) => CircuitId::Transfer,
        }
    }

    fn to_table(&self) -> Result<toml::Table> {
        let value = match self {
            Self::Deposit(i) | Self::Withdraw(i) => toml::Table::try_from(i)?,
            Self::Transfer(i) => toml::Table::try_from(i)?,
        };
        Ok(value)
    }

    /// Render as a Noir prover TOML file; points become `{ x, y }` tables
    pub fn to_prover_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(&self.to_table()?)?)
    }

    /// Top-level parameter names present in these inputs
    pub fn parameter_names(&self) -> Result<BTreeSet<String>> {
        Ok(self.to_table()?.keys().cloned().collect())
    }
}

impl fmt::Debug for CircuitInputs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // values include the private key and randomness
        write!(f, "CircuitInputs::{}(<redacted>)", self.circuit())
    }
}
