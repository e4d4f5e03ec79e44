use thiserror::Error;
use umbra_elgamal::CryptoError;

/// Errors raised while moving balances between wire, contract and display form
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BalanceError {
    #[error("Malformed public inputs: {0}")]
    MalformedPublicInputs(String),

    #[error("Invalid field element: {0}")]
    InvalidFieldElement(String),

    #[error("Invalid length: expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("Wrong private key: balance did not decrypt below {bound}")]
    WrongPrivateKey { bound: u64 },

    #[error("Amount too large: {0}")]
    AmountTooLarge(String),

    #[error("Invalid amount: {0:?}")]
    InvalidAmount(String),

    #[error("Balance source error: {0}")]
    Source(String),

    #[error(transparent)]
    Crypto(#[from] CryptoError),
}

pub type Result<T> = std::result::Result<T, BalanceError>;
