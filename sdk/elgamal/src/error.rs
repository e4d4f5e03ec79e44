use thiserror::Error;

/// Errors raised by curve arithmetic and ElGamal operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    #[error("Invalid point: ({x}, {y}) is not on the curve")]
    InvalidPoint { x: String, y: String },

    #[error("Invalid scalar: {0}")]
    InvalidScalar(String),

    #[error("Invalid field element: {0}")]
    InvalidFieldElement(String),

    #[error("Decryption failed: no discrete log below {bound}")]
    DecryptionFailed { bound: u64 },
}
