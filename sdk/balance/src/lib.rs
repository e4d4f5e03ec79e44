//! Umbra balance SDK
//!
//! Moves confidential balances between their three representations:
//!
//! ```text
//!  contract storage            circuit inputs             display
//! ┌──────────────────┐ decode ┌────────────────────┐
//! │ 128-byte wire    │──────▶│ decimal (x, y) ×2  │
//! │ EncryptedBalance │        └────────────────────┘
//! └──────────────────┘ recover (ElGamal + BSGS)  ┌─────────┐
//!          └─────────────────────────────────────▶│ "12.34" │
//!                                                 └─────────┘
//!  proof public inputs ──encode──▶ 416 / 704-byte contract calldata
//! ```

pub mod address;
pub mod amount;
pub mod codec;
pub mod error;
pub mod recovery;
pub mod source;
pub mod wire;

pub use address::Address;
pub use amount::{MAX_REPRESENTABLE_BALANCE, format_hundredths, truncate_amount};
pub use codec::{
    DEPOSIT_LAYOUT_LEN, DepositLayout, TRANSFER_LAYOUT_LEN, TransferLayout, encode_deposit_layout,
    encode_transfer_layout, encode_withdraw_layout,
};
pub use error::{BalanceError, Result};
pub use recovery::BalanceRecovery;
pub use source::{BalanceSource, InMemoryBalanceSource};
pub use wire::{
    BalancePoints, CircuitPoint, ENCRYPTED_BALANCE_LEN, EncryptedBalance, decode_encrypted_balance,
};
