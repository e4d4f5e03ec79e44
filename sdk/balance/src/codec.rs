//! Public inputs → contract calldata
//!
//! A proof's public inputs come back as an ordered list of field elements
//! (declared public inputs first, then return values). The verifier contract
//! takes them as one fixed-offset byte buffer instead.
//!
//! ```text
//! deposit / withdraw (416 bytes, 13 inputs, one word each, in order)
//!   0..64     sender public key
//!   64..192   old balance
//!   192..224  sender address
//!   224..256  token
//!   256..288  amount
//!   288..416  new balance
//!
//! transfer (704 bytes, 22 inputs)
//!   0..12     zero
//!   12..32    receiver address (20 bytes)
//!   32..96    receiver public key
//!   96..224   receiver old balance
//!   224..288  sender public key
//!   288..416  sender old balance
//!   416..428  zero
//!   428..448  token (20 bytes)
//!   448..576  sender new balance
//!   576..704  receiver new balance
//! ```
//!
//! The zero gaps are part of the contract ABI.

use tracing::debug;
use umbra_elgamal::CryptoError;
use umbra_elgamal::field::{FIELD_BYTES, biguint_to_be_bytes};

use crate::address::ADDRESS_BYTES;
use crate::error::{BalanceError, Result};
use crate::wire::{ENCRYPTED_BALANCE_LEN, EncryptedBalance};

pub const DEPOSIT_PUBLIC_INPUTS: usize = 13;
pub const TRANSFER_PUBLIC_INPUTS: usize = 22;

pub const DEPOSIT_LAYOUT_LEN: usize = DEPOSIT_PUBLIC_INPUTS * FIELD_BYTES;
pub const TRANSFER_LAYOUT_LEN: usize = 704;

const DEPOSIT_NEW_BALANCE: usize = 288;
const TRANSFER_SENDER_NEW_BALANCE: usize = 448;
const TRANSFER_RECEIVER_NEW_BALANCE: usize = 576;

/// Where one transfer public input lands in the buffer
#[derive(Clone, Copy)]
enum Slot {
    /// A full 32-byte word at this offset
    Word(usize),
    /// A 20-byte address ending at this offset
    Address(usize),
}

/// Transfer public input index → destination
const TRANSFER_SLOTS: [Slot; TRANSFER_PUBLIC_INPUTS] = [
    Slot::Address(32),
    Slot::Word(32),
    Slot::Word(64),
    Slot::Word(96),
    Slot::Word(128),
    Slot::Word(160),
    Slot::Word(192),
    Slot::Word(224),
    Slot::Word(256),
    Slot::Word(288),
    Slot::Word(320),
    Slot::Word(352),
    Slot::Word(384),
    Slot::Address(448),
    Slot::Word(448),
    Slot::Word(480),
    Slot::Word(512),
    Slot::Word(544),
    Slot::Word(576),
    Slot::Word(608),
    Slot::Word(640),
    Slot::Word(672),
];

/// Pack deposit public inputs into the 416-byte contract layout.
///
/// Inputs beyond the 13th are ignored.
pub fn encode_deposit_layout<S: AsRef<str>>(public_inputs: &[S]) -> Result<[u8; DEPOSIT_LAYOUT_LEN]> {
    require_len(public_inputs, DEPOSIT_PUBLIC_INPUTS, "deposit")?;

    let mut out = [0u8; DEPOSIT_LAYOUT_LEN];
    for (i, input) in public_inputs.iter().take(DEPOSIT_PUBLIC_INPUTS).enumerate() {
        let offset = i * FIELD_BYTES;
        out[offset..offset + FIELD_BYTES].copy_from_slice(&parse_word(input.as_ref(), i)?);
    }
    debug!(inputs = public_inputs.len(), "encoded deposit layout");
    Ok(out)
}

/// Withdraw shares the deposit layout
pub fn encode_withdraw_layout<S: AsRef<str>>(
    public_inputs: &[S],
) -> Result<[u8; DEPOSIT_LAYOUT_LEN]> {
    encode_deposit_layout(public_inputs)
}

/// Pack transfer public inputs into the 704-byte contract layout
pub fn encode_transfer_layout<S: AsRef<str>>(
    public_inputs: &[S],
) -> Result<[u8; TRANSFER_LAYOUT_LEN]> {
    require_len(public_inputs, TRANSFER_PUBLIC_INPUTS, "transfer")?;

    let mut out = [0u8; TRANSFER_LAYOUT_LEN];
    for (i, (input, slot)) in public_inputs.iter().zip(TRANSFER_SLOTS).enumerate() {
        let word = parse_word(input.as_ref(), i)?;
        match slot {
            Slot::Word(offset) => out[offset..offset + FIELD_BYTES].copy_from_slice(&word),
            Slot::Address(end) => {
                let pad = FIELD_BYTES - ADDRESS_BYTES;
                if word[..pad].iter().any(|b| *b != 0) {
                    return Err(BalanceError::MalformedPublicInputs(format!(
                        "input {i} ({}) does not fit a {ADDRESS_BYTES}-byte address",
                        input.as_ref()
                    )));
                }
                out[end - ADDRESS_BYTES..end].copy_from_slice(&word[pad..]);
            }
        }
    }
    debug!(inputs = public_inputs.len(), "encoded transfer layout");
    Ok(out)
}

fn require_len<S>(inputs: &[S], required: usize, circuit: &str) -> Result<()> {
    if inputs.len() < required {
        return Err(BalanceError::MalformedPublicInputs(format!(
            "{circuit} needs {required} public inputs, got {}",
            inputs.len()
        )));
    }
    Ok(())
}

fn parse_word(input: &str, index: usize) -> Result<[u8; FIELD_BYTES]> {
    let value = umbra_elgamal::parse_field_element(input).map_err(|e| match e {
        CryptoError::InvalidFieldElement(msg) => {
            BalanceError::InvalidFieldElement(format!("public input {index}: {msg}"))
        }
        other => BalanceError::Crypto(other),
    })?;
    Ok(biguint_to_be_bytes(&value))
}

fn balance_at(bytes: &[u8], offset: usize) -> EncryptedBalance {
    let mut out = [0u8; ENCRYPTED_BALANCE_LEN];
    out.copy_from_slice(&bytes[offset..offset + ENCRYPTED_BALANCE_LEN]);
    EncryptedBalance::new(out)
}

/// Encoded deposit or withdraw calldata
#[derive(Clone, PartialEq, Eq)]
pub struct DepositLayout([u8; DEPOSIT_LAYOUT_LEN]);

impl DepositLayout {
    pub fn encode<S: AsRef<str>>(public_inputs: &[S]) -> Result<Self> {
        encode_deposit_layout(public_inputs).map(Self)
    }

    pub fn as_bytes(&self) -> &[u8; DEPOSIT_LAYOUT_LEN] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    /// The post-transaction balance the contract will store
    pub fn new_balance(&self) -> EncryptedBalance {
        balance_at(&self.0, DEPOSIT_NEW_BALANCE)
    }
}

impl std::fmt::Debug for DepositLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "DepositLayout({})", self.to_hex())
    }
}

/// Encoded transfer calldata
#[derive(Clone, PartialEq, Eq)]
pub struct TransferLayout([u8; TRANSFER_LAYOUT_LEN]);

impl TransferLayout {
    pub fn encode<S: AsRef<str>>(public_inputs: &[S]) -> Result<Self> {
        encode_transfer_layout(public_inputs).map(Self)
    }

    pub fn as_bytes(&self) -> &[u8; TRANSFER_LAYOUT_LEN] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    pub fn sender_new_balance(&self) -> EncryptedBalance {
        balance_at(&self.0, TRANSFER_SENDER_NEW_BALANCE)
    }

    pub fn receiver_new_balance(&self) -> EncryptedBalance {
        balance_at(&self.0, TRANSFER_RECEIVER_NEW_BALANCE)
    }
}

impl std::fmt::Debug for TransferLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TransferLayout({})", self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered(n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("0x{i:02x}")).collect()
    }

    #[test]
    fn test_deposit_words_are_sequential() {
        let out = encode_deposit_layout(&numbered(13)).unwrap();
        for i in 0..13 {
            let word = &out[i * 32..(i + 1) * 32];
            assert!(word[..31].iter().all(|b| *b == 0));
            assert_eq!(word[31] as usize, i + 1);
        }
    }

    #[test]
    fn test_deposit_extra_inputs_ignored() {
        let mut inputs = numbered(13);
        let exact = encode_deposit_layout(&inputs).unwrap();
        inputs.push("0xff".into());
        assert_eq!(encode_deposit_layout(&inputs).unwrap(), exact);
    }

    #[test]
    fn test_deposit_rejects_bad_field() {
        let mut inputs = numbered(13);
        inputs[4] = "not-a-number".into();
        assert!(matches!(
            encode_deposit_layout(&inputs),
            Err(BalanceError::InvalidFieldElement(_))
        ));
    }

    #[test]
    fn test_transfer_slots_cover_buffer_once() {
        let mut covered = [0u8; TRANSFER_LAYOUT_LEN];
        for slot in TRANSFER_SLOTS {
            let range = match slot {
                Slot::Word(o) => o..o + FIELD_BYTES,
                Slot::Address(end) => end - ADDRESS_BYTES..end,
            };
            for b in &mut covered[range] {
                *b += 1;
            }
        }
        for (i, count) in covered.iter().enumerate() {
            let in_gap = i < 12 || (416..428).contains(&i);
            assert_eq!(*count, if in_gap { 0 } else { 1 }, "byte {i}");
        }
    }

    #[test]
    fn test_transfer_new_balances_readback() {
        let out = TransferLayout::encode(&numbered(22)).unwrap();
        let sender = out.sender_new_balance();
        let receiver = out.receiver_new_balance();
        assert_eq!(sender.as_bytes()[31], 15);
        assert_eq!(receiver.as_bytes()[127], 22);
    }
}
