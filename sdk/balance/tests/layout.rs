use umbra_balance::{
    BalanceError, BalanceRecovery, DepositLayout, EncryptedBalance, TransferLayout,
    decode_encrypted_balance, encode_deposit_layout, encode_transfer_layout,
    encode_withdraw_layout,
};
use umbra_elgamal::{KeyPair, PrivateKey, Scalar, encrypt, homomorphic_add};

fn numbered(n: usize) -> Vec<String> {
    (1..=n).map(|i| format!("0x{i:02x}")).collect()
}

fn word(value: u8) -> [u8; 32] {
    let mut w = [0u8; 32];
    w[31] = value;
    w
}

#[test]
fn deposit_sender_address_lands_at_192() {
    let out = encode_deposit_layout(&numbered(13)).unwrap();
    assert_eq!(out.len(), 416);
    assert_eq!(out[192..224], word(0x07));
}

#[test]
fn deposit_layout_is_deterministic() {
    let inputs = numbered(13);
    let a = encode_deposit_layout(&inputs).unwrap();
    let b = encode_deposit_layout(&inputs).unwrap();
    assert_eq!(a, b);
    assert_eq!(encode_withdraw_layout(&inputs).unwrap(), a);
}

#[test]
fn deposit_too_few_inputs_is_malformed() {
    let err = encode_deposit_layout(&numbered(10)).unwrap_err();
    assert!(matches!(err, BalanceError::MalformedPublicInputs(_)));
}

#[test]
fn decimal_and_hex_inputs_encode_identically() {
    let hex_inputs = numbered(13);
    let dec_inputs: Vec<String> = (1..=13).map(|i| i.to_string()).collect();
    assert_eq!(
        encode_deposit_layout(&hex_inputs).unwrap(),
        encode_deposit_layout(&dec_inputs).unwrap()
    );
}

#[test]
fn transfer_layout_offsets() {
    let out = encode_transfer_layout(&numbered(22)).unwrap();
    assert_eq!(out.len(), 704);

    assert!(out[0..12].iter().all(|b| *b == 0));
    assert!(out[416..428].iter().all(|b| *b == 0));

    // receiver address and token are right-aligned 20-byte values
    assert_eq!(out[12..32], word(0x01)[12..]);
    assert_eq!(out[428..448], word(0x0e)[12..]);

    assert_eq!(out[32..64], word(0x02));
    assert_eq!(out[96..128], word(0x04));
    assert_eq!(out[224..256], word(0x08));
    assert_eq!(out[288..320], word(0x0a));
    assert_eq!(out[448..480], word(0x0f));
    assert_eq!(out[576..608], word(0x13));
    assert_eq!(out[672..704], word(0x16));
}

#[test]
fn transfer_address_wider_than_20_bytes_is_malformed() {
    let mut inputs = numbered(22);
    inputs[0] = format!("0x01{}", "00".repeat(20));
    assert!(matches!(
        encode_transfer_layout(&inputs),
        Err(BalanceError::MalformedPublicInputs(_))
    ));

    let mut inputs = numbered(22);
    inputs[13] = format!("0x{}", "ff".repeat(20));
    let out = encode_transfer_layout(&inputs).unwrap();
    assert!(out[428..448].iter().all(|b| *b == 0xff));
    assert!(out[416..428].iter().all(|b| *b == 0));
}

#[test]
fn transfer_too_few_inputs_is_malformed() {
    assert!(matches!(
        encode_transfer_layout(&numbered(21)),
        Err(BalanceError::MalformedPublicInputs(_))
    ));
}

#[test]
fn out_of_range_field_is_reduced() {
    let p = "21888242871839275222246405745257275088548364400416034343698204186575808495617";
    let mut inputs: Vec<String> = numbered(13);
    inputs[0] = p.to_string();
    let out = encode_deposit_layout(&inputs).unwrap();
    assert!(out[0..32].iter().all(|b| *b == 0));
}

/// A balance written by one layout decodes back to the same points
#[test]
fn new_balance_roundtrips_through_layout() {
    let kp = KeyPair::from_private_key(PrivateKey::new(Scalar::from_u64(42)).unwrap()).unwrap();
    let old = encrypt(&kp.public_key, 1_000, &Scalar::from_u64(11)).unwrap();
    let delta = encrypt(&kp.public_key, 250, &Scalar::from_u64(12)).unwrap();
    let new = homomorphic_add(&old, &delta).unwrap();

    let pk = [kp.public_key.x_decimal(), kp.public_key.y_decimal()];
    let as_inputs = |ct: &umbra_elgamal::Ciphertext| {
        let p = decode_encrypted_balance(EncryptedBalance::from_ciphertext(ct).as_bytes());
        vec![p.x1.x, p.x1.y, p.x2.x, p.x2.y]
    };

    let mut inputs: Vec<String> = pk.to_vec();
    inputs.extend(as_inputs(&old));
    inputs.extend(["0x1234".to_string(), "0x5678".to_string(), "250".to_string()]);
    inputs.extend(as_inputs(&new));

    let layout = DepositLayout::encode(&inputs).unwrap();
    let readback = layout.new_balance();
    assert_eq!(readback, EncryptedBalance::from_ciphertext(&new));

    let recovery = BalanceRecovery::with_bound(10_000);
    assert_eq!(recovery.recover_balance(&readback, &kp.private_key).unwrap(), "12.50");
}

#[test]
fn transfer_layout_readback() {
    let layout = TransferLayout::encode(&numbered(22)).unwrap();
    assert_eq!(layout.sender_new_balance().as_bytes()[..32], word(0x0f));
    assert_eq!(layout.receiver_new_balance().as_bytes()[96..], word(0x16));
}
