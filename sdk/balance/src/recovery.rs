//! Decrypting an on-chain balance for display

use std::sync::{Arc, OnceLock};

use tracing::{debug, info, warn};
use umbra_elgamal::{CryptoError, DiscreteLog, PrivateKey, decrypt};

use crate::address::Address;
use crate::amount::{MAX_REPRESENTABLE_BALANCE, format_hundredths};
use crate::error::{BalanceError, Result};
use crate::source::BalanceSource;
use crate::wire::EncryptedBalance;

/// Display string of a never-funded balance
pub const ZERO_BALANCE_DISPLAY: &str = "0.00";

/// Turns encrypted balances back into numbers.
///
/// The discrete-log table is built on the first recovery that needs it and
/// reused afterwards. Zero balances never trigger the build.
#[derive(Debug)]
pub struct BalanceRecovery {
    bound: u64,
    table: OnceLock<Arc<DiscreteLog>>,
}

impl Default for BalanceRecovery {
    fn default() -> Self {
        Self::new()
    }
}

impl BalanceRecovery {
    /// Recovery over the full balance range, `[0, 10¹³)`
    pub fn new() -> Self {
        Self::with_bound(MAX_REPRESENTABLE_BALANCE)
    }

    pub fn with_bound(bound: u64) -> Self {
        Self {
            bound,
            table: OnceLock::new(),
        }
    }

    /// Reuse a table that has already been built
    pub fn with_table(table: Arc<DiscreteLog>) -> Self {
        let bound = table.bound();
        let cell = OnceLock::new();
        let _ = cell.set(table);
        Self { bound, table: cell }
    }

    pub fn bound(&self) -> u64 {
        self.bound
    }

    /// Whether the discrete-log table exists yet
    pub fn table_built(&self) -> bool {
        self.table.get().is_some()
    }

    fn table(&self) -> &DiscreteLog {
        self.table.get_or_init(|| {
            info!(bound = self.bound, "building discrete log table");
            let table = DiscreteLog::new(self.bound);
            debug!(?table, "discrete log table ready");
            Arc::new(table)
        })
    }

    /// Decrypt to the raw balance in hundredths
    pub fn recover(&self, balance: &EncryptedBalance, private_key: &PrivateKey) -> Result<u64> {
        if balance.is_zero_marker() {
            debug!("zero balance marker, skipping search");
            return Ok(0);
        }
        let ciphertext = balance.to_ciphertext()?;
        decrypt(&ciphertext, private_key, self.table()).map_err(|e| match e {
            CryptoError::DecryptionFailed { bound } => {
                warn!(bound, "balance did not decrypt, key does not match");
                BalanceError::WrongPrivateKey { bound }
            }
            other => BalanceError::Crypto(other),
        })
    }

    /// Decrypt and format: 12345 → "123.45", zero marker → "0.00"
    pub fn recover_balance(
        &self,
        balance: &EncryptedBalance,
        private_key: &PrivateKey,
    ) -> Result<String> {
        if balance.is_zero_marker() {
            return Ok(ZERO_BALANCE_DISPLAY.to_string());
        }
        self.recover(balance, private_key).map(format_hundredths)
    }

    /// Fetch `(token, user)` from a source, then recover it
    pub async fn recover_from_source<S: BalanceSource>(
        &self,
        source: &S,
        token: Address,
        user: Address,
        private_key: &PrivateKey,
    ) -> Result<String> {
        let balance = source.balance_of(token, user).await?;
        debug!(%token, %user, "fetched encrypted balance");
        self.recover_balance(&balance, private_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::InMemoryBalanceSource;
    use umbra_elgamal::{KeyPair, Scalar, encrypt, generate_randomness};

    fn key(sk: u64) -> KeyPair {
        KeyPair::from_private_key(PrivateKey::new(Scalar::from_u64(sk)).unwrap()).unwrap()
    }

    fn balance_of(kp: &KeyPair, value: u64) -> EncryptedBalance {
        let ct = encrypt(&kp.public_key, value, &generate_randomness()).unwrap();
        EncryptedBalance::from_ciphertext(&ct)
    }

    #[test]
    fn test_zero_marker_skips_table() {
        let recovery = BalanceRecovery::with_bound(1_000_000);
        let kp = key(3);
        let shown = recovery
            .recover_balance(&EncryptedBalance::zero(), &kp.private_key)
            .unwrap();
        assert_eq!(shown, "0.00");
        assert!(!recovery.table_built());
    }

    #[test]
    fn test_marker_with_garbage_c1_still_zero() {
        let recovery = BalanceRecovery::with_bound(1_000);
        let mut bytes = [0u8; 128];
        bytes[0] = 0xaa;
        bytes[127] = 0x01;
        let shown = recovery
            .recover_balance(&EncryptedBalance::new(bytes), &key(3).private_key)
            .unwrap();
        assert_eq!(shown, "0.00");
        assert!(!recovery.table_built());
    }

    #[test]
    fn test_recovers_and_formats() {
        let recovery = BalanceRecovery::with_bound(1_000_000);
        let kp = key(42);
        assert_eq!(
            recovery.recover_balance(&balance_of(&kp, 12345), &kp.private_key).unwrap(),
            "123.45"
        );
        assert_eq!(
            recovery.recover_balance(&balance_of(&kp, 5), &kp.private_key).unwrap(),
            "0.05"
        );
        assert!(recovery.table_built());
    }

    #[test]
    fn test_encrypted_zero_is_not_the_marker() {
        let recovery = BalanceRecovery::with_bound(1_000);
        let kp = key(8);
        let enc_zero = balance_of(&kp, 0);
        assert!(!enc_zero.is_zero_marker());
        assert_eq!(recovery.recover(&enc_zero, &kp.private_key).unwrap(), 0);
    }

    #[test]
    fn test_wrong_key_reported() {
        let recovery = BalanceRecovery::with_bound(10_000);
        let owner = key(42);
        let other = key(4242);
        let ct = encrypt(&owner.public_key, 500, &Scalar::from_u64(987_654_321)).unwrap();
        let result = recovery.recover(&EncryptedBalance::from_ciphertext(&ct), &other.private_key);
        match result {
            Ok(v) => assert_ne!(v, 500),
            Err(e) => assert_eq!(e, BalanceError::WrongPrivateKey { bound: 10_000 }),
        }
    }

    #[test]
    fn test_shared_table() {
        let table = Arc::new(DiscreteLog::new(1_000));
        let recovery = BalanceRecovery::with_table(table);
        assert!(recovery.table_built());
        assert_eq!(recovery.bound(), 1_000);
        let kp = key(6);
        assert_eq!(recovery.recover(&balance_of(&kp, 999), &kp.private_key).unwrap(), 999);
    }

    #[tokio::test]
    async fn test_recover_from_source() {
        let source = InMemoryBalanceSource::new();
        let kp = key(21);
        let token = Address([0x11; 20]);
        let user = Address([0x22; 20]);
        source.set_balance(token, user, balance_of(&kp, 700)).await;

        let recovery = BalanceRecovery::with_bound(10_000);
        let shown = recovery
            .recover_from_source(&source, token, user, &kp.private_key)
            .await
            .unwrap();
        assert_eq!(shown, "7.00");
        let missing = recovery
            .recover_from_source(&source, user, token, &kp.private_key)
            .await
            .unwrap();
        assert_eq!(missing, "0.00");
    }
}
