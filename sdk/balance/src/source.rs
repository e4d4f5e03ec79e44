//! Where encrypted balances come from
//!
//! On chain this is the token contract's `balanceOfEnc(token, user)` view.
//! The trait keeps recovery independent of any particular RPC client.

use std::collections::HashMap;
use std::future::Future;

use tokio::sync::RwLock;

use crate::address::Address;
use crate::error::Result;
use crate::wire::EncryptedBalance;

/// Read access to encrypted balances keyed by `(token, user)`
pub trait BalanceSource: Send + Sync {
    /// Current balance; an unknown pair reads as the zero balance
    fn balance_of(
        &self,
        token: Address,
        user: Address,
    ) -> impl Future<Output = Result<EncryptedBalance>> + Send;
}

/// A balance table held in memory, for tests and local tooling
#[derive(Debug, Default)]
pub struct InMemoryBalanceSource {
    balances: RwLock<HashMap<(Address, Address), EncryptedBalance>>,
}

impl InMemoryBalanceSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_balance(&self, token: Address, user: Address, balance: EncryptedBalance) {
        self.balances.write().await.insert((token, user), balance);
    }
}

impl BalanceSource for InMemoryBalanceSource {
    async fn balance_of(&self, token: Address, user: Address) -> Result<EncryptedBalance> {
        Ok(self
            .balances
            .read()
            .await
            .get(&(token, user))
            .copied()
            .unwrap_or_default())
    }
}
