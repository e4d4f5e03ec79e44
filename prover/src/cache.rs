//! Per-circuit backend cache
//!
//! Each circuit identity gets its own initialization cell. The map lock is
//! held only long enough to fetch or insert a cell, so initializing one
//! circuit never blocks callers of another, and concurrent first callers of
//! the same circuit share a single initialization. A failed initialization
//! leaves the cell empty; the next caller retries.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use tokio::sync::{Mutex, OnceCell};

use crate::circuit::CircuitId;
use crate::error::Result;

pub struct BackendCache<B> {
    cells: Mutex<HashMap<CircuitId, Arc<OnceCell<Arc<B>>>>>,
}

impl<B> Default for BackendCache<B> {
    fn default() -> Self {
        Self {
            cells: Mutex::new(HashMap::new()),
        }
    }
}

impl<B> BackendCache<B> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached backend for `circuit`, running `init` on first use
    pub async fn get_or_init<F, Fut>(&self, circuit: CircuitId, init: F) -> Result<Arc<B>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<B>>,
    {
        let cell = {
            let mut cells = self.cells.lock().await;
            Arc::clone(cells.entry(circuit).or_default())
        };
        cell.get_or_try_init(|| async { init().await.map(Arc::new) })
            .await
            .cloned()
    }

    /// Circuits whose backend is initialized, in a stable order
    pub async fn cached(&self) -> Vec<CircuitId> {
        let cells = self.cells.lock().await;
        let mut ready: Vec<CircuitId> = cells
            .iter()
            .filter(|(_, cell)| cell.initialized())
            .map(|(id, _)| *id)
            .collect();
        ready.sort();
        ready
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProverError;

    #[tokio::test]
    async fn test_initializes_once() {
        let cache: BackendCache<u32> = BackendCache::new();
        let first = cache.get_or_init(CircuitId::Deposit, || async { Ok(1) }).await.unwrap();
        let second = cache.get_or_init(CircuitId::Deposit, || async { Ok(2) }).await.unwrap();
        assert_eq!(*first, 1);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn test_failure_is_not_cached() {
        let cache: BackendCache<u32> = BackendCache::new();
        let failed = cache
            .get_or_init(CircuitId::Transfer, || async {
                Err(ProverError::InvalidWitness("boom".into()))
            })
            .await;
        assert!(failed.is_err());
        assert!(cache.cached().await.is_empty());

        let ok = cache.get_or_init(CircuitId::Transfer, || async { Ok(7) }).await.unwrap();
        assert_eq!(*ok, 7);
        assert_eq!(cache.cached().await, vec![CircuitId::Transfer]);
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let cache: BackendCache<&'static str> = BackendCache::new();
        cache.get_or_init(CircuitId::Withdraw, || async { Ok("w") }).await.unwrap();
        cache.get_or_init(CircuitId::Deposit, || async { Ok("d") }).await.unwrap();
        assert_eq!(
            cache.cached().await,
            vec![CircuitId::Deposit, CircuitId::Withdraw]
        );
    }
}
