//! Per-wallet exclusive locks.
//!
//! A mutation holds its wallet's lock from the authoritative balance read
//! until the history entry is appended, so two concurrent attempts can
//! never both validate against the same stale balance. Read-only lookups
//! bypass the registry entirely.

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::model::WalletId;

#[derive(Default)]
pub struct WalletLocks {
    locks: DashMap<WalletId, Arc<Mutex<()>>>,
}

impl WalletLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn handle(&self, id: WalletId) -> Arc<Mutex<()>> {
        self.locks
            .entry(id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Exclusive access to one wallet for the duration of the guard.
    pub async fn acquire(&self, id: WalletId) -> OwnedMutexGuard<()> {
        self.handle(id).lock_owned().await
    }

    /// Exclusive access to two distinct wallets.
    ///
    /// Locks are taken in canonical id order regardless of argument order,
    /// so opposing transfers (A→B and B→A) cannot deadlock. Guards are
    /// returned in argument order.
    pub async fn acquire_pair(
        &self,
        a: WalletId,
        b: WalletId,
    ) -> (OwnedMutexGuard<()>, OwnedMutexGuard<()>) {
        debug_assert_ne!(a, b, "acquire_pair requires distinct wallets");
        if a < b {
            let guard_a = self.acquire(a).await;
            let guard_b = self.acquire(b).await;
            (guard_a, guard_b)
        } else {
            let guard_b = self.acquire(b).await;
            let guard_a = self.acquire(a).await;
            (guard_a, guard_b)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_acquire_is_exclusive() {
        let locks = Arc::new(WalletLocks::new());
        let id = Uuid::new_v4();

        let guard = locks.acquire(id).await;
        let contender = {
            let locks = locks.clone();
            tokio::spawn(async move { locks.acquire(id).await })
        };

        // The second acquire must not complete while the guard is held.
        tokio::task::yield_now().await;
        assert!(!contender.is_finished());

        drop(guard);
        tokio::time::timeout(Duration::from_secs(1), contender)
            .await
            .expect("contender should acquire after release")
            .unwrap();
    }

    #[tokio::test]
    async fn test_opposing_pair_acquisition_does_not_deadlock() {
        let locks = Arc::new(WalletLocks::new());
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        let mut tasks = Vec::new();
        for i in 0..50 {
            let locks = locks.clone();
            let (x, y) = if i % 2 == 0 { (a, b) } else { (b, a) };
            tasks.push(tokio::spawn(async move {
                let _guards = locks.acquire_pair(x, y).await;
            }));
        }

        for task in tasks {
            tokio::time::timeout(Duration::from_secs(5), task)
                .await
                .expect("pair acquisition deadlocked")
                .unwrap();
        }
    }
}
