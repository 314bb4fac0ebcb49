//! Balance mutation.
//!
//! Applies the arithmetic and persists in one step; the store keeps the
//! write atomic per wallet. Sufficiency is not re-checked here; the guard
//! has already confirmed it under the same wallet lock.

use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::debug;

use crate::error::WalletError;
use crate::model::Wallet;
use crate::store::WalletStore;

#[derive(Clone)]
pub struct BalanceMutator {
    wallets: Arc<dyn WalletStore>,
}

impl BalanceMutator {
    pub fn new(wallets: Arc<dyn WalletStore>) -> Self {
        Self { wallets }
    }

    /// balance += amount, persisted. Returns the stored wallet.
    pub async fn credit(&self, mut wallet: Wallet, amount: Decimal) -> Result<Wallet, WalletError> {
        wallet.credit(amount);
        let saved = self.wallets.save(wallet).await?;
        debug!(wallet_id = %saved.id, balance = %saved.balance, "credited wallet");
        Ok(saved)
    }

    /// balance -= amount, persisted. Returns the stored wallet.
    pub async fn debit(&self, mut wallet: Wallet, amount: Decimal) -> Result<Wallet, WalletError> {
        wallet.debit(amount);
        let saved = self.wallets.save(wallet).await?;
        debug!(wallet_id = %saved.id, balance = %saved.balance, "debited wallet");
        Ok(saved)
    }

    /// Unconditional set, persisted.
    pub async fn set_balance(
        &self,
        mut wallet: Wallet,
        value: Decimal,
    ) -> Result<Wallet, WalletError> {
        wallet.balance = value;
        let saved = self.wallets.save(wallet).await?;
        debug!(wallet_id = %saved.id, balance = %saved.balance, "set wallet balance");
        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Owner;
    use crate::store::{InMemoryOwnerDirectory, InMemoryWalletStore};
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    async fn mutator_with_wallet() -> (BalanceMutator, Arc<InMemoryWalletStore>, Wallet) {
        let owners = Arc::new(InMemoryOwnerDirectory::new());
        owners.insert(Owner {
            id: 1,
            national_id: "11122233344".to_string(),
            active: true,
        });
        let store = Arc::new(InMemoryWalletStore::new(owners));
        let wallet = store.save(Wallet::new(1, 9891)).await.unwrap();
        (BalanceMutator::new(store.clone()), store, wallet)
    }

    #[tokio::test]
    async fn test_credit_persists() {
        let (mutator, store, wallet) = mutator_with_wallet().await;
        let saved = mutator.credit(wallet, dec("25.50")).await.unwrap();
        assert_eq!(saved.balance, dec("25.50"));

        let stored = store.by_id(saved.id).await.unwrap().unwrap();
        assert_eq!(stored.balance, dec("25.50"));
    }

    #[tokio::test]
    async fn test_debit_does_not_recheck_sufficiency() {
        let (mutator, _store, wallet) = mutator_with_wallet().await;
        // The guard owns sufficiency; the mutator applies what it is told.
        let saved = mutator.debit(wallet, dec("10.00")).await.unwrap();
        assert_eq!(saved.balance, dec("-10.00"));
    }

    #[tokio::test]
    async fn test_set_balance() {
        let (mutator, store, wallet) = mutator_with_wallet().await;
        let saved = mutator.set_balance(wallet, dec("7.77")).await.unwrap();
        assert_eq!(saved.balance, dec("7.77"));
        assert_eq!(
            store.by_id(saved.id).await.unwrap().unwrap().balance,
            dec("7.77")
        );
    }
}
