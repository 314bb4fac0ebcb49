//! Wallet lifecycle and read-side operations.
//!
//! Creation (with the derived account number), activation toggling, keyed
//! lookups and the paginated transaction-history listing. Money movement
//! itself lives in [`crate::engine`].

use std::sync::Arc;
use tracing::info;

use crate::config::EngineConfig;
use crate::engine::{WalletLocks, guard, resolver};
use crate::error::{WalletError, WalletLookup};
use crate::history::{HistoryPage, HistoryQuery};
use crate::model::{AccountNumber, OwnerId, Wallet, WalletId};
use crate::store::{HistoryStore, OwnerDirectory, WalletStore};

pub struct WalletService {
    wallets: Arc<dyn WalletStore>,
    owners: Arc<dyn OwnerDirectory>,
    history: Arc<dyn HistoryStore>,
    locks: Arc<WalletLocks>,
    config: EngineConfig,
}

impl WalletService {
    pub fn new(
        wallets: Arc<dyn WalletStore>,
        owners: Arc<dyn OwnerDirectory>,
        history: Arc<dyn HistoryStore>,
        locks: Arc<WalletLocks>,
        config: EngineConfig,
    ) -> Self {
        Self {
            wallets,
            owners,
            history,
            locks,
            config,
        }
    }

    /// Create the single wallet of an owner.
    ///
    /// Rejected when the owner is unknown or already has one. The account
    /// number is fixed at creation and never changes.
    pub async fn create_wallet(&self, owner_id: OwnerId) -> Result<Wallet, WalletError> {
        guard::require_owner_id(owner_id)?;
        info!(owner_id, "creating wallet");

        let owner = self
            .owners
            .find(owner_id)
            .await?
            .ok_or(WalletError::OwnerNotFound(owner_id))?;

        if self.wallets.exists_for_owner(owner.id).await? {
            return Err(WalletError::AlreadyExists(owner.id));
        }

        let account_number = self.derive_account_number(owner.id)?;
        let saved = self.wallets.save(Wallet::new(owner.id, account_number)).await?;

        info!(
            wallet_id = %saved.id,
            account_number = saved.account_number,
            owner_id,
            "wallet created"
        );
        Ok(saved)
    }

    pub async fn wallet_by_id(&self, wallet_id: WalletId) -> Result<Wallet, WalletError> {
        resolver::find_by_id(self.wallets.as_ref(), wallet_id).await
    }

    pub async fn wallet_by_account_number(
        &self,
        account_number: AccountNumber,
    ) -> Result<Wallet, WalletError> {
        guard::require_account_number(account_number)?;
        self.wallets
            .by_account_number(account_number)
            .await?
            .ok_or(WalletError::WalletNotFound(WalletLookup::AccountNumber(
                account_number,
            )))
    }

    /// Flip the active flag. No balance side effect.
    pub async fn toggle_active(&self, wallet_id: WalletId) -> Result<Wallet, WalletError> {
        let _wallet_guard = self.locks.acquire(wallet_id).await;

        let mut wallet = resolver::find_by_id(self.wallets.as_ref(), wallet_id).await?;
        wallet.active = !wallet.active;
        let saved = self.wallets.save(wallet).await?;

        info!(wallet_id = %saved.id, active = saved.active, "wallet active flag toggled");
        Ok(saved)
    }

    /// Paginated history for a wallet, on behalf of its owner.
    ///
    /// The wallet must belong to the owner; date filters obey the
    /// configured maximum span; the page size is clamped to the configured
    /// maximum.
    pub async fn transaction_history(
        &self,
        wallet_id: WalletId,
        owner_id: OwnerId,
        query: HistoryQuery,
    ) -> Result<HistoryPage, WalletError> {
        guard::require_owner_id(owner_id)?;
        if !self.owners.exists(owner_id).await? {
            return Err(WalletError::OwnerNotFound(owner_id));
        }

        let wallet = resolver::find_by_id(self.wallets.as_ref(), wallet_id).await?;
        if wallet.owner_id != owner_id {
            return Err(WalletError::Validation(format!(
                "wallet {} does not belong to owner {}",
                wallet_id, owner_id
            )));
        }

        guard::require_date_range(
            query.start_date,
            query.end_date,
            self.config.history.max_range_days,
        )?;

        let mut query = query;
        if query.size == 0 {
            query.size = self.config.history.default_page_size;
        }
        query.size = query.size.min(self.config.history.max_page_size);

        Ok(self.history.by_wallet(wallet_id, &query).await?)
    }

    /// Prefix ++ decimal owner id, parsed back to an integer. Fails when
    /// the owner id cannot be embedded this way.
    fn derive_account_number(&self, owner_id: OwnerId) -> Result<AccountNumber, WalletError> {
        format!("{}{}", self.config.account_number_prefix, owner_id)
            .parse::<AccountNumber>()
            .map_err(|_| {
                WalletError::Validation(format!(
                    "owner id {} cannot be embedded in an account number",
                    owner_id
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Owner;
    use crate::store::{InMemoryHistoryStore, InMemoryOwnerDirectory, InMemoryWalletStore};

    fn service() -> (Arc<InMemoryOwnerDirectory>, WalletService) {
        let owners = Arc::new(InMemoryOwnerDirectory::new());
        let wallets = Arc::new(InMemoryWalletStore::new(owners.clone()));
        let history = Arc::new(InMemoryHistoryStore::new());
        let service = WalletService::new(
            wallets,
            owners.clone(),
            history,
            Arc::new(WalletLocks::new()),
            EngineConfig::default(),
        );
        (owners, service)
    }

    fn owner(id: OwnerId) -> Owner {
        Owner {
            id,
            national_id: format!("{:011}", id),
            active: true,
        }
    }

    #[tokio::test]
    async fn test_account_number_derivation() {
        let (owners, service) = service();
        owners.insert(owner(42));

        let wallet = service.create_wallet(42).await.unwrap();
        assert_eq!(wallet.account_number, 98942);
        assert_eq!(wallet.owner_id, 42);
        assert!(wallet.active);
    }

    #[tokio::test]
    async fn test_one_wallet_per_owner() {
        let (owners, service) = service();
        owners.insert(owner(7));

        service.create_wallet(7).await.unwrap();
        let err = service.create_wallet(7).await.unwrap_err();
        assert_eq!(err, WalletError::AlreadyExists(7));
    }

    #[tokio::test]
    async fn test_unknown_owner_rejected() {
        let (_owners, service) = service();
        assert_eq!(
            service.create_wallet(99).await.unwrap_err(),
            WalletError::OwnerNotFound(99)
        );
        assert!(matches!(
            service.create_wallet(0).await.unwrap_err(),
            WalletError::Validation(_)
        ));
    }

    #[tokio::test]
    async fn test_unembeddable_owner_id_rejected() {
        let (owners, service) = service();
        // "989" ++ this id overflows i64.
        owners.insert(owner(i64::MAX));
        assert!(matches!(
            service.create_wallet(i64::MAX).await.unwrap_err(),
            WalletError::Validation(_)
        ));
    }

    #[tokio::test]
    async fn test_lookup_by_account_number() {
        let (owners, service) = service();
        owners.insert(owner(5));
        let created = service.create_wallet(5).await.unwrap();

        let found = service.wallet_by_account_number(9895).await.unwrap();
        assert_eq!(found.id, created.id);

        assert!(matches!(
            service.wallet_by_account_number(0).await.unwrap_err(),
            WalletError::Validation(_)
        ));
        assert_eq!(
            service.wallet_by_account_number(1111).await.unwrap_err(),
            WalletError::WalletNotFound(WalletLookup::AccountNumber(1111))
        );
    }

    #[tokio::test]
    async fn test_toggle_round_trip() {
        let (owners, service) = service();
        owners.insert(owner(3));
        let wallet = service.create_wallet(3).await.unwrap();
        assert!(wallet.active);

        let toggled = service.toggle_active(wallet.id).await.unwrap();
        assert!(!toggled.active);

        let restored = service.toggle_active(wallet.id).await.unwrap();
        assert!(restored.active);
        assert_eq!(restored.balance, wallet.balance);
    }

    #[tokio::test]
    async fn test_history_requires_ownership() {
        let (owners, service) = service();
        owners.insert(owner(1));
        owners.insert(owner(2));
        let wallet = service.create_wallet(1).await.unwrap();
        service.create_wallet(2).await.unwrap();

        let err = service
            .transaction_history(wallet.id, 2, HistoryQuery::default())
            .await
            .unwrap_err();
        assert!(matches!(err, WalletError::Validation(_)));

        let page = service
            .transaction_history(wallet.id, 1, HistoryQuery::default())
            .await
            .unwrap();
        assert_eq!(page.total_items, 0);
    }

    #[tokio::test]
    async fn test_history_clamps_page_size() {
        let (owners, service) = service();
        owners.insert(owner(1));
        let wallet = service.create_wallet(1).await.unwrap();

        let page = service
            .transaction_history(
                wallet.id,
                1,
                HistoryQuery {
                    size: 10_000,
                    ..HistoryQuery::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(page.size, 100);

        let page = service
            .transaction_history(
                wallet.id,
                1,
                HistoryQuery {
                    size: 0,
                    ..HistoryQuery::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(page.size, 20);
    }
}
