//! In-memory store implementations.
//!
//! Reference backing for the storage traits: `DashMap` keyed maps for
//! wallets and owners, append-only vectors for history and audit. Used by
//! the integration tests and as the template for a real backend. The
//! history and audit stores carry failure-injection switches so tests can
//! exercise the engine's partial-failure paths.

use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use uuid::Uuid;

use async_trait::async_trait;

use crate::audit::{AuditRecord, NewAuditRecord};
use crate::error::StoreError;
use crate::history::{
    HistoryEntry, HistoryPage, HistoryQuery, HistorySort, NewHistoryEntry, SortDirection,
};
use crate::model::{AccountNumber, Owner, OwnerId, Wallet, WalletId};
use crate::store::{AuditStore, HistoryStore, OwnerDirectory, WalletStore};

/// Owner directory over a `DashMap`.
#[derive(Default)]
pub struct InMemoryOwnerDirectory {
    owners: DashMap<OwnerId, Owner>,
}

impl InMemoryOwnerDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, owner: Owner) {
        self.owners.insert(owner.id, owner);
    }

    pub fn set_active(&self, owner_id: OwnerId, active: bool) {
        if let Some(mut owner) = self.owners.get_mut(&owner_id) {
            owner.active = active;
        }
    }

    pub fn find_by_national_id(&self, national_id: &str) -> Option<Owner> {
        self.owners
            .iter()
            .find(|entry| entry.value().national_id == national_id)
            .map(|entry| entry.value().clone())
    }
}

#[async_trait]
impl OwnerDirectory for InMemoryOwnerDirectory {
    async fn exists(&self, owner_id: OwnerId) -> Result<bool, StoreError> {
        Ok(self.owners.contains_key(&owner_id))
    }

    async fn find(&self, owner_id: OwnerId) -> Result<Option<Owner>, StoreError> {
        Ok(self.owners.get(&owner_id).map(|o| o.value().clone()))
    }
}

/// Wallet store over `DashMap`s with secondary indexes by account number and
/// owner. National-id lookups join through the owner directory, so the
/// returned wallets are plain values with no lazy edges.
pub struct InMemoryWalletStore {
    owners: Arc<InMemoryOwnerDirectory>,
    wallets: DashMap<WalletId, Wallet>,
    by_account: DashMap<AccountNumber, WalletId>,
    by_owner: DashMap<OwnerId, WalletId>,
}

impl InMemoryWalletStore {
    pub fn new(owners: Arc<InMemoryOwnerDirectory>) -> Self {
        Self {
            owners,
            wallets: DashMap::new(),
            by_account: DashMap::new(),
            by_owner: DashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.wallets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wallets.is_empty()
    }
}

#[async_trait]
impl WalletStore for InMemoryWalletStore {
    async fn by_id(&self, id: WalletId) -> Result<Option<Wallet>, StoreError> {
        Ok(self.wallets.get(&id).map(|w| w.value().clone()))
    }

    async fn by_account_number(
        &self,
        account_number: AccountNumber,
    ) -> Result<Option<Wallet>, StoreError> {
        let Some(id) = self.by_account.get(&account_number).map(|e| *e.value()) else {
            return Ok(None);
        };
        self.by_id(id).await
    }

    async fn by_national_id(&self, national_id: &str) -> Result<Option<Wallet>, StoreError> {
        let Some(owner) = self.owners.find_by_national_id(national_id) else {
            return Ok(None);
        };
        self.by_owner(owner.id).await
    }

    async fn by_owner(&self, owner_id: OwnerId) -> Result<Option<Wallet>, StoreError> {
        let Some(id) = self.by_owner.get(&owner_id).map(|e| *e.value()) else {
            return Ok(None);
        };
        self.by_id(id).await
    }

    async fn exists_for_owner(&self, owner_id: OwnerId) -> Result<bool, StoreError> {
        Ok(self.by_owner.contains_key(&owner_id))
    }

    async fn save(&self, wallet: Wallet) -> Result<Wallet, StoreError> {
        match self.wallets.entry(wallet.id) {
            Entry::Occupied(mut occupied) => {
                // Version check under the shard lock: the compare and the
                // write are one atomic step for this wallet.
                if occupied.get().version != wallet.version {
                    return Err(StoreError::Conflict(wallet.id));
                }
                let mut saved = wallet;
                saved.version += 1;
                saved.updated_at = Utc::now();
                occupied.insert(saved.clone());
                Ok(saved)
            }
            Entry::Vacant(vacant) => {
                let saved = wallet;
                vacant.insert(saved.clone());
                self.by_account.insert(saved.account_number, saved.id);
                self.by_owner.insert(saved.owner_id, saved.id);
                Ok(saved)
            }
        }
    }
}

/// Append-only history store.
#[derive(Default)]
pub struct InMemoryHistoryStore {
    entries: RwLock<Vec<HistoryEntry>>,
    fail_appends: AtomicBool,
}

impl InMemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent append fail. For partial-failure tests.
    pub fn set_fail_appends(&self, fail: bool) {
        self.fail_appends.store(fail, Ordering::SeqCst);
    }

    pub fn entries(&self) -> Vec<HistoryEntry> {
        self.entries.read().unwrap().clone()
    }

    pub fn entry_count(&self) -> usize {
        self.entries.read().unwrap().len()
    }
}

#[async_trait]
impl HistoryStore for InMemoryHistoryStore {
    async fn append(&self, entry: NewHistoryEntry) -> Result<HistoryEntry, StoreError> {
        if self.fail_appends.load(Ordering::SeqCst) {
            return Err(StoreError::Backend(
                "injected history append failure".to_string(),
            ));
        }

        let saved = HistoryEntry {
            id: Uuid::new_v4(),
            kind: entry.kind,
            amount: entry.amount,
            source_wallet_id: entry.source_wallet_id,
            target_wallet_id: entry.target_wallet_id,
            description: entry.description,
            balance_before: entry.balance_before,
            balance_after: entry.balance_after,
            status: entry.status,
            correlation_id: entry.correlation_id,
            created_at: Utc::now(),
        };
        self.entries.write().unwrap().push(saved.clone());
        Ok(saved)
    }

    async fn by_wallet(
        &self,
        wallet_id: WalletId,
        query: &HistoryQuery,
    ) -> Result<HistoryPage, StoreError> {
        let mut matched: Vec<HistoryEntry> = self
            .entries
            .read()
            .unwrap()
            .iter()
            .filter(|e| {
                e.source_wallet_id == Some(wallet_id) || e.target_wallet_id == Some(wallet_id)
            })
            .filter(|e| {
                let date = e.created_at.date_naive();
                query.start_date.is_none_or(|start| date >= start)
                    && query.end_date.is_none_or(|end| date <= end)
            })
            .cloned()
            .collect();

        matched.sort_by(|a, b| {
            let ordering = match query.sort_by {
                HistorySort::CreatedAt => a.created_at.cmp(&b.created_at),
                HistorySort::Amount => a.amount.cmp(&b.amount),
            };
            match query.direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        });

        let total_items = matched.len() as u64;
        let offset = (query.page as usize).saturating_mul(query.size as usize);
        let content: Vec<HistoryEntry> = matched
            .into_iter()
            .skip(offset)
            .take(query.size as usize)
            .collect();

        Ok(HistoryPage::new(
            content,
            query.page,
            query.size,
            total_items,
        ))
    }
}

/// Append-only audit store with a counted failure switch: the first
/// `fail_after(n)` appends succeed, every later one fails. Lets tests break
/// exactly the Initiated or the terminal write of an attempt.
#[derive(Default)]
pub struct InMemoryAuditStore {
    records: RwLock<Vec<AuditRecord>>,
    remaining_before_failure: Mutex<Option<u32>>,
}

impl InMemoryAuditStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_after(&self, successful_appends: u32) {
        *self.remaining_before_failure.lock().unwrap() = Some(successful_appends);
    }

    pub fn clear_failures(&self) {
        *self.remaining_before_failure.lock().unwrap() = None;
    }

    pub fn records(&self) -> Vec<AuditRecord> {
        self.records.read().unwrap().clone()
    }

    pub fn records_for_wallet(&self, wallet_id: WalletId) -> Vec<AuditRecord> {
        self.records
            .read()
            .unwrap()
            .iter()
            .filter(|r| r.wallet_id == wallet_id)
            .cloned()
            .collect()
    }

    pub fn record_count(&self) -> usize {
        self.records.read().unwrap().len()
    }

    fn take_failure_token(&self) -> Result<(), StoreError> {
        let mut remaining = self.remaining_before_failure.lock().unwrap();
        match remaining.as_mut() {
            None => Ok(()),
            Some(0) => Err(StoreError::Backend(
                "injected audit append failure".to_string(),
            )),
            Some(n) => {
                *n -= 1;
                Ok(())
            }
        }
    }
}

#[async_trait]
impl AuditStore for InMemoryAuditStore {
    async fn append(&self, record: NewAuditRecord) -> Result<AuditRecord, StoreError> {
        self.take_failure_token()?;

        let saved = AuditRecord {
            id: Uuid::new_v4(),
            transaction_id: record.transaction_id,
            wallet_id: record.wallet_id,
            owner_id: record.owner_id,
            operation: record.operation,
            amount: record.amount,
            balance_before: record.balance_before,
            balance_after: record.balance_after,
            status: record.status,
            actor: record.actor,
            origin_ip: record.origin_ip,
            user_agent: record.user_agent,
            session_id: record.session_id,
            correlation_id: record.correlation_id,
            description: record.description,
            metadata: record.metadata,
            created_at: Utc::now(),
        };
        self.records.write().unwrap().push(saved.clone());
        Ok(saved)
    }
}
