//! Storage collaborator contracts.
//!
//! The engine never talks to a database directly; it sees these traits and
//! nothing else. Implementations must keep `save` atomic per wallet (no
//! partial write visible to a concurrent reader) and must enforce the
//! wallet `version` so a stale snapshot cannot silently overwrite a newer
//! one.

pub mod memory;

pub use memory::{
    InMemoryAuditStore, InMemoryHistoryStore, InMemoryOwnerDirectory, InMemoryWalletStore,
};

use async_trait::async_trait;

use crate::audit::{AuditRecord, NewAuditRecord};
use crate::error::StoreError;
use crate::history::{HistoryEntry, HistoryPage, HistoryQuery, NewHistoryEntry};
use crate::model::{AccountNumber, Owner, OwnerId, Wallet, WalletId};

/// Wallet persistence: keyed lookups plus an atomic, version-checked save.
#[async_trait]
pub trait WalletStore: Send + Sync {
    async fn by_id(&self, id: WalletId) -> Result<Option<Wallet>, StoreError>;

    async fn by_account_number(
        &self,
        account_number: AccountNumber,
    ) -> Result<Option<Wallet>, StoreError>;

    /// Wallet of the owner identified by an exact national id.
    async fn by_national_id(&self, national_id: &str) -> Result<Option<Wallet>, StoreError>;

    async fn by_owner(&self, owner_id: OwnerId) -> Result<Option<Wallet>, StoreError>;

    async fn exists_for_owner(&self, owner_id: OwnerId) -> Result<bool, StoreError>;

    /// Persist the wallet and return the stored value.
    ///
    /// Updates must match the stored `version` (returning
    /// [`StoreError::Conflict`] otherwise) and bump it on success; inserts
    /// store the wallet as given.
    async fn save(&self, wallet: Wallet) -> Result<Wallet, StoreError>;
}

/// Owner lookups. Account management itself lives outside this crate.
#[async_trait]
pub trait OwnerDirectory: Send + Sync {
    async fn exists(&self, owner_id: OwnerId) -> Result<bool, StoreError>;

    async fn find(&self, owner_id: OwnerId) -> Result<Option<Owner>, StoreError>;
}

/// Append-only transaction history plus the read queries the reporting side
/// consumes.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Assigns id and timestamp, returns the persisted entry.
    async fn append(&self, entry: NewHistoryEntry) -> Result<HistoryEntry, StoreError>;

    /// Entries touching the wallet (as source or target), paginated.
    async fn by_wallet(
        &self,
        wallet_id: WalletId,
        query: &HistoryQuery,
    ) -> Result<HistoryPage, StoreError>;
}

/// Append-only audit trail. Each append is independently durable.
#[async_trait]
pub trait AuditStore: Send + Sync {
    async fn append(&self, record: NewAuditRecord) -> Result<AuditRecord, StoreError>;
}
