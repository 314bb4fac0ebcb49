//! Transaction engine.
//!
//! One variant per operation kind; dispatch is a single `match`. Every
//! variant runs the same shape: resolve wallet(s) → guard → audit Initiated
//! → mutate → record history → audit terminal. Guard failures abort before
//! any audit or mutation; failures after Initiated always produce a
//! matching Failed record before the error propagates.

pub mod guard;
pub mod locks;
pub mod mutator;
pub(crate) mod resolver;

mod deposit;
mod transfer;
mod withdraw;

pub use locks::WalletLocks;
pub use mutator::BalanceMutator;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::audit::{AuditTrail, RequestContext};
use crate::error::WalletError;
use crate::history::{HistoryEntry, HistoryEntryKind, HistoryRecorder, HistoryStatus};
use crate::model::{AccountNumber, Owner, TransactionKind, Wallet, WalletId};
use crate::store::{AuditStore, HistoryStore, OwnerDirectory, WalletStore};

/// A money-movement request as the caller hands it to the engine.
///
/// Target identifiers are tried in strict priority order: wallet id, then
/// account number, then owner national id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRequest {
    pub kind: TransactionKind,
    pub amount: Decimal,
    pub source_wallet_id: Option<WalletId>,
    pub target_wallet_id: Option<WalletId>,
    pub target_account_number: Option<AccountNumber>,
    pub target_national_id: Option<String>,
    pub description: Option<String>,
    pub correlation_id: Option<String>,
}

impl TransactionRequest {
    pub fn deposit(target_wallet_id: WalletId, amount: Decimal) -> Self {
        Self {
            kind: TransactionKind::Deposit,
            amount,
            source_wallet_id: None,
            target_wallet_id: Some(target_wallet_id),
            target_account_number: None,
            target_national_id: None,
            description: None,
            correlation_id: None,
        }
    }

    pub fn withdraw(source_wallet_id: WalletId, amount: Decimal) -> Self {
        Self {
            kind: TransactionKind::Withdraw,
            amount,
            source_wallet_id: Some(source_wallet_id),
            target_wallet_id: None,
            target_account_number: None,
            target_national_id: None,
            description: None,
            correlation_id: None,
        }
    }

    /// Transfer with the target still unset; combine with one of the
    /// `with_target_*` builders.
    pub fn transfer(source_wallet_id: WalletId, amount: Decimal) -> Self {
        Self {
            kind: TransactionKind::Transfer,
            amount,
            source_wallet_id: Some(source_wallet_id),
            target_wallet_id: None,
            target_account_number: None,
            target_national_id: None,
            description: None,
            correlation_id: None,
        }
    }

    pub fn with_target_wallet(mut self, target_wallet_id: WalletId) -> Self {
        self.target_wallet_id = Some(target_wallet_id);
        self
    }

    pub fn with_target_account(mut self, account_number: AccountNumber) -> Self {
        self.target_account_number = Some(account_number);
        self
    }

    pub fn with_target_national_id(mut self, national_id: impl Into<String>) -> Self {
        self.target_national_id = Some(national_id.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.correlation_id = Some(correlation_id.into());
        self
    }
}

/// What the engine returns: the persisted history entry of the operation
/// (for transfers, the TransferOut leg).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionResult {
    pub id: uuid::Uuid,
    pub kind: HistoryEntryKind,
    pub amount: Decimal,
    pub source_wallet_id: Option<WalletId>,
    pub target_wallet_id: Option<WalletId>,
    pub balance_before: Decimal,
    pub balance_after: Decimal,
    pub status: HistoryStatus,
    pub created_at: DateTime<Utc>,
}

impl TransactionResult {
    fn from_entry(entry: &HistoryEntry) -> Self {
        Self {
            id: entry.id,
            kind: entry.kind,
            amount: entry.amount,
            source_wallet_id: entry.source_wallet_id,
            target_wallet_id: entry.target_wallet_id,
            balance_before: entry.balance_before,
            balance_after: entry.balance_after,
            status: entry.status,
            created_at: entry.created_at,
        }
    }
}

/// Orchestrates guard → mutate → record → audit for the three operation
/// kinds, with per-wallet locking around the read-validate-write window.
pub struct TransactionEngine {
    pub(crate) wallets: Arc<dyn WalletStore>,
    pub(crate) owners: Arc<dyn OwnerDirectory>,
    pub(crate) mutator: BalanceMutator,
    pub(crate) recorder: HistoryRecorder,
    pub(crate) audit: AuditTrail,
    pub(crate) locks: Arc<WalletLocks>,
}

impl TransactionEngine {
    pub fn new(
        wallets: Arc<dyn WalletStore>,
        owners: Arc<dyn OwnerDirectory>,
        history: Arc<dyn HistoryStore>,
        audit: Arc<dyn AuditStore>,
        locks: Arc<WalletLocks>,
    ) -> Self {
        Self {
            mutator: BalanceMutator::new(wallets.clone()),
            recorder: HistoryRecorder::new(history),
            audit: AuditTrail::new(audit),
            wallets,
            owners,
            locks,
        }
    }

    /// Execute one attempt to completion or error.
    ///
    /// Amount positivity is checked before any store access. On success the
    /// result carries the id and timestamp of the persisted history entry.
    pub async fn execute(
        &self,
        request: TransactionRequest,
        ctx: &RequestContext,
    ) -> Result<TransactionResult, WalletError> {
        guard::require_positive_amount(request.amount)?;

        match request.kind {
            TransactionKind::Deposit => deposit::execute(self, &request, ctx).await,
            TransactionKind::Withdraw => withdraw::execute(self, &request, ctx).await,
            TransactionKind::Transfer => transfer::execute(self, &request, ctx).await,
        }
    }

    pub(crate) async fn owner_of(&self, wallet: &Wallet) -> Result<Owner, WalletError> {
        self.owners
            .find(wallet.owner_id)
            .await?
            .ok_or(WalletError::OwnerNotFound(wallet.owner_id))
    }
}
