//! Immutable transaction history.
//!
//! One entry per completed leg of an operation: a deposit or withdrawal
//! writes one entry, a transfer writes two (TransferOut for the source,
//! TransferIn for the target). Entries are append-only; the store assigns
//! id and timestamp and they are never mutated afterwards.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::error::WalletError;
use crate::model::WalletId;
use crate::store::HistoryStore;

/// The kind of leg an entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HistoryEntryKind {
    Deposit,
    Withdrawal,
    TransferOut,
    TransferIn,
}

impl HistoryEntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            HistoryEntryKind::Deposit => "DEPOSIT",
            HistoryEntryKind::Withdrawal => "WITHDRAWAL",
            HistoryEntryKind::TransferOut => "TRANSFER_OUT",
            HistoryEntryKind::TransferIn => "TRANSFER_IN",
        }
    }
}

impl fmt::Display for HistoryEntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HistoryStatus {
    Pending,
    #[default]
    Completed,
    Failed,
    Cancelled,
}

/// Shape of an entry before the store assigns id and timestamp.
///
/// Exactly one of `source_wallet_id`/`target_wallet_id` is set for
/// deposits/withdrawals; both are set for transfer legs. `balance_before`
/// and `balance_after` are of the wallet this leg concerns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewHistoryEntry {
    pub kind: HistoryEntryKind,
    pub amount: Decimal,
    pub source_wallet_id: Option<WalletId>,
    pub target_wallet_id: Option<WalletId>,
    pub description: Option<String>,
    pub balance_before: Decimal,
    pub balance_after: Decimal,
    pub status: HistoryStatus,
    pub correlation_id: Option<String>,
}

/// A persisted history entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: uuid::Uuid,
    pub kind: HistoryEntryKind,
    pub amount: Decimal,
    pub source_wallet_id: Option<WalletId>,
    pub target_wallet_id: Option<WalletId>,
    pub description: Option<String>,
    pub balance_before: Decimal,
    pub balance_after: Decimal,
    pub status: HistoryStatus,
    pub correlation_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Appends history entries and hands back the persisted record.
#[derive(Clone)]
pub struct HistoryRecorder {
    store: Arc<dyn HistoryStore>,
}

impl HistoryRecorder {
    pub fn new(store: Arc<dyn HistoryStore>) -> Self {
        Self { store }
    }

    /// Pure append; the returned entry carries the generated id and
    /// timestamp the caller uses for its response.
    pub async fn append(&self, entry: NewHistoryEntry) -> Result<HistoryEntry, WalletError> {
        let saved = self.store.append(entry).await?;
        debug!(
            entry_id = %saved.id,
            kind = %saved.kind,
            amount = %saved.amount,
            "history entry appended"
        );
        Ok(saved)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum HistorySort {
    #[default]
    CreatedAt,
    Amount,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

/// Paginated history query. Dates are inclusive and filter on the entry's
/// creation date; the guard enforces both-or-neither and the maximum span.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryQuery {
    pub page: u32,
    pub size: u32,
    pub sort_by: HistorySort,
    pub direction: SortDirection,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl Default for HistoryQuery {
    fn default() -> Self {
        Self {
            page: 0,
            size: 20,
            sort_by: HistorySort::default(),
            direction: SortDirection::default(),
            start_date: None,
            end_date: None,
        }
    }
}

/// One page of history entries plus paging metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryPage {
    pub content: Vec<HistoryEntry>,
    pub page: u32,
    pub size: u32,
    pub total_items: u64,
    pub total_pages: u32,
    pub first: bool,
    pub last: bool,
    pub has_next: bool,
    pub has_previous: bool,
}

impl HistoryPage {
    pub fn new(content: Vec<HistoryEntry>, page: u32, size: u32, total_items: u64) -> Self {
        let total_pages = if size == 0 {
            0
        } else {
            total_items.div_ceil(size as u64) as u32
        };
        let last = total_pages == 0 || page + 1 >= total_pages;
        Self {
            content,
            page,
            size,
            total_items,
            total_pages,
            first: page == 0,
            last,
            has_next: !last,
            has_previous: page > 0,
        }
    }
}
