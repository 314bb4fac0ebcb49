//! Wallet transaction-processing engine.
//!
//! Users hold a balance in a wallet and move money with three operations:
//! deposit, withdraw and transfer. The engine validates each attempt,
//! mutates balances under per-wallet locks, appends an immutable history
//! entry per leg and writes a durability-first audit trail describing
//! intent and outcome.
//!
//! # Modules
//!
//! - [`model`] - Wallet/Owner value objects and operation kinds
//! - [`error`] - typed business errors and store errors
//! - [`store`] - storage collaborator traits + in-memory implementations
//! - [`engine`] - guard, locks, mutator and the three operation variants
//! - [`history`] - immutable transaction history and its read queries
//! - [`audit`] - lifecycle audit records and the explicit request context
//! - [`wallet`] - wallet creation, account numbers, history listing
//! - [`config`] - engine settings (YAML-loadable)
//! - [`logging`] - tracing subscriber setup

pub mod audit;
pub mod config;
pub mod engine;
pub mod error;
pub mod history;
pub mod logging;
pub mod model;
pub mod store;
pub mod wallet;

pub use audit::{AuditOperation, AuditRecord, AuditStatus, AuditTrail, RequestContext};
pub use config::EngineConfig;
pub use engine::{TransactionEngine, TransactionRequest, TransactionResult, WalletLocks};
pub use error::{StoreError, WalletError, WalletLookup};
pub use history::{
    HistoryEntry, HistoryEntryKind, HistoryPage, HistoryQuery, HistorySort, HistoryStatus,
    SortDirection,
};
pub use model::{AccountNumber, Owner, OwnerId, TransactionKind, Wallet, WalletId, WalletRole};
pub use store::{AuditStore, HistoryStore, OwnerDirectory, WalletStore};
pub use wallet::WalletService;
