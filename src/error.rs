//! Error types for the wallet engine.
//!
//! One taxonomy for the whole crate. Every variant carries the structured
//! data a caller needs to render a precise message without string-parsing.

use rust_decimal::Decimal;
use std::fmt;
use thiserror::Error;

use crate::model::{OwnerId, TransactionKind, WalletId, WalletRole};

/// The key a wallet lookup was attempted with.
///
/// Reported inside [`WalletError::WalletNotFound`] so the caller knows which
/// identifier missed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalletLookup {
    Id(WalletId),
    AccountNumber(i64),
    NationalId(String),
}

impl fmt::Display for WalletLookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WalletLookup::Id(id) => write!(f, "wallet id {}", id),
            WalletLookup::AccountNumber(n) => write!(f, "account number {}", n),
            WalletLookup::NationalId(n) => write!(f, "national id {}", n),
        }
    }
}

/// Business errors raised by the engine and the wallet service.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WalletError {
    #[error("{0}")]
    Validation(String),

    #[error("wallet not found for {0}")]
    WalletNotFound(WalletLookup),

    #[error("owner not found with id {0}")]
    OwnerNotFound(OwnerId),

    #[error("wallet already exists for owner {0}")]
    AlreadyExists(OwnerId),

    #[error("{role} wallet {wallet_id} is not active for {kind}")]
    InactiveWallet {
        wallet_id: WalletId,
        role: WalletRole,
        kind: TransactionKind,
    },

    #[error("insufficient balance: available {available}, requested {requested}")]
    InsufficientBalance {
        available: Decimal,
        requested: Decimal,
    },

    #[error("concurrent modification detected on wallet {0}")]
    Conflict(WalletId),

    #[error("audit write failed: {0}")]
    AuditWriteFailure(String),

    #[error("storage error: {0}")]
    Storage(String),
}

impl WalletError {
    /// Stable machine-readable code for API responses and logs.
    pub fn code(&self) -> &'static str {
        match self {
            WalletError::Validation(_) => "VALIDATION_ERROR",
            WalletError::WalletNotFound(_) => "WALLET_NOT_FOUND",
            WalletError::OwnerNotFound(_) => "OWNER_NOT_FOUND",
            WalletError::AlreadyExists(_) => "WALLET_ALREADY_EXISTS",
            WalletError::InactiveWallet { .. } => "INACTIVE_WALLET",
            WalletError::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
            WalletError::Conflict(_) => "CONFLICT",
            WalletError::AuditWriteFailure(_) => "AUDIT_WRITE_FAILURE",
            WalletError::Storage(_) => "STORAGE_ERROR",
        }
    }

    /// True for failures the caller can fix by changing the request.
    pub fn is_client_error(&self) -> bool {
        !matches!(
            self,
            WalletError::Conflict(_)
                | WalletError::AuditWriteFailure(_)
                | WalletError::Storage(_)
        )
    }
}

/// Failures surfaced by a storage backend.
///
/// The engine maps these to [`WalletError`]; only the version conflict keeps
/// its identity, everything else is an opaque backend failure.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("version conflict on wallet {0}")]
    Conflict(WalletId),

    #[error("{0}")]
    Backend(String),
}

impl From<StoreError> for WalletError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Conflict(id) => WalletError::Conflict(id),
            StoreError::Backend(msg) => WalletError::Storage(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            WalletError::Validation("bad".into()).code(),
            "VALIDATION_ERROR"
        );
        assert_eq!(
            WalletError::InsufficientBalance {
                available: Decimal::ZERO,
                requested: Decimal::ONE,
            }
            .code(),
            "INSUFFICIENT_BALANCE"
        );
        assert_eq!(WalletError::AlreadyExists(7).code(), "WALLET_ALREADY_EXISTS");
    }

    #[test]
    fn test_inactive_wallet_message_names_side_and_operation() {
        let id = Uuid::nil();
        let err = WalletError::InactiveWallet {
            wallet_id: id,
            role: WalletRole::Source,
            kind: TransactionKind::Transfer,
        };
        let msg = err.to_string();
        assert!(msg.contains("source"));
        assert!(msg.contains("transfer"));
    }

    #[test]
    fn test_store_error_mapping() {
        let id = Uuid::nil();
        assert_eq!(
            WalletError::from(StoreError::Conflict(id)),
            WalletError::Conflict(id)
        );
        assert_eq!(
            WalletError::from(StoreError::Backend("down".into())),
            WalletError::Storage("down".into())
        );
    }

    #[test]
    fn test_client_error_split() {
        assert!(WalletError::Validation("x".into()).is_client_error());
        assert!(!WalletError::Storage("x".into()).is_client_error());
        assert!(!WalletError::Conflict(Uuid::nil()).is_client_error());
    }
}
