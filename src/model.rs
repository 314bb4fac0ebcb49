//! Core domain types: wallets, owners and the operation kinds.
//!
//! Wallets are eager value objects assembled by the store layer. Nothing in
//! here reaches back into storage; owner state travels separately via
//! [`crate::store::OwnerDirectory`].

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

pub type WalletId = Uuid;
pub type OwnerId = i64;
pub type AccountNumber = i64;

/// The three money-movement operations the engine dispatches on.
///
/// Closed set: dispatch is a single `match`, there is no runtime registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Deposit,
    Withdraw,
    Transfer,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Deposit => "deposit",
            TransactionKind::Withdraw => "withdraw",
            TransactionKind::Transfer => "transfer",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which side of an operation a wallet plays. Used in guard failures so the
/// message identifies the failing side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WalletRole {
    Source,
    Target,
}

impl fmt::Display for WalletRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WalletRole::Source => write!(f, "source"),
            WalletRole::Target => write!(f, "target"),
        }
    }
}

/// A wallet owner as the directory reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    pub id: OwnerId,
    /// National identifier (e.g. a tax id). Unique per owner; usable as a
    /// transfer-target key.
    pub national_id: String,
    pub active: bool,
}

/// A wallet holding a monetary balance for exactly one owner.
///
/// `balance >= 0` is enforced by the guard layer, not by this type; `debit`
/// assumes sufficiency was already checked. `version` backs the optimistic
/// check in [`crate::store::WalletStore::save`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wallet {
    pub id: WalletId,
    /// Unique, immutable, derived from the owner id at creation.
    pub account_number: AccountNumber,
    pub owner_id: OwnerId,
    pub balance: Decimal,
    pub active: bool,
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Wallet {
    /// Fresh wallet with zero balance, active, version 0.
    pub fn new(owner_id: OwnerId, account_number: AccountNumber) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            account_number,
            owner_id,
            balance: Decimal::ZERO,
            active: true,
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// balance += amount. Exact decimal arithmetic, no rounding.
    pub fn credit(&mut self, amount: Decimal) {
        self.balance += amount;
    }

    /// balance -= amount. Sufficiency is the guard's job, not re-checked
    /// here.
    pub fn debit(&mut self, amount: Decimal) {
        self.balance -= amount;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_new_wallet_defaults() {
        let wallet = Wallet::new(42, 98942);
        assert_eq!(wallet.owner_id, 42);
        assert_eq!(wallet.account_number, 98942);
        assert_eq!(wallet.balance, Decimal::ZERO);
        assert!(wallet.active);
        assert_eq!(wallet.version, 0);
    }

    #[test]
    fn test_credit_debit_are_exact() {
        let mut wallet = Wallet::new(1, 9891);
        wallet.credit(dec("100.00"));
        assert_eq!(wallet.balance, dec("100.00"));

        wallet.debit(dec("0.01"));
        assert_eq!(wallet.balance, dec("99.99"));

        wallet.credit(dec("0.01"));
        wallet.debit(dec("100.00"));
        assert_eq!(wallet.balance, Decimal::ZERO);
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(TransactionKind::Deposit.to_string(), "deposit");
        assert_eq!(TransactionKind::Withdraw.to_string(), "withdraw");
        assert_eq!(TransactionKind::Transfer.to_string(), "transfer");
        assert_eq!(WalletRole::Source.to_string(), "source");
        assert_eq!(WalletRole::Target.to_string(), "target");
    }
}
