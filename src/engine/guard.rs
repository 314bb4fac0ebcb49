//! Precondition checks.
//!
//! Pure functions, no side effects, no storage access. Every check fails
//! fast before any mutation; the engine calls them in a fixed order so a
//! rejected request leaves no partial state anywhere.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::error::WalletError;
use crate::model::{AccountNumber, Owner, OwnerId, TransactionKind, Wallet, WalletRole};

/// Amount must be strictly positive.
pub fn require_positive_amount(amount: Decimal) -> Result<(), WalletError> {
    if amount <= Decimal::ZERO {
        return Err(WalletError::Validation(
            "transaction amount must be positive".to_string(),
        ));
    }
    Ok(())
}

/// Wallet and its owner must both be active for the operation.
pub fn require_active(
    wallet: &Wallet,
    owner: &Owner,
    role: WalletRole,
    kind: TransactionKind,
) -> Result<(), WalletError> {
    if !wallet.active || !owner.active {
        return Err(WalletError::InactiveWallet {
            wallet_id: wallet.id,
            role,
            kind,
        });
    }
    Ok(())
}

/// Available balance must cover the requested amount.
pub fn require_sufficient_balance(
    available: Decimal,
    requested: Decimal,
) -> Result<(), WalletError> {
    if available < requested {
        return Err(WalletError::InsufficientBalance {
            available,
            requested,
        });
    }
    Ok(())
}

/// No self-transfer.
pub fn require_distinct(a: &Wallet, b: &Wallet) -> Result<(), WalletError> {
    if a.id == b.id {
        return Err(WalletError::Validation(
            "cannot transfer to the same wallet".to_string(),
        ));
    }
    Ok(())
}

/// Date filters come in pairs, ordered, and capped at `max_days`.
pub fn require_date_range(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    max_days: i64,
) -> Result<(), WalletError> {
    match (start, end) {
        (None, None) => Ok(()),
        (Some(start), Some(end)) => {
            if start > end {
                return Err(WalletError::Validation(
                    "start date cannot be after end date".to_string(),
                ));
            }
            if (end - start).num_days() > max_days {
                return Err(WalletError::Validation(format!(
                    "date range cannot exceed {} days",
                    max_days
                )));
            }
            Ok(())
        }
        _ => Err(WalletError::Validation(
            "both start date and end date must be provided".to_string(),
        )),
    }
}

/// Owner ids are positive numbers.
pub fn require_owner_id(owner_id: OwnerId) -> Result<(), WalletError> {
    if owner_id <= 0 {
        return Err(WalletError::Validation(
            "owner id must be a positive number".to_string(),
        ));
    }
    Ok(())
}

/// Account numbers are positive numbers.
pub fn require_account_number(account_number: AccountNumber) -> Result<(), WalletError> {
    if account_number <= 0 {
        return Err(WalletError::Validation(
            "account number must be a positive number".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn active_pair() -> (Wallet, Owner) {
        let wallet = Wallet::new(1, 9891);
        let owner = Owner {
            id: 1,
            national_id: "11122233344".to_string(),
            active: true,
        };
        (wallet, owner)
    }

    #[test]
    fn test_positive_amount() {
        assert!(require_positive_amount(dec("0.01")).is_ok());
        assert!(require_positive_amount(Decimal::ZERO).is_err());
        assert!(require_positive_amount(dec("-1.00")).is_err());
    }

    #[test]
    fn test_active_checks_both_sides() {
        let (wallet, owner) = active_pair();
        assert!(require_active(&wallet, &owner, WalletRole::Source, TransactionKind::Withdraw).is_ok());

        let mut inactive_wallet = wallet.clone();
        inactive_wallet.active = false;
        let err = require_active(
            &inactive_wallet,
            &owner,
            WalletRole::Source,
            TransactionKind::Withdraw,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            WalletError::InactiveWallet {
                role: WalletRole::Source,
                kind: TransactionKind::Withdraw,
                ..
            }
        ));

        let mut inactive_owner = owner.clone();
        inactive_owner.active = false;
        assert!(
            require_active(&wallet, &inactive_owner, WalletRole::Target, TransactionKind::Deposit)
                .is_err()
        );
    }

    #[test]
    fn test_sufficient_balance_reports_both_amounts() {
        assert!(require_sufficient_balance(dec("100.00"), dec("100.00")).is_ok());
        let err = require_sufficient_balance(dec("100.00"), dec("150.00")).unwrap_err();
        assert_eq!(
            err,
            WalletError::InsufficientBalance {
                available: dec("100.00"),
                requested: dec("150.00"),
            }
        );
    }

    #[test]
    fn test_distinct_wallets() {
        let (a, _) = active_pair();
        let b = Wallet::new(2, 9892);
        assert!(require_distinct(&a, &b).is_ok());
        assert!(require_distinct(&a, &a.clone()).is_err());
    }

    #[test]
    fn test_date_range() {
        let day = |s: &str| NaiveDate::from_str(s).unwrap();

        assert!(require_date_range(None, None, 90).is_ok());
        assert!(require_date_range(Some(day("2026-01-01")), Some(day("2026-03-01")), 90).is_ok());

        // One-sided ranges are rejected.
        assert!(require_date_range(Some(day("2026-01-01")), None, 90).is_err());
        assert!(require_date_range(None, Some(day("2026-01-01")), 90).is_err());

        // Inverted.
        assert!(require_date_range(Some(day("2026-02-01")), Some(day("2026-01-01")), 90).is_err());

        // 91 days exceeds the cap, 90 is fine.
        assert!(require_date_range(Some(day("2026-01-01")), Some(day("2026-04-02")), 90).is_err());
        assert!(require_date_range(Some(day("2026-01-01")), Some(day("2026-04-01")), 90).is_ok());
    }

    #[test]
    fn test_identifier_guards() {
        assert!(require_owner_id(1).is_ok());
        assert!(require_owner_id(0).is_err());
        assert!(require_owner_id(-5).is_err());
        assert!(require_account_number(9891).is_ok());
        assert!(require_account_number(0).is_err());
    }
}
