//! Wallet lookup and target resolution.

use crate::engine::TransactionRequest;
use crate::error::{WalletError, WalletLookup};
use crate::model::{Wallet, WalletId};
use crate::store::WalletStore;

/// Lookup by id, mapping absence to `WalletNotFound`.
pub(crate) async fn find_by_id(
    store: &dyn WalletStore,
    id: WalletId,
) -> Result<Wallet, WalletError> {
    store
        .by_id(id)
        .await?
        .ok_or(WalletError::WalletNotFound(WalletLookup::Id(id)))
}

/// Resolve the transfer target from the request.
///
/// Strict priority: explicit wallet id, then account number, then owner
/// national id. The first identifier present wins even when several are
/// supplied; with none present the request is rejected.
pub(crate) async fn resolve_target(
    store: &dyn WalletStore,
    request: &TransactionRequest,
) -> Result<Wallet, WalletError> {
    if let Some(id) = request.target_wallet_id {
        return find_by_id(store, id).await;
    }

    if let Some(account_number) = request.target_account_number {
        return store
            .by_account_number(account_number)
            .await?
            .ok_or(WalletError::WalletNotFound(WalletLookup::AccountNumber(
                account_number,
            )));
    }

    if let Some(national_id) = request.target_national_id.as_deref() {
        return store.by_national_id(national_id).await?.ok_or_else(|| {
            WalletError::WalletNotFound(WalletLookup::NationalId(national_id.to_string()))
        });
    }

    Err(WalletError::Validation(
        "target wallet identification is required (wallet id, account number or national id)"
            .to_string(),
    ))
}
