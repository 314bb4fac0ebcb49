//! Deposit: credit one wallet.

use tracing::{error, info, warn};

use crate::audit::{AuditLeg, AuditOperation, RequestContext};
use crate::engine::{TransactionEngine, TransactionRequest, TransactionResult, guard, resolver};
use crate::error::WalletError;
use crate::history::{HistoryEntry, HistoryEntryKind, HistoryStatus, NewHistoryEntry};
use crate::model::{TransactionKind, Wallet, WalletRole};

pub(crate) async fn execute(
    engine: &TransactionEngine,
    request: &TransactionRequest,
    ctx: &RequestContext,
) -> Result<TransactionResult, WalletError> {
    let wallet_id = request.target_wallet_id.ok_or_else(|| {
        WalletError::Validation("target wallet id is required for deposits".to_string())
    })?;

    info!(wallet_id = %wallet_id, amount = %request.amount, "processing deposit");

    // The lock spans the authoritative read through the history append.
    let _wallet_guard = engine.locks.acquire(wallet_id).await;

    let wallet = resolver::find_by_id(engine.wallets.as_ref(), wallet_id).await?;
    let owner = engine.owner_of(&wallet).await?;
    guard::require_active(&wallet, &owner, WalletRole::Target, TransactionKind::Deposit)?;

    let leg = AuditLeg::new(&wallet, AuditOperation::Credit, request.amount);
    engine
        .audit
        .record_initiated(&leg, "deposit initiated", ctx)
        .await?;

    match apply(engine, wallet, request).await {
        Ok(entry) => {
            if let Err(audit_err) = engine
                .audit
                .record_completed(&leg, entry.balance_after, "deposit completed", ctx)
                .await
            {
                // The credit is already durable; a missing terminal audit
                // record must not turn the outcome into a failure.
                warn!(
                    transaction_id = %leg.transaction_id,
                    error = %audit_err,
                    "completed-audit write failed after successful deposit"
                );
            }
            info!(
                transaction_id = %leg.transaction_id,
                entry_id = %entry.id,
                "deposit completed"
            );
            Ok(TransactionResult::from_entry(&entry))
        }
        Err(err) => {
            error!(
                wallet_id = %leg.wallet_id,
                amount = %request.amount,
                error = %err,
                "deposit failed"
            );
            let reason = format!("deposit failed: {}", err);
            if let Err(audit_err) = engine.audit.record_failed(&leg, &reason, ctx).await {
                error!(
                    transaction_id = %leg.transaction_id,
                    error = %audit_err,
                    "failed-audit write failed as well"
                );
            }
            Err(err)
        }
    }
}

async fn apply(
    engine: &TransactionEngine,
    wallet: Wallet,
    request: &TransactionRequest,
) -> Result<HistoryEntry, WalletError> {
    let balance_before = wallet.balance;
    let wallet = engine.mutator.credit(wallet, request.amount).await?;

    engine
        .recorder
        .append(NewHistoryEntry {
            kind: HistoryEntryKind::Deposit,
            amount: request.amount,
            source_wallet_id: None,
            target_wallet_id: Some(wallet.id),
            description: request.description.clone(),
            balance_before,
            balance_after: wallet.balance,
            status: HistoryStatus::Completed,
            correlation_id: request.correlation_id.clone(),
        })
        .await
}
