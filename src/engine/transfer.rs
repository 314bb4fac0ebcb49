//! Transfer: debit the source, credit the target, two history legs, four
//! audit records.
//!
//! Ordering contract: source is validated and mutated before the target,
//! but both Initiated records land before any mutation and both terminal
//! records after both mutations, so a partial failure still leaves a
//! complete, matched pair per leg.

use rust_decimal::Decimal;
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
    let source_id = request.source_wallet_id.ok_or_else(|| {
        WalletError::Validation("source wallet id is required for transfers".to_string())
    })?;

    info!(source_wallet_id = %source_id, amount = %request.amount, "processing transfer");

    // First resolution only discovers the target id; the authoritative
    // reads happen again under the locks.
    let target_probe = resolver::resolve_target(engine.wallets.as_ref(), request).await?;
    if target_probe.id == source_id {
        return Err(WalletError::Validation(
            "cannot transfer to the same wallet".to_string(),
        ));
    }

    let _guards = engine.locks.acquire_pair(source_id, target_probe.id).await;

    let source = resolver::find_by_id(engine.wallets.as_ref(), source_id).await?;
    let target = resolver::find_by_id(engine.wallets.as_ref(), target_probe.id).await?;

    let source_owner = engine.owner_of(&source).await?;
    let target_owner = engine.owner_of(&target).await?;
    guard::require_active(
        &source,
        &source_owner,
        WalletRole::Source,
        TransactionKind::Transfer,
    )?;
    guard::require_active(
        &target,
        &target_owner,
        WalletRole::Target,
        TransactionKind::Transfer,
    )?;
    guard::require_distinct(&source, &target)?;
    guard::require_sufficient_balance(source.balance, request.amount)?;

    // Two independent attempt ids, one per leg; both Initiated records go
    // down before any balance moves.
    let out_leg = AuditLeg::new(&source, AuditOperation::TransferOut, request.amount);
    let in_leg = AuditLeg::new(&target, AuditOperation::TransferIn, request.amount);

    engine
        .audit
        .record_initiated(&out_leg, "transfer out initiated", ctx)
        .await?;
    if let Err(err) = engine
        .audit
        .record_initiated(&in_leg, "transfer in initiated", ctx)
        .await
    {
        // Keep the out leg's pair matched before giving up.
        let reason = format!("transfer failed: {}", err);
        if let Err(audit_err) = engine.audit.record_failed(&out_leg, &reason, ctx).await {
            error!(
                transaction_id = %out_leg.transaction_id,
                error = %audit_err,
                "failed-audit write failed as well"
            );
        }
        return Err(err);
    }

    match apply(engine, source, target, request).await {
        Ok((out_entry, target_after)) => {
            let source_after = out_entry.balance_after;
            record_completed_pair(engine, &out_leg, source_after, &in_leg, target_after, ctx).await;
            info!(
                transfer_out_id = %out_leg.transaction_id,
                transfer_in_id = %in_leg.transaction_id,
                "transfer completed"
            );
            Ok(TransactionResult::from_entry(&out_entry))
        }
        Err(err) => {
            error!(
                source_wallet_id = %out_leg.wallet_id,
                target_wallet_id = %in_leg.wallet_id,
                amount = %request.amount,
                error = %err,
                "transfer failed"
            );
            let reason = format!("transfer failed: {}", err);
            for leg in [&out_leg, &in_leg] {
                if let Err(audit_err) = engine.audit.record_failed(leg, &reason, ctx).await {
                    error!(
                        transaction_id = %leg.transaction_id,
                        error = %audit_err,
                        "failed-audit write failed as well"
                    );
                }
            }
            Err(err)
        }
    }
}

/// Debit source, credit target, append both history legs. Returns the
/// TransferOut entry used as the representative response plus the target's
/// resulting balance.
async fn apply(
    engine: &TransactionEngine,
    source: Wallet,
    target: Wallet,
    request: &TransactionRequest,
) -> Result<(HistoryEntry, Decimal), WalletError> {
    let source_before = source.balance;
    let target_before = target.balance;

    let source = engine.mutator.debit(source, request.amount).await?;
    let target = engine.mutator.credit(target, request.amount).await?;

    let out_entry = engine
        .recorder
        .append(NewHistoryEntry {
            kind: HistoryEntryKind::TransferOut,
            amount: request.amount,
            source_wallet_id: Some(source.id),
            target_wallet_id: Some(target.id),
            description: request.description.clone(),
            balance_before: source_before,
            balance_after: source.balance,
            status: HistoryStatus::Completed,
            correlation_id: request.correlation_id.clone(),
        })
        .await?;

    engine
        .recorder
        .append(NewHistoryEntry {
            kind: HistoryEntryKind::TransferIn,
            amount: request.amount,
            source_wallet_id: Some(source.id),
            target_wallet_id: Some(target.id),
            description: request.description.clone(),
            balance_before: target_before,
            balance_after: target.balance,
            status: HistoryStatus::Completed,
            correlation_id: request.correlation_id.clone(),
        })
        .await?;

    Ok((out_entry, target.balance))
}

async fn record_completed_pair(
    engine: &TransactionEngine,
    out_leg: &AuditLeg,
    source_after: Decimal,
    in_leg: &AuditLeg,
    target_after: Decimal,
    ctx: &RequestContext,
) {
    if let Err(audit_err) = engine
        .audit
        .record_completed(out_leg, source_after, "transfer out completed", ctx)
        .await
    {
        warn!(
            transaction_id = %out_leg.transaction_id,
            error = %audit_err,
            "completed-audit write failed after successful transfer"
        );
    }
    if let Err(audit_err) = engine
        .audit
        .record_completed(in_leg, target_after, "transfer in completed", ctx)
        .await
    {
        warn!(
            transaction_id = %in_leg.transaction_id,
            error = %audit_err,
            "completed-audit write failed after successful transfer"
        );
    }
}
