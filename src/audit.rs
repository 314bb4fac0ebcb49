//! Audit trail: durability-first lifecycle records per transaction leg.
//!
//! Every attempt writes one `Initiated` record before any mutation and one
//! terminal record (`Completed` or `Failed`) afterwards. Each write is
//! independently durable: audit records are not part of the balance
//! mutation's atomic unit, so a trail exists even when the business
//! operation is abandoned halfway.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::WalletError;
use crate::model::{OwnerId, Wallet, WalletId};
use crate::store::AuditStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditOperation {
    Credit,
    Debit,
    TransferOut,
    TransferIn,
    Refund,
}

impl AuditOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditOperation::Credit => "CREDIT",
            AuditOperation::Debit => "DEBIT",
            AuditOperation::TransferOut => "TRANSFER_OUT",
            AuditOperation::TransferIn => "TRANSFER_IN",
            AuditOperation::Refund => "REFUND",
        }
    }
}

impl fmt::Display for AuditOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lifecycle state of one audited attempt.
///
/// `RolledBack` exists in the model but the engine never produces it; no
/// compensating-transaction logic is defined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditStatus {
    Initiated,
    Completed,
    Failed,
    RolledBack,
}

impl AuditStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditStatus::Initiated => "INITIATED",
            AuditStatus::Completed => "COMPLETED",
            AuditStatus::Failed => "FAILED",
            AuditStatus::RolledBack => "ROLLED_BACK",
        }
    }

    #[inline]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, AuditStatus::Initiated)
    }
}

impl fmt::Display for AuditStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Technical context of the request, built once at the boundary and passed
/// explicitly into every engine call. Never read from ambient state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestContext {
    pub correlation_id: String,
    /// Who triggered the operation (a user handle or "SYSTEM").
    pub actor: String,
    pub origin_ip: Option<String>,
    pub user_agent: Option<String>,
    pub session_id: Option<String>,
    pub metadata: Option<serde_json::Value>,
}

impl RequestContext {
    pub fn new(actor: impl Into<String>, correlation_id: impl Into<String>) -> Self {
        Self {
            correlation_id: correlation_id.into(),
            actor: actor.into(),
            origin_ip: None,
            user_agent: None,
            session_id: None,
            metadata: None,
        }
    }

    /// Context for internally-triggered operations.
    pub fn system() -> Self {
        Self {
            correlation_id: generate_correlation_id(),
            actor: "SYSTEM".to_string(),
            origin_ip: Some("127.0.0.1".to_string()),
            user_agent: Some("SYSTEM_INTERNAL".to_string()),
            session_id: Some("SYSTEM".to_string()),
            metadata: None,
        }
    }

    pub fn with_correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.correlation_id = correlation_id.into();
        self
    }
}

fn generate_correlation_id() -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!("CORR-{}", id[..8].to_uppercase())
}

/// Audit record shape before the store assigns id and timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAuditRecord {
    /// Correlates the initiated/terminal pair of one attempt.
    pub transaction_id: Uuid,
    pub wallet_id: WalletId,
    pub owner_id: OwnerId,
    pub operation: AuditOperation,
    pub amount: Decimal,
    pub balance_before: Decimal,
    /// Equals `balance_before` for Initiated and Failed records.
    pub balance_after: Decimal,
    pub status: AuditStatus,
    pub actor: String,
    pub origin_ip: Option<String>,
    pub user_agent: Option<String>,
    pub session_id: Option<String>,
    pub correlation_id: String,
    pub description: String,
    pub metadata: Option<serde_json::Value>,
}

/// A persisted, immutable audit record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub id: Uuid,
    pub transaction_id: Uuid,
    pub wallet_id: WalletId,
    pub owner_id: OwnerId,
    pub operation: AuditOperation,
    pub amount: Decimal,
    pub balance_before: Decimal,
    pub balance_after: Decimal,
    pub status: AuditStatus,
    pub actor: String,
    pub origin_ip: Option<String>,
    pub user_agent: Option<String>,
    pub session_id: Option<String>,
    pub correlation_id: String,
    pub description: String,
    pub metadata: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

/// One audited leg of an attempt: the fixed facts shared by its Initiated
/// and terminal records.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditLeg {
    pub transaction_id: Uuid,
    pub wallet_id: WalletId,
    pub owner_id: OwnerId,
    pub operation: AuditOperation,
    pub amount: Decimal,
    pub balance_before: Decimal,
}

impl AuditLeg {
    /// New leg with a fresh attempt id. A transfer builds two independent
    /// legs, one per wallet.
    pub fn new(wallet: &Wallet, operation: AuditOperation, amount: Decimal) -> Self {
        Self {
            transaction_id: Uuid::new_v4(),
            wallet_id: wallet.id,
            owner_id: wallet.owner_id,
            operation,
            amount,
            balance_before: wallet.balance,
        }
    }

    fn record(
        &self,
        status: AuditStatus,
        balance_after: Decimal,
        description: String,
        ctx: &RequestContext,
    ) -> NewAuditRecord {
        NewAuditRecord {
            transaction_id: self.transaction_id,
            wallet_id: self.wallet_id,
            owner_id: self.owner_id,
            operation: self.operation,
            amount: self.amount,
            balance_before: self.balance_before,
            balance_after,
            status,
            actor: ctx.actor.clone(),
            origin_ip: ctx.origin_ip.clone(),
            user_agent: ctx.user_agent.clone(),
            session_id: ctx.session_id.clone(),
            correlation_id: ctx.correlation_id.clone(),
            description,
            metadata: ctx.metadata.clone(),
        }
    }
}

/// Writes the lifecycle records of every attempt.
#[derive(Clone)]
pub struct AuditTrail {
    store: Arc<dyn AuditStore>,
}

impl AuditTrail {
    pub fn new(store: Arc<dyn AuditStore>) -> Self {
        Self { store }
    }

    /// status=Initiated, balance_after=balance_before.
    pub async fn record_initiated(
        &self,
        leg: &AuditLeg,
        description: &str,
        ctx: &RequestContext,
    ) -> Result<(), WalletError> {
        debug!(
            transaction_id = %leg.transaction_id,
            operation = %leg.operation,
            "recording initiated audit"
        );
        let record = leg.record(
            AuditStatus::Initiated,
            leg.balance_before,
            description.to_string(),
            ctx,
        );
        let saved = self.append(record).await?;
        info!(
            audit_id = %saved.id,
            transaction_id = %leg.transaction_id,
            correlation_id = %ctx.correlation_id,
            "initiated audit recorded"
        );
        Ok(())
    }

    /// status=Completed with the real balance_after.
    pub async fn record_completed(
        &self,
        leg: &AuditLeg,
        balance_after: Decimal,
        description: &str,
        ctx: &RequestContext,
    ) -> Result<(), WalletError> {
        let record = leg.record(
            AuditStatus::Completed,
            balance_after,
            description.to_string(),
            ctx,
        );
        let saved = self.append(record).await?;
        info!(
            audit_id = %saved.id,
            transaction_id = %leg.transaction_id,
            correlation_id = %ctx.correlation_id,
            "completed audit recorded"
        );
        Ok(())
    }

    /// status=Failed, balance_after=balance_before, description carries the
    /// failure reason.
    pub async fn record_failed(
        &self,
        leg: &AuditLeg,
        reason: &str,
        ctx: &RequestContext,
    ) -> Result<(), WalletError> {
        let record = leg.record(
            AuditStatus::Failed,
            leg.balance_before,
            reason.to_string(),
            ctx,
        );
        let saved = self.append(record).await?;
        warn!(
            audit_id = %saved.id,
            transaction_id = %leg.transaction_id,
            reason = %reason,
            "failed audit recorded"
        );
        Ok(())
    }

    async fn append(&self, record: NewAuditRecord) -> Result<AuditRecord, WalletError> {
        self.store
            .append(record)
            .await
            .map_err(|e| WalletError::AuditWriteFailure(e.to_string()))
    }
}
