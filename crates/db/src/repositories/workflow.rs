//! Approval workflow actions on transactions.

use chrono::Utc;
use holdco_core::access::{Action, Principal, authorize};
use holdco_core::audit::{ActivityAction, ActivityEntry, EntityKind};
use holdco_core::transaction::PaymentStatus;
use holdco_core::workflow::{ApprovalStatus, WorkflowAction, WorkflowError, WorkflowService};
use sea_orm::{ActiveModelTrait, Set, TransactionTrait};
use serde_json::json;
use uuid::Uuid;

use super::activity_log::record;
use super::error::RepositoryError;
use super::transaction::{TransactionRepository, apply_action, find, resource_of};
use crate::entities::sea_orm_active_enums::PaymentState;
use crate::entities::transactions;

impl TransactionRepository {
    /// Submits a DRAFT or REJECTED transaction for approval.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, `Access` or `Workflow`.
    pub async fn submit(
        &self,
        principal: &Principal,
        id: Uuid,
    ) -> Result<transactions::Model, RepositoryError> {
        self.transition(
            principal,
            id,
            Action::Submit,
            ActivityAction::Submit,
            WorkflowService::submit,
        )
        .await
    }

    /// Approves a PENDING transaction. CEO/Admin only.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, `Access` or `Workflow`.
    pub async fn approve(
        &self,
        principal: &Principal,
        id: Uuid,
    ) -> Result<transactions::Model, RepositoryError> {
        let approver = principal.user_id;
        self.transition(principal, id, Action::Approve, ActivityAction::Approve, |status| {
            WorkflowService::approve(status, approver)
        })
        .await
    }

    /// Rejects a PENDING transaction with a non-empty reason. CEO/Admin only.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, `Access` or `Workflow`.
    pub async fn reject(
        &self,
        principal: &Principal,
        id: Uuid,
        reason: &str,
    ) -> Result<transactions::Model, RepositoryError> {
        let approver = principal.user_id;
        self.transition(principal, id, Action::Reject, ActivityAction::Reject, |status| {
            WorkflowService::reject(status, approver, reason)
        })
        .await
    }

    /// Cancels a transaction that is neither APPROVED nor already CANCELLED.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, `Access` or `Workflow`.
    pub async fn cancel(
        &self,
        principal: &Principal,
        id: Uuid,
    ) -> Result<transactions::Model, RepositoryError> {
        let actor = principal.user_id;
        self.transition(principal, id, Action::Cancel, ActivityAction::Cancel, |status| {
            WorkflowService::cancel(status, actor)
        })
        .await
    }

    /// Marks a transaction PAID or UNPAID. Refused once CANCELLED.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, `Access` or `Workflow`.
    pub async fn update_payment_status(
        &self,
        principal: &Principal,
        id: Uuid,
        payment_status: PaymentStatus,
    ) -> Result<transactions::Model, RepositoryError> {
        let txn = self.db.begin().await?;
        let existing = find(&txn, id).await?;
        authorize(principal, &resource_of(&existing), Action::UpdatePaymentStatus)?;
        WorkflowService::ensure_payment_updatable(existing.approval_status.into())?;

        let before = PaymentStatus::from(existing.payment_status);
        let code = existing.code.clone();
        let mut active: transactions::ActiveModel = existing.into();
        active.payment_status = Set(PaymentState::from(payment_status));
        active.updated_at = Set(Utc::now().into());
        let updated = active.update(&txn).await?;

        record(
            &txn,
            ActivityEntry::new(
                principal.user_id,
                ActivityAction::Update,
                EntityKind::Transaction,
                id,
                &code,
            )
            .with_changes(
                json!({ "paymentStatus": before }),
                json!({ "paymentStatus": payment_status }),
            ),
        )
        .await?;
        txn.commit().await?;

        tracing::info!(
            transaction_id = %id,
            from = %before,
            to = %payment_status,
            "payment status updated"
        );
        Ok(updated)
    }

    async fn transition(
        &self,
        principal: &Principal,
        id: Uuid,
        action: Action,
        logged_as: ActivityAction,
        decide: impl FnOnce(ApprovalStatus) -> Result<WorkflowAction, WorkflowError>,
    ) -> Result<transactions::Model, RepositoryError> {
        let txn = self.db.begin().await?;
        let existing = find(&txn, id).await?;
        if let Err(denied) = authorize(principal, &resource_of(&existing), action) {
            tracing::warn!(
                transaction_id = %id,
                user_id = %principal.user_id,
                role = %principal.role,
                %action,
                "workflow action denied"
            );
            return Err(denied.into());
        }

        let from = ApprovalStatus::from(existing.approval_status);
        let workflow_action = decide(from)?;
        let to = workflow_action.new_status();

        let mut details = json!({ "from": from, "to": to });
        if let WorkflowAction::Reject {
            rejection_reason, ..
        } = &workflow_action
        {
            details["reason"] = json!(rejection_reason);
        }
        let entry = ActivityEntry::new(
            principal.user_id,
            logged_as,
            EntityKind::Transaction,
            id,
            &existing.code,
        )
        .with_details(details);

        let mut active: transactions::ActiveModel = existing.into();
        apply_action(&mut active, &workflow_action);
        let updated = active.update(&txn).await?;

        record(&txn, entry).await?;
        txn.commit().await?;

        tracing::info!(transaction_id = %id, %from, %to, "transaction status changed");
        Ok(updated)
    }
}
