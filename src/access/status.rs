//! Approval lifecycle for moderated resources.
//!
//! `draft -> pending -> {approved, rejected}`, plus `approved -> sent` for
//! alerts. Creation by staff short-circuits straight to `approved`; every
//! other creation enters `pending`. No transition may skip `pending` apart
//! from that staff path, and `sent` is terminal.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, sqlx::Type)]
#[sqlx(type_name = "approval_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    Draft,
    Pending,
    Approved,
    Rejected,
    Sent,
}

impl ApprovalStatus {
    /// Whether moving from `self` to `to` is a legal lifecycle step.
    pub fn can_transition_to(self, to: ApprovalStatus) -> bool {
        use ApprovalStatus::*;
        matches!(
            (self, to),
            (Draft, Pending) | (Pending, Approved) | (Pending, Rejected) | (Approved, Sent)
        )
    }

    /// Visible to the resource's intended audience (not just creator/staff).
    pub fn is_visible_to_audience(self) -> bool {
        matches!(self, ApprovalStatus::Approved | ApprovalStatus::Sent)
    }

    /// Whether the owner may still edit the resource. Once a moderated
    /// resource is approved (or sent) it leaves the owner's hands.
    pub fn is_owner_mutable(self) -> bool {
        matches!(
            self,
            ApprovalStatus::Draft | ApprovalStatus::Pending | ApprovalStatus::Rejected
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ApprovalStatus::Draft => "draft",
            ApprovalStatus::Pending => "pending",
            ApprovalStatus::Approved => "approved",
            ApprovalStatus::Rejected => "rejected",
            ApprovalStatus::Sent => "sent",
        }
    }
}
