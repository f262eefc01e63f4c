//! The access decision engine.
//!
//! Every resource module asks [`AccessPolicy::decide`] the same question:
//! may this actor perform this operation on this resource? The answer is a
//! [`Decision`] value; "denied" is a normal return, never an error. Store
//! lookup failures are the only thing that propagates as `Err`, and callers
//! must surface those as infrastructure faults rather than treating them as
//! an allow or a deny.
//!
//! For list operations the policy does not filter in memory. It hands back a
//! [`ScopeFilter`] that the service translates into query predicates, so the
//! store only ever returns rows the actor may see.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::access::assignments::AssignmentResolver;
use crate::access::guardians::GuardianResolver;
use crate::access::identity::Identity;
use crate::access::status::ApprovalStatus;
use crate::access::store::{AccessStore, StoreError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    List,
    Read,
    Create,
    Update,
    Delete,
}

/// Resource families governed by the policy. Every module maps onto one of
/// these; moderated kinds additionally carry an [`ApprovalStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Homework,
    Activity,
    Attendance,
    Announcement,
    Alert,
    Message,
    CalendarEvent,
    Birthday,
}

impl ResourceKind {
    /// Kinds that pass through the approval queue before reaching their
    /// audience. Teacher- and parent-authored rows of these kinds enter
    /// `pending`; staff-authored rows are approved directly.
    pub fn is_moderated(self) -> bool {
        matches!(
            self,
            ResourceKind::Alert | ResourceKind::Announcement | ResourceKind::CalendarEvent
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, sqlx::Type)]
#[sqlx(type_name = "visibility_scope", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum VisibilityScope {
    SchoolWide,
    ClassSpecific,
    TeacherSpecific,
    Direct,
}

/// What the policy needs to know about a resource to rule on it.
///
/// For list decisions only `kind` matters; for single-resource and mutation
/// decisions the descriptor is built from the fetched row's ownership and
/// status fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceDescriptor {
    pub kind: ResourceKind,
    pub class_division_id: Option<Uuid>,
    pub owner_id: Option<Uuid>,
    pub approval_status: Option<ApprovalStatus>,
    pub visibility_scope: Option<VisibilityScope>,
    /// The resource reached a state that gates mutation regardless of role or
    /// ownership: a completed activity, a sent alert.
    pub locked: bool,
}

impl ResourceDescriptor {
    pub fn new(kind: ResourceKind) -> Self {
        Self {
            kind,
            class_division_id: None,
            owner_id: None,
            approval_status: None,
            visibility_scope: None,
            locked: false,
        }
    }

    pub fn in_division(mut self, division_id: impl Into<Option<Uuid>>) -> Self {
        self.class_division_id = division_id.into();
        self
    }

    pub fn owned_by(mut self, owner_id: Uuid) -> Self {
        self.owner_id = Some(owner_id);
        self
    }

    pub fn with_status(mut self, status: ApprovalStatus) -> Self {
        self.approval_status = Some(status);
        self
    }

    pub fn with_visibility(mut self, scope: VisibilityScope) -> Self {
        self.visibility_scope = Some(scope);
        self
    }

    pub fn locked(mut self) -> Self {
        self.locked = true;
        self
    }

    /// Approved as far as the audience is concerned. Unmoderated kinds carry
    /// no status and are always audience-visible.
    fn audience_visible(&self) -> bool {
        self.approval_status
            .map(|s| s.is_visible_to_audience())
            .unwrap_or(true)
    }
}

/// Row-visibility predicate for one actor, pushed down into list queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeFilter {
    /// Staff: every record of the kind.
    Unrestricted,
    Scoped(ListScope),
}

/// The scoped form: a row is visible when it is owned by the actor, or sits in
/// one of the actor's divisions and is audience-visible, or is an approved
/// school-wide record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListScope {
    pub class_division_ids: HashSet<Uuid>,
    pub owner_id: Option<Uuid>,
    pub include_school_wide: bool,
}

impl ScopeFilter {
    /// Whether a concrete resource falls inside this scope. This is the same
    /// predicate the services express in SQL; read-single decisions apply it
    /// to the fetched row.
    pub fn permits(&self, resource: &ResourceDescriptor) -> bool {
        let scope = match self {
            ScopeFilter::Unrestricted => return true,
            ScopeFilter::Scoped(scope) => scope,
        };

        // Ownership dominates: a creator keeps access even after their class
        // assignment is revoked, and sees their own pending rows.
        if scope.owner_id.is_some() && resource.owner_id == scope.owner_id {
            return true;
        }

        if !resource.audience_visible() {
            return false;
        }

        if let Some(division_id) = resource.class_division_id {
            if scope.class_division_ids.contains(&division_id) {
                return true;
            }
        }

        scope.include_school_wide
            && resource.visibility_scope == Some(VisibilityScope::SchoolWide)
    }
}

/// Why a decision came back denied. Controllers map `State` to a 409 and the
/// rest to a 403 (or a masked 404 on guardianship probes).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    Role,
    Scope,
    Ownership,
    State,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub allowed: bool,
    pub scope: Option<ScopeFilter>,
    pub deny_reason: Option<DenyReason>,
}

impl Decision {
    pub fn allow() -> Self {
        Self {
            allowed: true,
            scope: None,
            deny_reason: None,
        }
    }

    pub fn allow_scoped(scope: ScopeFilter) -> Self {
        Self {
            allowed: true,
            scope: Some(scope),
            deny_reason: None,
        }
    }

    pub fn deny(reason: DenyReason) -> Self {
        Self {
            allowed: false,
            scope: None,
            deny_reason: Some(reason),
        }
    }

    pub fn is_state_conflict(&self) -> bool {
        self.deny_reason == Some(DenyReason::State)
    }
}

/// The decision engine. Stateless per request: scopes are recomputed from
/// current records on every call, so there is nothing to invalidate.
pub struct AccessPolicy<'a, S> {
    store: &'a S,
}

impl<'a, S: AccessStore> AccessPolicy<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Rule on one (actor, resource, operation) triple.
    ///
    /// Decision table, by role:
    ///
    /// | role       | list                | read        | create           | update/delete          |
    /// |------------|---------------------|-------------|------------------|------------------------|
    /// | staff      | unrestricted        | always      | always           | always (state-gated)   |
    /// | teacher    | divisions ∪ own ∪ SW| in scope    | assigned division| owner only             |
    /// | parent     | children ∪ own ∪ SW | in scope    | child's division | owner, mutable state   |
    ///
    /// SW = approved school-wide records. Pending rows never reach anyone but
    /// their creator and staff.
    pub async fn decide(
        &self,
        identity: &Identity,
        resource: &ResourceDescriptor,
        operation: Operation,
    ) -> Result<Decision, StoreError> {
        match operation {
            Operation::List => {
                let scope = self.list_scope(identity, resource.kind).await?;
                Ok(Decision::allow_scoped(scope))
            }
            Operation::Read => self.decide_read(identity, resource).await,
            Operation::Create => self.decide_create(identity, resource).await,
            Operation::Update | Operation::Delete => {
                self.decide_mutation(identity, resource, operation).await
            }
        }
    }

    /// The scope filter for listing records of `kind` as `identity`.
    pub async fn list_scope(
        &self,
        identity: &Identity,
        _kind: ResourceKind,
    ) -> Result<ScopeFilter, StoreError> {
        if identity.is_staff() {
            return Ok(ScopeFilter::Unrestricted);
        }

        let class_division_ids = if identity.is_teacher() {
            AssignmentResolver::new(self.store)
                .division_scope_for_teacher(identity.user_id)
                .await?
        } else {
            GuardianResolver::new(self.store)
                .division_scope_for_parent(identity.user_id)
                .await?
        };

        Ok(ScopeFilter::Scoped(ListScope {
            class_division_ids,
            owner_id: Some(identity.user_id),
            include_school_wide: true,
        }))
    }

    async fn decide_read(
        &self,
        identity: &Identity,
        resource: &ResourceDescriptor,
    ) -> Result<Decision, StoreError> {
        if identity.is_staff() {
            return Ok(Decision::allow());
        }

        let scope = self.list_scope(identity, resource.kind).await?;
        if scope.permits(resource) {
            Ok(Decision::allow())
        } else {
            Ok(Decision::deny(DenyReason::Scope))
        }
    }

    async fn decide_create(
        &self,
        identity: &Identity,
        resource: &ResourceDescriptor,
    ) -> Result<Decision, StoreError> {
        if identity.is_staff() {
            return Ok(Decision::allow());
        }

        if identity.is_teacher() {
            return match resource.class_division_id {
                // No division: a teacher-specific resource, always permitted.
                None => Ok(Decision::allow()),
                Some(division_id) => {
                    let scope = AssignmentResolver::new(self.store)
                        .division_scope_for_teacher(identity.user_id)
                        .await?;
                    if scope.contains(&division_id) {
                        Ok(Decision::allow())
                    } else {
                        Ok(Decision::deny(DenyReason::Scope))
                    }
                }
            };
        }

        // Parents create only into their children's current divisions.
        match resource.class_division_id {
            None => Ok(Decision::deny(DenyReason::Scope)),
            Some(division_id) => {
                let scope = GuardianResolver::new(self.store)
                    .division_scope_for_parent(identity.user_id)
                    .await?;
                if scope.contains(&division_id) {
                    Ok(Decision::allow())
                } else {
                    Ok(Decision::deny(DenyReason::Scope))
                }
            }
        }
    }

    async fn decide_mutation(
        &self,
        identity: &Identity,
        resource: &ResourceDescriptor,
        operation: Operation,
    ) -> Result<Decision, StoreError> {
        // State gates mutation independent of role and ownership.
        if resource.locked {
            return Ok(Decision::deny(DenyReason::State));
        }
        if operation == Operation::Delete
            && resource.kind == ResourceKind::Alert
            && resource.approval_status != Some(ApprovalStatus::Approved)
        {
            // Alerts may only be deleted from `approved`, pre-send.
            return Ok(Decision::deny(DenyReason::State));
        }

        if identity.is_staff() {
            return Ok(Decision::allow());
        }

        if resource.owner_id != Some(identity.user_id) {
            return Ok(Decision::deny(DenyReason::Ownership));
        }

        // A parent's submission leaves their hands once approved. Alerts are
        // exempt on delete: their lifecycle rule above already pins deletion
        // to the approved, pre-send window.
        let state_gated = operation == Operation::Update
            || (operation == Operation::Delete && resource.kind != ResourceKind::Alert);
        if identity.is_parent()
            && state_gated
            && !resource
                .approval_status
                .map(|s| s.is_owner_mutable())
                .unwrap_or(true)
        {
            return Ok(Decision::deny(DenyReason::State));
        }

        Ok(Decision::allow())
    }

    /// Guardianship check for consent-style sub-resources, which bypass
    /// resource ownership entirely: the question is "is this actor a guardian
    /// of this student", not "does this actor own this row".
    pub async fn authorize_consent(
        &self,
        identity: &Identity,
        student_id: Uuid,
    ) -> Result<Decision, StoreError> {
        if identity.is_staff() {
            return Ok(Decision::allow());
        }
        if !identity.is_parent() {
            return Ok(Decision::deny(DenyReason::Role));
        }

        let is_guardian = GuardianResolver::new(self.store)
            .is_guardian_of(identity.user_id, student_id)
            .await?;
        if is_guardian {
            Ok(Decision::allow())
        } else {
            Ok(Decision::deny(DenyReason::Scope))
        }
    }

}

/// Status a freshly created resource of `kind` enters, by creator role:
/// staff-authored content is approved directly, everything else joins the
/// moderation queue. `None` for unmoderated kinds.
pub fn initial_status(identity: &Identity, kind: ResourceKind) -> Option<ApprovalStatus> {
    if !kind.is_moderated() {
        return None;
    }
    if identity.is_staff() {
        Some(ApprovalStatus::Approved)
    } else {
        Some(ApprovalStatus::Pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scoped(divisions: &[Uuid], owner: Uuid) -> ScopeFilter {
        ScopeFilter::Scoped(ListScope {
            class_division_ids: divisions.iter().copied().collect(),
            owner_id: Some(owner),
            include_school_wide: true,
        })
    }

    #[test]
    fn ownership_dominates_revoked_assignment() {
        let owner = Uuid::new_v4();
        let scope = scoped(&[], owner);

        let resource = ResourceDescriptor::new(ResourceKind::Homework)
            .in_division(Uuid::new_v4())
            .owned_by(owner);

        assert!(scope.permits(&resource));
    }

    #[test]
    fn pending_rows_hidden_from_non_owners() {
        let division = Uuid::new_v4();
        let scope = scoped(&[division], Uuid::new_v4());

        let pending = ResourceDescriptor::new(ResourceKind::Alert)
            .in_division(division)
            .owned_by(Uuid::new_v4())
            .with_status(ApprovalStatus::Pending);
        assert!(!scope.permits(&pending));

        let approved = pending.clone().with_status(ApprovalStatus::Approved);
        assert!(scope.permits(&approved));
    }

    #[test]
    fn school_wide_requires_approval() {
        let scope = scoped(&[], Uuid::new_v4());

        let resource = ResourceDescriptor::new(ResourceKind::Announcement)
            .with_visibility(VisibilityScope::SchoolWide)
            .owned_by(Uuid::new_v4())
            .with_status(ApprovalStatus::Pending);
        assert!(!scope.permits(&resource));

        let approved = resource.clone().with_status(ApprovalStatus::Approved);
        assert!(scope.permits(&approved));
    }

    #[test]
    fn unmoderated_rows_in_scope_are_visible() {
        let division = Uuid::new_v4();
        let scope = scoped(&[division], Uuid::new_v4());

        let homework = ResourceDescriptor::new(ResourceKind::Homework)
            .in_division(division)
            .owned_by(Uuid::new_v4());
        assert!(scope.permits(&homework));
    }
}
