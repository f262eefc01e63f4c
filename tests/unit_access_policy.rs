mod common;

use common::MemoryStore;
use uuid::Uuid;

use schoolgate::access::assignments::AssignmentType;
use schoolgate::access::identity::{Identity, Role};
use schoolgate::access::policy::{
    AccessPolicy, DenyReason, Operation, ResourceDescriptor, ResourceKind, ScopeFilter,
    VisibilityScope, initial_status,
};
use schoolgate::access::status::ApprovalStatus;

fn teacher(id: Uuid) -> Identity {
    Identity::new(id, Role::Teacher)
}

fn parent(id: Uuid) -> Identity {
    Identity::new(id, Role::Parent)
}

fn principal() -> Identity {
    Identity::new(Uuid::new_v4(), Role::Principal)
}

#[tokio::test]
async fn staff_list_scope_is_unrestricted() {
    let store = MemoryStore::new();
    let policy = AccessPolicy::new(&store);

    let scope = policy
        .list_scope(&principal(), ResourceKind::Homework)
        .await
        .unwrap();

    assert_eq!(scope, ScopeFilter::Unrestricted);
}

#[tokio::test]
async fn subject_teacher_can_create_in_assigned_class_only() {
    // Scenario: X holds only a subject assignment for C1, nothing for C2.
    let x = Uuid::new_v4();
    let c1 = Uuid::new_v4();
    let c2 = Uuid::new_v4();

    let store = MemoryStore::new().with_assignment(
        x,
        c1,
        AssignmentType::SubjectTeacher,
        Some("English"),
        false,
    );
    let policy = AccessPolicy::new(&store);

    let in_c1 = ResourceDescriptor::new(ResourceKind::Homework).in_division(c1);
    let decision = policy
        .decide(&teacher(x), &in_c1, Operation::Create)
        .await
        .unwrap();
    assert!(decision.allowed);

    let in_c2 = ResourceDescriptor::new(ResourceKind::Homework).in_division(c2);
    let decision = policy
        .decide(&teacher(x), &in_c2, Operation::Create)
        .await
        .unwrap();
    assert!(!decision.allowed);
    assert_eq!(decision.deny_reason, Some(DenyReason::Scope));
}

#[tokio::test]
async fn legacy_class_teacher_link_grants_scope() {
    // Scenario: C2 has only the legacy teacher_id field set for Y.
    let y = Uuid::new_v4();
    let c2 = Uuid::new_v4();

    let store = MemoryStore::new().with_legacy_class_teacher(y, c2);
    let policy = AccessPolicy::new(&store);

    let resource = ResourceDescriptor::new(ResourceKind::Homework)
        .in_division(c2)
        .owned_by(Uuid::new_v4());
    let decision = policy
        .decide(&teacher(y), &resource, Operation::Read)
        .await
        .unwrap();

    assert!(decision.allowed);
}

#[tokio::test]
async fn teacher_with_no_division_creates_teacher_specific_resource() {
    let store = MemoryStore::new();
    let policy = AccessPolicy::new(&store);

    // No division on the descriptor: teacher-specific, always permitted.
    let descriptor = ResourceDescriptor::new(ResourceKind::Alert);
    let decision = policy
        .decide(&teacher(Uuid::new_v4()), &descriptor, Operation::Create)
        .await
        .unwrap();

    assert!(decision.allowed);
}

#[tokio::test]
async fn parent_creates_only_into_childrens_divisions() {
    let p = Uuid::new_v4();
    let child = Uuid::new_v4();
    let child_division = Uuid::new_v4();
    let other_division = Uuid::new_v4();

    let store = MemoryStore::new()
        .with_guardian(p, child, "mother", true)
        .with_enrollment(child, child_division, "ongoing");
    let policy = AccessPolicy::new(&store);

    let in_childs = ResourceDescriptor::new(ResourceKind::Message).in_division(child_division);
    assert!(
        policy
            .decide(&parent(p), &in_childs, Operation::Create)
            .await
            .unwrap()
            .allowed
    );

    let elsewhere = ResourceDescriptor::new(ResourceKind::Message).in_division(other_division);
    let decision = policy
        .decide(&parent(p), &elsewhere, Operation::Create)
        .await
        .unwrap();
    assert!(!decision.allowed);

    let nowhere = ResourceDescriptor::new(ResourceKind::Message);
    let decision = policy
        .decide(&parent(p), &nowhere, Operation::Create)
        .await
        .unwrap();
    assert!(!decision.allowed);
}

#[tokio::test]
async fn pending_school_wide_alert_visibility_follows_approval() {
    // Scenario: a teacher authors a school-wide alert; the author sees it
    // while pending, a second teacher only after approval.
    let author = Uuid::new_v4();
    let other = Uuid::new_v4();

    let store = MemoryStore::new();
    let policy = AccessPolicy::new(&store);

    let pending = ResourceDescriptor::new(ResourceKind::Alert)
        .owned_by(author)
        .with_visibility(VisibilityScope::SchoolWide)
        .with_status(ApprovalStatus::Pending);

    let author_scope = policy
        .list_scope(&teacher(author), ResourceKind::Alert)
        .await
        .unwrap();
    assert!(author_scope.permits(&pending));

    let other_scope = policy
        .list_scope(&teacher(other), ResourceKind::Alert)
        .await
        .unwrap();
    assert!(!other_scope.permits(&pending));

    let approved = pending.clone().with_status(ApprovalStatus::Approved);
    assert!(other_scope.permits(&approved));

    // Staff see the moderation queue regardless.
    assert!(
        policy
            .decide(&principal(), &pending, Operation::Read)
            .await
            .unwrap()
            .allowed
    );
}

#[tokio::test]
async fn owner_keeps_access_after_assignment_revoked() {
    let x = Uuid::new_v4();
    let division = Uuid::new_v4();

    // No assignments at all: the teacher was unassigned after authoring.
    let store = MemoryStore::new();
    let policy = AccessPolicy::new(&store);

    let own = ResourceDescriptor::new(ResourceKind::Homework)
        .in_division(division)
        .owned_by(x);

    assert!(
        policy
            .decide(&teacher(x), &own, Operation::Read)
            .await
            .unwrap()
            .allowed
    );
    assert!(
        policy
            .decide(&teacher(x), &own, Operation::Update)
            .await
            .unwrap()
            .allowed
    );
}

#[tokio::test]
async fn non_owner_teacher_cannot_mutate() {
    let x = Uuid::new_v4();
    let division = Uuid::new_v4();

    let store = MemoryStore::new().with_assignment(
        x,
        division,
        AssignmentType::ClassTeacher,
        None,
        true,
    );
    let policy = AccessPolicy::new(&store);

    // In scope for reading, but owned by someone else.
    let resource = ResourceDescriptor::new(ResourceKind::Homework)
        .in_division(division)
        .owned_by(Uuid::new_v4());

    assert!(
        policy
            .decide(&teacher(x), &resource, Operation::Read)
            .await
            .unwrap()
            .allowed
    );

    let decision = policy
        .decide(&teacher(x), &resource, Operation::Delete)
        .await
        .unwrap();
    assert!(!decision.allowed);
    assert_eq!(decision.deny_reason, Some(DenyReason::Ownership));
}

#[tokio::test]
async fn locked_resource_blocks_mutation_even_for_staff() {
    let store = MemoryStore::new();
    let policy = AccessPolicy::new(&store);

    let completed = ResourceDescriptor::new(ResourceKind::Activity)
        .in_division(Uuid::new_v4())
        .owned_by(Uuid::new_v4())
        .locked();

    let decision = policy
        .decide(&principal(), &completed, Operation::Delete)
        .await
        .unwrap();
    assert!(!decision.allowed);
    assert_eq!(decision.deny_reason, Some(DenyReason::State));
    assert!(decision.is_state_conflict());
}

#[tokio::test]
async fn alert_delete_only_from_approved() {
    let owner = Uuid::new_v4();
    let store = MemoryStore::new();
    let policy = AccessPolicy::new(&store);

    let base = ResourceDescriptor::new(ResourceKind::Alert).owned_by(owner);

    // Pending: even the owner may not delete yet.
    let pending = base.clone().with_status(ApprovalStatus::Pending);
    let decision = policy
        .decide(&teacher(owner), &pending, Operation::Delete)
        .await
        .unwrap();
    assert!(decision.is_state_conflict());

    // Approved, pre-send: deletable.
    let approved = base.clone().with_status(ApprovalStatus::Approved);
    assert!(
        policy
            .decide(&teacher(owner), &approved, Operation::Delete)
            .await
            .unwrap()
            .allowed
    );

    // Sent: locked for good.
    let sent = base.with_status(ApprovalStatus::Sent).locked();
    let decision = policy
        .decide(&principal(), &sent, Operation::Delete)
        .await
        .unwrap();
    assert!(decision.is_state_conflict());
}

#[tokio::test]
async fn parent_update_blocked_once_approved() {
    let p = Uuid::new_v4();
    let store = MemoryStore::new();
    let policy = AccessPolicy::new(&store);

    let own_pending = ResourceDescriptor::new(ResourceKind::Announcement)
        .owned_by(p)
        .with_status(ApprovalStatus::Pending);
    assert!(
        policy
            .decide(&parent(p), &own_pending, Operation::Update)
            .await
            .unwrap()
            .allowed
    );

    let own_approved = ResourceDescriptor::new(ResourceKind::Announcement)
        .owned_by(p)
        .with_status(ApprovalStatus::Approved);
    let decision = policy
        .decide(&parent(p), &own_approved, Operation::Update)
        .await
        .unwrap();
    assert!(decision.is_state_conflict());
}

#[tokio::test]
async fn parent_delete_blocked_once_approved() {
    let p = Uuid::new_v4();
    let store = MemoryStore::new();
    let policy = AccessPolicy::new(&store);

    // Still in the moderation queue: the owner may withdraw it.
    let own_pending = ResourceDescriptor::new(ResourceKind::CalendarEvent)
        .owned_by(p)
        .with_status(ApprovalStatus::Pending);
    assert!(
        policy
            .decide(&parent(p), &own_pending, Operation::Delete)
            .await
            .unwrap()
            .allowed
    );

    // Approved: gone from the owner's hands, update and delete alike.
    let own_approved = ResourceDescriptor::new(ResourceKind::CalendarEvent)
        .owned_by(p)
        .with_status(ApprovalStatus::Approved);
    let decision = policy
        .decide(&parent(p), &own_approved, Operation::Delete)
        .await
        .unwrap();
    assert!(decision.is_state_conflict());
}

#[tokio::test]
async fn consent_authorized_by_guardianship_not_ownership() {
    let p = Uuid::new_v4();
    let child = Uuid::new_v4();
    let other_student = Uuid::new_v4();

    let store = MemoryStore::new().with_guardian(p, child, "father", false);
    let policy = AccessPolicy::new(&store);

    assert!(
        policy
            .authorize_consent(&parent(p), child)
            .await
            .unwrap()
            .allowed
    );

    // Probing another family's student id: denied, no distinction from a
    // nonexistent id.
    let decision = policy
        .authorize_consent(&parent(p), other_student)
        .await
        .unwrap();
    assert!(!decision.allowed);

    // Teachers have no consent path at all.
    let decision = policy
        .authorize_consent(&teacher(Uuid::new_v4()), child)
        .await
        .unwrap();
    assert!(!decision.allowed);
    assert_eq!(decision.deny_reason, Some(DenyReason::Role));

    // Staff may record consent on a family's behalf.
    assert!(
        policy
            .authorize_consent(&principal(), child)
            .await
            .unwrap()
            .allowed
    );
}

#[tokio::test]
async fn parent_list_scope_hides_unapproved_class_rows() {
    let p = Uuid::new_v4();
    let child = Uuid::new_v4();
    let division = Uuid::new_v4();

    let store = MemoryStore::new()
        .with_guardian(p, child, "mother", true)
        .with_enrollment(child, division, "ongoing");
    let policy = AccessPolicy::new(&store);

    let scope = policy
        .list_scope(&parent(p), ResourceKind::Alert)
        .await
        .unwrap();

    let pending = ResourceDescriptor::new(ResourceKind::Alert)
        .in_division(division)
        .owned_by(Uuid::new_v4())
        .with_status(ApprovalStatus::Pending);
    assert!(!scope.permits(&pending));

    let approved = pending.clone().with_status(ApprovalStatus::Approved);
    assert!(scope.permits(&approved));
}

#[test]
fn initial_status_by_role_and_kind() {
    let staff = Identity::new(Uuid::new_v4(), Role::Admin);
    let author = Identity::new(Uuid::new_v4(), Role::Teacher);

    assert_eq!(
        initial_status(&staff, ResourceKind::Alert),
        Some(ApprovalStatus::Approved)
    );
    assert_eq!(
        initial_status(&author, ResourceKind::Alert),
        Some(ApprovalStatus::Pending)
    );
    assert_eq!(
        initial_status(&Identity::new(Uuid::new_v4(), Role::Parent), ResourceKind::Announcement),
        Some(ApprovalStatus::Pending)
    );

    // Unmoderated kinds carry no status.
    assert_eq!(initial_status(&author, ResourceKind::Homework), None);
}
