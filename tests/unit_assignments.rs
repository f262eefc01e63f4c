mod common;

use common::MemoryStore;
use uuid::Uuid;

use schoolgate::access::assignments::{AssignmentResolver, AssignmentType};

#[tokio::test]
async fn merges_modern_and_legacy_sources() {
    let teacher = Uuid::new_v4();
    let c1 = Uuid::new_v4();
    let c2 = Uuid::new_v4();

    let store = MemoryStore::new()
        .with_assignment(teacher, c1, AssignmentType::SubjectTeacher, Some("English"), false)
        .with_legacy_class_teacher(teacher, c2);

    let resolved = AssignmentResolver::new(&store)
        .resolve_for_teacher(teacher)
        .await
        .unwrap();

    assert_eq!(resolved.len(), 2);

    let modern = resolved.iter().find(|a| a.class_division_id == c1).unwrap();
    assert_eq!(modern.assignment_type, AssignmentType::SubjectTeacher);
    assert_eq!(modern.subject.as_deref(), Some("English"));

    let legacy = resolved.iter().find(|a| a.class_division_id == c2).unwrap();
    assert_eq!(legacy.assignment_type, AssignmentType::ClassTeacher);
    assert!(legacy.is_primary);
    assert!(legacy.subject.is_none());
}

#[tokio::test]
async fn division_in_both_sources_is_not_double_counted() {
    let teacher = Uuid::new_v4();
    let division = Uuid::new_v4();

    // Same division reachable via the m2m table and the legacy field; the m2m
    // record wins and the legacy link contributes nothing extra.
    let store = MemoryStore::new()
        .with_assignment(teacher, division, AssignmentType::ClassTeacher, None, true)
        .with_legacy_class_teacher(teacher, division);

    let resolved = AssignmentResolver::new(&store)
        .resolve_for_teacher(teacher)
        .await
        .unwrap();

    assert_eq!(resolved.len(), 1);
    assert_eq!(resolved[0].class_division_id, division);
    assert_eq!(resolved[0].assignment_type, AssignmentType::ClassTeacher);
}

#[tokio::test]
async fn retains_multiple_roles_for_same_division() {
    let teacher = Uuid::new_v4();
    let division = Uuid::new_v4();

    // Class teacher plus two subject assignments for the same division: all
    // three are distinct records, keyed by (division, type, subject).
    let store = MemoryStore::new()
        .with_assignment(teacher, division, AssignmentType::ClassTeacher, None, true)
        .with_assignment(teacher, division, AssignmentType::SubjectTeacher, Some("Maths"), false)
        .with_assignment(teacher, division, AssignmentType::SubjectTeacher, Some("Science"), false);

    let resolved = AssignmentResolver::new(&store)
        .resolve_for_teacher(teacher)
        .await
        .unwrap();

    assert_eq!(resolved.len(), 3);

    let scope = AssignmentResolver::new(&store)
        .division_scope_for_teacher(teacher)
        .await
        .unwrap();
    assert_eq!(scope.len(), 1);
    assert!(scope.contains(&division));
}

#[tokio::test]
async fn inactive_assignments_grant_nothing() {
    let teacher = Uuid::new_v4();
    let division = Uuid::new_v4();

    let store = MemoryStore::new().with_inactive_assignment(
        teacher,
        division,
        AssignmentType::ClassTeacher,
        None,
    );

    let resolved = AssignmentResolver::new(&store)
        .resolve_for_teacher(teacher)
        .await
        .unwrap();

    assert!(resolved.is_empty());
}

#[tokio::test]
async fn no_assignments_is_empty_not_error() {
    let store = MemoryStore::new();

    let resolved = AssignmentResolver::new(&store)
        .resolve_for_teacher(Uuid::new_v4())
        .await
        .unwrap();

    assert!(resolved.is_empty());
}

#[tokio::test]
async fn resolution_is_idempotent() {
    let teacher = Uuid::new_v4();
    let c1 = Uuid::new_v4();
    let c2 = Uuid::new_v4();

    let store = MemoryStore::new()
        .with_assignment(teacher, c1, AssignmentType::SubjectTeacher, Some("English"), false)
        .with_legacy_class_teacher(teacher, c2);

    let resolver = AssignmentResolver::new(&store);
    let first = resolver.resolve_for_teacher(teacher).await.unwrap();
    let second = resolver.resolve_for_teacher(teacher).await.unwrap();

    assert_eq!(first, second);
}
