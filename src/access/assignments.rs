//! Teacher/class assignment resolution.
//!
//! The school runs two sources of truth in parallel: the legacy model stores a
//! single `class_teacher_id` directly on each class division, while the
//! current model is a many-to-many `teacher_assignments` table carrying
//! assignment type and subject. [`AssignmentResolver`] merges both into one
//! normalized set so the merge rule exists in exactly one place.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::access::store::{AccessStore, StoreError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, sqlx::Type)]
#[sqlx(type_name = "assignment_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AssignmentType {
    ClassTeacher,
    SubjectTeacher,
}

/// One normalized teacher-to-division link.
///
/// Unique by (class_division_id, assignment_type, subject): a teacher may hold
/// a class-teacher row and several subject rows for the same division, and all
/// of them are retained.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow, ToSchema)]
pub struct ClassAssignment {
    pub class_division_id: Uuid,
    pub assignment_type: AssignmentType,
    pub subject: Option<String>,
    pub is_primary: bool,
}

impl ClassAssignment {
    /// The record synthesized for a legacy-only `class_teacher_id` link.
    fn legacy(class_division_id: Uuid) -> Self {
        Self {
            class_division_id,
            assignment_type: AssignmentType::ClassTeacher,
            subject: None,
            is_primary: true,
        }
    }
}

/// Resolves the full set of divisions a teacher is currently assigned to.
pub struct AssignmentResolver<'a, S> {
    store: &'a S,
}

impl<'a, S: AccessStore> AssignmentResolver<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Merge active many-to-many rows with legacy single-teacher links.
    ///
    /// Divisions present in both sources keep the many-to-many rows (they
    /// carry subject and primary metadata); divisions present only on the
    /// legacy side synthesize a primary class-teacher record. An empty result
    /// means the teacher holds no assignments and must be treated by callers
    /// as "no class-scoped access", not as a failure.
    pub async fn resolve_for_teacher(
        &self,
        teacher_id: Uuid,
    ) -> Result<Vec<ClassAssignment>, StoreError> {
        let mut assignments = self.store.active_assignments_for_teacher(teacher_id).await?;

        let modern_divisions: HashSet<Uuid> = assignments
            .iter()
            .map(|a| a.class_division_id)
            .collect();

        for division_id in self.store.legacy_class_teacher_divisions(teacher_id).await? {
            if !modern_divisions.contains(&division_id) {
                assignments.push(ClassAssignment::legacy(division_id));
            }
        }

        Ok(assignments)
    }

    /// The set of division ids the teacher may act within. Convenience for
    /// callers that only need the scope, not the per-subject detail.
    pub async fn division_scope_for_teacher(
        &self,
        teacher_id: Uuid,
    ) -> Result<HashSet<Uuid>, StoreError> {
        let assignments = self.resolve_for_teacher(teacher_id).await?;
        Ok(assignments.into_iter().map(|a| a.class_division_id).collect())
    }
}
