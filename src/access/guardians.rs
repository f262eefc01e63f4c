//! Parent/student guardianship resolution.
//!
//! A parent acts on behalf of the students they are mapped to. Class scope is
//! derived from each student's single `ongoing` enrollment; a student between
//! enrollments (transferred, graduated) still has a confirmed guardian link
//! but contributes no class scope.

use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::access::store::{AccessStore, StoreError};

/// Raw guardian mapping row as stored.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct GuardianRow {
    pub student_id: Uuid,
    pub relationship: String,
    pub is_primary_guardian: bool,
}

/// A guardian mapping joined with the student's current division.
///
/// `class_division_id` is `None` when the student has no ongoing enrollment;
/// callers must treat that as "no current class scope", never as an error.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct GuardianLink {
    pub student_id: Uuid,
    pub class_division_id: Option<Uuid>,
    pub relationship: String,
    pub is_primary_guardian: bool,
}

/// Resolves the students (and their current divisions) a parent may act for.
pub struct GuardianResolver<'a, S> {
    store: &'a S,
}

impl<'a, S: AccessStore> GuardianResolver<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    pub async fn resolve_for_parent(
        &self,
        parent_id: Uuid,
    ) -> Result<Vec<GuardianLink>, StoreError> {
        let mappings = self.store.guardian_mappings_for_parent(parent_id).await?;

        let mut links = Vec::with_capacity(mappings.len());
        for row in mappings {
            let class_division_id = self.store.ongoing_division_for_student(row.student_id).await?;
            links.push(GuardianLink {
                student_id: row.student_id,
                class_division_id,
                relationship: row.relationship,
                is_primary_guardian: row.is_primary_guardian,
            });
        }

        Ok(links)
    }

    /// Point lookup used on mutation paths (e.g. recording consent) instead of
    /// materializing the full list for a single relationship check.
    pub async fn is_guardian_of(
        &self,
        parent_id: Uuid,
        student_id: Uuid,
    ) -> Result<bool, StoreError> {
        let mapping = self.store.guardian_mapping(parent_id, student_id).await?;
        Ok(mapping.is_some())
    }

    /// Division ids of all students the parent currently guards. Students
    /// without an ongoing enrollment contribute nothing.
    pub async fn division_scope_for_parent(
        &self,
        parent_id: Uuid,
    ) -> Result<std::collections::HashSet<Uuid>, StoreError> {
        let links = self.resolve_for_parent(parent_id).await?;
        Ok(links.into_iter().filter_map(|l| l.class_division_id).collect())
    }
}
