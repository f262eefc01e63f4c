//! Shared test fixtures: an in-memory record store so the access core can be
//! exercised without a database.

use uuid::Uuid;

use schoolgate::access::assignments::{AssignmentType, ClassAssignment};
use schoolgate::access::guardians::GuardianRow;
use schoolgate::access::store::{AccessStore, StoreError};

#[derive(Debug, Clone)]
struct StoredAssignment {
    teacher_id: Uuid,
    assignment: ClassAssignment,
    is_active: bool,
}

#[derive(Debug, Clone)]
struct StoredEnrollment {
    student_id: Uuid,
    class_division_id: Uuid,
    status: &'static str,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    assignments: Vec<StoredAssignment>,
    legacy_links: Vec<(Uuid, Uuid)>, // (teacher_id, class_division_id)
    guardians: Vec<(Uuid, GuardianRow)>, // (parent_id, mapping)
    enrollments: Vec<StoredEnrollment>,
}

#[allow(dead_code)]
impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_assignment(
        mut self,
        teacher_id: Uuid,
        class_division_id: Uuid,
        assignment_type: AssignmentType,
        subject: Option<&str>,
        is_primary: bool,
    ) -> Self {
        self.assignments.push(StoredAssignment {
            teacher_id,
            assignment: ClassAssignment {
                class_division_id,
                assignment_type,
                subject: subject.map(str::to_string),
                is_primary,
            },
            is_active: true,
        });
        self
    }

    pub fn with_inactive_assignment(
        mut self,
        teacher_id: Uuid,
        class_division_id: Uuid,
        assignment_type: AssignmentType,
        subject: Option<&str>,
    ) -> Self {
        self.assignments.push(StoredAssignment {
            teacher_id,
            assignment: ClassAssignment {
                class_division_id,
                assignment_type,
                subject: subject.map(str::to_string),
                is_primary: false,
            },
            is_active: false,
        });
        self
    }

    /// Legacy single-teacher field set directly on the division.
    pub fn with_legacy_class_teacher(mut self, teacher_id: Uuid, class_division_id: Uuid) -> Self {
        self.legacy_links.push((teacher_id, class_division_id));
        self
    }

    pub fn with_guardian(
        mut self,
        parent_id: Uuid,
        student_id: Uuid,
        relationship: &str,
        is_primary_guardian: bool,
    ) -> Self {
        self.guardians.push((
            parent_id,
            GuardianRow {
                student_id,
                relationship: relationship.to_string(),
                is_primary_guardian,
            },
        ));
        self
    }

    pub fn with_enrollment(
        mut self,
        student_id: Uuid,
        class_division_id: Uuid,
        status: &'static str,
    ) -> Self {
        self.enrollments.push(StoredEnrollment {
            student_id,
            class_division_id,
            status,
        });
        self
    }
}

impl AccessStore for MemoryStore {
    async fn active_assignments_for_teacher(
        &self,
        teacher_id: Uuid,
    ) -> Result<Vec<ClassAssignment>, StoreError> {
        Ok(self
            .assignments
            .iter()
            .filter(|a| a.teacher_id == teacher_id && a.is_active)
            .map(|a| a.assignment.clone())
            .collect())
    }

    async fn legacy_class_teacher_divisions(
        &self,
        teacher_id: Uuid,
    ) -> Result<Vec<Uuid>, StoreError> {
        Ok(self
            .legacy_links
            .iter()
            .filter(|(t, _)| *t == teacher_id)
            .map(|(_, d)| *d)
            .collect())
    }

    async fn guardian_mappings_for_parent(
        &self,
        parent_id: Uuid,
    ) -> Result<Vec<GuardianRow>, StoreError> {
        Ok(self
            .guardians
            .iter()
            .filter(|(p, _)| *p == parent_id)
            .map(|(_, row)| row.clone())
            .collect())
    }

    async fn guardian_mapping(
        &self,
        parent_id: Uuid,
        student_id: Uuid,
    ) -> Result<Option<GuardianRow>, StoreError> {
        Ok(self
            .guardians
            .iter()
            .find(|(p, row)| *p == parent_id && row.student_id == student_id)
            .map(|(_, row)| row.clone()))
    }

    async fn ongoing_division_for_student(
        &self,
        student_id: Uuid,
    ) -> Result<Option<Uuid>, StoreError> {
        Ok(self
            .enrollments
            .iter()
            .find(|e| e.student_id == student_id && e.status == "ongoing")
            .map(|e| e.class_division_id))
    }
}
