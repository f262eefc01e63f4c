//! Record-store seam for the access core.
//!
//! The resolvers and the policy never talk to Postgres directly; they go
//! through [`AccessStore`], which exposes exactly the lookups the core needs.
//! Production uses [`PgAccessStore`]; tests use an in-memory implementation.
//! Every lookup hits current records, per-request, with no caching.

use uuid::Uuid;

use crate::access::assignments::ClassAssignment;
use crate::access::guardians::GuardianRow;

/// Failure modes of the backing record store.
///
/// `Unavailable` is infrastructure trouble and propagates to the handler as a
/// 500; it must never be collapsed into an allow or deny decision.
#[derive(Debug)]
pub enum StoreError {
    NotFound,
    Conflict(String),
    Unavailable(anyhow::Error),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::NotFound => write!(f, "record not found"),
            StoreError::Conflict(msg) => write!(f, "conflict: {}", msg),
            StoreError::Unavailable(err) => write!(f, "store unavailable: {}", err),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                StoreError::Conflict(db_err.message().to_string())
            }
            other => StoreError::Unavailable(anyhow::Error::from(other)),
        }
    }
}

/// Lookups the access core requires from the record store.
pub trait AccessStore: Send + Sync {
    /// Active many-to-many assignment rows for a teacher. Inactive rows are
    /// filtered out at the store; they must never reach the resolver.
    fn active_assignments_for_teacher(
        &self,
        teacher_id: Uuid,
    ) -> impl Future<Output = Result<Vec<ClassAssignment>, StoreError>> + Send;

    /// Divisions whose legacy single-teacher field points at this teacher.
    fn legacy_class_teacher_divisions(
        &self,
        teacher_id: Uuid,
    ) -> impl Future<Output = Result<Vec<Uuid>, StoreError>> + Send;

    /// All guardian mappings held by a parent.
    fn guardian_mappings_for_parent(
        &self,
        parent_id: Uuid,
    ) -> impl Future<Output = Result<Vec<GuardianRow>, StoreError>> + Send;

    /// Point lookup for one parent/student mapping, used on mutation paths so
    /// the full list is never materialized for a single check.
    fn guardian_mapping(
        &self,
        parent_id: Uuid,
        student_id: Uuid,
    ) -> impl Future<Output = Result<Option<GuardianRow>, StoreError>> + Send;

    /// The student's current division via their single `ongoing` enrollment,
    /// if any. Transferred and graduated enrollments never surface here.
    fn ongoing_division_for_student(
        &self,
        student_id: Uuid,
    ) -> impl Future<Output = Result<Option<Uuid>, StoreError>> + Send;
}

/// Postgres-backed store used by the running service.
#[derive(Clone, Debug)]
pub struct PgAccessStore {
    pool: sqlx::PgPool,
}

impl PgAccessStore {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

impl AccessStore for PgAccessStore {
    async fn active_assignments_for_teacher(
        &self,
        teacher_id: Uuid,
    ) -> Result<Vec<ClassAssignment>, StoreError> {
        let rows = sqlx::query_as::<_, ClassAssignment>(
            "SELECT class_division_id, assignment_type, subject, is_primary
             FROM teacher_assignments
             WHERE teacher_id = $1 AND is_active = TRUE",
        )
        .bind(teacher_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn legacy_class_teacher_divisions(
        &self,
        teacher_id: Uuid,
    ) -> Result<Vec<Uuid>, StoreError> {
        let rows = sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM class_divisions WHERE class_teacher_id = $1",
        )
        .bind(teacher_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn guardian_mappings_for_parent(
        &self,
        parent_id: Uuid,
    ) -> Result<Vec<GuardianRow>, StoreError> {
        let rows = sqlx::query_as::<_, GuardianRow>(
            "SELECT student_id, relationship, is_primary_guardian
             FROM guardian_mappings
             WHERE parent_id = $1",
        )
        .bind(parent_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn guardian_mapping(
        &self,
        parent_id: Uuid,
        student_id: Uuid,
    ) -> Result<Option<GuardianRow>, StoreError> {
        let row = sqlx::query_as::<_, GuardianRow>(
            "SELECT student_id, relationship, is_primary_guardian
             FROM guardian_mappings
             WHERE parent_id = $1 AND student_id = $2",
        )
        .bind(parent_id)
        .bind(student_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn ongoing_division_for_student(
        &self,
        student_id: Uuid,
    ) -> Result<Option<Uuid>, StoreError> {
        let row = sqlx::query_scalar::<_, Uuid>(
            "SELECT class_division_id FROM student_enrollments
             WHERE student_id = $1 AND status = 'ongoing'",
        )
        .bind(student_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }
}
