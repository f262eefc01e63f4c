use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use crate::access::policy::{ScopeFilter, VisibilityScope};
use crate::access::status::ApprovalStatus;
use crate::utils::errors::AppError;

use super::model::{Alert, CreateAlertDto};

pub struct AlertService;

impl AlertService {
    #[instrument(skip(db, dto))]
    pub async fn create_alert(
        db: &PgPool,
        dto: CreateAlertDto,
        owner_id: Uuid,
        status: ApprovalStatus,
    ) -> Result<Alert, AppError> {
        let alert = sqlx::query_as::<_, Alert>(
            "INSERT INTO alerts (title, body, visibility_scope, class_division_id, owner_id, approval_status)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING id, title, body, visibility_scope, class_division_id, owner_id,
                       approval_status, created_at, updated_at",
        )
        .bind(&dto.title)
        .bind(&dto.body)
        .bind(dto.visibility_scope)
        .bind(dto.class_division_id)
        .bind(owner_id)
        .bind(status)
        .fetch_one(db)
        .await?;

        Ok(alert)
    }

    /// Moderation-aware listing. Scoped actors see their own rows in any
    /// status, plus approved rows of their divisions and approved school-wide
    /// rows; pending rows of other authors never leave the store.
    #[instrument(skip(db, scope))]
    pub async fn list_alerts(
        db: &PgPool,
        scope: &ScopeFilter,
        division_filter: Option<Uuid>,
        status_filter: Option<ApprovalStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Alert>, i64), AppError> {
        let (rows, total) = match scope {
            ScopeFilter::Unrestricted => {
                let rows = sqlx::query_as::<_, Alert>(
                    "SELECT id, title, body, visibility_scope, class_division_id, owner_id,
                            approval_status, created_at, updated_at
                     FROM alerts
                     WHERE ($1::uuid IS NULL OR class_division_id = $1)
                       AND ($2::approval_status IS NULL OR approval_status = $2)
                     ORDER BY created_at DESC
                     LIMIT $3 OFFSET $4",
                )
                .bind(division_filter)
                .bind(status_filter)
                .bind(limit)
                .bind(offset)
                .fetch_all(db)
                .await?;

                let total = sqlx::query_scalar::<_, i64>(
                    "SELECT COUNT(*) FROM alerts
                     WHERE ($1::uuid IS NULL OR class_division_id = $1)
                       AND ($2::approval_status IS NULL OR approval_status = $2)",
                )
                .bind(division_filter)
                .bind(status_filter)
                .fetch_one(db)
                .await?;

                (rows, total)
            }
            ScopeFilter::Scoped(list_scope) => {
                let division_ids: Vec<Uuid> =
                    list_scope.class_division_ids.iter().copied().collect();

                let rows = sqlx::query_as::<_, Alert>(
                    "SELECT id, title, body, visibility_scope, class_division_id, owner_id,
                            approval_status, created_at, updated_at
                     FROM alerts
                     WHERE (owner_id = $2
                            OR (class_division_id = ANY($1)
                                AND approval_status IN ('approved', 'sent'))
                            OR (visibility_scope = 'school_wide'
                                AND approval_status IN ('approved', 'sent')))
                       AND ($3::uuid IS NULL OR class_division_id = $3)
                     ORDER BY created_at DESC
                     LIMIT $4 OFFSET $5",
                )
                .bind(&division_ids)
                .bind(list_scope.owner_id)
                .bind(division_filter)
                .bind(limit)
                .bind(offset)
                .fetch_all(db)
                .await?;

                let total = sqlx::query_scalar::<_, i64>(
                    "SELECT COUNT(*) FROM alerts
                     WHERE (owner_id = $2
                            OR (class_division_id = ANY($1)
                                AND approval_status IN ('approved', 'sent'))
                            OR (visibility_scope = 'school_wide'
                                AND approval_status IN ('approved', 'sent')))
                       AND ($3::uuid IS NULL OR class_division_id = $3)",
                )
                .bind(&division_ids)
                .bind(list_scope.owner_id)
                .bind(division_filter)
                .fetch_one(db)
                .await?;

                (rows, total)
            }
        };

        Ok((rows, total))
    }

    #[instrument(skip(db))]
    pub async fn get_alert_by_id(db: &PgPool, id: Uuid) -> Result<Alert, AppError> {
        let alert = sqlx::query_as::<_, Alert>(
            "SELECT id, title, body, visibility_scope, class_division_id, owner_id,
                    approval_status, created_at, updated_at
             FROM alerts WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found("Alert not found"))?;

        Ok(alert)
    }

    #[instrument(skip(db))]
    pub async fn set_status(
        db: &PgPool,
        id: Uuid,
        status: ApprovalStatus,
    ) -> Result<Alert, AppError> {
        let alert = sqlx::query_as::<_, Alert>(
            "UPDATE alerts
             SET approval_status = $1, updated_at = NOW()
             WHERE id = $2
             RETURNING id, title, body, visibility_scope, class_division_id, owner_id,
                       approval_status, created_at, updated_at",
        )
        .bind(status)
        .bind(id)
        .fetch_one(db)
        .await?;

        Ok(alert)
    }

    #[instrument(skip(db))]
    pub async fn delete_alert(db: &PgPool, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM alerts WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Alert not found"));
        }

        Ok(())
    }

    /// Parents to notify when an alert is sent: guardians of students
    /// currently enrolled in the target division, or every guardian of an
    /// ongoing enrollment for a school-wide alert.
    #[instrument(skip(db))]
    pub async fn recipients_for(db: &PgPool, alert: &Alert) -> Result<Vec<Uuid>, AppError> {
        let recipients = match (alert.visibility_scope, alert.class_division_id) {
            (VisibilityScope::SchoolWide, _) => {
                sqlx::query_scalar::<_, Uuid>(
                    "SELECT DISTINCT gm.parent_id
                     FROM guardian_mappings gm
                     JOIN student_enrollments se ON se.student_id = gm.student_id
                     WHERE se.status = 'ongoing'",
                )
                .fetch_all(db)
                .await?
            }
            (_, Some(division_id)) => {
                sqlx::query_scalar::<_, Uuid>(
                    "SELECT DISTINCT gm.parent_id
                     FROM guardian_mappings gm
                     JOIN student_enrollments se ON se.student_id = gm.student_id
                     WHERE se.status = 'ongoing' AND se.class_division_id = $1",
                )
                .bind(division_id)
                .fetch_all(db)
                .await?
            }
            _ => Vec::new(),
        };

        Ok(recipients)
    }
}
