use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use crate::access::policy::ScopeFilter;
use crate::utils::errors::AppError;

use super::model::{Activity, ActivityConsent, CreateActivityDto, UpdateActivityDto};

pub struct ActivityService;

impl ActivityService {
    #[instrument(skip(db, dto))]
    pub async fn create_activity(
        db: &PgPool,
        dto: CreateActivityDto,
        owner_id: Uuid,
    ) -> Result<Activity, AppError> {
        let activity = sqlx::query_as::<_, Activity>(
            "INSERT INTO activities (title, description, class_division_id, owner_id, activity_date)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id, title, description, class_division_id, owner_id, activity_date,
                       is_completed, created_at, updated_at",
        )
        .bind(&dto.title)
        .bind(&dto.description)
        .bind(dto.class_division_id)
        .bind(owner_id)
        .bind(dto.activity_date)
        .fetch_one(db)
        .await?;

        Ok(activity)
    }

    #[instrument(skip(db, scope))]
    pub async fn list_activities(
        db: &PgPool,
        scope: &ScopeFilter,
        division_filter: Option<Uuid>,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Activity>, i64), AppError> {
        let (rows, total) = match scope {
            ScopeFilter::Unrestricted => {
                let rows = sqlx::query_as::<_, Activity>(
                    "SELECT id, title, description, class_division_id, owner_id, activity_date,
                            is_completed, created_at, updated_at
                     FROM activities
                     WHERE ($1::uuid IS NULL OR class_division_id = $1)
                     ORDER BY activity_date DESC
                     LIMIT $2 OFFSET $3",
                )
                .bind(division_filter)
                .bind(limit)
                .bind(offset)
                .fetch_all(db)
                .await?;

                let total = sqlx::query_scalar::<_, i64>(
                    "SELECT COUNT(*) FROM activities
                     WHERE ($1::uuid IS NULL OR class_division_id = $1)",
                )
                .bind(division_filter)
                .fetch_one(db)
                .await?;

                (rows, total)
            }
            ScopeFilter::Scoped(list_scope) => {
                let division_ids: Vec<Uuid> =
                    list_scope.class_division_ids.iter().copied().collect();

                let rows = sqlx::query_as::<_, Activity>(
                    "SELECT id, title, description, class_division_id, owner_id, activity_date,
                            is_completed, created_at, updated_at
                     FROM activities
                     WHERE (class_division_id = ANY($1) OR owner_id = $2)
                       AND ($3::uuid IS NULL OR class_division_id = $3)
                     ORDER BY activity_date DESC
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
                    "SELECT COUNT(*) FROM activities
                     WHERE (class_division_id = ANY($1) OR owner_id = $2)
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
    pub async fn get_activity_by_id(db: &PgPool, id: Uuid) -> Result<Activity, AppError> {
        let activity = sqlx::query_as::<_, Activity>(
            "SELECT id, title, description, class_division_id, owner_id, activity_date,
                    is_completed, created_at, updated_at
             FROM activities WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found("Activity not found"))?;

        Ok(activity)
    }

    #[instrument(skip(db, dto))]
    pub async fn update_activity(
        db: &PgPool,
        existing: &Activity,
        dto: UpdateActivityDto,
    ) -> Result<Activity, AppError> {
        let title = dto.title.as_deref().unwrap_or(&existing.title);
        let description = dto.description.as_deref().or(existing.description.as_deref());
        let activity_date = dto.activity_date.unwrap_or(existing.activity_date);

        let activity = sqlx::query_as::<_, Activity>(
            "UPDATE activities
             SET title = $1, description = $2, activity_date = $3, updated_at = NOW()
             WHERE id = $4
             RETURNING id, title, description, class_division_id, owner_id, activity_date,
                       is_completed, created_at, updated_at",
        )
        .bind(title)
        .bind(description)
        .bind(activity_date)
        .bind(existing.id)
        .fetch_one(db)
        .await?;

        Ok(activity)
    }

    #[instrument(skip(db))]
    pub async fn mark_completed(db: &PgPool, id: Uuid) -> Result<Activity, AppError> {
        let activity = sqlx::query_as::<_, Activity>(
            "UPDATE activities
             SET is_completed = TRUE, updated_at = NOW()
             WHERE id = $1
             RETURNING id, title, description, class_division_id, owner_id, activity_date,
                       is_completed, created_at, updated_at",
        )
        .bind(id)
        .fetch_one(db)
        .await?;

        Ok(activity)
    }

    #[instrument(skip(db))]
    pub async fn delete_activity(db: &PgPool, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM activities WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Activity not found"));
        }

        Ok(())
    }

    /// Upsert the consent record for (activity, student). The unique
    /// constraint keeps one row per pair; re-recording overwrites.
    #[instrument(skip(db))]
    pub async fn record_consent(
        db: &PgPool,
        activity_id: Uuid,
        student_id: Uuid,
        granted: bool,
        recorded_by: Uuid,
    ) -> Result<ActivityConsent, AppError> {
        let consent = sqlx::query_as::<_, ActivityConsent>(
            "INSERT INTO activity_consents (activity_id, student_id, granted, recorded_by)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (activity_id, student_id)
             DO UPDATE SET granted = EXCLUDED.granted, recorded_by = EXCLUDED.recorded_by,
                           recorded_at = NOW()
             RETURNING activity_id, student_id, granted, recorded_by, recorded_at",
        )
        .bind(activity_id)
        .bind(student_id)
        .bind(granted)
        .bind(recorded_by)
        .fetch_one(db)
        .await?;

        Ok(consent)
    }
}
