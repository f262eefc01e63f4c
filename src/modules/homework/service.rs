use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use crate::access::policy::ScopeFilter;
use crate::utils::errors::AppError;

use super::model::{CreateHomeworkDto, Homework, UpdateHomeworkDto};

pub struct HomeworkService;

impl HomeworkService {
    #[instrument(skip(db, dto))]
    pub async fn create_homework(
        db: &PgPool,
        dto: CreateHomeworkDto,
        owner_id: Uuid,
    ) -> Result<Homework, AppError> {
        let homework = sqlx::query_as::<_, Homework>(
            "INSERT INTO homework (title, description, subject, class_division_id, owner_id, due_date)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING id, title, description, subject, class_division_id, owner_id, due_date,
                       created_at, updated_at",
        )
        .bind(&dto.title)
        .bind(&dto.description)
        .bind(&dto.subject)
        .bind(dto.class_division_id)
        .bind(owner_id)
        .bind(dto.due_date)
        .fetch_one(db)
        .await?;

        Ok(homework)
    }

    /// List homework visible under `scope`. The filter is pushed down into the
    /// query predicate; rows outside the actor's scope never leave the store.
    #[instrument(skip(db, scope))]
    pub async fn list_homework(
        db: &PgPool,
        scope: &ScopeFilter,
        division_filter: Option<Uuid>,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Homework>, i64), AppError> {
        let (rows, total) = match scope {
            ScopeFilter::Unrestricted => {
                let rows = sqlx::query_as::<_, Homework>(
                    "SELECT id, title, description, subject, class_division_id, owner_id, due_date,
                            created_at, updated_at
                     FROM homework
                     WHERE ($1::uuid IS NULL OR class_division_id = $1)
                     ORDER BY due_date DESC, created_at DESC
                     LIMIT $2 OFFSET $3",
                )
                .bind(division_filter)
                .bind(limit)
                .bind(offset)
                .fetch_all(db)
                .await?;

                let total = sqlx::query_scalar::<_, i64>(
                    "SELECT COUNT(*) FROM homework
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

                let rows = sqlx::query_as::<_, Homework>(
                    "SELECT id, title, description, subject, class_division_id, owner_id, due_date,
                            created_at, updated_at
                     FROM homework
                     WHERE (class_division_id = ANY($1) OR owner_id = $2)
                       AND ($3::uuid IS NULL OR class_division_id = $3)
                     ORDER BY due_date DESC, created_at DESC
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
                    "SELECT COUNT(*) FROM homework
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
    pub async fn get_homework_by_id(db: &PgPool, id: Uuid) -> Result<Homework, AppError> {
        let homework = sqlx::query_as::<_, Homework>(
            "SELECT id, title, description, subject, class_division_id, owner_id, due_date,
                    created_at, updated_at
             FROM homework WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found("Homework not found"))?;

        Ok(homework)
    }

    #[instrument(skip(db, dto))]
    pub async fn update_homework(
        db: &PgPool,
        existing: &Homework,
        dto: UpdateHomeworkDto,
    ) -> Result<Homework, AppError> {
        let title = dto.title.as_deref().unwrap_or(&existing.title);
        let description = dto.description.as_deref().or(existing.description.as_deref());
        let subject = dto.subject.as_deref().unwrap_or(&existing.subject);
        let due_date = dto.due_date.unwrap_or(existing.due_date);

        let homework = sqlx::query_as::<_, Homework>(
            "UPDATE homework
             SET title = $1, description = $2, subject = $3, due_date = $4, updated_at = NOW()
             WHERE id = $5
             RETURNING id, title, description, subject, class_division_id, owner_id, due_date,
                       created_at, updated_at",
        )
        .bind(title)
        .bind(description)
        .bind(subject)
        .bind(due_date)
        .bind(existing.id)
        .fetch_one(db)
        .await?;

        Ok(homework)
    }

    #[instrument(skip(db))]
    pub async fn delete_homework(db: &PgPool, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM homework WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Homework not found"));
        }

        Ok(())
    }
}
