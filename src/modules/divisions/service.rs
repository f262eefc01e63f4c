use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use crate::utils::errors::AppError;

use super::model::ClassDivision;

pub struct DivisionService;

impl DivisionService {
    #[instrument(skip(db))]
    pub async fn get_divisions_by_ids(
        db: &PgPool,
        ids: &[Uuid],
    ) -> Result<Vec<ClassDivision>, AppError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let divisions = sqlx::query_as::<_, ClassDivision>(
            "SELECT id, level, division_label, academic_year
             FROM class_divisions
             WHERE id = ANY($1)
             ORDER BY level, division_label",
        )
        .bind(ids)
        .fetch_all(db)
        .await?;

        Ok(divisions)
    }

    #[instrument(skip(db))]
    pub async fn get_all_divisions(db: &PgPool) -> Result<Vec<ClassDivision>, AppError> {
        let divisions = sqlx::query_as::<_, ClassDivision>(
            "SELECT id, level, division_label, academic_year
             FROM class_divisions
             ORDER BY level, division_label",
        )
        .fetch_all(db)
        .await?;

        Ok(divisions)
    }
}
