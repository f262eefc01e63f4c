use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::utils::pagination::{PaginationMeta, PaginationParams};

#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct Homework {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub subject: String,
    pub class_division_id: Uuid,
    pub owner_id: Uuid,
    pub due_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateHomeworkDto {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    pub description: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub subject: String,
    pub class_division_id: Uuid,
    pub due_date: NaiveDate,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateHomeworkDto {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    pub description: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub subject: Option<String>,
    pub due_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, ToSchema, utoipa::IntoParams)]
pub struct HomeworkFilterParams {
    /// Restrict to one division (must still fall inside the actor's scope).
    pub class_division_id: Option<Uuid>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedHomeworkResponse {
    pub data: Vec<Homework>,
    pub meta: PaginationMeta,
}

#[cfg(test)]
mod tests {
    use axum::extract::Query;
    use axum::http::Uri;

    use super::*;

    #[test]
    fn filter_params_parse_from_query_string() {
        let uri: Uri = "/api/homework?limit=10&page=2".parse().unwrap();
        let Query(params) = Query::<HomeworkFilterParams>::try_from_uri(&uri).unwrap();

        assert_eq!(params.pagination.limit(), 10);
        assert_eq!(params.pagination.page(), 2);
        assert!(params.class_division_id.is_none());
    }

    #[test]
    fn filter_params_parse_division_with_pagination() {
        let division = Uuid::new_v4();
        let uri: Uri = format!("/api/homework?class_division_id={division}&limit=5")
            .parse()
            .unwrap();
        let Query(params) = Query::<HomeworkFilterParams>::try_from_uri(&uri).unwrap();

        assert_eq!(params.class_division_id, Some(division));
        assert_eq!(params.pagination.limit(), 5);
        assert_eq!(params.pagination.page(), 1);
    }

    #[test]
    fn filter_params_parse_without_pagination() {
        let uri: Uri = "/api/homework".parse().unwrap();
        let Query(params) = Query::<HomeworkFilterParams>::try_from_uri(&uri).unwrap();

        assert_eq!(params.pagination.limit(), 20);
        assert_eq!(params.pagination.offset(), 0);
    }
}
