use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::access::policy::VisibilityScope;
use crate::access::status::ApprovalStatus;
use crate::utils::pagination::{PaginationMeta, PaginationParams};

#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct Alert {
    pub id: Uuid,
    pub title: String,
    pub body: String,
    pub visibility_scope: VisibilityScope,
    pub class_division_id: Option<Uuid>,
    pub owner_id: Uuid,
    pub approval_status: ApprovalStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateAlertDto {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1, max = 2000))]
    pub body: String,
    pub visibility_scope: VisibilityScope,
    /// Required when `visibility_scope` is `class_specific`.
    pub class_division_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, ToSchema, utoipa::IntoParams)]
pub struct AlertFilterParams {
    pub class_division_id: Option<Uuid>,
    /// Staff-only convenience: restrict to one approval status, e.g. the
    /// moderation queue (`pending`).
    pub approval_status: Option<ApprovalStatus>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedAlertsResponse {
    pub data: Vec<Alert>,
    pub meta: PaginationMeta,
}

#[cfg(test)]
mod tests {
    use axum::extract::Query;
    use axum::http::Uri;

    use super::*;

    #[test]
    fn filter_params_parse_status_with_pagination() {
        let uri: Uri = "/api/alerts?approval_status=pending&limit=50&page=3"
            .parse()
            .unwrap();
        let Query(params) = Query::<AlertFilterParams>::try_from_uri(&uri).unwrap();

        assert_eq!(params.approval_status, Some(ApprovalStatus::Pending));
        assert_eq!(params.pagination.limit(), 50);
        assert_eq!(params.pagination.page(), 3);
    }
}
