use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde_json::json;
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use crate::access::policy::{AccessPolicy, Operation, ResourceDescriptor, ResourceKind};
use crate::middleware::auth::AuthUser;
use crate::modules::auth::controller::ErrorResponse;
use crate::state::AppState;
use crate::utils::errors::{AppError, ensure_allowed};
use crate::utils::pagination::PaginationMeta;

use super::model::{
    Activity, ActivityConsent, ActivityFilterParams, CreateActivityDto,
    PaginatedActivitiesResponse, RecordConsentDto, UpdateActivityDto,
};
use super::service::ActivityService;

fn descriptor_for(activity: &Activity) -> ResourceDescriptor {
    let descriptor = ResourceDescriptor::new(ResourceKind::Activity)
        .in_division(activity.class_division_id)
        .owned_by(activity.owner_id);
    if activity.is_completed {
        descriptor.locked()
    } else {
        descriptor
    }
}

#[utoipa::path(
    post,
    path = "/api/activities",
    request_body = CreateActivityDto,
    responses(
        (status = 200, description = "Activity created", body = Activity),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Not assigned to this class", body = ErrorResponse),
        (status = 422, description = "Validation failed", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Activities"
)]
#[instrument(skip(state, dto))]
pub async fn create_activity(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(dto): Json<CreateActivityDto>,
) -> Result<Json<Activity>, AppError> {
    let identity = auth_user.identity()?;

    dto.validate()
        .map_err(|e| AppError::unprocessable(anyhow::anyhow!("Validation failed: {}", e)))?;

    let descriptor =
        ResourceDescriptor::new(ResourceKind::Activity).in_division(dto.class_division_id);
    let decision = AccessPolicy::new(&state.access)
        .decide(&identity, &descriptor, Operation::Create)
        .await?;
    ensure_allowed(&decision)?;

    let activity = ActivityService::create_activity(&state.db, dto, identity.user_id).await?;
    Ok(Json(activity))
}

#[utoipa::path(
    get,
    path = "/api/activities",
    params(ActivityFilterParams),
    responses(
        (status = 200, description = "Activities visible to the actor", body = PaginatedActivitiesResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Activities"
)]
#[instrument(skip(state))]
pub async fn get_activities(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(params): Query<ActivityFilterParams>,
) -> Result<Json<PaginatedActivitiesResponse>, AppError> {
    let identity = auth_user.identity()?;

    let scope = AccessPolicy::new(&state.access)
        .list_scope(&identity, ResourceKind::Activity)
        .await?;

    let limit = params.pagination.limit();
    let offset = params.pagination.offset();
    let page = params.pagination.page();

    let (data, total) = ActivityService::list_activities(
        &state.db,
        &scope,
        params.class_division_id,
        limit,
        offset,
    )
    .await?;

    let total_pages = (total as f64 / limit as f64).ceil() as i64;

    Ok(Json(PaginatedActivitiesResponse {
        data,
        meta: PaginationMeta {
            total,
            limit,
            page,
            total_pages,
        },
    }))
}

#[utoipa::path(
    get,
    path = "/api/activities/{id}",
    params(("id" = Uuid, Path, description = "Activity ID")),
    responses(
        (status = 200, description = "Activity details", body = Activity),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Outside the actor's scope", body = ErrorResponse),
        (status = 404, description = "Activity not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Activities"
)]
#[instrument(skip(state))]
pub async fn get_activity(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Activity>, AppError> {
    let identity = auth_user.identity()?;

    let activity = ActivityService::get_activity_by_id(&state.db, id).await?;

    let decision = AccessPolicy::new(&state.access)
        .decide(&identity, &descriptor_for(&activity), Operation::Read)
        .await?;
    ensure_allowed(&decision)?;

    Ok(Json(activity))
}

#[utoipa::path(
    put,
    path = "/api/activities/{id}",
    params(("id" = Uuid, Path, description = "Activity ID")),
    request_body = UpdateActivityDto,
    responses(
        (status = 200, description = "Activity updated", body = Activity),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Not the owner", body = ErrorResponse),
        (status = 404, description = "Activity not found", body = ErrorResponse),
        (status = 409, description = "Activity already completed", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Activities"
)]
#[instrument(skip(state, dto))]
pub async fn update_activity(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    Json(dto): Json<UpdateActivityDto>,
) -> Result<Json<Activity>, AppError> {
    let identity = auth_user.identity()?;

    dto.validate()
        .map_err(|e| AppError::unprocessable(anyhow::anyhow!("Validation failed: {}", e)))?;

    let activity = ActivityService::get_activity_by_id(&state.db, id).await?;

    let decision = AccessPolicy::new(&state.access)
        .decide(&identity, &descriptor_for(&activity), Operation::Update)
        .await?;
    ensure_allowed(&decision)?;

    let updated = ActivityService::update_activity(&state.db, &activity, dto).await?;
    Ok(Json(updated))
}

#[utoipa::path(
    post,
    path = "/api/activities/{id}/complete",
    params(("id" = Uuid, Path, description = "Activity ID")),
    responses(
        (status = 200, description = "Activity marked completed", body = Activity),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Not the owner", body = ErrorResponse),
        (status = 404, description = "Activity not found", body = ErrorResponse),
        (status = 409, description = "Activity already completed", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Activities"
)]
#[instrument(skip(state))]
pub async fn complete_activity(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Activity>, AppError> {
    let identity = auth_user.identity()?;

    let activity = ActivityService::get_activity_by_id(&state.db, id).await?;

    // Completing twice is a state conflict, same as any mutation of a
    // completed activity.
    let decision = AccessPolicy::new(&state.access)
        .decide(&identity, &descriptor_for(&activity), Operation::Update)
        .await?;
    ensure_allowed(&decision)?;

    let completed = ActivityService::mark_completed(&state.db, id).await?;
    Ok(Json(completed))
}

#[utoipa::path(
    delete,
    path = "/api/activities/{id}",
    params(("id" = Uuid, Path, description = "Activity ID")),
    responses(
        (status = 200, description = "Activity deleted"),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Not the owner", body = ErrorResponse),
        (status = 404, description = "Activity not found", body = ErrorResponse),
        (status = 409, description = "Completed activities cannot be deleted", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Activities"
)]
#[instrument(skip(state))]
pub async fn delete_activity(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let identity = auth_user.identity()?;

    let activity = ActivityService::get_activity_by_id(&state.db, id).await?;

    let decision = AccessPolicy::new(&state.access)
        .decide(&identity, &descriptor_for(&activity), Operation::Delete)
        .await?;
    ensure_allowed(&decision)?;

    ActivityService::delete_activity(&state.db, id).await?;
    Ok(Json(json!({"message": "Activity deleted successfully"})))
}

#[utoipa::path(
    put,
    path = "/api/activities/{id}/consent",
    params(("id" = Uuid, Path, description = "Activity ID")),
    request_body = RecordConsentDto,
    responses(
        (status = 200, description = "Consent recorded", body = ActivityConsent),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Activity or student not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Activities"
)]
#[instrument(skip(state, dto))]
pub async fn record_consent(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    Json(dto): Json<RecordConsentDto>,
) -> Result<Json<ActivityConsent>, AppError> {
    let identity = auth_user.identity()?;

    let activity = ActivityService::get_activity_by_id(&state.db, id).await?;

    // Consent bypasses resource ownership: the check is guardianship of the
    // target student. Denials are masked as not-found so a parent probing
    // another family's student id learns nothing about its existence.
    let decision = AccessPolicy::new(&state.access)
        .authorize_consent(&identity, dto.student_id)
        .await?;
    if !decision.allowed {
        return Err(AppError::not_found("Student not found"));
    }

    let consent = ActivityService::record_consent(
        &state.db,
        activity.id,
        dto.student_id,
        dto.granted,
        identity.user_id,
    )
    .await?;

    Ok(Json(consent))
}
