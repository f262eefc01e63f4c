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
    CreateHomeworkDto, Homework, HomeworkFilterParams, PaginatedHomeworkResponse,
    UpdateHomeworkDto,
};
use super::service::HomeworkService;

fn descriptor_for(homework: &Homework) -> ResourceDescriptor {
    ResourceDescriptor::new(ResourceKind::Homework)
        .in_division(homework.class_division_id)
        .owned_by(homework.owner_id)
}

#[utoipa::path(
    post,
    path = "/api/homework",
    request_body = CreateHomeworkDto,
    responses(
        (status = 200, description = "Homework created", body = Homework),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Not assigned to this class", body = ErrorResponse),
        (status = 422, description = "Validation failed", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Homework"
)]
#[instrument(skip(state, dto))]
pub async fn create_homework(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(dto): Json<CreateHomeworkDto>,
) -> Result<Json<Homework>, AppError> {
    let identity = auth_user.identity()?;

    dto.validate()
        .map_err(|e| AppError::unprocessable(anyhow::anyhow!("Validation failed: {}", e)))?;

    let descriptor =
        ResourceDescriptor::new(ResourceKind::Homework).in_division(dto.class_division_id);
    let decision = AccessPolicy::new(&state.access)
        .decide(&identity, &descriptor, Operation::Create)
        .await?;
    ensure_allowed(&decision)?;

    let homework = HomeworkService::create_homework(&state.db, dto, identity.user_id).await?;
    Ok(Json(homework))
}

#[utoipa::path(
    get,
    path = "/api/homework",
    params(HomeworkFilterParams),
    responses(
        (status = 200, description = "Homework visible to the actor", body = PaginatedHomeworkResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Homework"
)]
#[instrument(skip(state))]
pub async fn get_homework(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(params): Query<HomeworkFilterParams>,
) -> Result<Json<PaginatedHomeworkResponse>, AppError> {
    let identity = auth_user.identity()?;

    let scope = AccessPolicy::new(&state.access)
        .list_scope(&identity, ResourceKind::Homework)
        .await?;

    let limit = params.pagination.limit();
    let offset = params.pagination.offset();
    let page = params.pagination.page();

    let (data, total) = HomeworkService::list_homework(
        &state.db,
        &scope,
        params.class_division_id,
        limit,
        offset,
    )
    .await?;

    let total_pages = (total as f64 / limit as f64).ceil() as i64;

    Ok(Json(PaginatedHomeworkResponse {
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
    path = "/api/homework/{id}",
    params(("id" = Uuid, Path, description = "Homework ID")),
    responses(
        (status = 200, description = "Homework details", body = Homework),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Outside the actor's scope", body = ErrorResponse),
        (status = 404, description = "Homework not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Homework"
)]
#[instrument(skip(state))]
pub async fn get_homework_by_id(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Homework>, AppError> {
    let identity = auth_user.identity()?;

    let homework = HomeworkService::get_homework_by_id(&state.db, id).await?;

    let decision = AccessPolicy::new(&state.access)
        .decide(&identity, &descriptor_for(&homework), Operation::Read)
        .await?;
    ensure_allowed(&decision)?;

    Ok(Json(homework))
}

#[utoipa::path(
    put,
    path = "/api/homework/{id}",
    params(("id" = Uuid, Path, description = "Homework ID")),
    request_body = UpdateHomeworkDto,
    responses(
        (status = 200, description = "Homework updated", body = Homework),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Not the owner", body = ErrorResponse),
        (status = 404, description = "Homework not found", body = ErrorResponse),
        (status = 422, description = "Validation failed", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Homework"
)]
#[instrument(skip(state, dto))]
pub async fn update_homework(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    Json(dto): Json<UpdateHomeworkDto>,
) -> Result<Json<Homework>, AppError> {
    let identity = auth_user.identity()?;

    dto.validate()
        .map_err(|e| AppError::unprocessable(anyhow::anyhow!("Validation failed: {}", e)))?;

    let homework = HomeworkService::get_homework_by_id(&state.db, id).await?;

    let decision = AccessPolicy::new(&state.access)
        .decide(&identity, &descriptor_for(&homework), Operation::Update)
        .await?;
    ensure_allowed(&decision)?;

    let updated = HomeworkService::update_homework(&state.db, &homework, dto).await?;
    Ok(Json(updated))
}

#[utoipa::path(
    delete,
    path = "/api/homework/{id}",
    params(("id" = Uuid, Path, description = "Homework ID")),
    responses(
        (status = 200, description = "Homework deleted"),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Not the owner", body = ErrorResponse),
        (status = 404, description = "Homework not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Homework"
)]
#[instrument(skip(state))]
pub async fn delete_homework(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let identity = auth_user.identity()?;

    let homework = HomeworkService::get_homework_by_id(&state.db, id).await?;

    let decision = AccessPolicy::new(&state.access)
        .decide(&identity, &descriptor_for(&homework), Operation::Delete)
        .await?;
    ensure_allowed(&decision)?;

    HomeworkService::delete_homework(&state.db, id).await?;
    Ok(Json(json!({"message": "Homework deleted successfully"})))
}
