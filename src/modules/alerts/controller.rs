use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde_json::json;
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use crate::access::policy::{
    AccessPolicy, Operation, ResourceDescriptor, ResourceKind, VisibilityScope, initial_status,
};
use crate::access::status::ApprovalStatus;
use crate::middleware::auth::AuthUser;
use crate::modules::auth::controller::ErrorResponse;
use crate::notify::Notification;
use crate::state::AppState;
use crate::utils::errors::{AppError, ensure_allowed};
use crate::utils::pagination::PaginationMeta;

use super::model::{Alert, AlertFilterParams, CreateAlertDto, PaginatedAlertsResponse};
use super::service::AlertService;

fn descriptor_for(alert: &Alert) -> ResourceDescriptor {
    let descriptor = ResourceDescriptor::new(ResourceKind::Alert)
        .in_division(alert.class_division_id)
        .owned_by(alert.owner_id)
        .with_status(alert.approval_status)
        .with_visibility(alert.visibility_scope);
    if alert.approval_status == ApprovalStatus::Sent {
        descriptor.locked()
    } else {
        descriptor
    }
}

#[utoipa::path(
    post,
    path = "/api/alerts",
    request_body = CreateAlertDto,
    responses(
        (status = 200, description = "Alert created; staff-authored alerts are approved directly, others enter the moderation queue", body = Alert),
        (status = 400, description = "Class-specific alert without a division", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Not assigned to this class", body = ErrorResponse),
        (status = 422, description = "Validation failed", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Alerts"
)]
#[instrument(skip(state, dto))]
pub async fn create_alert(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(dto): Json<CreateAlertDto>,
) -> Result<Json<Alert>, AppError> {
    let identity = auth_user.identity()?;

    dto.validate()
        .map_err(|e| AppError::unprocessable(anyhow::anyhow!("Validation failed: {}", e)))?;

    if dto.visibility_scope == VisibilityScope::ClassSpecific && dto.class_division_id.is_none() {
        return Err(AppError::bad_request(
            "Class-specific alerts require a class_division_id",
        ));
    }

    let descriptor =
        ResourceDescriptor::new(ResourceKind::Alert).in_division(dto.class_division_id);
    let decision = AccessPolicy::new(&state.access)
        .decide(&identity, &descriptor, Operation::Create)
        .await?;
    ensure_allowed(&decision)?;

    let status =
        initial_status(&identity, ResourceKind::Alert).unwrap_or(ApprovalStatus::Pending);

    let alert = AlertService::create_alert(&state.db, dto, identity.user_id, status).await?;
    Ok(Json(alert))
}

#[utoipa::path(
    get,
    path = "/api/alerts",
    params(AlertFilterParams),
    responses(
        (status = 200, description = "Alerts visible to the actor", body = PaginatedAlertsResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Alerts"
)]
#[instrument(skip(state))]
pub async fn get_alerts(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(params): Query<AlertFilterParams>,
) -> Result<Json<PaginatedAlertsResponse>, AppError> {
    let identity = auth_user.identity()?;

    let scope = AccessPolicy::new(&state.access)
        .list_scope(&identity, ResourceKind::Alert)
        .await?;

    // The status filter (moderation queue view) is a staff convenience; for
    // scoped actors the status rules are baked into the scope itself.
    let status_filter = if identity.is_staff() {
        params.approval_status
    } else {
        None
    };

    let limit = params.pagination.limit();
    let offset = params.pagination.offset();
    let page = params.pagination.page();

    let (data, total) = AlertService::list_alerts(
        &state.db,
        &scope,
        params.class_division_id,
        status_filter,
        limit,
        offset,
    )
    .await?;

    let total_pages = (total as f64 / limit as f64).ceil() as i64;

    Ok(Json(PaginatedAlertsResponse {
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
    path = "/api/alerts/{id}",
    params(("id" = Uuid, Path, description = "Alert ID")),
    responses(
        (status = 200, description = "Alert details", body = Alert),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Outside the actor's scope", body = ErrorResponse),
        (status = 404, description = "Alert not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Alerts"
)]
#[instrument(skip(state))]
pub async fn get_alert(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Alert>, AppError> {
    let identity = auth_user.identity()?;

    let alert = AlertService::get_alert_by_id(&state.db, id).await?;

    let decision = AccessPolicy::new(&state.access)
        .decide(&identity, &descriptor_for(&alert), Operation::Read)
        .await?;
    ensure_allowed(&decision)?;

    Ok(Json(alert))
}

#[utoipa::path(
    post,
    path = "/api/alerts/{id}/approve",
    params(("id" = Uuid, Path, description = "Alert ID")),
    responses(
        (status = 200, description = "Alert approved", body = Alert),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Staff only", body = ErrorResponse),
        (status = 404, description = "Alert not found", body = ErrorResponse),
        (status = 409, description = "Alert is not pending", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Alerts"
)]
#[instrument(skip(state))]
pub async fn approve_alert(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Alert>, AppError> {
    moderate_alert(state, auth_user, id, ApprovalStatus::Approved).await
}

#[utoipa::path(
    post,
    path = "/api/alerts/{id}/reject",
    params(("id" = Uuid, Path, description = "Alert ID")),
    responses(
        (status = 200, description = "Alert rejected", body = Alert),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Staff only", body = ErrorResponse),
        (status = 404, description = "Alert not found", body = ErrorResponse),
        (status = 409, description = "Alert is not pending", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Alerts"
)]
#[instrument(skip(state))]
pub async fn reject_alert(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Alert>, AppError> {
    moderate_alert(state, auth_user, id, ApprovalStatus::Rejected).await
}

async fn moderate_alert(
    state: AppState,
    auth_user: AuthUser,
    id: Uuid,
    target: ApprovalStatus,
) -> Result<Json<Alert>, AppError> {
    let identity = auth_user.identity()?;

    if !identity.is_staff() {
        return Err(AppError::forbidden("Only staff can moderate alerts"));
    }

    let alert = AlertService::get_alert_by_id(&state.db, id).await?;

    if !alert.approval_status.can_transition_to(target) {
        return Err(AppError::state_conflict(format!(
            "Cannot move alert from {} to {}",
            alert.approval_status.as_str(),
            target.as_str()
        )));
    }

    let updated = AlertService::set_status(&state.db, id, target).await?;

    // Tell the author; delivery failure never rolls back the transition.
    state.notifier.deliver(Notification {
        user_ids: vec![updated.owner_id],
        title: format!("Alert {}", target.as_str()),
        body: updated.title.clone(),
    });

    Ok(Json(updated))
}

#[utoipa::path(
    post,
    path = "/api/alerts/{id}/send",
    params(("id" = Uuid, Path, description = "Alert ID")),
    responses(
        (status = 200, description = "Alert dispatched", body = Alert),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Staff only", body = ErrorResponse),
        (status = 404, description = "Alert not found", body = ErrorResponse),
        (status = 409, description = "Alert is not approved", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Alerts"
)]
#[instrument(skip(state))]
pub async fn send_alert(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Alert>, AppError> {
    let identity = auth_user.identity()?;

    if !identity.is_staff() {
        return Err(AppError::forbidden("Only staff can send alerts"));
    }

    let alert = AlertService::get_alert_by_id(&state.db, id).await?;

    if !alert.approval_status.can_transition_to(ApprovalStatus::Sent) {
        return Err(AppError::state_conflict(format!(
            "Cannot send alert from {}",
            alert.approval_status.as_str()
        )));
    }

    let recipients = AlertService::recipients_for(&state.db, &alert).await?;
    let sent = AlertService::set_status(&state.db, id, ApprovalStatus::Sent).await?;

    state.notifier.deliver(Notification {
        user_ids: recipients,
        title: sent.title.clone(),
        body: sent.body.clone(),
    });

    Ok(Json(sent))
}

#[utoipa::path(
    delete,
    path = "/api/alerts/{id}",
    params(("id" = Uuid, Path, description = "Alert ID")),
    responses(
        (status = 200, description = "Alert deleted"),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Not the owner", body = ErrorResponse),
        (status = 404, description = "Alert not found", body = ErrorResponse),
        (status = 409, description = "Alerts can only be deleted while approved and unsent", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Alerts"
)]
#[instrument(skip(state))]
pub async fn delete_alert(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let identity = auth_user.identity()?;

    let alert = AlertService::get_alert_by_id(&state.db, id).await?;

    let decision = AccessPolicy::new(&state.access)
        .decide(&identity, &descriptor_for(&alert), Operation::Delete)
        .await?;
    ensure_allowed(&decision)?;

    AlertService::delete_alert(&state.db, id).await?;
    Ok(Json(json!({"message": "Alert deleted successfully"})))
}
