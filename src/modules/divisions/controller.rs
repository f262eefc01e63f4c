use axum::{Json, extract::State};
use tracing::instrument;

use crate::access::assignments::AssignmentResolver;
use crate::access::guardians::GuardianResolver;
use crate::middleware::auth::AuthUser;
use crate::modules::auth::controller::ErrorResponse;
use crate::state::AppState;
use crate::utils::errors::AppError;

use super::model::MyDivisionsResponse;
use super::service::DivisionService;

#[utoipa::path(
    get,
    path = "/api/divisions/mine",
    responses(
        (status = 200, description = "Divisions the actor has scope over", body = MyDivisionsResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Divisions"
)]
#[instrument(skip(state))]
pub async fn get_my_divisions(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<MyDivisionsResponse>, AppError> {
    let identity = auth_user.identity()?;

    if identity.is_staff() {
        let divisions = DivisionService::get_all_divisions(&state.db).await?;
        return Ok(Json(MyDivisionsResponse {
            divisions,
            assignments: None,
            children: None,
        }));
    }

    if identity.is_teacher() {
        let assignments = AssignmentResolver::new(&state.access)
            .resolve_for_teacher(identity.user_id)
            .await?;

        let mut ids: Vec<_> = assignments.iter().map(|a| a.class_division_id).collect();
        ids.sort();
        ids.dedup();

        let divisions = DivisionService::get_divisions_by_ids(&state.db, &ids).await?;
        return Ok(Json(MyDivisionsResponse {
            divisions,
            assignments: Some(assignments),
            children: None,
        }));
    }

    // Parent: children with an ongoing enrollment contribute their division;
    // the rest keep the guardian link but no class scope.
    let children = GuardianResolver::new(&state.access)
        .resolve_for_parent(identity.user_id)
        .await?;

    let mut ids: Vec<_> = children.iter().filter_map(|c| c.class_division_id).collect();
    ids.sort();
    ids.dedup();

    let divisions = DivisionService::get_divisions_by_ids(&state.db, &ids).await?;
    Ok(Json(MyDivisionsResponse {
        divisions,
        assignments: None,
        children: Some(children),
    }))
}
