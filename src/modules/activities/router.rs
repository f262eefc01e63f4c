use axum::{
    Router,
    routing::{get, post, put},
};

use crate::state::AppState;

use super::controller::{
    complete_activity, create_activity, delete_activity, get_activities, get_activity,
    record_consent, update_activity,
};

pub fn init_activities_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_activity).get(get_activities))
        .route(
            "/{id}",
            get(get_activity).put(update_activity).delete(delete_activity),
        )
        .route("/{id}/complete", post(complete_activity))
        .route("/{id}/consent", put(record_consent))
}
