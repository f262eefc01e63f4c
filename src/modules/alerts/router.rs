use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{
    approve_alert, create_alert, delete_alert, get_alert, get_alerts, reject_alert, send_alert,
};

pub fn init_alerts_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_alert).get(get_alerts))
        .route("/{id}", get(get_alert).delete(delete_alert))
        .route("/{id}/approve", post(approve_alert))
        .route("/{id}/reject", post(reject_alert))
        .route("/{id}/send", post(send_alert))
}
