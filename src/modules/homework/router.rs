use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{
    create_homework, delete_homework, get_homework, get_homework_by_id, update_homework,
};

pub fn init_homework_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_homework).get(get_homework))
        .route(
            "/{id}",
            get(get_homework_by_id)
                .put(update_homework)
                .delete(delete_homework),
        )
}
