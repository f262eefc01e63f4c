use axum::{Router, routing::get};

use crate::state::AppState;

use super::controller::get_my_divisions;

pub fn init_divisions_router() -> Router<AppState> {
    Router::new().route("/mine", get(get_my_divisions))
}
