pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::evaluation::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/api/v1/evaluations/:application_id",
            post(handlers::handle_create_evaluation),
        )
        .route(
            "/api/v1/applications/:application_id/evaluations",
            get(handlers::handle_list_evaluations),
        )
        .route(
            "/api/v1/applications/:application_id/evaluations/latest",
            get(handlers::handle_latest_evaluation),
        )
        .with_state(state)
}
