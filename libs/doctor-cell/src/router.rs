use std::sync::Arc;

use axum::{
    Router,
    routing::{get, put},
    middleware,
};

use shared_utils::extractor::auth_middleware;

use crate::handlers::{self, DoctorCellState};

pub fn doctor_routes(state: Arc<DoctorCellState>) -> Router {
    let public_routes = Router::new()
        .route("/{doctor_id}", get(handlers::get_doctor))
        .route("/{doctor_id}/schedules", get(handlers::list_schedules));

    let protected_routes = Router::new()
        .route("/{doctor_id}/schedules/{weekday}", put(handlers::upsert_schedule))
        .layer(middleware::from_fn_with_state(state.config.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}
