use std::sync::Arc;

use axum::{
    Router,
    routing::{get, patch, post},
    middleware,
};

use shared_utils::extractor::auth_middleware;

use crate::handlers;
use crate::state::AppointmentCellState;

pub fn appointment_routes(state: Arc<AppointmentCellState>) -> Router {
    let public_routes = Router::new()
        .route("/available-slots/{doctor_id}/{date}", get(handlers::get_available_slots));

    let protected_routes = Router::new()
        .route("/", post(handlers::book_appointment))
        .route("/stats", get(handlers::get_appointment_stats))
        .route("/{appointment_id}", get(handlers::get_appointment).patch(handlers::update_appointment))
        .route("/{appointment_id}/charges", patch(handlers::update_charges))

        // Lifecycle
        .route("/{appointment_id}/confirm", post(handlers::confirm_appointment))
        .route("/{appointment_id}/start", post(handlers::start_appointment))
        .route("/{appointment_id}/complete", post(handlers::complete_appointment))
        .route("/{appointment_id}/cancel", post(handlers::cancel_appointment))
        .route("/{appointment_id}/no-show", post(handlers::mark_no_show))
        .route("/{appointment_id}/reschedule", post(handlers::reschedule_appointment))

        // Attached records
        .route("/{appointment_id}/feedback", post(handlers::add_feedback))
        .route("/{appointment_id}/documents", post(handlers::add_document))
        .route("/{appointment_id}/payments", post(handlers::record_payment))

        .layer(middleware::from_fn_with_state(state.config.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}
