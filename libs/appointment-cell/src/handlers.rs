use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_models::auth::User;
use shared_models::error::AppError;

use crate::models::{
    AddDocumentRequest, BookAppointmentRequest, FeedbackRequest, RecordPaymentRequest,
    RescheduleRequest, UpdateAppointmentRequest, UpdateChargesRequest,
};
use crate::services::availability::parse_date;
use crate::state::AppointmentCellState;

// ==============================================================================
// PUBLIC HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn get_available_slots(
    State(state): State<Arc<AppointmentCellState>>,
    Path((doctor_id, date)): Path<(Uuid, String)>,
) -> Result<Json<Value>, AppError> {
    let date = parse_date(&date)?;
    let slots = state.availability().available_slots(doctor_id, date).await?;
    Ok(Json(json!(slots)))
}

// ==============================================================================
// BOOKING
// ==============================================================================

#[axum::debug_handler]
pub async fn book_appointment(
    State(state): State<Arc<AppointmentCellState>>,
    Extension(user): Extension<User>,
    Json(request): Json<BookAppointmentRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let caller = state.caller(&user).await?;
    let appointment = state.booking().book(&caller, request).await?;
    Ok((StatusCode::CREATED, Json(json!(appointment))))
}

#[axum::debug_handler]
pub async fn reschedule_appointment(
    State(state): State<Arc<AppointmentCellState>>,
    Extension(user): Extension<User>,
    Path(appointment_id): Path<Uuid>,
    Json(request): Json<RescheduleRequest>,
) -> Result<Json<Value>, AppError> {
    let caller = state.caller(&user).await?;
    let outcome = state.booking().reschedule(&caller, appointment_id, request).await?;

    Ok(Json(json!({
        "appointment": outcome.appointment,
        "previous_appointment_id": outcome.previous.id,
    })))
}

// ==============================================================================
// APPOINTMENT RECORD
// ==============================================================================

#[axum::debug_handler]
pub async fn get_appointment(
    State(state): State<Arc<AppointmentCellState>>,
    Extension(user): Extension<User>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let caller = state.caller(&user).await?;
    let details = state.workflow().details(&caller, appointment_id).await?;
    Ok(Json(json!(details)))
}

#[axum::debug_handler]
pub async fn update_appointment(
    State(state): State<Arc<AppointmentCellState>>,
    Extension(user): Extension<User>,
    Path(appointment_id): Path<Uuid>,
    Json(request): Json<UpdateAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let caller = state.caller(&user).await?;
    let appointment = state.workflow().update_details(&caller, appointment_id, request).await?;
    Ok(Json(json!(appointment)))
}

#[axum::debug_handler]
pub async fn update_charges(
    State(state): State<Arc<AppointmentCellState>>,
    Extension(user): Extension<User>,
    Path(appointment_id): Path<Uuid>,
    Json(request): Json<UpdateChargesRequest>,
) -> Result<Json<Value>, AppError> {
    let caller = state.caller(&user).await?;
    let appointment = state.workflow().update_charges(&caller, appointment_id, request).await?;
    Ok(Json(json!(appointment)))
}

// ==============================================================================
// LIFECYCLE
// ==============================================================================

#[axum::debug_handler]
pub async fn confirm_appointment(
    State(state): State<Arc<AppointmentCellState>>,
    Extension(user): Extension<User>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let caller = state.caller(&user).await?;
    let appointment = state.workflow().confirm(&caller, appointment_id).await?;
    Ok(Json(json!(appointment)))
}

#[axum::debug_handler]
pub async fn start_appointment(
    State(state): State<Arc<AppointmentCellState>>,
    Extension(user): Extension<User>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let caller = state.caller(&user).await?;
    let appointment = state.workflow().start(&caller, appointment_id).await?;
    Ok(Json(json!(appointment)))
}

#[axum::debug_handler]
pub async fn complete_appointment(
    State(state): State<Arc<AppointmentCellState>>,
    Extension(user): Extension<User>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let caller = state.caller(&user).await?;
    let appointment = state.workflow().complete(&caller, appointment_id).await?;
    Ok(Json(json!(appointment)))
}

#[axum::debug_handler]
pub async fn cancel_appointment(
    State(state): State<Arc<AppointmentCellState>>,
    Extension(user): Extension<User>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let caller = state.caller(&user).await?;
    let appointment = state.workflow().cancel(&caller, appointment_id).await?;
    Ok(Json(json!(appointment)))
}

#[axum::debug_handler]
pub async fn mark_no_show(
    State(state): State<Arc<AppointmentCellState>>,
    Extension(user): Extension<User>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let caller = state.caller(&user).await?;
    let appointment = state.workflow().mark_no_show(&caller, appointment_id).await?;
    Ok(Json(json!(appointment)))
}

// ==============================================================================
// FEEDBACK, DOCUMENTS, PAYMENTS
// ==============================================================================

#[axum::debug_handler]
pub async fn add_feedback(
    State(state): State<Arc<AppointmentCellState>>,
    Extension(user): Extension<User>,
    Path(appointment_id): Path<Uuid>,
    Json(request): Json<FeedbackRequest>,
) -> Result<Json<Value>, AppError> {
    let caller = state.caller(&user).await?;
    let feedback = state.feedback().add_feedback(&caller, appointment_id, request).await?;

    Ok(Json(json!({
        "message": "Feedback added successfully",
        "feedback": feedback,
    })))
}

#[axum::debug_handler]
pub async fn add_document(
    State(state): State<Arc<AppointmentCellState>>,
    Extension(user): Extension<User>,
    Path(appointment_id): Path<Uuid>,
    Json(request): Json<AddDocumentRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let caller = state.caller(&user).await?;
    let document = state.records().add_document(&caller, appointment_id, request).await?;
    Ok((StatusCode::CREATED, Json(json!(document))))
}

#[axum::debug_handler]
pub async fn record_payment(
    State(state): State<Arc<AppointmentCellState>>,
    Extension(user): Extension<User>,
    Path(appointment_id): Path<Uuid>,
    Json(request): Json<RecordPaymentRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let caller = state.caller(&user).await?;
    let payment = state.records().record_payment(&caller, appointment_id, request).await?;
    Ok((StatusCode::CREATED, Json(json!(payment))))
}

// ==============================================================================
// STATS
// ==============================================================================

#[axum::debug_handler]
pub async fn get_appointment_stats(
    State(state): State<Arc<AppointmentCellState>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let caller = state.caller(&user).await?;
    let stats = state.stats().stats(&caller).await?;
    Ok(Json(json!(stats)))
}
