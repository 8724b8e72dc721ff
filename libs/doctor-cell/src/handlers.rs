use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;

use crate::models::{DayOfWeek, UpsertScheduleRequest};
use crate::services::{resolve_caller, DoctorStore, ScheduleService};

pub struct DoctorCellState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn DoctorStore>,
}

impl DoctorCellState {
    pub fn new(config: Arc<AppConfig>, store: Arc<dyn DoctorStore>) -> Self {
        Self { config, store }
    }

    fn schedules(&self) -> ScheduleService {
        ScheduleService::new(self.store.clone())
    }
}

// ==============================================================================
// PUBLIC HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn get_doctor(
    State(state): State<Arc<DoctorCellState>>,
    Path(doctor_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let doctor = state.schedules().get_doctor(doctor_id).await?;
    Ok(Json(json!(doctor)))
}

#[axum::debug_handler]
pub async fn list_schedules(
    State(state): State<Arc<DoctorCellState>>,
    Path(doctor_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let schedules = state.schedules().list(doctor_id).await?;

    Ok(Json(json!({
        "doctor_id": doctor_id,
        "schedules": schedules,
    })))
}

// ==============================================================================
// PROTECTED HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn upsert_schedule(
    State(state): State<Arc<DoctorCellState>>,
    Extension(user): Extension<User>,
    Path((doctor_id, weekday)): Path<(Uuid, String)>,
    Json(request): Json<UpsertScheduleRequest>,
) -> Result<Json<Value>, AppError> {
    let day = DayOfWeek::parse(&weekday)
        .ok_or_else(|| AppError::ValidationError(format!("Unknown weekday '{}'", weekday)))?;
    let caller = resolve_caller(state.store.as_ref(), &user).await?;

    let schedule = state.schedules().upsert(&caller, doctor_id, day, request).await?;
    Ok(Json(json!(schedule)))
}
