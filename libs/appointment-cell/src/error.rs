use thiserror::Error;

use doctor_cell::models::DoctorError;
use shared_database::DbError;
use shared_models::error::AppError;

use crate::models::AppointmentStatus;

#[derive(Error, Debug)]
pub enum AppointmentError {
    #[error("Appointment not found")]
    NotFound,

    #[error("Doctor not found")]
    DoctorNotFound,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Time slot is already booked")]
    SlotTaken,

    /// The record changed between read and write.
    #[error("Appointment was modified concurrently, reload and retry")]
    Conflict,

    #[error("Cannot {action} an appointment that is {from}")]
    InvalidTransition {
        from: AppointmentStatus,
        action: &'static str,
    },

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Doctor is not available for booking")]
    DoctorUnavailable,

    #[error("Doctor has no schedule on that day")]
    NoScheduleForDay,

    #[error("Appointment time is in the past")]
    PastTime,

    #[error(transparent)]
    Store(DbError),
}

impl From<DbError> for AppointmentError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Conflict(_) => AppointmentError::Conflict,
            other => AppointmentError::Store(other),
        }
    }
}

impl From<DoctorError> for AppointmentError {
    fn from(err: DoctorError) -> Self {
        match err {
            DoctorError::NotFound => AppointmentError::DoctorNotFound,
            DoctorError::NoScheduleForDay(_) | DoctorError::ScheduleNotFound(_) => AppointmentError::NoScheduleForDay,
            DoctorError::Validation(msg) => AppointmentError::Validation(msg),
            DoctorError::PermissionDenied(msg) => AppointmentError::PermissionDenied(msg),
            DoctorError::Store(db) => db.into(),
        }
    }
}

impl From<AppointmentError> for AppError {
    fn from(err: AppointmentError) -> Self {
        let message = err.to_string();
        match err {
            AppointmentError::NotFound | AppointmentError::DoctorNotFound => AppError::NotFound(message),
            AppointmentError::Validation(msg) => AppError::ValidationError(msg),
            AppointmentError::PastTime => AppError::ValidationError(message),
            AppointmentError::SlotTaken | AppointmentError::Conflict => AppError::Conflict(message),
            AppointmentError::InvalidTransition { .. } => AppError::InvalidTransition(message),
            AppointmentError::PermissionDenied(msg) => AppError::Forbidden(msg),
            AppointmentError::DoctorUnavailable | AppointmentError::NoScheduleForDay => AppError::Unavailable(message),
            AppointmentError::Store(DbError::NotFound(_)) => AppError::NotFound(message),
            AppointmentError::Store(_) => AppError::Database(message),
        }
    }
}
