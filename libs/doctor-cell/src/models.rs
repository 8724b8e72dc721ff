use std::fmt;

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc, Weekday};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use shared_database::DbError;
use shared_models::error::AppError;
use shared_models::time::hhmm;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doctor {
    pub id: Uuid,
    /// Identity-provider user the doctor signs in as.
    pub user_id: Uuid,
    pub name: String,
    pub specialty: String,
    pub consultation_fee: Decimal,
    pub is_available: bool,
    #[serde(default)]
    pub average_rating: Decimal,
    #[serde(default)]
    pub total_reviews: i32,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl DayOfWeek {
    pub const ALL: [DayOfWeek; 7] = [
        DayOfWeek::Monday,
        DayOfWeek::Tuesday,
        DayOfWeek::Wednesday,
        DayOfWeek::Thursday,
        DayOfWeek::Friday,
        DayOfWeek::Saturday,
        DayOfWeek::Sunday,
    ];

    pub fn from_date(date: NaiveDate) -> Self {
        date.weekday().into()
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "monday" => Some(DayOfWeek::Monday),
            "tuesday" => Some(DayOfWeek::Tuesday),
            "wednesday" => Some(DayOfWeek::Wednesday),
            "thursday" => Some(DayOfWeek::Thursday),
            "friday" => Some(DayOfWeek::Friday),
            "saturday" => Some(DayOfWeek::Saturday),
            "sunday" => Some(DayOfWeek::Sunday),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DayOfWeek::Monday => "monday",
            DayOfWeek::Tuesday => "tuesday",
            DayOfWeek::Wednesday => "wednesday",
            DayOfWeek::Thursday => "thursday",
            DayOfWeek::Friday => "friday",
            DayOfWeek::Saturday => "saturday",
            DayOfWeek::Sunday => "sunday",
        }
    }
}

impl From<Weekday> for DayOfWeek {
    fn from(day: Weekday) -> Self {
        match day {
            Weekday::Mon => DayOfWeek::Monday,
            Weekday::Tue => DayOfWeek::Tuesday,
            Weekday::Wed => DayOfWeek::Wednesday,
            Weekday::Thu => DayOfWeek::Thursday,
            Weekday::Fri => DayOfWeek::Friday,
            Weekday::Sat => DayOfWeek::Saturday,
            Weekday::Sun => DayOfWeek::Sunday,
        }
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Weekly recurring working window of a doctor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorSchedule {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub day_of_week: DayOfWeek,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
    pub is_available: bool,
    pub max_appointments: i32,
}

impl DoctorSchedule {
    pub fn window(&self) -> ScheduleWindow {
        ScheduleWindow {
            start_time: self.start_time,
            end_time: self.end_time,
            max_appointments: self.max_appointments,
        }
    }
}

/// Compact view of a schedule returned alongside available slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleWindow {
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
    pub max_appointments: i32,
}

fn default_true() -> bool {
    true
}

fn default_max_appointments() -> i32 {
    10
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpsertScheduleRequest {
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
    #[serde(default = "default_true")]
    pub is_available: bool,
    #[serde(default = "default_max_appointments")]
    pub max_appointments: i32,
}

/// Aggregate rating stored on the doctor row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoctorRating {
    pub average_rating: Decimal,
    pub total_reviews: i32,
}

impl Default for DoctorRating {
    fn default() -> Self {
        Self { average_rating: Decimal::ZERO, total_reviews: 0 }
    }
}

#[derive(Error, Debug)]
pub enum DoctorError {
    #[error("Doctor not found")]
    NotFound,

    #[error("No schedule for {0}")]
    ScheduleNotFound(DayOfWeek),

    #[error("Doctor has no schedule on {0}")]
    NoScheduleForDay(DayOfWeek),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error(transparent)]
    Store(#[from] DbError),
}

impl From<DoctorError> for AppError {
    fn from(err: DoctorError) -> Self {
        match err {
            DoctorError::NotFound | DoctorError::ScheduleNotFound(_) => AppError::NotFound(err.to_string()),
            DoctorError::NoScheduleForDay(_) => AppError::Unavailable(err.to_string()),
            DoctorError::Validation(msg) => AppError::ValidationError(msg),
            DoctorError::PermissionDenied(msg) => AppError::Forbidden(msg),
            DoctorError::Store(DbError::NotFound(_)) => AppError::NotFound("Doctor not found".to_string()),
            DoctorError::Store(DbError::Conflict(msg)) => AppError::Conflict(msg),
            DoctorError::Store(db) => AppError::Database(db.to_string()),
        }
    }
}
