use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use doctor_cell::models::ScheduleWindow;
use shared_models::time::hhmm;

pub const MIN_DURATION_MINUTES: i32 = 15;
pub const MAX_DURATION_MINUTES: i32 = 240;

// ==============================================================================
// APPOINTMENT
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
    NoShow,
    Rescheduled,
}

impl AppointmentStatus {
    /// Active appointments hold their slot.
    pub fn is_active(&self) -> bool {
        matches!(self, AppointmentStatus::Pending | AppointmentStatus::Confirmed)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            AppointmentStatus::Completed
                | AppointmentStatus::Cancelled
                | AppointmentStatus::NoShow
                | AppointmentStatus::Rescheduled
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "pending",
            AppointmentStatus::Confirmed => "confirmed",
            AppointmentStatus::InProgress => "in_progress",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::Cancelled => "cancelled",
            AppointmentStatus::NoShow => "no_show",
            AppointmentStatus::Rescheduled => "rescheduled",
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    #[default]
    Routine,
    Urgent,
    Emergency,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Partial,
    Refunded,
}

/// Patient-supplied clinical information carried on an appointment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClinicalDetails {
    pub symptoms: String,
    pub medical_history: String,
    pub current_medications: String,
    pub allergies: String,
    pub vital_signs: Map<String, Value>,
    pub notes: String,
    pub special_requirements: String,
    pub follow_up_required: bool,
    pub follow_up_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub service_id: Uuid,
    pub appointment_date: NaiveDate,
    #[serde(with = "hhmm")]
    pub appointment_time: NaiveTime,
    pub duration_minutes: i32,
    pub status: AppointmentStatus,
    #[serde(default)]
    pub urgency: Urgency,
    #[serde(flatten)]
    pub clinical: ClinicalDetails,

    pub consultation_fee: Decimal,
    pub additional_charges: Decimal,
    pub discount_amount: Decimal,
    pub total_cost: Decimal,
    pub payment_status: PaymentStatus,

    #[serde(default)]
    pub external_id: Option<String>,
    #[serde(default)]
    pub referral_source: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub confirmed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub cancelled_at: Option<DateTime<Utc>>,

    /// Bumped by every store write; a write carrying an older value is rejected.
    #[serde(default)]
    pub version: i64,
}

impl Appointment {
    /// Clinic-local start of the appointment.
    pub fn starts_at(&self) -> NaiveDateTime {
        self.appointment_date.and_time(self.appointment_time)
    }

    pub fn is_past(&self, now: NaiveDateTime) -> bool {
        self.starts_at() < now
    }
}

fn default_duration() -> i32 {
    30
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookAppointmentRequest {
    pub doctor_id: Uuid,
    pub service_id: Uuid,
    pub appointment_date: NaiveDate,
    #[serde(with = "hhmm")]
    pub appointment_time: NaiveTime,
    #[serde(default = "default_duration")]
    pub duration_minutes: i32,
    #[serde(default)]
    pub urgency: Urgency,
    #[serde(flatten)]
    pub clinical: ClinicalDetails,
    #[serde(default)]
    pub external_id: Option<String>,
    #[serde(default)]
    pub referral_source: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RescheduleRequest {
    pub appointment_date: NaiveDate,
    #[serde(with = "hhmm")]
    pub appointment_time: NaiveTime,
}

/// Partial update of clinical fields. Date and time move only through
/// rescheduling.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdateAppointmentRequest {
    pub symptoms: Option<String>,
    pub medical_history: Option<String>,
    pub current_medications: Option<String>,
    pub allergies: Option<String>,
    pub vital_signs: Option<Map<String, Value>>,
    pub notes: Option<String>,
    pub special_requirements: Option<String>,
    pub follow_up_required: Option<bool>,
    pub follow_up_date: Option<NaiveDate>,
    pub urgency: Option<Urgency>,
}

impl UpdateAppointmentRequest {
    pub fn apply(self, appointment: &mut Appointment) {
        let clinical = &mut appointment.clinical;
        if let Some(value) = self.symptoms {
            clinical.symptoms = value;
        }
        if let Some(value) = self.medical_history {
            clinical.medical_history = value;
        }
        if let Some(value) = self.current_medications {
            clinical.current_medications = value;
        }
        if let Some(value) = self.allergies {
            clinical.allergies = value;
        }
        if let Some(value) = self.vital_signs {
            clinical.vital_signs = value;
        }
        if let Some(value) = self.notes {
            clinical.notes = value;
        }
        if let Some(value) = self.special_requirements {
            clinical.special_requirements = value;
        }
        if let Some(value) = self.follow_up_required {
            clinical.follow_up_required = value;
        }
        if self.follow_up_date.is_some() {
            clinical.follow_up_date = self.follow_up_date;
        }
        if let Some(value) = self.urgency {
            appointment.urgency = value;
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdateChargesRequest {
    pub additional_charges: Option<Decimal>,
    pub discount_amount: Option<Decimal>,
}

// ==============================================================================
// FEEDBACK
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentFeedback {
    pub id: Uuid,
    pub appointment_id: Uuid,
    pub overall_rating: i32,
    pub doctor_rating: i32,
    pub service_rating: i32,
    pub facility_rating: i32,
    #[serde(default)]
    pub comment: String,
    pub would_recommend: bool,
    pub wait_time_satisfactory: bool,
    pub staff_friendly: bool,
    pub clean_facility: bool,
    #[serde(default)]
    pub improvement_suggestions: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackRequest {
    pub overall_rating: i32,
    pub doctor_rating: i32,
    pub service_rating: i32,
    pub facility_rating: i32,
    #[serde(default)]
    pub comment: String,
    #[serde(default = "default_true")]
    pub would_recommend: bool,
    #[serde(default = "default_true")]
    pub wait_time_satisfactory: bool,
    #[serde(default = "default_true")]
    pub staff_friendly: bool,
    #[serde(default = "default_true")]
    pub clean_facility: bool,
    #[serde(default)]
    pub improvement_suggestions: String,
}

// ==============================================================================
// DOCUMENTS, PAYMENTS, REMINDERS
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    Prescription,
    LabReport,
    Xray,
    Mri,
    CtScan,
    Ultrasound,
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentDocument {
    pub id: Uuid,
    pub appointment_id: Uuid,
    pub document_type: DocumentType,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// URL or storage key of a file uploaded elsewhere.
    pub file_reference: String,
    pub uploaded_by: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddDocumentRequest {
    pub document_type: DocumentType,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub file_reference: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Card,
    BankTransfer,
    MobilePayment,
    Insurance,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentPayment {
    pub id: Uuid,
    pub appointment_id: Uuid,
    pub amount: Decimal,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub transaction_id: Option<String>,
    pub processed_by: Uuid,
    #[serde(default)]
    pub notes: String,
    pub payment_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordPaymentRequest {
    pub amount: Decimal,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub transaction_id: Option<String>,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderChannel {
    Email,
    Sms,
    Call,
    Push,
}

/// Minutes-before values a reminder may be scheduled at.
pub const REMINDER_TIMINGS: [i32; 6] = [15, 30, 60, 1440, 2880, 10080];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentReminder {
    pub id: Uuid,
    pub appointment_id: Uuid,
    pub reminder_type: ReminderChannel,
    pub reminder_timing: i32,
    pub reminder_datetime: DateTime<Utc>,
    pub sent: bool,
    #[serde(default)]
    pub sent_at: Option<DateTime<Utc>>,
    pub delivery_status: String,
    pub created_at: DateTime<Utc>,
}

// ==============================================================================
// READ MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailableSlots {
    pub doctor_id: Uuid,
    pub doctor: String,
    pub date: NaiveDate,
    pub available_slots: Vec<String>,
    pub schedule: ScheduleWindow,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentStats {
    pub total_appointments: usize,
    pub pending_appointments: usize,
    pub confirmed_appointments: usize,
    pub completed_appointments: usize,
    pub cancelled_appointments: usize,
    pub today_appointments: usize,
    pub upcoming_appointments: usize,
    pub total_revenue: Decimal,
    pub average_rating: Decimal,
}
