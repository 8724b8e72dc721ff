use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use uuid::Uuid;

use crate::error::AppointmentError;
use crate::models::{
    Appointment, AppointmentDocument, AppointmentFeedback, AppointmentPayment,
    AppointmentReminder,
};
use crate::services::access::AppointmentScope;

/// Persistence seam for appointments and the records hanging off them.
///
/// Implementations enforce two things the services rely on: at most one
/// active appointment per `(doctor, date, time)`, and writes that only land
/// when the stored `version` is the one the caller read.
#[async_trait]
pub trait AppointmentStore: Send + Sync {
    /// Fails with [`AppointmentError::Conflict`] when an active appointment
    /// already holds the slot.
    async fn insert(&self, appointment: &Appointment) -> Result<Appointment, AppointmentError>;

    async fn get(&self, id: Uuid) -> Result<Option<Appointment>, AppointmentError>;

    /// Replaces the stored appointment if its version still equals
    /// `appointment.version`, otherwise fails with [`AppointmentError::Conflict`].
    /// The stored copy comes back with the version bumped.
    async fn update(&self, appointment: &Appointment) -> Result<Appointment, AppointmentError>;

    async fn list(&self, scope: &AppointmentScope) -> Result<Vec<Appointment>, AppointmentError>;

    /// Start times held by active appointments of a doctor on a date.
    async fn booked_times(&self, doctor_id: Uuid, date: NaiveDate) -> Result<Vec<NaiveTime>, AppointmentError>;

    async fn get_feedback(&self, appointment_id: Uuid) -> Result<Option<AppointmentFeedback>, AppointmentError>;

    /// Upserts feedback and refreshes the doctor's aggregate rating as one unit.
    async fn save_feedback(
        &self,
        feedback: &AppointmentFeedback,
        doctor_id: Uuid,
    ) -> Result<AppointmentFeedback, AppointmentError>;

    async fn feedback_for(&self, appointment_ids: &[Uuid]) -> Result<Vec<AppointmentFeedback>, AppointmentError>;

    async fn add_document(&self, document: &AppointmentDocument) -> Result<AppointmentDocument, AppointmentError>;

    async fn documents(&self, appointment_id: Uuid) -> Result<Vec<AppointmentDocument>, AppointmentError>;

    async fn add_payment(&self, payment: &AppointmentPayment) -> Result<AppointmentPayment, AppointmentError>;

    async fn payments(&self, appointment_id: Uuid) -> Result<Vec<AppointmentPayment>, AppointmentError>;

    async fn add_reminders(&self, reminders: &[AppointmentReminder]) -> Result<(), AppointmentError>;

    async fn reminders(&self, appointment_id: Uuid) -> Result<Vec<AppointmentReminder>, AppointmentError>;
}
