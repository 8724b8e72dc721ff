use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use shared_models::auth::Caller;
use shared_utils::clock::ClinicTime;

use crate::error::AppointmentError;
use crate::models::{AppointmentFeedback, AppointmentStatus, FeedbackRequest};
use crate::services::access::{is_owning_patient, visible_to};
use crate::services::store::AppointmentStore;

#[derive(Clone)]
pub struct FeedbackService {
    appointments: Arc<dyn AppointmentStore>,
    clinic_time: ClinicTime,
}

fn check_rating(name: &str, value: i32) -> Result<(), AppointmentError> {
    if (1..=5).contains(&value) {
        Ok(())
    } else {
        Err(AppointmentError::Validation(format!("{} must be between 1 and 5", name)))
    }
}

impl FeedbackService {
    pub fn new(appointments: Arc<dyn AppointmentStore>, clinic_time: ClinicTime) -> Self {
        Self { appointments, clinic_time }
    }

    /// Records the patient's feedback on a completed appointment, replacing
    /// earlier feedback, and refreshes the doctor's rating.
    pub async fn add_feedback(
        &self,
        caller: &Caller,
        appointment_id: Uuid,
        request: FeedbackRequest,
    ) -> Result<AppointmentFeedback, AppointmentError> {
        let appointment = self
            .appointments
            .get(appointment_id)
            .await?
            .filter(|appointment| visible_to(caller, appointment))
            .ok_or(AppointmentError::NotFound)?;

        if !is_owning_patient(caller, &appointment) {
            return Err(AppointmentError::PermissionDenied(
                "Only the patient can leave feedback".to_string(),
            ));
        }
        if appointment.status != AppointmentStatus::Completed {
            return Err(AppointmentError::InvalidTransition {
                from: appointment.status,
                action: "add feedback to",
            });
        }

        check_rating("overall_rating", request.overall_rating)?;
        check_rating("doctor_rating", request.doctor_rating)?;
        check_rating("service_rating", request.service_rating)?;
        check_rating("facility_rating", request.facility_rating)?;

        let now = self.clinic_time.now_utc();
        let existing = self.appointments.get_feedback(appointment_id).await?;
        let feedback = AppointmentFeedback {
            id: existing.as_ref().map_or_else(Uuid::new_v4, |f| f.id),
            appointment_id,
            overall_rating: request.overall_rating,
            doctor_rating: request.doctor_rating,
            service_rating: request.service_rating,
            facility_rating: request.facility_rating,
            comment: request.comment,
            would_recommend: request.would_recommend,
            wait_time_satisfactory: request.wait_time_satisfactory,
            staff_friendly: request.staff_friendly,
            clean_facility: request.clean_facility,
            improvement_suggestions: request.improvement_suggestions,
            created_at: existing.as_ref().map_or(now, |f| f.created_at),
            updated_at: now,
        };

        let saved = self.appointments.save_feedback(&feedback, appointment.doctor_id).await?;
        info!(
            "Feedback {} for appointment {} ({}/5)",
            if existing.is_some() { "updated" } else { "added" },
            appointment_id,
            saved.overall_rating
        );
        Ok(saved)
    }
}
