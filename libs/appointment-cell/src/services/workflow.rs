use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use shared_models::auth::{Caller, Role};
use shared_utils::clock::ClinicTime;

use crate::error::AppointmentError;
use crate::models::{
    Appointment, AppointmentDocument, AppointmentFeedback, AppointmentPayment,
    UpdateAppointmentRequest, UpdateChargesRequest,
};
use crate::services::access::{is_owning_patient, visible_to};
use crate::services::lifecycle::{self, LifecycleAction};
use crate::services::notifier::{deliver, AppointmentEvent, Notification, Notifier};
use crate::services::pricing;
use crate::services::store::AppointmentStore;

/// An appointment with the records attached to it.
#[derive(Debug, Clone, Serialize)]
pub struct AppointmentDetails {
    #[serde(flatten)]
    pub appointment: Appointment,
    pub feedback: Option<AppointmentFeedback>,
    pub documents: Vec<AppointmentDocument>,
    pub payments: Vec<AppointmentPayment>,
}

/// Status transitions and edits of existing appointments.
#[derive(Clone)]
pub struct AppointmentService {
    appointments: Arc<dyn AppointmentStore>,
    clinic_time: ClinicTime,
    notifier: Arc<dyn Notifier>,
}

impl AppointmentService {
    pub fn new(appointments: Arc<dyn AppointmentStore>, clinic_time: ClinicTime, notifier: Arc<dyn Notifier>) -> Self {
        Self { appointments, clinic_time, notifier }
    }

    /// Loads an appointment the caller may see. Invisible appointments are
    /// reported as missing.
    pub async fn get(&self, caller: &Caller, appointment_id: Uuid) -> Result<Appointment, AppointmentError> {
        self.appointments
            .get(appointment_id)
            .await?
            .filter(|appointment| visible_to(caller, appointment))
            .ok_or(AppointmentError::NotFound)
    }

    pub async fn details(&self, caller: &Caller, appointment_id: Uuid) -> Result<AppointmentDetails, AppointmentError> {
        let appointment = self.get(caller, appointment_id).await?;
        let feedback = self.appointments.get_feedback(appointment_id).await?;
        let documents = self.appointments.documents(appointment_id).await?;
        let payments = self.appointments.payments(appointment_id).await?;

        Ok(AppointmentDetails { appointment, feedback, documents, payments })
    }

    pub async fn confirm(&self, caller: &Caller, appointment_id: Uuid) -> Result<Appointment, AppointmentError> {
        self.transition(caller, appointment_id, LifecycleAction::Confirm).await
    }

    pub async fn start(&self, caller: &Caller, appointment_id: Uuid) -> Result<Appointment, AppointmentError> {
        self.transition(caller, appointment_id, LifecycleAction::Start).await
    }

    pub async fn complete(&self, caller: &Caller, appointment_id: Uuid) -> Result<Appointment, AppointmentError> {
        self.transition(caller, appointment_id, LifecycleAction::Complete).await
    }

    pub async fn mark_no_show(&self, caller: &Caller, appointment_id: Uuid) -> Result<Appointment, AppointmentError> {
        self.transition(caller, appointment_id, LifecycleAction::NoShow).await
    }

    pub async fn cancel(&self, caller: &Caller, appointment_id: Uuid) -> Result<Appointment, AppointmentError> {
        self.transition(caller, appointment_id, LifecycleAction::Cancel).await
    }

    pub async fn update_details(
        &self,
        caller: &Caller,
        appointment_id: Uuid,
        request: UpdateAppointmentRequest,
    ) -> Result<Appointment, AppointmentError> {
        let mut appointment = self.get(caller, appointment_id).await?;
        if appointment.status.is_terminal() {
            return Err(AppointmentError::InvalidTransition {
                from: appointment.status,
                action: "update",
            });
        }

        request.apply(&mut appointment);
        pricing::recompute_total(&mut appointment);
        appointment.updated_at = self.clinic_time.now_utc();

        let updated = self.appointments.update(&appointment).await?;
        info!("Appointment {} details updated by {}", appointment_id, caller.user_id);
        Ok(updated)
    }

    pub async fn update_charges(
        &self,
        caller: &Caller,
        appointment_id: Uuid,
        request: UpdateChargesRequest,
    ) -> Result<Appointment, AppointmentError> {
        if !caller.is_staff_or_admin() {
            return Err(AppointmentError::PermissionDenied("Only clinic staff can change charges".to_string()));
        }

        let mut appointment = self.get(caller, appointment_id).await?;
        pricing::apply_charges(&mut appointment, &request)?;
        appointment.updated_at = self.clinic_time.now_utc();

        let updated = self.appointments.update(&appointment).await?;
        info!("Appointment {} total is now {}", appointment_id, updated.total_cost);
        Ok(updated)
    }

    async fn transition(
        &self,
        caller: &Caller,
        appointment_id: Uuid,
        action: LifecycleAction,
    ) -> Result<Appointment, AppointmentError> {
        let mut appointment = self.get(caller, appointment_id).await?;
        authorize(caller, &appointment, action)?;

        if action == LifecycleAction::Cancel {
            lifecycle::ensure_cancellable(&appointment, self.clinic_time.now())?;
        }

        let from = lifecycle::apply(&mut appointment, action, self.clinic_time.now_utc())?;
        let updated = self.appointments.update(&appointment).await?;
        info!("Appointment {} moved from {} to {}", updated.id, from, updated.status);

        let event = match action {
            LifecycleAction::Confirm => Some(AppointmentEvent::Confirmed),
            LifecycleAction::Cancel => Some(AppointmentEvent::Cancelled),
            LifecycleAction::Complete => Some(AppointmentEvent::Completed),
            _ => None,
        };
        if let Some(event) = event {
            deliver(self.notifier.as_ref(), Notification::new(event, &updated)).await;
        }

        Ok(updated)
    }
}

fn authorize(caller: &Caller, appointment: &Appointment, action: LifecycleAction) -> Result<(), AppointmentError> {
    let allowed = match action {
        LifecycleAction::Cancel | LifecycleAction::Reschedule => {
            is_owning_patient(caller, appointment) || caller.is_staff_or_admin()
        }
        _ => caller.role == Role::Doctor || caller.is_staff_or_admin(),
    };

    if !allowed {
        warn!("{} {} may not {} appointment {}", caller.role, caller.user_id, action.name(), appointment.id);
        return Err(AppointmentError::PermissionDenied(format!(
            "{} cannot {} this appointment",
            caller.role,
            action.name()
        )));
    }
    Ok(())
}
