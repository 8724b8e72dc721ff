use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use tracing::{debug, info, warn};
use uuid::Uuid;

use doctor_cell::models::Doctor;
use doctor_cell::services::DoctorStore;
use shared_models::auth::{Caller, Role};
use shared_utils::clock::ClinicTime;

use crate::error::AppointmentError;
use crate::models::{
    Appointment, AppointmentStatus, BookAppointmentRequest, PaymentStatus, RescheduleRequest,
    MAX_DURATION_MINUTES, MIN_DURATION_MINUTES,
};
use crate::services::access::{is_owning_patient, visible_to};
use crate::services::lifecycle::{self, LifecycleAction};
use crate::services::notifier::{deliver, AppointmentEvent, Notification, Notifier};
use crate::services::pricing;
use crate::services::reminders::default_reminders;
use crate::services::store::AppointmentStore;

/// Outcome of a reschedule: the new booking and the record it replaced.
#[derive(Debug, Clone)]
pub struct Rescheduled {
    pub appointment: Appointment,
    pub previous: Appointment,
}

/// Guards and performs the creation of appointments.
#[derive(Clone)]
pub struct BookingService {
    doctors: Arc<dyn DoctorStore>,
    appointments: Arc<dyn AppointmentStore>,
    clinic_time: ClinicTime,
    notifier: Arc<dyn Notifier>,
}

impl BookingService {
    pub fn new(
        doctors: Arc<dyn DoctorStore>,
        appointments: Arc<dyn AppointmentStore>,
        clinic_time: ClinicTime,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self { doctors, appointments, clinic_time, notifier }
    }

    /// Books a slot for the calling patient.
    pub async fn book(&self, caller: &Caller, request: BookAppointmentRequest) -> Result<Appointment, AppointmentError> {
        if caller.role != Role::Patient {
            warn!("{} {} tried to book an appointment", caller.role, caller.user_id);
            return Err(AppointmentError::PermissionDenied("Only patients can book appointments".to_string()));
        }

        let appointment = self.place(caller.user_id, request).await?;
        self.after_booking(&appointment, Notification::new(AppointmentEvent::Booked, &appointment)).await;
        Ok(appointment)
    }

    /// Moves an appointment to a new slot by booking the new slot first and
    /// then retiring the old record. A failed booking leaves the old record as it was.
    pub async fn reschedule(
        &self,
        caller: &Caller,
        appointment_id: Uuid,
        request: RescheduleRequest,
    ) -> Result<Rescheduled, AppointmentError> {
        let mut previous = self
            .appointments
            .get(appointment_id)
            .await?
            .filter(|appointment| visible_to(caller, appointment))
            .ok_or(AppointmentError::NotFound)?;

        if !is_owning_patient(caller, &previous) && !caller.is_staff_or_admin() {
            return Err(AppointmentError::PermissionDenied(
                "Only the patient or clinic staff can reschedule".to_string(),
            ));
        }
        if !LifecycleAction::Reschedule.allowed_from(previous.status) {
            return Err(AppointmentError::InvalidTransition {
                from: previous.status,
                action: LifecycleAction::Reschedule.name(),
            });
        }
        lifecycle::ensure_cancellable(&previous, self.clinic_time.now())?;

        let replacement = BookAppointmentRequest {
            doctor_id: previous.doctor_id,
            service_id: previous.service_id,
            appointment_date: request.appointment_date,
            appointment_time: request.appointment_time,
            duration_minutes: previous.duration_minutes,
            urgency: previous.urgency,
            clinical: previous.clinical.clone(),
            external_id: previous.external_id.clone(),
            referral_source: previous.referral_source.clone(),
        };
        let appointment = self.place(previous.patient_id, replacement).await?;

        lifecycle::apply(&mut previous, LifecycleAction::Reschedule, self.clinic_time.now_utc())?;
        let previous = match self.appointments.update(&previous).await {
            Ok(previous) => previous,
            Err(e) => {
                warn!("Retiring appointment {} failed, releasing new booking {}: {}", appointment_id, appointment.id, e);
                self.release(appointment).await;
                return Err(e);
            }
        };

        info!("Appointment {} rescheduled to {}", previous.id, appointment.id);
        let mut notification = Notification::new(AppointmentEvent::Rescheduled, &appointment);
        notification.previous_appointment_id = Some(previous.id);
        self.after_booking(&appointment, notification).await;

        Ok(Rescheduled { appointment, previous })
    }

    /// Runs the booking guard for `patient_id` and inserts the appointment.
    async fn place(&self, patient_id: Uuid, request: BookAppointmentRequest) -> Result<Appointment, AppointmentError> {
        if !(MIN_DURATION_MINUTES..=MAX_DURATION_MINUTES).contains(&request.duration_minutes) {
            return Err(AppointmentError::Validation(format!(
                "duration_minutes must be between {} and {}",
                MIN_DURATION_MINUTES, MAX_DURATION_MINUTES
            )));
        }

        let doctor = self.doctors.get_doctor(request.doctor_id).await?;
        self.guard(&doctor, request.appointment_date, request.appointment_time).await?;

        let now = self.clinic_time.now_utc();
        let mut appointment = Appointment {
            id: Uuid::new_v4(),
            patient_id,
            doctor_id: doctor.id,
            service_id: request.service_id,
            appointment_date: request.appointment_date,
            appointment_time: request.appointment_time,
            duration_minutes: request.duration_minutes,
            status: AppointmentStatus::Pending,
            urgency: request.urgency,
            clinical: request.clinical,
            consultation_fee: doctor.consultation_fee,
            additional_charges: Decimal::ZERO,
            discount_amount: Decimal::ZERO,
            total_cost: Decimal::ZERO,
            payment_status: PaymentStatus::Pending,
            external_id: request.external_id,
            referral_source: request.referral_source,
            created_at: now,
            updated_at: now,
            confirmed_at: None,
            started_at: None,
            completed_at: None,
            cancelled_at: None,
            version: 0,
        };
        pricing::recompute_total(&mut appointment);

        let appointment = self.appointments.insert(&appointment).await.map_err(|e| match e {
            AppointmentError::Conflict => {
                debug!("Lost the race for doctor {} at {} {}", doctor.id, request.appointment_date, request.appointment_time);
                AppointmentError::SlotTaken
            }
            other => other,
        })?;

        info!(
            "Booked appointment {} with doctor {} at {} {}",
            appointment.id, appointment.doctor_id, appointment.appointment_date, appointment.appointment_time
        );
        Ok(appointment)
    }

    /// Checks in order: doctor accepting bookings, slot in the future, slot free.
    async fn guard(&self, doctor: &Doctor, date: NaiveDate, time: NaiveTime) -> Result<(), AppointmentError> {
        if !doctor.is_available {
            return Err(AppointmentError::DoctorUnavailable);
        }
        if date.and_time(time) <= self.clinic_time.now() {
            return Err(AppointmentError::PastTime);
        }
        if self.appointments.booked_times(doctor.id, date).await?.contains(&time) {
            return Err(AppointmentError::SlotTaken);
        }
        Ok(())
    }

    async fn after_booking(&self, appointment: &Appointment, notification: Notification) {
        let reminders = default_reminders(appointment, &self.clinic_time);
        if let Err(e) = self.appointments.add_reminders(&reminders).await {
            warn!("Could not record reminders for appointment {}: {}", appointment.id, e);
        }
        deliver(self.notifier.as_ref(), notification).await;
    }

    async fn release(&self, mut appointment: Appointment) {
        let result = match lifecycle::apply(&mut appointment, LifecycleAction::Cancel, self.clinic_time.now_utc()) {
            Ok(_) => self.appointments.update(&appointment).await.map(|_| ()),
            Err(e) => Err(e),
        };
        if let Err(e) = result {
            warn!("Could not release appointment {}: {}", appointment.id, e);
        }
    }
}
