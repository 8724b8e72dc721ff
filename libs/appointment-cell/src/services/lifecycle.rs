use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::{debug, warn};

use crate::error::AppointmentError;
use crate::models::{Appointment, AppointmentStatus};

/// Status-changing operations on an appointment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleAction {
    Confirm,
    Start,
    Complete,
    Cancel,
    NoShow,
    Reschedule,
}

impl LifecycleAction {
    pub fn name(&self) -> &'static str {
        match self {
            LifecycleAction::Confirm => "confirm",
            LifecycleAction::Start => "start",
            LifecycleAction::Complete => "complete",
            LifecycleAction::Cancel => "cancel",
            LifecycleAction::NoShow => "mark as no-show",
            LifecycleAction::Reschedule => "reschedule",
        }
    }

    pub fn target(&self) -> AppointmentStatus {
        match self {
            LifecycleAction::Confirm => AppointmentStatus::Confirmed,
            LifecycleAction::Start => AppointmentStatus::InProgress,
            LifecycleAction::Complete => AppointmentStatus::Completed,
            LifecycleAction::Cancel => AppointmentStatus::Cancelled,
            LifecycleAction::NoShow => AppointmentStatus::NoShow,
            LifecycleAction::Reschedule => AppointmentStatus::Rescheduled,
        }
    }

    pub fn allowed_from(&self, status: AppointmentStatus) -> bool {
        use AppointmentStatus::*;
        match self {
            LifecycleAction::Confirm => status == Pending,
            LifecycleAction::Start => status == Confirmed,
            LifecycleAction::Complete => status == InProgress,
            LifecycleAction::Cancel | LifecycleAction::NoShow | LifecycleAction::Reschedule => {
                matches!(status, Pending | Confirmed)
            }
        }
    }
}

/// Moves `appointment` along `action`, stamping the matching timestamp.
///
/// Returns the status it left. On error the appointment is untouched.
pub fn apply(
    appointment: &mut Appointment,
    action: LifecycleAction,
    at: DateTime<Utc>,
) -> Result<AppointmentStatus, AppointmentError> {
    let from = appointment.status;
    if !action.allowed_from(from) {
        warn!("Refusing to {} appointment {} in status {}", action.name(), appointment.id, from);
        return Err(AppointmentError::InvalidTransition { from, action: action.name() });
    }

    appointment.status = action.target();
    appointment.updated_at = at;
    match action {
        LifecycleAction::Confirm => appointment.confirmed_at = Some(at),
        LifecycleAction::Start => appointment.started_at = Some(at),
        LifecycleAction::Complete => appointment.completed_at = Some(at),
        LifecycleAction::Cancel | LifecycleAction::Reschedule => appointment.cancelled_at = Some(at),
        LifecycleAction::NoShow => {}
    }

    debug!("Appointment {}: {} -> {}", appointment.id, from, appointment.status);
    Ok(from)
}

/// Cancellation additionally requires the appointment not to have started yet.
pub fn ensure_cancellable(appointment: &Appointment, now: NaiveDateTime) -> Result<(), AppointmentError> {
    if !LifecycleAction::Cancel.allowed_from(appointment.status) {
        return Err(AppointmentError::InvalidTransition {
            from: appointment.status,
            action: LifecycleAction::Cancel.name(),
        });
    }
    if appointment.is_past(now) {
        return Err(AppointmentError::PastTime);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};
    use rust_decimal::Decimal;
    use uuid::Uuid;

    use crate::models::{ClinicalDetails, PaymentStatus, Urgency};

    fn appointment(status: AppointmentStatus) -> Appointment {
        let now = Utc::now();
        Appointment {
            id: Uuid::new_v4(),
            patient_id: Uuid::new_v4(),
            doctor_id: Uuid::new_v4(),
            service_id: Uuid::new_v4(),
            appointment_date: NaiveDate::from_ymd_opt(2030, 1, 7).unwrap(),
            appointment_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            duration_minutes: 30,
            status,
            urgency: Urgency::Routine,
            clinical: ClinicalDetails::default(),
            consultation_fee: Decimal::ZERO,
            additional_charges: Decimal::ZERO,
            discount_amount: Decimal::ZERO,
            total_cost: Decimal::ZERO,
            payment_status: PaymentStatus::Pending,
            external_id: None,
            referral_source: None,
            created_at: now,
            updated_at: now,
            confirmed_at: None,
            started_at: None,
            completed_at: None,
            cancelled_at: None,
            version: 0,
        }
    }

    #[test]
    fn happy_path_stamps_each_step() {
        let mut appt = appointment(AppointmentStatus::Pending);
        let at = Utc::now();

        assert_eq!(apply(&mut appt, LifecycleAction::Confirm, at).unwrap(), AppointmentStatus::Pending);
        assert_eq!(apply(&mut appt, LifecycleAction::Start, at).unwrap(), AppointmentStatus::Confirmed);
        assert_eq!(apply(&mut appt, LifecycleAction::Complete, at).unwrap(), AppointmentStatus::InProgress);

        assert_eq!(appt.status, AppointmentStatus::Completed);
        assert_eq!(appt.confirmed_at, Some(at));
        assert_eq!(appt.started_at, Some(at));
        assert_eq!(appt.completed_at, Some(at));
        assert_eq!(appt.cancelled_at, None);
    }

    #[test]
    fn confirming_a_cancelled_appointment_changes_nothing() {
        let mut appt = appointment(AppointmentStatus::Cancelled);
        let before = appt.clone();

        let err = apply(&mut appt, LifecycleAction::Confirm, Utc::now()).unwrap_err();
        assert!(matches!(err, AppointmentError::InvalidTransition { from: AppointmentStatus::Cancelled, .. }));
        assert_eq!(appt.status, before.status);
        assert_eq!(appt.confirmed_at, None);
        assert_eq!(appt.updated_at, before.updated_at);
    }

    #[test]
    fn complete_requires_a_started_appointment() {
        let mut appt = appointment(AppointmentStatus::Confirmed);
        assert!(apply(&mut appt, LifecycleAction::Complete, Utc::now()).is_err());
    }

    #[test]
    fn terminal_states_accept_nothing() {
        let actions = [
            LifecycleAction::Confirm,
            LifecycleAction::Start,
            LifecycleAction::Complete,
            LifecycleAction::Cancel,
            LifecycleAction::NoShow,
            LifecycleAction::Reschedule,
        ];
        for status in [
            AppointmentStatus::Completed,
            AppointmentStatus::Cancelled,
            AppointmentStatus::NoShow,
            AppointmentStatus::Rescheduled,
        ] {
            assert!(actions.iter().all(|action| !action.allowed_from(status)), "{} accepted a transition", status);
        }
    }

    #[test]
    fn cancel_in_the_past_fails_even_when_pending() {
        let appt = appointment(AppointmentStatus::Pending);
        let after_start = appt.starts_at() + chrono::Duration::minutes(1);
        let before_start = appt.starts_at() - chrono::Duration::minutes(1);

        assert!(matches!(ensure_cancellable(&appt, after_start), Err(AppointmentError::PastTime)));
        assert!(ensure_cancellable(&appt, before_start).is_ok());
    }
}
