use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use uuid::Uuid;

use shared_models::auth::Caller;
use shared_utils::clock::ClinicTime;

use crate::error::AppointmentError;
use crate::models::{Appointment, AppointmentFeedback, AppointmentStats, AppointmentStatus, PaymentStatus};
use crate::services::access::AppointmentScope;
use crate::services::store::AppointmentStore;

/// Aggregates over the appointments a caller can see. Computed fresh on every call.
pub fn compute_stats(
    appointments: &[Appointment],
    feedback: &[AppointmentFeedback],
    today: NaiveDate,
) -> AppointmentStats {
    let count = |status: AppointmentStatus| appointments.iter().filter(|a| a.status == status).count();

    let total_revenue: Decimal = appointments
        .iter()
        .filter(|a| a.status == AppointmentStatus::Completed && a.payment_status == PaymentStatus::Paid)
        .map(|a| a.total_cost)
        .sum();

    let completed: Vec<Uuid> = appointments
        .iter()
        .filter(|a| a.status == AppointmentStatus::Completed)
        .map(|a| a.id)
        .collect();
    let ratings: Vec<i32> = feedback
        .iter()
        .filter(|f| completed.contains(&f.appointment_id))
        .map(|f| f.overall_rating)
        .collect();
    let average_rating = if ratings.is_empty() {
        Decimal::ZERO
    } else {
        let sum: i64 = ratings.iter().map(|r| i64::from(*r)).sum();
        (Decimal::from(sum) / Decimal::from(ratings.len() as i64))
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    };

    AppointmentStats {
        total_appointments: appointments.len(),
        pending_appointments: count(AppointmentStatus::Pending),
        confirmed_appointments: count(AppointmentStatus::Confirmed),
        completed_appointments: count(AppointmentStatus::Completed),
        cancelled_appointments: count(AppointmentStatus::Cancelled),
        today_appointments: appointments.iter().filter(|a| a.appointment_date == today).count(),
        upcoming_appointments: appointments
            .iter()
            .filter(|a| a.appointment_date >= today && a.status.is_active())
            .count(),
        total_revenue,
        average_rating,
    }
}

#[derive(Clone)]
pub struct StatsService {
    appointments: Arc<dyn AppointmentStore>,
    clinic_time: ClinicTime,
}

impl StatsService {
    pub fn new(appointments: Arc<dyn AppointmentStore>, clinic_time: ClinicTime) -> Self {
        Self { appointments, clinic_time }
    }

    pub async fn stats(&self, caller: &Caller) -> Result<AppointmentStats, AppointmentError> {
        let appointments = self.appointments.list(&AppointmentScope::for_caller(caller)).await?;
        let completed: Vec<Uuid> = appointments
            .iter()
            .filter(|a| a.status == AppointmentStatus::Completed)
            .map(|a| a.id)
            .collect();
        let feedback = self.appointments.feedback_for(&completed).await?;

        Ok(compute_stats(&appointments, &feedback, self.clinic_time.today()))
    }
}
