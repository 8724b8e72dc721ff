use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use tokio::sync::Mutex;
use tracing::{debug, error};
use uuid::Uuid;

use doctor_cell::services::rating::summarize;
use doctor_cell::services::DoctorStore;

use crate::error::AppointmentError;
use crate::models::{
    Appointment, AppointmentDocument, AppointmentFeedback, AppointmentPayment,
    AppointmentReminder,
};
use crate::services::access::AppointmentScope;
use crate::services::store::AppointmentStore;

#[derive(Default)]
struct Tables {
    appointments: HashMap<Uuid, Appointment>,
    feedback: HashMap<Uuid, AppointmentFeedback>,
    documents: Vec<AppointmentDocument>,
    payments: Vec<AppointmentPayment>,
    reminders: Vec<AppointmentReminder>,
}

impl Tables {
    fn slot_holder(&self, doctor_id: Uuid, date: NaiveDate, time: NaiveTime) -> Option<&Appointment> {
        self.appointments.values().find(|a| {
            a.status.is_active()
                && a.doctor_id == doctor_id
                && a.appointment_date == date
                && a.appointment_time == time
        })
    }

    fn overall_ratings_for(&self, doctor_id: Uuid) -> Vec<i32> {
        self.feedback
            .values()
            .filter(|f| {
                self.appointments
                    .get(&f.appointment_id)
                    .is_some_and(|a| a.doctor_id == doctor_id)
            })
            .map(|f| f.overall_rating)
            .collect()
    }
}

/// In-process appointment store.
///
/// All tables sit behind one lock, so check-and-insert and the feedback plus
/// rating write are each a single critical section.
pub struct MemoryAppointmentStore {
    tables: Mutex<Tables>,
    doctors: Arc<dyn DoctorStore>,
}

impl MemoryAppointmentStore {
    pub fn new(doctors: Arc<dyn DoctorStore>) -> Self {
        Self { tables: Mutex::new(Tables::default()), doctors }
    }
}

#[async_trait]
impl AppointmentStore for MemoryAppointmentStore {
    async fn insert(&self, appointment: &Appointment) -> Result<Appointment, AppointmentError> {
        let mut tables = self.tables.lock().await;

        if appointment.status.is_active()
            && tables
                .slot_holder(appointment.doctor_id, appointment.appointment_date, appointment.appointment_time)
                .is_some()
        {
            return Err(AppointmentError::Conflict);
        }

        tables.appointments.insert(appointment.id, appointment.clone());
        Ok(appointment.clone())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Appointment>, AppointmentError> {
        Ok(self.tables.lock().await.appointments.get(&id).cloned())
    }

    async fn update(&self, appointment: &Appointment) -> Result<Appointment, AppointmentError> {
        let mut tables = self.tables.lock().await;

        let stored = tables.appointments.get(&appointment.id).ok_or(AppointmentError::NotFound)?;
        if stored.version != appointment.version {
            debug!(
                "Stale write to appointment {}: read version {}, found {}",
                appointment.id, appointment.version, stored.version
            );
            return Err(AppointmentError::Conflict);
        }

        let mut updated = appointment.clone();
        updated.version += 1;
        tables.appointments.insert(updated.id, updated.clone());
        Ok(updated)
    }

    async fn list(&self, scope: &AppointmentScope) -> Result<Vec<Appointment>, AppointmentError> {
        let tables = self.tables.lock().await;
        let mut appointments: Vec<Appointment> = tables
            .appointments
            .values()
            .filter(|a| scope.includes(a))
            .cloned()
            .collect();
        appointments.sort_by(|a, b| b.starts_at().cmp(&a.starts_at()));
        Ok(appointments)
    }

    async fn booked_times(&self, doctor_id: Uuid, date: NaiveDate) -> Result<Vec<NaiveTime>, AppointmentError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .appointments
            .values()
            .filter(|a| a.status.is_active() && a.doctor_id == doctor_id && a.appointment_date == date)
            .map(|a| a.appointment_time)
            .collect())
    }

    async fn get_feedback(&self, appointment_id: Uuid) -> Result<Option<AppointmentFeedback>, AppointmentError> {
        Ok(self.tables.lock().await.feedback.get(&appointment_id).cloned())
    }

    async fn save_feedback(
        &self,
        feedback: &AppointmentFeedback,
        doctor_id: Uuid,
    ) -> Result<AppointmentFeedback, AppointmentError> {
        let mut tables = self.tables.lock().await;

        let previous = tables.feedback.insert(feedback.appointment_id, feedback.clone());
        let rating = summarize(&tables.overall_ratings_for(doctor_id));

        if let Err(e) = self.doctors.update_rating(doctor_id, rating).await {
            error!("Rating update for doctor {} failed, rolling back feedback: {}", doctor_id, e);
            match previous {
                Some(previous) => tables.feedback.insert(feedback.appointment_id, previous),
                None => tables.feedback.remove(&feedback.appointment_id),
            };
            return Err(e.into());
        }

        Ok(feedback.clone())
    }

    async fn feedback_for(&self, appointment_ids: &[Uuid]) -> Result<Vec<AppointmentFeedback>, AppointmentError> {
        let tables = self.tables.lock().await;
        Ok(appointment_ids
            .iter()
            .filter_map(|id| tables.feedback.get(id).cloned())
            .collect())
    }

    async fn add_document(&self, document: &AppointmentDocument) -> Result<AppointmentDocument, AppointmentError> {
        self.tables.lock().await.documents.push(document.clone());
        Ok(document.clone())
    }

    async fn documents(&self, appointment_id: Uuid) -> Result<Vec<AppointmentDocument>, AppointmentError> {
        let tables = self.tables.lock().await;
        Ok(tables.documents.iter().filter(|d| d.appointment_id == appointment_id).cloned().collect())
    }

    async fn add_payment(&self, payment: &AppointmentPayment) -> Result<AppointmentPayment, AppointmentError> {
        self.tables.lock().await.payments.push(payment.clone());
        Ok(payment.clone())
    }

    async fn payments(&self, appointment_id: Uuid) -> Result<Vec<AppointmentPayment>, AppointmentError> {
        let tables = self.tables.lock().await;
        Ok(tables.payments.iter().filter(|p| p.appointment_id == appointment_id).cloned().collect())
    }

    async fn add_reminders(&self, reminders: &[AppointmentReminder]) -> Result<(), AppointmentError> {
        self.tables.lock().await.reminders.extend_from_slice(reminders);
        Ok(())
    }

    async fn reminders(&self, appointment_id: Uuid) -> Result<Vec<AppointmentReminder>, AppointmentError> {
        let tables = self.tables.lock().await;
        Ok(tables.reminders.iter().filter(|r| r.appointment_id == appointment_id).cloned().collect())
    }
}
