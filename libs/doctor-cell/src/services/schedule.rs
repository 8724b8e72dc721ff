use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_models::auth::{Caller, Role};

use crate::models::{DayOfWeek, Doctor, DoctorError, DoctorSchedule, UpsertScheduleRequest};
use crate::services::store::DoctorStore;

#[derive(Clone)]
pub struct ScheduleService {
    store: Arc<dyn DoctorStore>,
}

impl ScheduleService {
    pub fn new(store: Arc<dyn DoctorStore>) -> Self {
        Self { store }
    }

    pub async fn get_doctor(&self, doctor_id: Uuid) -> Result<Doctor, DoctorError> {
        self.store.get_doctor(doctor_id).await
    }

    /// Schedule for one weekday, whether or not it is open.
    pub async fn get_schedule(&self, doctor_id: Uuid, day: DayOfWeek) -> Result<DoctorSchedule, DoctorError> {
        debug!("Looking up {} schedule for doctor {}", day, doctor_id);
        self.store
            .get_schedule(doctor_id, day)
            .await?
            .ok_or(DoctorError::ScheduleNotFound(day))
    }

    /// The doctor's open schedule for the weekday of `date`.
    pub async fn open_schedule(&self, doctor_id: Uuid, date: NaiveDate) -> Result<DoctorSchedule, DoctorError> {
        let doctor = self.store.get_doctor(doctor_id).await?;
        self.schedule_on(&doctor, date).await
    }

    /// Same as [`Self::open_schedule`] for a doctor already loaded.
    pub async fn schedule_on(&self, doctor: &Doctor, date: NaiveDate) -> Result<DoctorSchedule, DoctorError> {
        let day = DayOfWeek::from_date(date);
        match self.store.get_schedule(doctor.id, day).await? {
            Some(schedule) if schedule.is_available => Ok(schedule),
            _ => Err(DoctorError::NoScheduleForDay(day)),
        }
    }

    /// All schedules of a doctor, Monday first.
    pub async fn list(&self, doctor_id: Uuid) -> Result<Vec<DoctorSchedule>, DoctorError> {
        self.store.get_doctor(doctor_id).await?;
        self.store.list_schedules(doctor_id).await
    }

    pub async fn upsert(
        &self,
        caller: &Caller,
        doctor_id: Uuid,
        day: DayOfWeek,
        request: UpsertScheduleRequest,
    ) -> Result<DoctorSchedule, DoctorError> {
        self.store.get_doctor(doctor_id).await?;

        let own_schedule = caller.role == Role::Doctor && caller.doctor_id == Some(doctor_id);
        if !own_schedule && !caller.is_staff_or_admin() {
            warn!("{} {} may not edit schedules of doctor {}", caller.role, caller.user_id, doctor_id);
            return Err(DoctorError::PermissionDenied(
                "Only the doctor or clinic staff can change this schedule".to_string(),
            ));
        }

        if request.start_time >= request.end_time {
            return Err(DoctorError::Validation("start_time must be before end_time".to_string()));
        }
        if request.max_appointments < 1 {
            return Err(DoctorError::Validation("max_appointments must be at least 1".to_string()));
        }

        let schedule = self.store.upsert_schedule(doctor_id, day, &request).await?;
        info!("Schedule for doctor {} on {} set to {}-{}", doctor_id, day, schedule.start_time, schedule.end_time);
        Ok(schedule)
    }
}
