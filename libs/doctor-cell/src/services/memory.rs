use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::models::{DayOfWeek, Doctor, DoctorError, DoctorRating, DoctorSchedule, UpsertScheduleRequest};
use crate::services::store::DoctorStore;

/// In-process doctor store used for local runs and tests.
#[derive(Default)]
pub struct MemoryDoctorStore {
    doctors: RwLock<HashMap<Uuid, Doctor>>,
    schedules: RwLock<HashMap<(Uuid, DayOfWeek), DoctorSchedule>>,
}

impl MemoryDoctorStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_doctor(&self, doctor: Doctor) {
        self.doctors.write().await.insert(doctor.id, doctor);
    }

    pub async fn set_available(&self, doctor_id: Uuid, is_available: bool) -> Result<(), DoctorError> {
        let mut doctors = self.doctors.write().await;
        let doctor = doctors.get_mut(&doctor_id).ok_or(DoctorError::NotFound)?;
        doctor.is_available = is_available;
        Ok(())
    }
}

#[async_trait]
impl DoctorStore for MemoryDoctorStore {
    async fn get_doctor(&self, doctor_id: Uuid) -> Result<Doctor, DoctorError> {
        self.doctors
            .read()
            .await
            .get(&doctor_id)
            .cloned()
            .ok_or(DoctorError::NotFound)
    }

    async fn find_by_user(&self, user_id: Uuid) -> Result<Option<Doctor>, DoctorError> {
        Ok(self
            .doctors
            .read()
            .await
            .values()
            .find(|doctor| doctor.user_id == user_id)
            .cloned())
    }

    async fn get_schedule(&self, doctor_id: Uuid, day: DayOfWeek) -> Result<Option<DoctorSchedule>, DoctorError> {
        Ok(self.schedules.read().await.get(&(doctor_id, day)).cloned())
    }

    async fn list_schedules(&self, doctor_id: Uuid) -> Result<Vec<DoctorSchedule>, DoctorError> {
        let mut schedules: Vec<DoctorSchedule> = self
            .schedules
            .read()
            .await
            .values()
            .filter(|schedule| schedule.doctor_id == doctor_id)
            .cloned()
            .collect();
        schedules.sort_by_key(|schedule| schedule.day_of_week);
        Ok(schedules)
    }

    async fn upsert_schedule(
        &self,
        doctor_id: Uuid,
        day: DayOfWeek,
        request: &UpsertScheduleRequest,
    ) -> Result<DoctorSchedule, DoctorError> {
        let mut schedules = self.schedules.write().await;
        let id = schedules
            .get(&(doctor_id, day))
            .map(|existing| existing.id)
            .unwrap_or_else(Uuid::new_v4);

        let schedule = DoctorSchedule {
            id,
            doctor_id,
            day_of_week: day,
            start_time: request.start_time,
            end_time: request.end_time,
            is_available: request.is_available,
            max_appointments: request.max_appointments,
        };
        schedules.insert((doctor_id, day), schedule.clone());
        debug!("Stored {} schedule for doctor {}", day, doctor_id);

        Ok(schedule)
    }

    async fn update_rating(&self, doctor_id: Uuid, rating: DoctorRating) -> Result<(), DoctorError> {
        let mut doctors = self.doctors.write().await;
        let doctor = doctors.get_mut(&doctor_id).ok_or(DoctorError::NotFound)?;
        doctor.average_rating = rating.average_rating;
        doctor.total_reviews = rating.total_reviews;
        doctor.updated_at = Some(Utc::now());
        Ok(())
    }
}
