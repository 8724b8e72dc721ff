use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{DayOfWeek, Doctor, DoctorError, DoctorRating, DoctorSchedule, UpsertScheduleRequest};

/// Persistence seam for doctors and their weekly schedules.
#[async_trait]
pub trait DoctorStore: Send + Sync {
    /// Fails with [`DoctorError::NotFound`] when no such doctor exists.
    async fn get_doctor(&self, doctor_id: Uuid) -> Result<Doctor, DoctorError>;

    async fn find_by_user(&self, user_id: Uuid) -> Result<Option<Doctor>, DoctorError>;

    async fn get_schedule(&self, doctor_id: Uuid, day: DayOfWeek) -> Result<Option<DoctorSchedule>, DoctorError>;

    async fn list_schedules(&self, doctor_id: Uuid) -> Result<Vec<DoctorSchedule>, DoctorError>;

    /// Creates or replaces the schedule for `(doctor_id, day)`.
    async fn upsert_schedule(
        &self,
        doctor_id: Uuid,
        day: DayOfWeek,
        request: &UpsertScheduleRequest,
    ) -> Result<DoctorSchedule, DoctorError>;

    async fn update_rating(&self, doctor_id: Uuid, rating: DoctorRating) -> Result<(), DoctorError>;
}
