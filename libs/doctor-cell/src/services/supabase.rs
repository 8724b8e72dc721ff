use async_trait::async_trait;
use chrono::Utc;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Method;
use serde_json::json;
use tracing::{debug, error};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;
use shared_models::time::format_time;

use crate::models::{DayOfWeek, Doctor, DoctorError, DoctorRating, DoctorSchedule, UpsertScheduleRequest};
use crate::services::store::DoctorStore;

/// Doctor store backed by the `doctors` and `doctor_schedules` tables.
///
/// Requests run with the service-role key; access rules are enforced by the
/// services in front of the store.
pub struct SupabaseDoctorStore {
    supabase: SupabaseClient,
    service_key: String,
}

impl SupabaseDoctorStore {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
            service_key: config.supabase_service_key.clone(),
        }
    }

    async fn first_doctor(&self, path: &str) -> Result<Option<Doctor>, DoctorError> {
        let rows: Vec<Doctor> = self.supabase
            .request(Method::GET, path, Some(&self.service_key), None)
            .await?;
        Ok(rows.into_iter().next())
    }
}

#[async_trait]
impl DoctorStore for SupabaseDoctorStore {
    async fn get_doctor(&self, doctor_id: Uuid) -> Result<Doctor, DoctorError> {
        debug!("Fetching doctor {}", doctor_id);
        let path = format!("/rest/v1/doctors?id=eq.{}", doctor_id);
        self.first_doctor(&path).await?.ok_or(DoctorError::NotFound)
    }

    async fn find_by_user(&self, user_id: Uuid) -> Result<Option<Doctor>, DoctorError> {
        let path = format!("/rest/v1/doctors?user_id=eq.{}", user_id);
        self.first_doctor(&path).await
    }

    async fn get_schedule(&self, doctor_id: Uuid, day: DayOfWeek) -> Result<Option<DoctorSchedule>, DoctorError> {
        debug!("Fetching {} schedule for doctor {}", day, doctor_id);
        let path = format!(
            "/rest/v1/doctor_schedules?doctor_id=eq.{}&day_of_week=eq.{}",
            doctor_id, day
        );
        let rows: Vec<DoctorSchedule> = self.supabase
            .request(Method::GET, &path, Some(&self.service_key), None)
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn list_schedules(&self, doctor_id: Uuid) -> Result<Vec<DoctorSchedule>, DoctorError> {
        let path = format!("/rest/v1/doctor_schedules?doctor_id=eq.{}", doctor_id);
        let mut rows: Vec<DoctorSchedule> = self.supabase
            .request(Method::GET, &path, Some(&self.service_key), None)
            .await?;
        // day_of_week is an enum column; its text order is not the week order.
        rows.sort_by_key(|schedule| schedule.day_of_week);
        Ok(rows)
    }

    async fn upsert_schedule(
        &self,
        doctor_id: Uuid,
        day: DayOfWeek,
        request: &UpsertScheduleRequest,
    ) -> Result<DoctorSchedule, DoctorError> {
        let body = json!({
            "doctor_id": doctor_id,
            "day_of_week": day,
            "start_time": format_time(&request.start_time),
            "end_time": format_time(&request.end_time),
            "is_available": request.is_available,
            "max_appointments": request.max_appointments,
        });

        let mut headers = HeaderMap::new();
        headers.insert(
            "Prefer",
            HeaderValue::from_static("resolution=merge-duplicates,return=representation"),
        );

        let rows: Vec<DoctorSchedule> = self.supabase
            .request_with_headers(
                Method::POST,
                "/rest/v1/doctor_schedules?on_conflict=doctor_id,day_of_week",
                Some(&self.service_key),
                Some(body),
                Some(headers),
            )
            .await?;

        rows.into_iter().next().ok_or_else(|| {
            error!("Schedule upsert for doctor {} returned no rows", doctor_id);
            DoctorError::ScheduleNotFound(day)
        })
    }

    async fn update_rating(&self, doctor_id: Uuid, rating: DoctorRating) -> Result<(), DoctorError> {
        let path = format!("/rest/v1/doctors?id=eq.{}", doctor_id);
        let body = json!({
            "average_rating": rating.average_rating,
            "total_reviews": rating.total_reviews,
            "updated_at": Utc::now().to_rfc3339(),
        });

        let rows: Vec<Doctor> = self.supabase
            .request_with_headers(
                Method::PATCH,
                &path,
                Some(&self.service_key),
                Some(body),
                Some(SupabaseClient::return_representation()),
            )
            .await?;

        if rows.is_empty() {
            return Err(DoctorError::NotFound);
        }
        Ok(())
    }
}
