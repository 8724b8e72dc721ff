use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use reqwest::Method;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, error};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;
use shared_database::DbError;
use shared_models::time::hhmm;

use crate::error::AppointmentError;
use crate::models::{
    Appointment, AppointmentDocument, AppointmentFeedback, AppointmentPayment,
    AppointmentReminder,
};
use crate::services::access::AppointmentScope;
use crate::services::store::AppointmentStore;

fn to_row<T: Serialize>(value: &T) -> Result<Value, AppointmentError> {
    Ok(serde_json::to_value(value).map_err(DbError::from)?)
}

#[derive(Deserialize)]
struct BookedTime {
    #[serde(with = "hhmm")]
    appointment_time: NaiveTime,
}

/// Appointment store over PostgREST.
///
/// Slot uniqueness comes from the partial unique index on active
/// appointments; PostgREST reports a violation as 409. Updates filter on the
/// version the caller read and treat an empty result as a lost race. Feedback goes through the `submit_appointment_feedback` function so
/// that the doctor's rating is refreshed in the same transaction.
pub struct SupabaseAppointmentStore {
    supabase: SupabaseClient,
    service_key: String,
}

impl SupabaseAppointmentStore {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
            service_key: config.supabase_service_key.clone(),
        }
    }

    async fn get_rows<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, AppointmentError> {
        Ok(self.supabase
            .request(Method::GET, path, Some(&self.service_key), None)
            .await?)
    }

    async fn insert_rows<T: DeserializeOwned>(&self, table: &str, body: Value) -> Result<Vec<T>, AppointmentError> {
        let path = format!("/rest/v1/{}", table);
        Ok(self.supabase
            .request_with_headers(
                Method::POST,
                &path,
                Some(&self.service_key),
                Some(body),
                Some(SupabaseClient::return_representation()),
            )
            .await?)
    }

    async fn insert_one<T: DeserializeOwned>(&self, table: &str, body: Value) -> Result<T, AppointmentError> {
        self.insert_rows(table, body).await?.into_iter().next().ok_or_else(|| {
            error!("Insert into {} returned no rows", table);
            AppointmentError::Store(DbError::Api {
                status: 200,
                message: format!("insert into {} returned no rows", table),
            })
        })
    }
}

#[async_trait]
impl AppointmentStore for SupabaseAppointmentStore {
    async fn insert(&self, appointment: &Appointment) -> Result<Appointment, AppointmentError> {
        debug!(
            "Inserting appointment for doctor {} at {} {}",
            appointment.doctor_id, appointment.appointment_date, appointment.appointment_time
        );
        self.insert_one("appointments", to_row(appointment)?).await
    }

    async fn get(&self, id: Uuid) -> Result<Option<Appointment>, AppointmentError> {
        let path = format!("/rest/v1/appointments?id=eq.{}", id);
        Ok(self.get_rows(&path).await?.into_iter().next())
    }

    async fn update(&self, appointment: &Appointment) -> Result<Appointment, AppointmentError> {
        let mut body = to_row(appointment)?;
        if let Some(fields) = body.as_object_mut() {
            fields.remove("id");
            fields.remove("created_at");
            fields.insert("version".to_string(), json!(appointment.version + 1));
        }

        let path = format!("/rest/v1/appointments?id=eq.{}&version=eq.{}", appointment.id, appointment.version);
        let rows: Vec<Appointment> = self.supabase
            .request_with_headers(
                Method::PATCH,
                &path,
                Some(&self.service_key),
                Some(body),
                Some(SupabaseClient::return_representation()),
            )
            .await?;

        match rows.into_iter().next() {
            Some(updated) => Ok(updated),
            None => match self.get(appointment.id).await? {
                Some(current) => {
                    debug!(
                        "Stale write to appointment {}: read version {}, found {}",
                        appointment.id, appointment.version, current.version
                    );
                    Err(AppointmentError::Conflict)
                }
                None => Err(AppointmentError::NotFound),
            },
        }
    }

    async fn list(&self, scope: &AppointmentScope) -> Result<Vec<Appointment>, AppointmentError> {
        let filter = match scope {
            AppointmentScope::All => String::new(),
            AppointmentScope::Doctor(doctor_id) => format!("doctor_id=eq.{}&", doctor_id),
            AppointmentScope::Patient(patient_id) => format!("patient_id=eq.{}&", patient_id),
            AppointmentScope::Nothing => return Ok(Vec::new()),
        };
        let path = format!(
            "/rest/v1/appointments?{}order=appointment_date.desc,appointment_time.desc",
            filter
        );
        self.get_rows(&path).await
    }

    async fn booked_times(&self, doctor_id: Uuid, date: NaiveDate) -> Result<Vec<NaiveTime>, AppointmentError> {
        let path = format!(
            "/rest/v1/appointments?select=appointment_time&doctor_id=eq.{}&appointment_date=eq.{}&status=in.(pending,confirmed)",
            doctor_id, date
        );
        let rows: Vec<BookedTime> = self.get_rows(&path).await?;
        Ok(rows.into_iter().map(|row| row.appointment_time).collect())
    }

    async fn get_feedback(&self, appointment_id: Uuid) -> Result<Option<AppointmentFeedback>, AppointmentError> {
        let path = format!("/rest/v1/appointment_feedback?appointment_id=eq.{}", appointment_id);
        Ok(self.get_rows(&path).await?.into_iter().next())
    }

    async fn save_feedback(
        &self,
        feedback: &AppointmentFeedback,
        doctor_id: Uuid,
    ) -> Result<AppointmentFeedback, AppointmentError> {
        let body = json!({
            "p_doctor_id": doctor_id.to_string(),
            "p_feedback": to_row(feedback)?,
        });

        Ok(self.supabase
            .request(
                Method::POST,
                "/rest/v1/rpc/submit_appointment_feedback",
                Some(&self.service_key),
                Some(body),
            )
            .await?)
    }

    async fn feedback_for(&self, appointment_ids: &[Uuid]) -> Result<Vec<AppointmentFeedback>, AppointmentError> {
        if appointment_ids.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<String> = appointment_ids.iter().map(Uuid::to_string).collect();
        let path = format!("/rest/v1/appointment_feedback?appointment_id=in.({})", ids.join(","));
        self.get_rows(&path).await
    }

    async fn add_document(&self, document: &AppointmentDocument) -> Result<AppointmentDocument, AppointmentError> {
        self.insert_one("appointment_documents", to_row(document)?).await
    }

    async fn documents(&self, appointment_id: Uuid) -> Result<Vec<AppointmentDocument>, AppointmentError> {
        let path = format!("/rest/v1/appointment_documents?appointment_id=eq.{}&order=created_at.asc", appointment_id);
        self.get_rows(&path).await
    }

    async fn add_payment(&self, payment: &AppointmentPayment) -> Result<AppointmentPayment, AppointmentError> {
        self.insert_one("appointment_payments", to_row(payment)?).await
    }

    async fn payments(&self, appointment_id: Uuid) -> Result<Vec<AppointmentPayment>, AppointmentError> {
        let path = format!("/rest/v1/appointment_payments?appointment_id=eq.{}&order=payment_date.asc", appointment_id);
        self.get_rows(&path).await
    }

    async fn add_reminders(&self, reminders: &[AppointmentReminder]) -> Result<(), AppointmentError> {
        if reminders.is_empty() {
            return Ok(());
        }
        let _: Vec<AppointmentReminder> = self.insert_rows("appointment_reminders", to_row(&reminders)?).await?;
        Ok(())
    }

    async fn reminders(&self, appointment_id: Uuid) -> Result<Vec<AppointmentReminder>, AppointmentError> {
        let path = format!("/rest/v1/appointment_reminders?appointment_id=eq.{}&order=reminder_datetime.asc", appointment_id);
        self.get_rows(&path).await
    }
}
