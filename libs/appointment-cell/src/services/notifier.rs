use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use chrono::NaiveTime;
use reqwest::Client;
use serde::Serialize;
use thiserror::Error;
use tokio::time::timeout;
use tracing::{info, warn};
use uuid::Uuid;

use shared_models::time::hhmm;

use crate::models::Appointment;

/// Upper bound on one delivery attempt.
pub const NOTIFY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentEvent {
    Booked,
    Confirmed,
    Cancelled,
    Completed,
    Rescheduled,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub event: AppointmentEvent,
    pub appointment_id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub appointment_date: NaiveDate,
    #[serde(with = "hhmm")]
    pub appointment_time: NaiveTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_appointment_id: Option<Uuid>,
}

impl Notification {
    pub fn new(event: AppointmentEvent, appointment: &Appointment) -> Self {
        Self {
            event,
            appointment_id: appointment.id,
            patient_id: appointment.patient_id,
            doctor_id: appointment.doctor_id,
            appointment_date: appointment.appointment_date,
            appointment_time: appointment.appointment_time,
            previous_appointment_id: None,
        }
    }
}

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Notification transport failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Notification endpoint answered {0}")]
    Rejected(u16),
}

/// Outbound channel for patient and doctor notifications.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notification: &Notification) -> Result<(), NotifyError>;
}

/// Writes notifications to the log. Used when no webhook is configured.
#[derive(Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        info!(
            event = ?notification.event,
            appointment_id = %notification.appointment_id,
            "Appointment notification"
        );
        Ok(())
    }
}

/// Posts notifications as JSON to a webhook that fans out email and SMS.
pub struct WebhookNotifier {
    client: Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>) -> Result<Self, NotifyError> {
        Self::with_timeout(url, NOTIFY_TIMEOUT)
    }

    pub fn with_timeout(url: impl Into<String>, request_timeout: Duration) -> Result<Self, NotifyError> {
        let client = Client::builder().timeout(request_timeout).build()?;
        Ok(Self { client, url: url.into() })
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        let response = self.client.post(&self.url).json(notification).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::Rejected(status.as_u16()));
        }
        Ok(())
    }
}

/// Sends a notification without letting a delivery failure reach the caller.
/// Gives up after [`NOTIFY_TIMEOUT`] whatever the notifier does.
pub async fn deliver(notifier: &dyn Notifier, notification: Notification) {
    match timeout(NOTIFY_TIMEOUT, notifier.notify(&notification)).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => warn!(
            "Failed to send {:?} notification for appointment {}: {}",
            notification.event, notification.appointment_id, e
        ),
        Err(_) => warn!(
            "{:?} notification for appointment {} timed out after {:?}",
            notification.event, notification.appointment_id, NOTIFY_TIMEOUT
        ),
    }
}
