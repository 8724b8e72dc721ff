use std::time::{Duration, Instant};

use assert_matches::assert_matches;
use chrono::{NaiveDate, NaiveTime};
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use appointment_cell::services::notifier::{
    deliver, AppointmentEvent, Notification, NotifyError,
};
use appointment_cell::services::{Notifier, WebhookNotifier};

fn cancelled() -> Notification {
    Notification {
        event: AppointmentEvent::Cancelled,
        appointment_id: Uuid::new_v4(),
        patient_id: Uuid::new_v4(),
        doctor_id: Uuid::new_v4(),
        appointment_date: NaiveDate::from_ymd_opt(2030, 1, 7).unwrap(),
        appointment_time: NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
        previous_appointment_id: None,
    }
}

#[tokio::test]
async fn webhook_receives_the_event_as_json() {
    let server = MockServer::start().await;
    let notification = cancelled();

    Mock::given(method("POST"))
        .and(path("/hooks/appointments"))
        .and(body_partial_json(json!({
            "event": "cancelled",
            "appointment_id": notification.appointment_id,
            "appointment_time": "09:30",
        })))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&server)
        .await;

    let notifier = WebhookNotifier::new(format!("{}/hooks/appointments", server.uri())).unwrap();
    notifier.notify(&notification).await.unwrap();
}

#[tokio::test]
async fn rejected_webhook_is_an_error_but_deliver_swallows_it() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(2)
        .mount(&server)
        .await;

    let notifier = WebhookNotifier::new(server.uri()).unwrap();
    assert_matches!(notifier.notify(&cancelled()).await, Err(NotifyError::Rejected(500)));

    deliver(&notifier, cancelled()).await;
}

#[tokio::test]
async fn hung_webhook_times_out() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(120)))
        .mount(&server)
        .await;

    let notifier = WebhookNotifier::with_timeout(server.uri(), Duration::from_millis(200)).unwrap();
    let started = Instant::now();

    assert_matches!(notifier.notify(&cancelled()).await, Err(NotifyError::Transport(_)));
    assert!(started.elapsed() < Duration::from_secs(10));
}
