mod common;

use std::sync::Arc;

use axum::{body::Body, Router};
use http::{Method, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use doctor_cell::{doctor_routes, DoctorCellState};
use shared_utils::test_utils::{JwtTestUtils, TestConfig, TestUser};

use common::seeded_store;

async fn app_for(doctor_user: &TestUser) -> (Router, Uuid) {
    let config = TestConfig::default().to_arc();
    let (store, doctor) = seeded_store(doctor_user.uuid()).await;
    let state = Arc::new(DoctorCellState::new(config, store));
    (doctor_routes(state), doctor.id)
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
    (status, body)
}

fn put_schedule(doctor_id: Uuid, weekday: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(Method::PUT)
        .uri(format!("/{}/schedules/{}", doctor_id, weekday))
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

#[tokio::test]
async fn doctor_profile_is_public() {
    let (app, doctor_id) = app_for(&TestUser::doctor("doc@example.com")).await;

    let request = Request::get(format!("/{}", doctor_id)).body(Body::empty()).unwrap();
    let (status, body) = send(app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], doctor_id.to_string());
    assert_eq!(body["consultation_fee"], "1500.00");
}

#[tokio::test]
async fn unknown_doctor_is_404() {
    let (app, _) = app_for(&TestUser::doctor("doc@example.com")).await;

    let request = Request::get(format!("/{}", Uuid::new_v4())).body(Body::empty()).unwrap();
    let (status, body) = send(app, request).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn schedules_list_uses_hh_mm() {
    let (app, doctor_id) = app_for(&TestUser::doctor("doc@example.com")).await;

    let request = Request::get(format!("/{}/schedules", doctor_id)).body(Body::empty()).unwrap();
    let (status, body) = send(app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["schedules"][0]["day_of_week"], "monday");
    assert_eq!(body["schedules"][0]["start_time"], "09:00");
    assert_eq!(body["schedules"][0]["end_time"], "10:00");
}

#[tokio::test]
async fn schedule_update_requires_a_token() {
    let (app, doctor_id) = app_for(&TestUser::doctor("doc@example.com")).await;

    let request = put_schedule(doctor_id, "tuesday", None, json!({ "start_time": "09:00", "end_time": "12:00" }));
    let (status, _) = send(app, request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn doctor_updates_own_schedule() {
    let config = TestConfig::default();
    let doctor_user = TestUser::doctor("doc@example.com");
    let (app, doctor_id) = app_for(&doctor_user).await;
    let token = JwtTestUtils::create_test_token(&doctor_user, &config.jwt_secret, None);

    let request = put_schedule(
        doctor_id,
        "Tuesday",
        Some(&token),
        json!({ "start_time": "13:00", "end_time": "17:30", "max_appointments": 6 }),
    );
    let (status, body) = send(app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["day_of_week"], "tuesday");
    assert_eq!(body["end_time"], "17:30");
    assert_eq!(body["max_appointments"], 6);
}

#[tokio::test]
async fn patient_cannot_update_schedules() {
    let config = TestConfig::default();
    let (app, doctor_id) = app_for(&TestUser::doctor("doc@example.com")).await;
    let token = JwtTestUtils::create_test_token(&TestUser::patient("pat@example.com"), &config.jwt_secret, None);

    let request = put_schedule(doctor_id, "monday", Some(&token), json!({ "start_time": "09:00", "end_time": "12:00" }));
    let (status, body) = send(app, request).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "PERMISSION_DENIED");
}

#[tokio::test]
async fn inverted_window_and_bad_weekday_are_rejected() {
    let config = TestConfig::default();
    let (app, doctor_id) = app_for(&TestUser::doctor("doc@example.com")).await;
    let token = JwtTestUtils::create_test_token(&TestUser::admin("admin@example.com"), &config.jwt_secret, None);

    let inverted = put_schedule(doctor_id, "monday", Some(&token), json!({ "start_time": "12:00", "end_time": "09:00" }));
    let (status, body) = send(app.clone(), inverted).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let bad_day = put_schedule(doctor_id, "someday", Some(&token), json!({ "start_time": "09:00", "end_time": "12:00" }));
    let (status, _) = send(app, bad_day).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
