mod common;

use std::str::FromStr;

use assert_matches::assert_matches;
use rust_decimal::Decimal;
use uuid::Uuid;

use appointment_cell::error::AppointmentError;
use appointment_cell::models::{
    Appointment, FeedbackRequest, PaymentMethod, RecordPaymentRequest,
};
use shared_models::auth::Caller;

use common::{book_request, monday, t, Clinic};

fn rating(overall: i32) -> FeedbackRequest {
    FeedbackRequest {
        overall_rating: overall,
        doctor_rating: overall,
        service_rating: 4,
        facility_rating: 4,
        comment: "Clear explanations".to_string(),
        would_recommend: true,
        wait_time_satisfactory: true,
        staff_friendly: true,
        clean_facility: true,
        improvement_suggestions: String::new(),
    }
}

/// Books `time` on Monday for `patient` and walks it to completed.
async fn completed_visit(clinic: &Clinic, patient: &Caller, time: chrono::NaiveTime) -> Appointment {
    let appointment = clinic
        .booking()
        .book(patient, book_request(clinic.doctor.id, monday(), time))
        .await
        .unwrap();
    let doctor = clinic.doctor_caller();
    let workflow = clinic.workflow();
    workflow.confirm(&doctor, appointment.id).await.unwrap();
    workflow.start(&doctor, appointment.id).await.unwrap();
    workflow.complete(&doctor, appointment.id).await.unwrap()
}

#[tokio::test]
async fn feedback_refreshes_doctor_rating() {
    let clinic = Clinic::new().await;
    let first = Caller::patient(Uuid::new_v4());
    let second = Caller::patient(Uuid::new_v4());
    let a = completed_visit(&clinic, &first, t(9, 0)).await;
    let b = completed_visit(&clinic, &second, t(9, 30)).await;

    clinic.feedback().add_feedback(&first, a.id, rating(5)).await.unwrap();
    clinic.feedback().add_feedback(&second, b.id, rating(4)).await.unwrap();

    let doctor = clinic.current_doctor().await;
    assert_eq!(doctor.average_rating, Decimal::from_str("4.50").unwrap());
    assert_eq!(doctor.total_reviews, 2);
}

#[tokio::test]
async fn re_adding_feedback_updates_in_place() {
    let clinic = Clinic::new().await;
    let patient = Caller::patient(Uuid::new_v4());
    let visit = completed_visit(&clinic, &patient, t(9, 0)).await;

    let original = clinic.feedback().add_feedback(&patient, visit.id, rating(2)).await.unwrap();
    let revised = clinic.feedback().add_feedback(&patient, visit.id, rating(5)).await.unwrap();

    assert_eq!(revised.id, original.id);
    assert_eq!(revised.created_at, original.created_at);
    assert_eq!(revised.overall_rating, 5);

    let doctor = clinic.current_doctor().await;
    assert_eq!(doctor.average_rating, Decimal::from_str("5.00").unwrap());
    assert_eq!(doctor.total_reviews, 1);
}

#[tokio::test]
async fn feedback_needs_a_completed_visit() {
    let clinic = Clinic::new().await;
    let patient = Caller::patient(Uuid::new_v4());
    let appointment = clinic
        .booking()
        .book(&patient, book_request(clinic.doctor.id, monday(), t(9, 0)))
        .await
        .unwrap();

    let result = clinic.feedback().add_feedback(&patient, appointment.id, rating(5)).await;

    assert_matches!(result, Err(AppointmentError::InvalidTransition { .. }));
}

#[tokio::test]
async fn ratings_outside_one_to_five_are_rejected() {
    let clinic = Clinic::new().await;
    let patient = Caller::patient(Uuid::new_v4());
    let visit = completed_visit(&clinic, &patient, t(9, 0)).await;

    let result = clinic.feedback().add_feedback(&patient, visit.id, rating(6)).await;

    assert_matches!(result, Err(AppointmentError::Validation(_)));
    assert_eq!(clinic.current_doctor().await.total_reviews, 0);
}

#[tokio::test]
async fn only_the_patient_leaves_feedback() {
    let clinic = Clinic::new().await;
    let visit = completed_visit(&clinic, &Caller::patient(Uuid::new_v4()), t(9, 0)).await;

    let result = clinic
        .feedback()
        .add_feedback(&Caller::admin(Uuid::new_v4()), visit.id, rating(5))
        .await;

    assert_matches!(result, Err(AppointmentError::PermissionDenied(_)));
}

#[tokio::test]
async fn stats_are_scoped_to_the_caller() {
    let clinic = Clinic::new().await;
    let first = Caller::patient(Uuid::new_v4());
    let second = Caller::patient(Uuid::new_v4());
    let visit = completed_visit(&clinic, &first, t(9, 0)).await;
    clinic
        .booking()
        .book(&second, book_request(clinic.doctor.id, monday(), t(9, 30)))
        .await
        .unwrap();

    clinic.feedback().add_feedback(&first, visit.id, rating(4)).await.unwrap();
    clinic
        .records()
        .record_payment(
            &Caller::staff(Uuid::new_v4()),
            visit.id,
            RecordPaymentRequest {
                amount: Decimal::from_str("1500.00").unwrap(),
                payment_method: PaymentMethod::Card,
                transaction_id: Some("txn-881".to_string()),
                notes: String::new(),
            },
        )
        .await
        .unwrap();

    let doctor_view = clinic.stats().stats(&clinic.doctor_caller()).await.unwrap();
    assert_eq!(doctor_view.total_appointments, 2);
    assert_eq!(doctor_view.completed_appointments, 1);
    assert_eq!(doctor_view.pending_appointments, 1);
    assert_eq!(doctor_view.upcoming_appointments, 1);
    assert_eq!(doctor_view.today_appointments, 0);
    assert_eq!(doctor_view.total_revenue, Decimal::from_str("1500.00").unwrap());
    assert_eq!(doctor_view.average_rating, Decimal::from_str("4.00").unwrap());

    let second_view = clinic.stats().stats(&second).await.unwrap();
    assert_eq!(second_view.total_appointments, 1);
    assert_eq!(second_view.total_revenue, Decimal::ZERO);
    assert_eq!(second_view.average_rating, Decimal::ZERO);

    let stranger = clinic.stats().stats(&Caller::doctor(Uuid::new_v4(), Uuid::new_v4())).await.unwrap();
    assert_eq!(stranger.total_appointments, 0);
}
