mod common;

use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use assert_matches::assert_matches;
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use uuid::Uuid;

use appointment_cell::error::AppointmentError;
use appointment_cell::models::{
    AddDocumentRequest, Appointment, AppointmentDocument, AppointmentFeedback, AppointmentPayment,
    AppointmentReminder, AppointmentStatus, DocumentType, PaymentMethod, PaymentStatus, RecordPaymentRequest,
};
use appointment_cell::services::lifecycle::{self, LifecycleAction};
use appointment_cell::services::pricing;
use appointment_cell::services::{AppointmentScope, AppointmentStore, MemoryAppointmentStore, RecordsService};
use shared_models::auth::Caller;

use common::{book_request, monday, t, Clinic};

fn payment(amount: &str) -> RecordPaymentRequest {
    RecordPaymentRequest {
        amount: Decimal::from_str(amount).unwrap(),
        payment_method: PaymentMethod::Cash,
        transaction_id: None,
        notes: "front desk".to_string(),
    }
}

fn lab_report() -> AddDocumentRequest {
    AddDocumentRequest {
        document_type: DocumentType::LabReport,
        title: "Lipid panel".to_string(),
        description: String::new(),
        file_reference: "s3://clinic-docs/lipid-panel.pdf".to_string(),
    }
}

/// Lets a doctor confirm the visit and staff grant a discount just before
/// the first appointment write goes through.
struct InterleavingStore {
    inner: Arc<MemoryAppointmentStore>,
    interfered: AtomicBool,
}

impl InterleavingStore {
    fn new(inner: Arc<MemoryAppointmentStore>) -> Self {
        Self { inner, interfered: AtomicBool::new(false) }
    }

    async fn confirm_with_discount(&self, id: Uuid) {
        let mut appointment = self.inner.get(id).await.unwrap().unwrap();
        lifecycle::apply(&mut appointment, LifecycleAction::Confirm, chrono::Utc::now()).unwrap();
        appointment.discount_amount = Decimal::new(10000, 2);
        pricing::recompute_total(&mut appointment);
        self.inner.update(&appointment).await.unwrap();
    }
}

#[async_trait]
impl AppointmentStore for InterleavingStore {
    async fn insert(&self, appointment: &Appointment) -> Result<Appointment, AppointmentError> {
        self.inner.insert(appointment).await
    }

    async fn get(&self, id: Uuid) -> Result<Option<Appointment>, AppointmentError> {
        self.inner.get(id).await
    }

    async fn update(&self, appointment: &Appointment) -> Result<Appointment, AppointmentError> {
        if !self.interfered.swap(true, Ordering::SeqCst) {
            self.confirm_with_discount(appointment.id).await;
        }
        self.inner.update(appointment).await
    }

    async fn list(&self, scope: &AppointmentScope) -> Result<Vec<Appointment>, AppointmentError> {
        self.inner.list(scope).await
    }

    async fn booked_times(&self, doctor_id: Uuid, date: NaiveDate) -> Result<Vec<NaiveTime>, AppointmentError> {
        self.inner.booked_times(doctor_id, date).await
    }

    async fn get_feedback(&self, appointment_id: Uuid) -> Result<Option<AppointmentFeedback>, AppointmentError> {
        self.inner.get_feedback(appointment_id).await
    }

    async fn save_feedback(
        &self,
        feedback: &AppointmentFeedback,
        doctor_id: Uuid,
    ) -> Result<AppointmentFeedback, AppointmentError> {
        self.inner.save_feedback(feedback, doctor_id).await
    }

    async fn feedback_for(&self, appointment_ids: &[Uuid]) -> Result<Vec<AppointmentFeedback>, AppointmentError> {
        self.inner.feedback_for(appointment_ids).await
    }

    async fn add_document(&self, document: &AppointmentDocument) -> Result<AppointmentDocument, AppointmentError> {
        self.inner.add_document(document).await
    }

    async fn documents(&self, appointment_id: Uuid) -> Result<Vec<AppointmentDocument>, AppointmentError> {
        self.inner.documents(appointment_id).await
    }

    async fn add_payment(&self, payment: &AppointmentPayment) -> Result<AppointmentPayment, AppointmentError> {
        self.inner.add_payment(payment).await
    }

    async fn payments(&self, appointment_id: Uuid) -> Result<Vec<AppointmentPayment>, AppointmentError> {
        self.inner.payments(appointment_id).await
    }

    async fn add_reminders(&self, reminders: &[AppointmentReminder]) -> Result<(), AppointmentError> {
        self.inner.add_reminders(reminders).await
    }

    async fn reminders(&self, appointment_id: Uuid) -> Result<Vec<AppointmentReminder>, AppointmentError> {
        self.inner.reminders(appointment_id).await
    }
}

async fn booked(clinic: &Clinic, patient: &Caller) -> Appointment {
    clinic
        .booking()
        .book(patient, book_request(clinic.doctor.id, monday(), t(9, 0)))
        .await
        .unwrap()
}

#[tokio::test]
async fn partial_then_full_payment() {
    let clinic = Clinic::new().await;
    let appointment = booked(&clinic, &Caller::patient(Uuid::new_v4())).await;
    let staff = Caller::staff(Uuid::new_v4());

    clinic.records().record_payment(&staff, appointment.id, payment("500.00")).await.unwrap();
    let stored = clinic.appointments.get(appointment.id).await.unwrap().unwrap();
    assert_eq!(stored.payment_status, PaymentStatus::Partial);

    clinic.records().record_payment(&staff, appointment.id, payment("1000.00")).await.unwrap();
    let stored = clinic.appointments.get(appointment.id).await.unwrap().unwrap();
    assert_eq!(stored.payment_status, PaymentStatus::Paid);
    assert_eq!(clinic.appointments.payments(appointment.id).await.unwrap().len(), 2);
}

#[tokio::test]
async fn payment_survives_a_concurrent_confirmation() {
    let clinic = Clinic::new().await;
    let appointment = booked(&clinic, &Caller::patient(Uuid::new_v4())).await;
    let store = Arc::new(InterleavingStore::new(clinic.appointments.clone()));
    let records = RecordsService::new(store, clinic.clinic_time.clone());

    let recorded = records
        .record_payment(&Caller::staff(Uuid::new_v4()), appointment.id, payment("500.00"))
        .await
        .unwrap();

    assert_eq!(recorded.amount, Decimal::new(50000, 2));
    assert_eq!(clinic.appointments.payments(appointment.id).await.unwrap().len(), 1);
    let stored = clinic.appointments.get(appointment.id).await.unwrap().unwrap();
    assert_eq!(stored.status, AppointmentStatus::Confirmed);
    assert_eq!(stored.payment_status, PaymentStatus::Partial);
    assert_eq!(stored.discount_amount, Decimal::new(10000, 2));
    assert_eq!(stored.total_cost, Decimal::new(140000, 2));
}

#[tokio::test]
async fn payments_must_be_positive() {
    let clinic = Clinic::new().await;
    let appointment = booked(&clinic, &Caller::patient(Uuid::new_v4())).await;

    let result = clinic
        .records()
        .record_payment(&Caller::admin(Uuid::new_v4()), appointment.id, payment("0.00"))
        .await;

    assert_matches!(result, Err(AppointmentError::Validation(_)));
}

#[tokio::test]
async fn patients_cannot_record_payments() {
    let clinic = Clinic::new().await;
    let patient = Caller::patient(Uuid::new_v4());
    let appointment = booked(&clinic, &patient).await;

    let result = clinic.records().record_payment(&patient, appointment.id, payment("100.00")).await;

    assert_matches!(result, Err(AppointmentError::PermissionDenied(_)));
}

#[tokio::test]
async fn patient_attaches_document_to_own_appointment() {
    let clinic = Clinic::new().await;
    let patient = Caller::patient(Uuid::new_v4());
    let appointment = booked(&clinic, &patient).await;

    let document = clinic.records().add_document(&patient, appointment.id, lab_report()).await.unwrap();

    assert_eq!(document.uploaded_by, patient.user_id);
    let details = clinic.workflow().details(&clinic.doctor_caller(), appointment.id).await.unwrap();
    assert_eq!(details.documents.len(), 1);
    assert_eq!(details.documents[0].title, "Lipid panel");
}

#[tokio::test]
async fn document_needs_a_file_reference() {
    let clinic = Clinic::new().await;
    let patient = Caller::patient(Uuid::new_v4());
    let appointment = booked(&clinic, &patient).await;

    let mut request = lab_report();
    request.file_reference = "  ".to_string();
    let result = clinic.records().add_document(&patient, appointment.id, request).await;

    assert_matches!(result, Err(AppointmentError::Validation(_)));
}

#[tokio::test]
async fn strangers_cannot_attach_documents() {
    let clinic = Clinic::new().await;
    let appointment = booked(&clinic, &Caller::patient(Uuid::new_v4())).await;

    let result = clinic
        .records()
        .add_document(&Caller::patient(Uuid::new_v4()), appointment.id, lab_report())
        .await;

    assert_matches!(result, Err(AppointmentError::NotFound));
}
