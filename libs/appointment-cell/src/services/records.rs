use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_models::auth::Caller;
use shared_utils::clock::ClinicTime;

use crate::error::AppointmentError;
use crate::models::{
    AddDocumentRequest, AppointmentDocument, AppointmentPayment, PaymentStatus, RecordPaymentRequest,
};
use crate::services::access::visible_to;
use crate::services::pricing;
use crate::services::store::AppointmentStore;

const MAX_SETTLE_ATTEMPTS: u32 = 5;

/// Documents and payments attached to appointments.
#[derive(Clone)]
pub struct RecordsService {
    appointments: Arc<dyn AppointmentStore>,
    clinic_time: ClinicTime,
}

impl RecordsService {
    pub fn new(appointments: Arc<dyn AppointmentStore>, clinic_time: ClinicTime) -> Self {
        Self { appointments, clinic_time }
    }

    /// Attaches a reference to an already uploaded file. Anyone who can see
    /// the appointment may add one.
    pub async fn add_document(
        &self,
        caller: &Caller,
        appointment_id: Uuid,
        request: AddDocumentRequest,
    ) -> Result<AppointmentDocument, AppointmentError> {
        self.appointments
            .get(appointment_id)
            .await?
            .filter(|appointment| visible_to(caller, appointment))
            .ok_or(AppointmentError::NotFound)?;

        if request.title.trim().is_empty() {
            return Err(AppointmentError::Validation("title is required".to_string()));
        }
        if request.file_reference.trim().is_empty() {
            return Err(AppointmentError::Validation("file_reference is required".to_string()));
        }

        let document = AppointmentDocument {
            id: Uuid::new_v4(),
            appointment_id,
            document_type: request.document_type,
            title: request.title,
            description: request.description,
            file_reference: request.file_reference,
            uploaded_by: caller.user_id,
            created_at: self.clinic_time.now_utc(),
        };
        self.appointments.add_document(&document).await
    }

    /// Records a payment and moves the appointment's payment status along.
    pub async fn record_payment(
        &self,
        caller: &Caller,
        appointment_id: Uuid,
        request: RecordPaymentRequest,
    ) -> Result<AppointmentPayment, AppointmentError> {
        if !caller.is_staff_or_admin() {
            return Err(AppointmentError::PermissionDenied("Only clinic staff can record payments".to_string()));
        }
        if request.amount <= Decimal::ZERO {
            return Err(AppointmentError::Validation("amount must be positive".to_string()));
        }

        let appointment = self
            .appointments
            .get(appointment_id)
            .await?
            .ok_or(AppointmentError::NotFound)?;

        let payment = AppointmentPayment {
            id: Uuid::new_v4(),
            appointment_id: appointment.id,
            amount: request.amount,
            payment_method: request.payment_method,
            transaction_id: request.transaction_id,
            processed_by: caller.user_id,
            notes: request.notes,
            payment_date: self.clinic_time.now_utc(),
        };
        let payment = self.appointments.add_payment(&payment).await?;

        // The payment row is stored; failing the call now would invite a retry
        // that records it twice.
        match self.settle_payment_status(appointment_id).await {
            Ok(status) => {
                info!("Payment of {} recorded for appointment {} ({:?})", payment.amount, appointment_id, status)
            }
            Err(e) => warn!(
                "Payment {} recorded but payment status of appointment {} not updated: {}",
                payment.id, appointment_id, e
            ),
        }
        Ok(payment)
    }

    /// Recomputes the payment status from the recorded payments and writes it
    /// back, re-reading the appointment whenever a concurrent write wins.
    async fn settle_payment_status(&self, appointment_id: Uuid) -> Result<PaymentStatus, AppointmentError> {
        for attempt in 1..=MAX_SETTLE_ATTEMPTS {
            let mut appointment = self
                .appointments
                .get(appointment_id)
                .await?
                .ok_or(AppointmentError::NotFound)?;

            let paid: Decimal = self
                .appointments
                .payments(appointment_id)
                .await?
                .iter()
                .map(|p| p.amount)
                .sum();
            let status = pricing::payment_status(appointment.payment_status, appointment.total_cost, paid);
            if status == appointment.payment_status {
                return Ok(status);
            }

            appointment.payment_status = status;
            appointment.updated_at = self.clinic_time.now_utc();
            match self.appointments.update(&appointment).await {
                Ok(updated) => return Ok(updated.payment_status),
                Err(AppointmentError::Conflict) => {
                    debug!("Payment status write for {} lost a race (attempt {})", appointment_id, attempt);
                }
                Err(e) => return Err(e),
            }
        }

        debug!("Giving up on payment status of {} after {} attempts", appointment_id, MAX_SETTLE_ATTEMPTS);
        Err(AppointmentError::Conflict)
    }
}
