use std::sync::Arc;

use doctor_cell::services::{resolve_caller, DoctorStore};
use shared_config::AppConfig;
use shared_models::auth::{Caller, User};
use shared_models::error::AppError;
use shared_utils::clock::ClinicTime;

use crate::services::{
    AppointmentService, AppointmentStore, BookingService, FeedbackService, Notifier,
    RecordsService, SlotAvailabilityService, StatsService,
};

/// Everything the appointment handlers need, shared across requests.
pub struct AppointmentCellState {
    pub config: Arc<AppConfig>,
    pub doctors: Arc<dyn DoctorStore>,
    pub appointments: Arc<dyn AppointmentStore>,
    pub clinic_time: ClinicTime,
    pub notifier: Arc<dyn Notifier>,
}

impl AppointmentCellState {
    pub fn new(
        config: Arc<AppConfig>,
        doctors: Arc<dyn DoctorStore>,
        appointments: Arc<dyn AppointmentStore>,
        clinic_time: ClinicTime,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self { config, doctors, appointments, clinic_time, notifier }
    }

    pub async fn caller(&self, user: &User) -> Result<Caller, AppError> {
        resolve_caller(self.doctors.as_ref(), user).await
    }

    pub fn booking(&self) -> BookingService {
        BookingService::new(
            self.doctors.clone(),
            self.appointments.clone(),
            self.clinic_time.clone(),
            self.notifier.clone(),
        )
    }

    pub fn workflow(&self) -> AppointmentService {
        AppointmentService::new(self.appointments.clone(), self.clinic_time.clone(), self.notifier.clone())
    }

    pub fn availability(&self) -> SlotAvailabilityService {
        SlotAvailabilityService::new(self.doctors.clone(), self.appointments.clone())
    }

    pub fn feedback(&self) -> FeedbackService {
        FeedbackService::new(self.appointments.clone(), self.clinic_time.clone())
    }

    pub fn stats(&self) -> StatsService {
        StatsService::new(self.appointments.clone(), self.clinic_time.clone())
    }

    pub fn records(&self) -> RecordsService {
        RecordsService::new(self.appointments.clone(), self.clinic_time.clone())
    }
}
