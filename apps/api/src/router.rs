use std::sync::Arc;

use axum::{routing::get, Router};
use tracing::{info, warn};

use appointment_cell::services::{
    AppointmentStore, LogNotifier, MemoryAppointmentStore, Notifier, SupabaseAppointmentStore,
    WebhookNotifier,
};
use appointment_cell::{appointment_routes, AppointmentCellState};
use doctor_cell::services::{DoctorStore, MemoryDoctorStore, SupabaseDoctorStore};
use doctor_cell::{doctor_routes, DoctorCellState};
use shared_config::{AppConfig, StorageBackend};
use shared_utils::clock::{ClinicTime, SystemClock};

/// Shared state of both cells, wired to the configured backends.
pub struct Cells {
    pub doctors: Arc<DoctorCellState>,
    pub appointments: Arc<AppointmentCellState>,
}

impl Cells {
    pub fn from_config(config: Arc<AppConfig>) -> Self {
        let (doctor_store, appointment_store): (Arc<dyn DoctorStore>, Arc<dyn AppointmentStore>) =
            match config.storage_backend {
                StorageBackend::Supabase => {
                    info!("Using Supabase storage at {}", config.supabase_url);
                    (
                        Arc::new(SupabaseDoctorStore::new(&config)),
                        Arc::new(SupabaseAppointmentStore::new(&config)),
                    )
                }
                StorageBackend::Memory => {
                    info!("Using in-memory storage");
                    let doctors: Arc<dyn DoctorStore> = Arc::new(MemoryDoctorStore::new());
                    let appointments = Arc::new(MemoryAppointmentStore::new(doctors.clone()));
                    (doctors, appointments)
                }
            };

        let notifier: Arc<dyn Notifier> = match &config.notifier_webhook_url {
            Some(url) => match WebhookNotifier::new(url.clone()) {
                Ok(webhook) => {
                    info!("Sending notifications to {}", url);
                    Arc::new(webhook)
                }
                Err(e) => {
                    warn!("Notification webhook unusable, logging notifications instead: {}", e);
                    Arc::new(LogNotifier)
                }
            },
            None => Arc::new(LogNotifier),
        };

        let clinic_time = ClinicTime::new(Arc::new(SystemClock), config.clinic_utc_offset_minutes);

        Self {
            doctors: Arc::new(DoctorCellState::new(config.clone(), doctor_store.clone())),
            appointments: Arc::new(AppointmentCellState::new(
                config,
                doctor_store,
                appointment_store,
                clinic_time,
                notifier,
            )),
        }
    }
}

pub fn create_router(cells: Cells) -> Router {
    Router::new()
        .route("/", get(|| async { "Hospital booking API is running!" }))
        .nest("/doctors", doctor_routes(cells.doctors))
        .nest("/appointments", appointment_routes(cells.appointments))
}
