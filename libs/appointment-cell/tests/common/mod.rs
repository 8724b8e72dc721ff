#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
use mockall::mock;
use rust_decimal::Decimal;
use uuid::Uuid;

use appointment_cell::models::{BookAppointmentRequest, ClinicalDetails, Urgency};
use appointment_cell::services::notifier::{Notification, NotifyError};
use appointment_cell::services::{
    AppointmentService, BookingService, FeedbackService, MemoryAppointmentStore, Notifier,
    RecordsService, SlotAvailabilityService, StatsService,
};
use doctor_cell::models::{DayOfWeek, Doctor, UpsertScheduleRequest};
use doctor_cell::services::{DoctorStore, MemoryDoctorStore};
use shared_utils::clock::{ClinicTime, FixedClock};

mock! {
    pub Outbox {}

    #[async_trait]
    impl Notifier for Outbox {
        async fn notify(&self, notification: &Notification) -> Result<(), NotifyError>;
    }
}

/// Notifier that keeps everything it is handed.
#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn events(&self) -> Vec<Notification> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        self.sent.lock().unwrap().push(notification.clone());
        Ok(())
    }
}

pub fn t(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

/// Sunday. The seeded doctor works Mondays.
pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2030, 1, 6).unwrap()
}

pub fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2030, 1, 7).unwrap()
}

pub fn tuesday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2030, 1, 8).unwrap()
}

pub fn book_request(doctor_id: Uuid, date: NaiveDate, time: NaiveTime) -> BookAppointmentRequest {
    BookAppointmentRequest {
        doctor_id,
        service_id: Uuid::new_v4(),
        appointment_date: date,
        appointment_time: time,
        duration_minutes: 30,
        urgency: Urgency::Routine,
        clinical: ClinicalDetails {
            symptoms: "chest pain on exertion".to_string(),
            ..ClinicalDetails::default()
        },
        external_id: None,
        referral_source: None,
    }
}

/// One doctor (fee 1500.00) working Monday 09:00-10:00, a fixed clock at
/// Sunday noon UTC and empty in-memory appointment tables.
pub struct Clinic {
    pub doctors: Arc<MemoryDoctorStore>,
    pub appointments: Arc<MemoryAppointmentStore>,
    pub clock: FixedClock,
    pub clinic_time: ClinicTime,
    pub doctor: Doctor,
    pub doctor_user_id: Uuid,
    pub notifier: Arc<RecordingNotifier>,
}

impl Clinic {
    pub async fn new() -> Self {
        let doctors = Arc::new(MemoryDoctorStore::new());
        let doctor_user_id = Uuid::new_v4();
        let doctor = Doctor {
            id: Uuid::new_v4(),
            user_id: doctor_user_id,
            name: "Dr. Amina Yusuf".to_string(),
            specialty: "cardiology".to_string(),
            consultation_fee: Decimal::new(150000, 2),
            is_available: true,
            average_rating: Decimal::ZERO,
            total_reviews: 0,
            created_at: None,
            updated_at: None,
        };
        doctors.insert_doctor(doctor.clone()).await;
        doctors
            .upsert_schedule(
                doctor.id,
                DayOfWeek::Monday,
                &UpsertScheduleRequest {
                    start_time: t(9, 0),
                    end_time: t(10, 0),
                    is_available: true,
                    max_appointments: 10,
                },
            )
            .await
            .unwrap();

        let clock = FixedClock::new(Utc.with_ymd_and_hms(2030, 1, 6, 12, 0, 0).unwrap());
        let clinic_time = ClinicTime::utc(Arc::new(clock.clone()));
        let appointments = Arc::new(MemoryAppointmentStore::new(doctors.clone()));

        Self {
            doctors,
            appointments,
            clock,
            clinic_time,
            doctor,
            doctor_user_id,
            notifier: Arc::new(RecordingNotifier::default()),
        }
    }

    pub fn booking(&self) -> BookingService {
        self.booking_with(self.notifier.clone())
    }

    pub fn booking_with(&self, notifier: Arc<dyn Notifier>) -> BookingService {
        BookingService::new(
            self.doctors.clone(),
            self.appointments.clone(),
            self.clinic_time.clone(),
            notifier,
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

    pub fn doctor_caller(&self) -> shared_models::auth::Caller {
        shared_models::auth::Caller::doctor(self.doctor_user_id, self.doctor.id)
    }

    pub async fn current_doctor(&self) -> Doctor {
        self.doctors.get_doctor(self.doctor.id).await.unwrap()
    }
}
