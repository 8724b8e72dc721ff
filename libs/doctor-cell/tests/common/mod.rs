#![allow(dead_code)]

use std::sync::Arc;

use chrono::NaiveTime;
use rust_decimal::Decimal;
use uuid::Uuid;

use doctor_cell::models::{DayOfWeek, Doctor, UpsertScheduleRequest};
use doctor_cell::services::{DoctorStore, MemoryDoctorStore};

pub fn t(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

pub fn doctor(user_id: Uuid) -> Doctor {
    Doctor {
        id: Uuid::new_v4(),
        user_id,
        name: "Dr. Amina Yusuf".to_string(),
        specialty: "cardiology".to_string(),
        consultation_fee: Decimal::new(150000, 2),
        is_available: true,
        average_rating: Decimal::ZERO,
        total_reviews: 0,
        created_at: None,
        updated_at: None,
    }
}

pub fn window(start: NaiveTime, end: NaiveTime) -> UpsertScheduleRequest {
    UpsertScheduleRequest {
        start_time: start,
        end_time: end,
        is_available: true,
        max_appointments: 10,
    }
}

/// Store holding one doctor with a Monday 09:00-10:00 schedule.
pub async fn seeded_store(user_id: Uuid) -> (Arc<MemoryDoctorStore>, Doctor) {
    let store = Arc::new(MemoryDoctorStore::new());
    let doctor = doctor(user_id);
    store.insert_doctor(doctor.clone()).await;
    store
        .upsert_schedule(doctor.id, DayOfWeek::Monday, &window(t(9, 0), t(10, 0)))
        .await
        .unwrap();
    (store, doctor)
}
