use std::collections::HashSet;
use std::iter::FusedIterator;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use tracing::debug;
use uuid::Uuid;

use doctor_cell::models::{Doctor, DoctorSchedule};
use doctor_cell::services::{DoctorStore, ScheduleService, SlotGrid};
use shared_models::time::format_time;

use crate::error::AppointmentError;
use crate::models::AvailableSlots;
use crate::services::store::AppointmentStore;

/// Free slot start times of one doctor on one date, ascending.
///
/// Lazy over the schedule grid; clones restart from where they were taken.
#[derive(Debug, Clone)]
pub struct FreeSlots {
    grid: SlotGrid,
    booked: Arc<HashSet<NaiveTime>>,
}

impl FreeSlots {
    pub fn new(grid: SlotGrid, booked: impl IntoIterator<Item = NaiveTime>) -> Self {
        Self { grid, booked: Arc::new(booked.into_iter().collect()) }
    }
}

impl Iterator for FreeSlots {
    type Item = NaiveTime;

    fn next(&mut self) -> Option<NaiveTime> {
        let booked = &self.booked;
        self.grid.by_ref().find(|slot| !booked.contains(slot))
    }
}

impl FusedIterator for FreeSlots {}

pub fn parse_date(raw: &str) -> Result<NaiveDate, AppointmentError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| AppointmentError::Validation("Invalid date format. Use YYYY-MM-DD".to_string()))
}

#[derive(Clone)]
pub struct SlotAvailabilityService {
    schedules: ScheduleService,
    appointments: Arc<dyn AppointmentStore>,
}

impl SlotAvailabilityService {
    pub fn new(doctors: Arc<dyn DoctorStore>, appointments: Arc<dyn AppointmentStore>) -> Self {
        Self { schedules: ScheduleService::new(doctors), appointments }
    }

    /// Free slots of `doctor_id` on `date` together with the doctor and
    /// the schedule they were derived from.
    pub async fn free_slots(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
    ) -> Result<(Doctor, DoctorSchedule, FreeSlots), AppointmentError> {
        let doctor = self.schedules.get_doctor(doctor_id).await?;
        let schedule = self.schedules.schedule_on(&doctor, date).await?;
        let booked = self.appointments.booked_times(doctor_id, date).await?;
        debug!("Doctor {} has {} active bookings on {}", doctor_id, booked.len(), date);

        let slots = FreeSlots::new(SlotGrid::for_schedule(&schedule), booked);
        Ok((doctor, schedule, slots))
    }

    pub async fn available_slots(&self, doctor_id: Uuid, date: NaiveDate) -> Result<AvailableSlots, AppointmentError> {
        let (doctor, schedule, slots) = self.free_slots(doctor_id, date).await?;

        Ok(AvailableSlots {
            doctor_id: doctor.id,
            doctor: doctor.name,
            date,
            available_slots: slots.map(|slot| format_time(&slot)).collect(),
            schedule: schedule.window(),
        })
    }
}
