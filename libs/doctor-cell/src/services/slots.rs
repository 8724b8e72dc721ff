use std::iter::FusedIterator;

use chrono::{Duration, NaiveTime};

use crate::models::DoctorSchedule;

/// Spacing of bookable start times.
pub const SLOT_MINUTES: i64 = 30;

/// Ascending slot start times over the half-open window `[start, end)`.
///
/// The grid never wraps past midnight: a window whose next step would cross
/// 24:00 simply ends there. Cloning restarts from the clone point.
#[derive(Debug, Clone)]
pub struct SlotGrid {
    next: Option<NaiveTime>,
    end: NaiveTime,
    step: Duration,
}

impl SlotGrid {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self {
            next: (start < end).then_some(start),
            end,
            step: Duration::minutes(SLOT_MINUTES),
        }
    }

    pub fn for_schedule(schedule: &DoctorSchedule) -> Self {
        Self::new(schedule.start_time, schedule.end_time)
    }
}

impl Iterator for SlotGrid {
    type Item = NaiveTime;

    fn next(&mut self) -> Option<NaiveTime> {
        let current = self.next?;
        let (following, wrapped) = current.overflowing_add_signed(self.step);
        self.next = (wrapped == 0 && following < self.end).then_some(following);
        Some(current)
    }
}

impl FusedIterator for SlotGrid {}
