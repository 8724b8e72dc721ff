use chrono::Duration;
use uuid::Uuid;

use shared_utils::clock::ClinicTime;

use crate::models::{Appointment, AppointmentReminder, ReminderChannel};

/// Reminders recorded for every new booking: email a day ahead, SMS an hour ahead.
pub const DEFAULT_REMINDERS: [(ReminderChannel, i32); 2] = [
    (ReminderChannel::Email, 1440),
    (ReminderChannel::Sms, 60),
];

/// Default reminders for `appointment` whose send time is still ahead of now.
pub fn default_reminders(appointment: &Appointment, clinic_time: &ClinicTime) -> Vec<AppointmentReminder> {
    let starts_at = clinic_time.to_utc(appointment.starts_at());
    let now = clinic_time.now_utc();

    DEFAULT_REMINDERS
        .iter()
        .filter_map(|(channel, minutes_before)| {
            let reminder_datetime = starts_at - Duration::minutes(i64::from(*minutes_before));
            (reminder_datetime > now).then(|| AppointmentReminder {
                id: Uuid::new_v4(),
                appointment_id: appointment.id,
                reminder_type: *channel,
                reminder_timing: *minutes_before,
                reminder_datetime,
                sent: false,
                sent_at: None,
                delivery_status: "pending".to_string(),
                created_at: now,
            })
        })
        .collect()
}
