use uuid::Uuid;

use shared_models::auth::{Caller, Role};

use crate::models::Appointment;

/// The slice of appointments a caller may see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppointmentScope {
    All,
    Doctor(Uuid),
    Patient(Uuid),
    Nothing,
}

impl AppointmentScope {
    pub fn for_caller(caller: &Caller) -> Self {
        match caller.role {
            Role::Admin | Role::Staff => AppointmentScope::All,
            Role::Patient => AppointmentScope::Patient(caller.user_id),
            Role::Doctor => caller.doctor_id.map_or(AppointmentScope::Nothing, AppointmentScope::Doctor),
        }
    }

    pub fn includes(&self, appointment: &Appointment) -> bool {
        match self {
            AppointmentScope::All => true,
            AppointmentScope::Doctor(doctor_id) => appointment.doctor_id == *doctor_id,
            AppointmentScope::Patient(patient_id) => appointment.patient_id == *patient_id,
            AppointmentScope::Nothing => false,
        }
    }
}

/// Whether `caller` may see `appointment`. Every read and write goes through here.
pub fn visible_to(caller: &Caller, appointment: &Appointment) -> bool {
    AppointmentScope::for_caller(caller).includes(appointment)
}

pub fn is_owning_patient(caller: &Caller, appointment: &Appointment) -> bool {
    caller.role == Role::Patient && appointment.patient_id == caller.user_id
}
