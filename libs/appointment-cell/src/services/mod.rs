pub mod access;
pub mod availability;
pub mod booking;
pub mod feedback;
pub mod lifecycle;
pub mod memory;
pub mod notifier;
pub mod pricing;
pub mod records;
pub mod reminders;
pub mod stats;
pub mod store;
pub mod supabase;
pub mod workflow;

pub use access::{visible_to, AppointmentScope};
pub use availability::{FreeSlots, SlotAvailabilityService};
pub use booking::{BookingService, Rescheduled};
pub use feedback::FeedbackService;
pub use memory::MemoryAppointmentStore;
pub use notifier::{LogNotifier, Notifier, WebhookNotifier};
pub use records::RecordsService;
pub use stats::StatsService;
pub use store::AppointmentStore;
pub use supabase::SupabaseAppointmentStore;
pub use workflow::{AppointmentDetails, AppointmentService};
