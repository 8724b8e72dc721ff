pub mod caller;
pub mod memory;
pub mod rating;
pub mod schedule;
pub mod slots;
pub mod store;
pub mod supabase;

pub use caller::resolve_caller;
pub use memory::MemoryDoctorStore;
pub use schedule::ScheduleService;
pub use slots::{SlotGrid, SLOT_MINUTES};
pub use store::DoctorStore;
pub use supabase::SupabaseDoctorStore;
