pub mod lifecycle;
pub mod reschedule;

pub use lifecycle::AppointmentLifecycleService;
