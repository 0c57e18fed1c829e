pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::{Appointment, AppointmentStatus, BookAppointmentRequest};
pub use services::booking::BookingService;
pub use services::conflict::ConflictCheckService;
