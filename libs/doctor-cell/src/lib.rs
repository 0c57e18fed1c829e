pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::{Doctor, DoctorProfile, DoctorStatus};
pub use services::directory::DirectoryService;
