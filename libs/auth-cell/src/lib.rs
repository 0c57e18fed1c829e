pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use services::account::AccountService;
