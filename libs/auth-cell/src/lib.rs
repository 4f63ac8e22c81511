pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::*;
pub use router::{doctor_routes, user_routes, AuthState};
pub use services::account::AccountService;
