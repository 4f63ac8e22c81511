pub mod appointment;
pub mod auth;
pub mod department;
pub mod error;
pub mod identity;
