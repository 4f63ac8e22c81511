use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use security_cell::ValidationService;

use crate::handlers;
use crate::services::account::AccountService;

#[derive(Clone)]
pub struct AuthState {
    pub accounts: Arc<AccountService>,
    pub validator: ValidationService,
}

pub fn user_routes(state: AuthState) -> Router {
    Router::new()
        .route("/register", post(handlers::register_user))
        .route("/login", post(handlers::login_user))
        .route("/one_user/{id}", get(handlers::get_user))
        .route("/all_users", get(handlers::list_users))
        .route("/activate_account/{token}", get(handlers::activate_user))
        .with_state(state)
}

pub fn doctor_routes(state: AuthState) -> Router {
    Router::new()
        .route("/add", post(handlers::register_doctor))
        .route("/login", post(handlers::login_doctor))
        .route("/one_doctor/{id}", get(handlers::get_doctor))
        .route("/all_doctors", get(handlers::list_doctors))
        .route("/activate_account/{token}", get(handlers::activate_doctor))
        .with_state(state)
}
