use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};

use security_cell::ValidationService;
use shared_utils::extractor::auth_middleware;
use shared_utils::TokenService;

use crate::handlers;
use crate::services::booking::AppointmentService;

#[derive(Clone)]
pub struct AppointmentState {
    pub appointments: Arc<AppointmentService>,
    pub validator: ValidationService,
}

/// Every route sits behind the access guard.
pub fn appointment_routes(state: AppointmentState, tokens: Arc<TokenService>) -> Router {
    Router::new()
        .route("/createApointment", post(handlers::create_appointment))
        .route("/my_appointments", get(handlers::my_appointments))
        .route("/cancel/{appointment_id}", delete(handlers::cancel_appointment))
        .route_layer(middleware::from_fn_with_state(tokens, auth_middleware))
        .with_state(state)
}
