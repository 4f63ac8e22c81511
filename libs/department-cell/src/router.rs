use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};

use security_cell::ValidationService;
use shared_utils::extractor::auth_middleware;
use shared_utils::TokenService;

use crate::handlers;
use crate::services::department::DepartmentService;

#[derive(Clone)]
pub struct DepartmentState {
    pub departments: Arc<DepartmentService>,
    pub validator: ValidationService,
}

pub fn department_routes(state: DepartmentState, tokens: Arc<TokenService>) -> Router {
    let public_routes = Router::new()
        .route("/all_departments", get(handlers::list_departments))
        .route("/one_department/{id}", get(handlers::get_department));

    let protected_routes = Router::new()
        .route("/add", post(handlers::add_department))
        .route("/update/{id}", put(handlers::update_department))
        .route("/delete/{id}", delete(handlers::delete_department))
        .route_layer(middleware::from_fn_with_state(tokens, auth_middleware));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}
