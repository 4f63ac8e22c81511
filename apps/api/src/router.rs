use std::sync::Arc;

use axum::{routing::get, Router};

use appointment_cell::{appointment_routes, AppointmentService, AppointmentState};
use auth_cell::{doctor_routes, user_routes, AccountService, AuthState};
use department_cell::{department_routes, DepartmentService, DepartmentState};
use notification_cell::NotificationDispatcher;
use security_cell::{CredentialHasher, FieldCipher, ValidationService};
use shared_database::ClinicStore;
use shared_utils::TokenService;

/// Per-cell router state, all sharing one store and one set of secrets.
pub struct AppContext {
    pub auth: AuthState,
    pub appointments: AppointmentState,
    pub departments: DepartmentState,
    pub tokens: Arc<TokenService>,
}

impl AppContext {
    pub fn new(
        store: Arc<dyn ClinicStore>,
        hasher: CredentialHasher,
        cipher: Arc<FieldCipher>,
        tokens: Arc<TokenService>,
        validator: ValidationService,
        notifier: NotificationDispatcher,
    ) -> Self {
        let accounts = AccountService::new(store.clone(), hasher, cipher.clone(), tokens.clone(), notifier);

        Self {
            auth: AuthState {
                accounts: Arc::new(accounts),
                validator: validator.clone(),
            },
            appointments: AppointmentState {
                appointments: Arc::new(AppointmentService::new(store.clone(), cipher)),
                validator: validator.clone(),
            },
            departments: DepartmentState {
                departments: Arc::new(DepartmentService::new(store)),
                validator,
            },
            tokens,
        }
    }
}

pub fn create_router(context: AppContext) -> Router {
    Router::new()
        .route("/", get(|| async { "Clinic booking API is running!" }))
        .nest("/user", user_routes(context.auth.clone()))
        .nest("/doctor", doctor_routes(context.auth))
        .nest("/appointments", appointment_routes(context.appointments, context.tokens.clone()))
        .nest("/department", department_routes(context.departments, context.tokens))
}
