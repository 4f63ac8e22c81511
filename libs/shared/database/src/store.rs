use async_trait::async_trait;
use thiserror::Error;

use shared_models::appointment::{AppointmentRecord, AppointmentStatus, NewAppointment};
use shared_models::department::{DepartmentChanges, DepartmentRecord, NewDepartment};
use shared_models::error::AppError;
use shared_models::identity::{AccountKind, IdentityRecord, NewIdentity};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Store request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Store API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Unexpected store payload: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid store header: {0}")]
    Header(String),

    #[error("Store returned no rows for {0}")]
    EmptyResult(&'static str),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::Internal(err.to_string())
    }
}

/// Query interface to the relational store. Every call is one round trip;
/// nothing here is transactional, so check-then-write sequences built on
/// top of it can interleave with concurrent requests.
#[async_trait]
pub trait ClinicStore: Send + Sync {
    /// Identities of `kind` whose email equals `email` or whose stored phone
    /// ciphertext equals `phone`.
    async fn find_identities_by_email_or_phone(
        &self,
        kind: AccountKind,
        email: &str,
        phone: &str,
    ) -> Result<Vec<IdentityRecord>, StoreError>;

    async fn find_identity_by_email(
        &self,
        kind: AccountKind,
        email: &str,
    ) -> Result<Option<IdentityRecord>, StoreError>;

    async fn find_identity_by_id(
        &self,
        kind: AccountKind,
        id: i64,
    ) -> Result<Option<IdentityRecord>, StoreError>;

    async fn list_identities(&self, kind: AccountKind) -> Result<Vec<IdentityRecord>, StoreError>;

    async fn insert_identity(&self, identity: NewIdentity) -> Result<IdentityRecord, StoreError>;

    /// Sets `isActive` on every identity of `kind` with this email.
    async fn activate_identity(&self, kind: AccountKind, email: &str) -> Result<(), StoreError>;

    async fn doctor_exists(&self, doctor_id: i64) -> Result<bool, StoreError>;

    async fn insert_appointment(
        &self,
        appointment: NewAppointment,
    ) -> Result<AppointmentRecord, StoreError>;

    /// Appointments owned by `user_id`, newest date first.
    async fn list_appointments_for_user(
        &self,
        user_id: i64,
    ) -> Result<Vec<AppointmentRecord>, StoreError>;

    async fn find_appointment_for_user(
        &self,
        appointment_id: i64,
        user_id: i64,
    ) -> Result<Option<AppointmentRecord>, StoreError>;

    async fn set_appointment_status(
        &self,
        appointment_id: i64,
        status: AppointmentStatus,
    ) -> Result<(), StoreError>;

    async fn find_department_by_name(
        &self,
        name: &str,
    ) -> Result<Option<DepartmentRecord>, StoreError>;

    async fn find_department(&self, id: i64) -> Result<Option<DepartmentRecord>, StoreError>;

    async fn list_departments(&self) -> Result<Vec<DepartmentRecord>, StoreError>;

    async fn insert_department(
        &self,
        department: NewDepartment,
    ) -> Result<DepartmentRecord, StoreError>;

    async fn update_department(
        &self,
        id: i64,
        changes: DepartmentChanges,
    ) -> Result<(), StoreError>;

    async fn delete_department(&self, id: i64) -> Result<(), StoreError>;
}
