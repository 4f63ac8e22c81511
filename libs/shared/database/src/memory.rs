use async_trait::async_trait;
use tokio::sync::RwLock;

use shared_models::appointment::{AppointmentRecord, AppointmentStatus, NewAppointment};
use shared_models::department::{DepartmentChanges, DepartmentRecord, NewDepartment};
use shared_models::identity::{AccountKind, IdentityRecord, NewIdentity};

use crate::store::{ClinicStore, StoreError};

#[derive(Default)]
struct Tables {
    users: Vec<IdentityRecord>,
    doctors: Vec<IdentityRecord>,
    appointments: Vec<AppointmentRecord>,
    departments: Vec<DepartmentRecord>,
    next_user_id: i64,
    next_doctor_id: i64,
    next_appointment_id: i64,
    next_department_id: i64,
}

impl Tables {
    fn identities(&self, kind: AccountKind) -> &Vec<IdentityRecord> {
        match kind {
            AccountKind::Patient => &self.users,
            AccountKind::Doctor => &self.doctors,
        }
    }

    fn identities_mut(&mut self, kind: AccountKind) -> &mut Vec<IdentityRecord> {
        match kind {
            AccountKind::Patient => &mut self.users,
            AccountKind::Doctor => &mut self.doctors,
        }
    }

    fn next_identity_id(&mut self, kind: AccountKind) -> i64 {
        let counter = match kind {
            AccountKind::Patient => &mut self.next_user_id,
            AccountKind::Doctor => &mut self.next_doctor_id,
        };
        *counter += 1;
        *counter
    }
}

/// Process-local store with the same query semantics as the PostgREST
/// tables. Like the real schema it has no uniqueness constraints.
#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every stored appointment regardless of owner.
    pub async fn appointments(&self) -> Vec<AppointmentRecord> {
        self.tables.read().await.appointments.clone()
    }

    // Each query yields once, standing in for the network round trip.
    async fn round_trip(&self) {
        tokio::task::yield_now().await;
    }
}

#[async_trait]
impl ClinicStore for InMemoryStore {
    async fn find_identities_by_email_or_phone(
        &self,
        kind: AccountKind,
        email: &str,
        phone: &str,
    ) -> Result<Vec<IdentityRecord>, StoreError> {
        self.round_trip().await;
        let tables = self.tables.read().await;
        Ok(tables
            .identities(kind)
            .iter()
            .filter(|identity| identity.email == email || identity.phone == phone)
            .cloned()
            .collect())
    }

    async fn find_identity_by_email(
        &self,
        kind: AccountKind,
        email: &str,
    ) -> Result<Option<IdentityRecord>, StoreError> {
        self.round_trip().await;
        let tables = self.tables.read().await;
        Ok(tables.identities(kind).iter().find(|identity| identity.email == email).cloned())
    }

    async fn find_identity_by_id(
        &self,
        kind: AccountKind,
        id: i64,
    ) -> Result<Option<IdentityRecord>, StoreError> {
        self.round_trip().await;
        let tables = self.tables.read().await;
        Ok(tables.identities(kind).iter().find(|identity| identity.id == id).cloned())
    }

    async fn list_identities(&self, kind: AccountKind) -> Result<Vec<IdentityRecord>, StoreError> {
        self.round_trip().await;
        Ok(self.tables.read().await.identities(kind).clone())
    }

    async fn insert_identity(&self, identity: NewIdentity) -> Result<IdentityRecord, StoreError> {
        self.round_trip().await;
        let mut tables = self.tables.write().await;
        let kind = identity.kind;
        let id = tables.next_identity_id(kind);
        let record = identity.into_record(id);
        tables.identities_mut(kind).push(record.clone());
        Ok(record)
    }

    async fn activate_identity(&self, kind: AccountKind, email: &str) -> Result<(), StoreError> {
        self.round_trip().await;
        let mut tables = self.tables.write().await;
        tables
            .identities_mut(kind)
            .iter_mut()
            .filter(|identity| identity.email == email)
            .for_each(|identity| identity.is_active = true);
        Ok(())
    }

    async fn doctor_exists(&self, doctor_id: i64) -> Result<bool, StoreError> {
        self.round_trip().await;
        let tables = self.tables.read().await;
        Ok(tables.doctors.iter().any(|doctor| doctor.id == doctor_id))
    }

    async fn insert_appointment(
        &self,
        appointment: NewAppointment,
    ) -> Result<AppointmentRecord, StoreError> {
        self.round_trip().await;
        let mut tables = self.tables.write().await;
        tables.next_appointment_id += 1;
        let record = appointment.into_record(tables.next_appointment_id);
        tables.appointments.push(record.clone());
        Ok(record)
    }

    async fn list_appointments_for_user(
        &self,
        user_id: i64,
    ) -> Result<Vec<AppointmentRecord>, StoreError> {
        self.round_trip().await;
        let tables = self.tables.read().await;
        let mut owned: Vec<AppointmentRecord> = tables
            .appointments
            .iter()
            .filter(|appointment| appointment.user_id == user_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(owned)
    }

    async fn find_appointment_for_user(
        &self,
        appointment_id: i64,
        user_id: i64,
    ) -> Result<Option<AppointmentRecord>, StoreError> {
        self.round_trip().await;
        let tables = self.tables.read().await;
        Ok(tables
            .appointments
            .iter()
            .find(|appointment| appointment.id == appointment_id && appointment.user_id == user_id)
            .cloned())
    }

    async fn set_appointment_status(
        &self,
        appointment_id: i64,
        status: AppointmentStatus,
    ) -> Result<(), StoreError> {
        self.round_trip().await;
        let mut tables = self.tables.write().await;
        if let Some(appointment) = tables
            .appointments
            .iter_mut()
            .find(|appointment| appointment.id == appointment_id)
        {
            appointment.status = status;
        }
        Ok(())
    }

    async fn find_department_by_name(
        &self,
        name: &str,
    ) -> Result<Option<DepartmentRecord>, StoreError> {
        self.round_trip().await;
        let tables = self.tables.read().await;
        Ok(tables.departments.iter().find(|department| department.name == name).cloned())
    }

    async fn find_department(&self, id: i64) -> Result<Option<DepartmentRecord>, StoreError> {
        self.round_trip().await;
        let tables = self.tables.read().await;
        Ok(tables.departments.iter().find(|department| department.id == id).cloned())
    }

    async fn list_departments(&self) -> Result<Vec<DepartmentRecord>, StoreError> {
        self.round_trip().await;
        Ok(self.tables.read().await.departments.clone())
    }

    async fn insert_department(
        &self,
        department: NewDepartment,
    ) -> Result<DepartmentRecord, StoreError> {
        self.round_trip().await;
        let mut tables = self.tables.write().await;
        tables.next_department_id += 1;
        let record = DepartmentRecord {
            id: tables.next_department_id,
            name: department.name,
            description: department.description,
            image: department.image,
        };
        tables.departments.push(record.clone());
        Ok(record)
    }

    async fn update_department(
        &self,
        id: i64,
        changes: DepartmentChanges,
    ) -> Result<(), StoreError> {
        self.round_trip().await;
        let mut tables = self.tables.write().await;
        if let Some(department) = tables.departments.iter_mut().find(|department| department.id == id) {
            changes.apply(department);
        }
        Ok(())
    }

    async fn delete_department(&self, id: i64) -> Result<(), StoreError> {
        self.round_trip().await;
        self.tables.write().await.departments.retain(|department| department.id != id);
        Ok(())
    }
}
