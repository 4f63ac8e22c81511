use std::sync::Arc;

use tracing::{info, instrument, warn};

use shared_database::ClinicStore;
use shared_models::auth::SessionClaims;
use shared_models::department::{DepartmentChanges, DepartmentRecord, NewDepartment};
use shared_models::error::AppError;
use shared_utils::extractor::require_admin;

/// Plain CRUD over departments. Reads are public; every mutation needs an
/// admin caller.
pub struct DepartmentService {
    store: Arc<dyn ClinicStore>,
}

impl DepartmentService {
    pub fn new(store: Arc<dyn ClinicStore>) -> Self {
        Self { store }
    }

    #[instrument(skip(self, caller, department), fields(caller = caller.id))]
    pub async fn add(
        &self,
        caller: &SessionClaims,
        department: NewDepartment,
    ) -> Result<DepartmentRecord, AppError> {
        require_admin(caller)?;

        if self.store.find_department_by_name(&department.name).await?.is_some() {
            warn!("Department {} already exists", department.name);
            return Err(AppError::DepartmentExists);
        }

        let record = self.store.insert_department(department).await?;
        info!("Department {} added", record.id);
        Ok(record)
    }

    pub async fn list(&self) -> Result<Vec<DepartmentRecord>, AppError> {
        Ok(self.store.list_departments().await?)
    }

    pub async fn get(&self, id: i64) -> Result<DepartmentRecord, AppError> {
        self.store
            .find_department(id)
            .await?
            .ok_or(AppError::DepartmentNotFound)
    }

    #[instrument(skip(self, caller, changes), fields(caller = caller.id))]
    pub async fn update(
        &self,
        caller: &SessionClaims,
        id: i64,
        changes: DepartmentChanges,
    ) -> Result<(), AppError> {
        require_admin(caller)?;

        if changes.is_empty() {
            return Err(AppError::NoFieldsToUpdate);
        }

        self.get(id).await?;

        if let Some(name) = &changes.name {
            let holder = self.store.find_department_by_name(name).await?;
            if holder.is_some_and(|department| department.id != id) {
                return Err(AppError::DepartmentExists);
            }
        }

        self.store.update_department(id, changes).await?;
        info!("Department {} updated", id);
        Ok(())
    }

    #[instrument(skip(self, caller), fields(caller = caller.id))]
    pub async fn delete(&self, caller: &SessionClaims, id: i64) -> Result<(), AppError> {
        require_admin(caller)?;

        self.get(id).await?;
        self.store.delete_department(id).await?;
        info!("Department {} deleted", id);
        Ok(())
    }
}
