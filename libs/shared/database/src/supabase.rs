use async_trait::async_trait;
use chrono::NaiveDateTime;
use reqwest::{
    Client,
    header::{HeaderMap, HeaderValue, CONTENT_TYPE, AUTHORIZATION},
    Method,
};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::{json, Value};
use tracing::{debug, error};

use shared_config::AppConfig;
use shared_models::appointment::{
    store_timestamp, AppointmentRecord, AppointmentStatus, NewAppointment, STORE_TIMESTAMP_FORMAT,
};
use shared_models::department::{DepartmentChanges, DepartmentRecord, NewDepartment};
use shared_models::identity::{AccountKind, DoctorProfile, IdentityRecord, NewIdentity, DEFAULT_ROLE};

use crate::store::{ClinicStore, StoreError};

/// PostgREST client for the clinic tables (`users`, `doctors`,
/// `appointments`, `departments`).
pub struct SupabaseClient {
    client: Client,
    base_url: String,
    anon_key: String,
}

#[derive(Debug, Deserialize)]
struct UserRow {
    id: i64,
    name: String,
    email: String,
    phone: String,
    password: String,
    #[serde(rename = "isActive", default)]
    is_active: bool,
    role: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DoctorRow {
    id: i64,
    name: String,
    specialty: String,
    email: String,
    phone: String,
    password: String,
    image: Option<String>,
    description: String,
    experience_years: i32,
    #[serde(rename = "isActive", default)]
    is_active: bool,
}

#[derive(Debug, Deserialize)]
struct AppointmentRow {
    id: i64,
    user_id: i64,
    doctor_id: i64,
    #[serde(with = "store_timestamp")]
    date: NaiveDateTime,
    reason: String,
    status: AppointmentStatus,
}

impl From<UserRow> for IdentityRecord {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            kind: AccountKind::Patient,
            name: row.name,
            email: row.email,
            phone: row.phone,
            password_hash: row.password,
            is_active: row.is_active,
            role: row.role.or_else(|| Some(DEFAULT_ROLE.to_string())),
            doctor: None,
        }
    }
}

impl From<DoctorRow> for IdentityRecord {
    fn from(row: DoctorRow) -> Self {
        Self {
            id: row.id,
            kind: AccountKind::Doctor,
            name: row.name,
            email: row.email,
            phone: row.phone,
            password_hash: row.password,
            is_active: row.is_active,
            role: None,
            doctor: Some(DoctorProfile {
                specialty: row.specialty,
                description: row.description,
                experience_years: row.experience_years,
                image: row.image,
            }),
        }
    }
}

impl From<AppointmentRow> for AppointmentRecord {
    fn from(row: AppointmentRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            doctor_id: row.doctor_id,
            date: row.date,
            reason: row.reason,
            status: row.status,
        }
    }
}

/// Quotes a value for use inside a PostgREST `or=(...)` list.
fn quoted(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    urlencoding::encode(&format!("\"{}\"", escaped)).into_owned()
}

fn eq(value: &str) -> String {
    format!("eq.{}", urlencoding::encode(value))
}

fn return_representation() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert("Prefer", HeaderValue::from_static("return=representation"));
    headers
}

impl SupabaseClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.supabase_url.trim_end_matches('/').to_string(),
            anon_key: config.supabase_anon_key.clone(),
        }
    }

    fn get_headers(&self) -> Result<HeaderMap, StoreError> {
        let mut headers = HeaderMap::new();

        let key = HeaderValue::from_str(&self.anon_key)
            .map_err(|e| StoreError::Header(e.to_string()))?;
        let bearer = HeaderValue::from_str(&format!("Bearer {}", self.anon_key))
            .map_err(|e| StoreError::Header(e.to_string()))?;

        headers.insert("apikey", key);
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        Ok(headers)
    }

    pub async fn request<T>(&self, method: Method, path: &str, body: Option<Value>) -> Result<T, StoreError>
    where
        T: DeserializeOwned,
    {
        self.request_with_headers(method, path, body, None).await
    }

    pub async fn request_with_headers<T>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        extra_headers: Option<HeaderMap>,
    ) -> Result<T, StoreError>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!("Making {} request to {}", method, url);

        let mut headers = self.get_headers()?;
        if let Some(extra) = extra_headers {
            headers.extend(extra);
        }

        let mut req = self.client.request(method, &url).headers(headers);

        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        let response = req.send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            error!("Store API error ({}): {}", status, error_text);
            return Err(StoreError::Api {
                status: status.as_u16(),
                message: error_text,
            });
        }

        let data = response.json::<T>().await?;
        Ok(data)
    }

    async fn select_identities(&self, kind: AccountKind, query: &str) -> Result<Vec<IdentityRecord>, StoreError> {
        let path = format!("/rest/v1/{}?{}", kind.table(), query);

        let records = match kind {
            AccountKind::Patient => self
                .request::<Vec<UserRow>>(Method::GET, &path, None)
                .await?
                .into_iter()
                .map(IdentityRecord::from)
                .collect(),
            AccountKind::Doctor => self
                .request::<Vec<DoctorRow>>(Method::GET, &path, None)
                .await?
                .into_iter()
                .map(IdentityRecord::from)
                .collect(),
        };

        Ok(records)
    }

    async fn select_appointments(&self, query: &str) -> Result<Vec<AppointmentRecord>, StoreError> {
        let path = format!("/rest/v1/appointments?{}", query);
        let rows: Vec<AppointmentRow> = self.request(Method::GET, &path, None).await?;
        Ok(rows.into_iter().map(AppointmentRecord::from).collect())
    }
}

#[async_trait]
impl ClinicStore for SupabaseClient {
    async fn find_identities_by_email_or_phone(
        &self,
        kind: AccountKind,
        email: &str,
        phone: &str,
    ) -> Result<Vec<IdentityRecord>, StoreError> {
        let query = format!("or=(email.eq.{},phone.eq.{})", quoted(email), quoted(phone));
        self.select_identities(kind, &query).await
    }

    async fn find_identity_by_email(
        &self,
        kind: AccountKind,
        email: &str,
    ) -> Result<Option<IdentityRecord>, StoreError> {
        let query = format!("email={}&limit=1", eq(email));
        Ok(self.select_identities(kind, &query).await?.into_iter().next())
    }

    async fn find_identity_by_id(
        &self,
        kind: AccountKind,
        id: i64,
    ) -> Result<Option<IdentityRecord>, StoreError> {
        let query = format!("id=eq.{}", id);
        Ok(self.select_identities(kind, &query).await?.into_iter().next())
    }

    async fn list_identities(&self, kind: AccountKind) -> Result<Vec<IdentityRecord>, StoreError> {
        self.select_identities(kind, "order=id.asc").await
    }

    async fn insert_identity(&self, identity: NewIdentity) -> Result<IdentityRecord, StoreError> {
        let kind = identity.kind;
        let mut payload = json!({
            "name": identity.name,
            "email": identity.email,
            "phone": identity.phone,
            "password": identity.password_hash,
            "isActive": false,
        });

        match (&identity.doctor, kind) {
            (Some(profile), AccountKind::Doctor) => {
                payload["specialty"] = json!(profile.specialty);
                payload["description"] = json!(profile.description);
                payload["experience_years"] = json!(profile.experience_years);
                payload["image"] = json!(profile.image);
            }
            (_, AccountKind::Patient) => {
                if let Some(role) = &identity.role {
                    payload["role"] = json!(role);
                }
            }
            (None, AccountKind::Doctor) => {}
        }

        let path = format!("/rest/v1/{}", kind.table());
        let rows: Vec<Value> = self
            .request_with_headers(Method::POST, &path, Some(payload), Some(return_representation()))
            .await?;
        let row = rows.into_iter().next().ok_or(StoreError::EmptyResult("identity insert"))?;

        let record = match kind {
            AccountKind::Patient => IdentityRecord::from(serde_json::from_value::<UserRow>(row)?),
            AccountKind::Doctor => IdentityRecord::from(serde_json::from_value::<DoctorRow>(row)?),
        };
        Ok(record)
    }

    async fn activate_identity(&self, kind: AccountKind, email: &str) -> Result<(), StoreError> {
        let path = format!("/rest/v1/{}?email={}", kind.table(), eq(email));
        let _: Vec<Value> = self
            .request_with_headers(
                Method::PATCH,
                &path,
                Some(json!({ "isActive": true })),
                Some(return_representation()),
            )
            .await?;
        Ok(())
    }

    async fn doctor_exists(&self, doctor_id: i64) -> Result<bool, StoreError> {
        let path = format!("/rest/v1/doctors?id=eq.{}&select=id", doctor_id);
        let rows: Vec<Value> = self.request(Method::GET, &path, None).await?;
        Ok(!rows.is_empty())
    }

    async fn insert_appointment(
        &self,
        appointment: NewAppointment,
    ) -> Result<AppointmentRecord, StoreError> {
        let payload = json!({
            "user_id": appointment.user_id,
            "doctor_id": appointment.doctor_id,
            "date": appointment.date.format(STORE_TIMESTAMP_FORMAT).to_string(),
            "reason": appointment.reason,
            "status": appointment.status,
        });

        let rows: Vec<AppointmentRow> = self
            .request_with_headers(
                Method::POST,
                "/rest/v1/appointments",
                Some(payload),
                Some(return_representation()),
            )
            .await?;

        rows.into_iter()
            .next()
            .map(AppointmentRecord::from)
            .ok_or(StoreError::EmptyResult("appointment insert"))
    }

    async fn list_appointments_for_user(
        &self,
        user_id: i64,
    ) -> Result<Vec<AppointmentRecord>, StoreError> {
        self.select_appointments(&format!("user_id=eq.{}&order=date.desc", user_id)).await
    }

    async fn find_appointment_for_user(
        &self,
        appointment_id: i64,
        user_id: i64,
    ) -> Result<Option<AppointmentRecord>, StoreError> {
        let query = format!("id=eq.{}&user_id=eq.{}", appointment_id, user_id);
        Ok(self.select_appointments(&query).await?.into_iter().next())
    }

    async fn set_appointment_status(
        &self,
        appointment_id: i64,
        status: AppointmentStatus,
    ) -> Result<(), StoreError> {
        let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);
        let _: Vec<Value> = self
            .request_with_headers(
                Method::PATCH,
                &path,
                Some(json!({ "status": status })),
                Some(return_representation()),
            )
            .await?;
        Ok(())
    }

    async fn find_department_by_name(
        &self,
        name: &str,
    ) -> Result<Option<DepartmentRecord>, StoreError> {
        let path = format!("/rest/v1/departments?name={}&limit=1", eq(name));
        let rows: Vec<DepartmentRecord> = self.request(Method::GET, &path, None).await?;
        Ok(rows.into_iter().next())
    }

    async fn find_department(&self, id: i64) -> Result<Option<DepartmentRecord>, StoreError> {
        let path = format!("/rest/v1/departments?id=eq.{}", id);
        let rows: Vec<DepartmentRecord> = self.request(Method::GET, &path, None).await?;
        Ok(rows.into_iter().next())
    }

    async fn list_departments(&self) -> Result<Vec<DepartmentRecord>, StoreError> {
        self.request(Method::GET, "/rest/v1/departments?order=id.asc", None).await
    }

    async fn insert_department(
        &self,
        department: NewDepartment,
    ) -> Result<DepartmentRecord, StoreError> {
        let rows: Vec<DepartmentRecord> = self
            .request_with_headers(
                Method::POST,
                "/rest/v1/departments",
                Some(serde_json::to_value(&department)?),
                Some(return_representation()),
            )
            .await?;
        rows.into_iter().next().ok_or(StoreError::EmptyResult("department insert"))
    }

    async fn update_department(
        &self,
        id: i64,
        changes: DepartmentChanges,
    ) -> Result<(), StoreError> {
        let path = format!("/rest/v1/departments?id=eq.{}", id);
        let _: Vec<Value> = self
            .request_with_headers(
                Method::PATCH,
                &path,
                Some(serde_json::to_value(&changes)?),
                Some(return_representation()),
            )
            .await?;
        Ok(())
    }

    async fn delete_department(&self, id: i64) -> Result<(), StoreError> {
        let path = format!("/rest/v1/departments?id=eq.{}", id);
        let _: Vec<Value> = self
            .request_with_headers(Method::DELETE, &path, None, Some(return_representation()))
            .await?;
        Ok(())
    }
}
