use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use shared_models::appointment::{store_timestamp, AppointmentRecord, AppointmentStatus};
use shared_utils::{IntegerField, TextFields};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateAppointmentRequest {
    /// Integer, integral float or numeric string.
    pub doctor_id: Option<Value>,
    pub date: Option<String>,
    pub reason: Option<String>,
}

impl TextFields for CreateAppointmentRequest {
    const TEXT_FIELDS: &'static [&'static str] = &["date", "reason"];
}

impl CreateAppointmentRequest {
    pub fn sanitized(self) -> Self {
        Self {
            doctor_id: self.doctor_id,
            date: self.date.map(|v| v.trim().to_string()),
            reason: self.reason.map(|v| v.trim().to_string()),
        }
    }

    pub fn doctor_id(&self) -> IntegerField {
        IntegerField::read(self.doctor_id.as_ref())
    }
}

/// Booking input as the workflow sees it; any field may still be missing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookingRequest {
    pub doctor_id: Option<i64>,
    pub date: Option<String>,
    pub reason: Option<String>,
}

/// An appointment as returned to its owner, reason in plaintext.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppointmentView {
    pub id: i64,
    pub user_id: i64,
    pub doctor_id: i64,
    #[serde(serialize_with = "store_timestamp::serialize")]
    pub date: NaiveDateTime,
    pub reason: String,
    pub status: AppointmentStatus,
}

impl AppointmentView {
    pub fn from_record(record: AppointmentRecord, reason: String) -> Self {
        Self {
            id: record.id,
            user_id: record.user_id,
            doctor_id: record.doctor_id,
            date: record.date,
            reason,
            status: record.status,
        }
    }
}
