use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

pub const STORE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Scheduled,
    Cancelled,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Scheduled => "scheduled",
            AppointmentStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A persisted appointment; `reason` is ciphertext.
#[derive(Debug, Clone, PartialEq)]
pub struct AppointmentRecord {
    pub id: i64,
    pub user_id: i64,
    pub doctor_id: i64,
    pub date: NaiveDateTime,
    pub reason: String,
    pub status: AppointmentStatus,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewAppointment {
    pub user_id: i64,
    pub doctor_id: i64,
    pub date: NaiveDateTime,
    pub reason: String,
    pub status: AppointmentStatus,
}

impl NewAppointment {
    pub fn into_record(self, id: i64) -> AppointmentRecord {
        AppointmentRecord {
            id,
            user_id: self.user_id,
            doctor_id: self.doctor_id,
            date: self.date,
            reason: self.reason,
            status: self.status,
        }
    }
}

/// Normalizes a submitted date to the store's UTC timestamp. Accepts RFC 3339
/// (offsets are converted to UTC), naive ISO date-times with `T` or a space,
/// and bare dates (midnight).
pub fn normalize_store_timestamp(input: &str) -> Option<NaiveDateTime> {
    let input = input.trim();

    if let Ok(with_offset) = DateTime::parse_from_rfc3339(input) {
        return Some(with_offset.with_timezone(&Utc).naive_utc());
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, format) {
            return Some(naive);
        }
    }

    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

/// Serde adapter writing `YYYY-MM-DD HH:MM:SS` and reading anything
/// `normalize_store_timestamp` understands.
pub mod store_timestamp {
    use chrono::NaiveDateTime;
    use serde::{de, Deserialize, Deserializer, Serializer};

    use super::{normalize_store_timestamp, STORE_TIMESTAMP_FORMAT};

    pub fn serialize<S>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.format(STORE_TIMESTAMP_FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        normalize_store_timestamp(&raw)
            .ok_or_else(|| de::Error::custom(format!("invalid timestamp: {}", raw)))
    }
}
