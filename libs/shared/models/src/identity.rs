use std::fmt;

use serde::{Deserialize, Serialize};

pub const DEFAULT_ROLE: &str = "user";
pub const ADMIN_ROLE: &str = "admin";

/// The two account variants. Serialized as the route segment they live
/// under (`user` / `doctor`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccountKind {
    #[serde(rename = "user")]
    Patient,
    #[serde(rename = "doctor")]
    Doctor,
}

impl AccountKind {
    pub fn path_segment(&self) -> &'static str {
        match self {
            AccountKind::Patient => "user",
            AccountKind::Doctor => "doctor",
        }
    }

    pub fn table(&self) -> &'static str {
        match self {
            AccountKind::Patient => "users",
            AccountKind::Doctor => "doctors",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AccountKind::Patient => "User",
            AccountKind::Doctor => "Doctor",
        }
    }
}

impl fmt::Display for AccountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path_segment())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoctorProfile {
    pub specialty: String,
    pub description: String,
    pub experience_years: i32,
    pub image: Option<String>,
}

/// A persisted patient or doctor. `phone` is ciphertext and
/// `password_hash` a PHC string; neither leaves the service layer as is.
#[derive(Debug, Clone, PartialEq)]
pub struct IdentityRecord {
    pub id: i64,
    pub kind: AccountKind,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password_hash: String,
    pub is_active: bool,
    pub role: Option<String>,
    pub doctor: Option<DoctorProfile>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewIdentity {
    pub kind: AccountKind,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password_hash: String,
    pub role: Option<String>,
    pub doctor: Option<DoctorProfile>,
}

impl NewIdentity {
    /// Materializes the row the store would hold after insert: inactive,
    /// with patients defaulting to the non-admin role.
    pub fn into_record(self, id: i64) -> IdentityRecord {
        let role = match self.kind {
            AccountKind::Patient => Some(self.role.unwrap_or_else(|| DEFAULT_ROLE.to_string())),
            AccountKind::Doctor => None,
        };

        IdentityRecord {
            id,
            kind: self.kind,
            name: self.name,
            email: self.email,
            phone: self.phone,
            password_hash: self.password_hash,
            is_active: false,
            role,
            doctor: self.doctor,
        }
    }
}
