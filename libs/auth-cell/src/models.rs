use serde::{Deserialize, Serialize};
use serde_json::Value;

use shared_models::identity::{AccountKind, DoctorProfile};
use shared_utils::{IntegerField, TextFields};

// ==============================================================================
// REQUEST BODIES
// ==============================================================================
//
// Every field is optional so that missing values surface as validation
// messages instead of a body rejection.

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub password: Option<String>,
    #[serde(rename = "confirmPassword")]
    pub confirm_password: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterDoctorRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub password: Option<String>,
    #[serde(rename = "confirmPassword")]
    pub confirm_password: Option<String>,
    pub specialty: Option<String>,
    pub description: Option<String>,
    /// Integer, integral float or numeric string.
    pub experience_years: Option<Value>,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(rename = "emailOrPhone")]
    pub email_or_phone: Option<String>,
    pub password: Option<String>,
}

impl TextFields for RegisterUserRequest {
    const TEXT_FIELDS: &'static [&'static str] = &["name", "email", "phone", "password", "confirmPassword"];
}

impl TextFields for RegisterDoctorRequest {
    const TEXT_FIELDS: &'static [&'static str] = &[
        "name",
        "email",
        "phone",
        "password",
        "confirmPassword",
        "specialty",
        "description",
        "image",
    ];
}

impl TextFields for LoginRequest {
    const TEXT_FIELDS: &'static [&'static str] = &["emailOrPhone", "password"];
}

pub(crate) fn trimmed(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string())
}

impl RegisterUserRequest {
    pub fn sanitized(self) -> Self {
        Self {
            name: trimmed(self.name),
            email: trimmed(self.email),
            phone: trimmed(self.phone),
            password: trimmed(self.password),
            confirm_password: trimmed(self.confirm_password),
        }
    }
}

impl RegisterDoctorRequest {
    pub fn sanitized(self) -> Self {
        Self {
            name: trimmed(self.name),
            email: trimmed(self.email),
            phone: trimmed(self.phone),
            password: trimmed(self.password),
            confirm_password: trimmed(self.confirm_password),
            specialty: trimmed(self.specialty),
            description: trimmed(self.description),
            experience_years: self.experience_years,
            image: trimmed(self.image).filter(|image| !image.is_empty()),
        }
    }

    pub fn experience_years(&self) -> IntegerField {
        IntegerField::read(self.experience_years.as_ref())
    }
}

impl LoginRequest {
    pub fn sanitized(self) -> Self {
        Self {
            email_or_phone: trimmed(self.email_or_phone),
            password: trimmed(self.password),
        }
    }
}

// ==============================================================================
// DOMAIN INPUT
// ==============================================================================

/// Validated registration for either account kind.
#[derive(Debug, Clone, PartialEq)]
pub struct Registration {
    pub kind: AccountKind,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub doctor: Option<DoctorProfile>,
}

// ==============================================================================
// RESPONSES
// ==============================================================================

/// Public shape of an account: plaintext phone, never the password hash.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountView {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(flatten)]
    pub doctor: Option<DoctorView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DoctorView {
    pub specialty: String,
    pub description: String,
    pub experience_years: i32,
    pub image: Option<String>,
    #[serde(rename = "isActive")]
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoginOutcome {
    pub account: AccountView,
    pub token: String,
}
