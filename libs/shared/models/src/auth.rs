use serde::{Deserialize, Serialize};

use crate::identity::{AccountKind, ADMIN_ROLE};

/// Claims carried by a session token and attached to the request by the
/// access guard. `phone` is the stored ciphertext, never the plaintext.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub id: i64,
    pub email: String,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub kind: AccountKind,
}

impl SessionClaims {
    pub fn is_admin(&self) -> bool {
        self.role.as_deref() == Some(ADMIN_ROLE)
    }

    pub fn is_patient(&self) -> bool {
        self.kind == AccountKind::Patient
    }
}

/// Claims proving control of an email address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivationClaims {
    pub email: String,
}
