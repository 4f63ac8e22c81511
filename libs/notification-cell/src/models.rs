use serde::Serialize;

use shared_models::identity::AccountKind;

/// Signal that an account was persisted and needs an activation email.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAccountNotice {
    pub kind: AccountKind,
    pub email: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub html: String,
}
