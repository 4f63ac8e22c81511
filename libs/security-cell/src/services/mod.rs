pub mod cipher;
pub mod password;
pub mod validation;

pub use cipher::{CipherError, FieldCipher};
pub use password::{CredentialHasher, HashError};
pub use validation::{FieldCheck, ValidationService};
