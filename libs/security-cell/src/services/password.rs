// =====================================================================================
// CREDENTIAL HASHER - ONE-WAY PASSWORD HASHING
// =====================================================================================

use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version};
use thiserror::Error;
use tracing::instrument;

use shared_models::error::AppError;

#[derive(Error, Debug)]
pub enum HashError {
    #[error("Invalid hash parameters: {0}")]
    Params(String),

    #[error("Password hashing failed: {0}")]
    Hash(String),

    #[error("Stored password hash is malformed: {0}")]
    Malformed(String),
}

impl From<HashError> for AppError {
    fn from(err: HashError) -> Self {
        AppError::Internal(err.to_string())
    }
}

/// Argon2id hasher whose iteration count is the configured cost factor.
#[derive(Clone, Debug)]
pub struct CredentialHasher {
    argon2: Argon2<'static>,
}

impl CredentialHasher {
    pub fn new(cost: u32) -> Result<Self, HashError> {
        Self::with_memory(cost, Params::DEFAULT_M_COST)
    }

    /// Same as `new` with an explicit memory size in KiB.
    pub fn with_memory(cost: u32, memory_kib: u32) -> Result<Self, HashError> {
        let params = Params::new(memory_kib, cost, Params::DEFAULT_P_COST, None)
            .map_err(|e| HashError::Params(e.to_string()))?;

        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    #[instrument(skip_all)]
    pub fn hash(&self, plaintext: &str) -> Result<String, HashError> {
        let salt = SaltString::generate(&mut OsRng);

        let password_hash = self
            .argon2
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|e| HashError::Hash(e.to_string()))?;
        Ok(password_hash.to_string())
    }

    /// `Ok(false)` on mismatch; `Err` only when `hashed` is not a valid PHC
    /// string. Parameters are read from the hash itself.
    #[instrument(skip_all)]
    pub fn verify(&self, plaintext: &str, hashed: &str) -> Result<bool, HashError> {
        let parsed_hash = PasswordHash::new(hashed).map_err(|e| HashError::Malformed(e.to_string()))?;

        match self.argon2.verify_password(plaintext.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(HashError::Malformed(e.to_string())),
        }
    }

    /// Does the work of a `verify` when there is no stored hash to compare
    /// against, then reports a mismatch. Keeps "no such account" as slow as
    /// "wrong password".
    #[instrument(skip_all)]
    pub fn verify_absent(&self, plaintext: &str) -> Result<bool, HashError> {
        let mut output = [0u8; Params::DEFAULT_OUTPUT_LEN];
        self.argon2
            .hash_password_into(plaintext.as_bytes(), ABSENT_ACCOUNT_SALT, &mut output)
            .map_err(|e| HashError::Hash(e.to_string()))?;
        Ok(false)
    }
}

const ABSENT_ACCOUNT_SALT: &[u8] = b"absent-account-salt";
