// =====================================================================================
// SECURITY CELL - CREDENTIALS, FIELD ENCRYPTION & INPUT VALIDATION
// =====================================================================================
//
// - One-way password hashing (Argon2id PHC strings)
// - Deterministic authenticated encryption for PII columns (phone, reason)
// - Aggregated input validation producing every field message at once
//
// =====================================================================================

pub mod services;

pub use services::{
    CipherError, CredentialHasher, FieldCheck, FieldCipher, HashError, ValidationService,
};
