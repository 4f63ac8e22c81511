// =====================================================================================
// FIELD CIPHER - DETERMINISTIC AUTHENTICATED ENCRYPTION FOR PII COLUMNS
// =====================================================================================
//
// AES-256-GCM with a synthetic nonce taken from a keyed hash of the plaintext.
// Equal plaintexts encrypt to equal ciphertexts, which keeps equality lookups
// on encrypted columns (phone) working.
//
// =====================================================================================

use base64::{engine::general_purpose::STANDARD, Engine};
use hmac::{Hmac, Mac};
use ring::aead::{Aad, LessSafeKey, Nonce, UnboundKey, AES_256_GCM, NONCE_LEN};
use sha2::Sha256;
use thiserror::Error;
use tracing::debug;

use shared_models::error::AppError;

type HmacSha256 = Hmac<Sha256>;

const ENCRYPTION_KEY_LABEL: &[u8] = b"field-cipher/encryption";
const NONCE_KEY_LABEL: &[u8] = b"field-cipher/nonce";

#[derive(Error, Debug, PartialEq)]
pub enum CipherError {
    #[error("Cipher key must not be empty")]
    MissingKey,

    #[error("Failed to initialise cipher key")]
    KeyInit,

    #[error("Encryption failed")]
    Encrypt,

    #[error("Ciphertext is malformed")]
    Malformed,

    #[error("Decryption failed")]
    Decrypt,
}

impl From<CipherError> for AppError {
    fn from(err: CipherError) -> Self {
        AppError::Internal(err.to_string())
    }
}

pub struct FieldCipher {
    key: LessSafeKey,
    nonce_key: [u8; 32],
}

impl std::fmt::Debug for FieldCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldCipher").finish_non_exhaustive()
    }
}

impl FieldCipher {
    pub fn new(secret: &str) -> Result<Self, CipherError> {
        if secret.is_empty() {
            return Err(CipherError::MissingKey);
        }

        let encryption_key = derive_subkey(secret.as_bytes(), ENCRYPTION_KEY_LABEL)?;
        let nonce_key = derive_subkey(secret.as_bytes(), NONCE_KEY_LABEL)?;

        let unbound = UnboundKey::new(&AES_256_GCM, &encryption_key).map_err(|_| CipherError::KeyInit)?;

        Ok(Self {
            key: LessSafeKey::new(unbound),
            nonce_key,
        })
    }

    pub fn encrypt(&self, plaintext: &str) -> Result<String, CipherError> {
        let nonce_bytes = self.synthetic_nonce(plaintext.as_bytes())?;

        let mut in_out = plaintext.as_bytes().to_vec();
        self.key
            .seal_in_place_append_tag(Nonce::assume_unique_for_key(nonce_bytes), Aad::empty(), &mut in_out)
            .map_err(|_| CipherError::Encrypt)?;

        let mut combined = Vec::with_capacity(NONCE_LEN + in_out.len());
        combined.extend_from_slice(&nonce_bytes);
        combined.extend_from_slice(&in_out);

        Ok(STANDARD.encode(combined))
    }

    pub fn decrypt(&self, ciphertext: &str) -> Result<String, CipherError> {
        let combined = STANDARD.decode(ciphertext).map_err(|e| {
            debug!("Ciphertext is not base64: {}", e);
            CipherError::Malformed
        })?;

        if combined.len() < NONCE_LEN + AES_256_GCM.tag_len() {
            return Err(CipherError::Malformed);
        }

        let (nonce_bytes, sealed) = combined.split_at(NONCE_LEN);
        let nonce = Nonce::try_assume_unique_for_key(nonce_bytes).map_err(|_| CipherError::Malformed)?;

        let mut in_out = sealed.to_vec();
        let plaintext = self
            .key
            .open_in_place(nonce, Aad::empty(), &mut in_out)
            .map_err(|_| CipherError::Decrypt)?;

        // The nonce must be the one this key derives for the recovered plaintext.
        if self.synthetic_nonce(plaintext)?.as_slice() != nonce_bytes {
            return Err(CipherError::Decrypt);
        }

        String::from_utf8(plaintext.to_vec()).map_err(|_| CipherError::Malformed)
    }

    fn synthetic_nonce(&self, plaintext: &[u8]) -> Result<[u8; NONCE_LEN], CipherError> {
        let mut mac = HmacSha256::new_from_slice(&self.nonce_key).map_err(|_| CipherError::KeyInit)?;
        mac.update(plaintext);
        let digest = mac.finalize().into_bytes();

        let mut nonce = [0u8; NONCE_LEN];
        nonce.copy_from_slice(&digest[..NONCE_LEN]);
        Ok(nonce)
    }
}

fn derive_subkey(secret: &[u8], label: &[u8]) -> Result<[u8; 32], CipherError> {
    let mut mac = HmacSha256::new_from_slice(secret).map_err(|_| CipherError::KeyInit)?;
    mac.update(label);

    let mut subkey = [0u8; 32];
    subkey.copy_from_slice(&mac.finalize().into_bytes());
    Ok(subkey)
}
