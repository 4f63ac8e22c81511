use std::time::Duration;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;
use tracing::debug;

type HmacSha256 = Hmac<Sha256>;

pub const SESSION_TOKEN_TTL: Duration = Duration::from_secs(60 * 60);
pub const ACTIVATION_TOKEN_TTL: Duration = Duration::from_secs(24 * 60 * 60);

const ALGORITHM: &str = "HS256";

#[derive(Error, Debug, PartialEq)]
pub enum TokenError {
    #[error("Invalid token")]
    Invalid,

    #[error("Token expired")]
    Expired,

    #[error("Token encoding failed: {0}")]
    Encoding(String),
}

#[derive(Debug, Serialize, Deserialize)]
struct JwtHeader {
    alg: String,
    typ: String,
}

#[derive(Serialize)]
struct SignedClaims<'a, C> {
    #[serde(flatten)]
    claims: &'a C,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct VerifiedClaims<C> {
    #[serde(flatten)]
    claims: C,
    exp: i64,
}

/// Issues and verifies HS256 compact tokens. Stateless: there is no
/// revocation, a token stays valid until its `exp`.
pub struct TokenService {
    secret: Vec<u8>,
}

impl TokenService {
    pub fn new(secret: &str) -> Self {
        Self {
            secret: secret.as_bytes().to_vec(),
        }
    }

    fn mac(&self) -> Result<HmacSha256, TokenError> {
        HmacSha256::new_from_slice(&self.secret).map_err(|e| TokenError::Encoding(e.to_string()))
    }

    pub fn issue<C: Serialize>(&self, claims: &C, ttl: Duration) -> Result<String, TokenError> {
        self.issue_at(claims, ttl, Utc::now())
    }

    /// Issues a token as if the current time were `issued_at`.
    pub fn issue_at<C: Serialize>(
        &self,
        claims: &C,
        ttl: Duration,
        issued_at: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let ttl = chrono::Duration::from_std(ttl).map_err(|e| TokenError::Encoding(e.to_string()))?;

        let header = JwtHeader {
            alg: ALGORITHM.to_string(),
            typ: "JWT".to_string(),
        };
        let payload = SignedClaims {
            claims,
            iat: issued_at.timestamp(),
            exp: (issued_at + ttl).timestamp(),
        };

        let header_json = serde_json::to_vec(&header).map_err(|e| TokenError::Encoding(e.to_string()))?;
        let payload_json = serde_json::to_vec(&payload).map_err(|e| TokenError::Encoding(e.to_string()))?;

        let signing_input = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(header_json),
            URL_SAFE_NO_PAD.encode(payload_json)
        );

        let mut mac = self.mac()?;
        mac.update(signing_input.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

        Ok(format!("{}.{}", signing_input, signature))
    }

    pub fn verify<C: DeserializeOwned>(&self, token: &str) -> Result<C, TokenError> {
        // Split token into parts
        let parts: Vec<&str> = token.split('.').collect();
        if parts.len() != 3 {
            debug!("Invalid token format");
            return Err(TokenError::Invalid);
        }

        let header_b64 = parts[0];
        let claims_b64 = parts[1];
        let signature_b64 = parts[2];

        let signature = URL_SAFE_NO_PAD.decode(signature_b64).map_err(|e| {
            debug!("Failed to decode signature: {}", e);
            TokenError::Invalid
        })?;

        let mut mac = self.mac().map_err(|_| TokenError::Invalid)?;
        mac.update(format!("{}.{}", header_b64, claims_b64).as_bytes());

        if mac.verify_slice(&signature).is_err() {
            debug!("Token signature verification failed");
            return Err(TokenError::Invalid);
        }

        let header: JwtHeader = URL_SAFE_NO_PAD
            .decode(header_b64)
            .ok()
            .and_then(|bytes| serde_json::from_slice(&bytes).ok())
            .ok_or(TokenError::Invalid)?;
        if header.alg != ALGORITHM {
            debug!("Unexpected token algorithm: {}", header.alg);
            return Err(TokenError::Invalid);
        }

        let claims_json = URL_SAFE_NO_PAD.decode(claims_b64).map_err(|_| TokenError::Invalid)?;
        let verified: VerifiedClaims<C> = serde_json::from_slice(&claims_json).map_err(|e| {
            debug!("Failed to parse claims: {}", e);
            TokenError::Invalid
        })?;

        let now = Utc::now().timestamp();
        if verified.exp < now {
            debug!("Token expired at {} (now: {})", verified.exp, now);
            return Err(TokenError::Expired);
        }

        Ok(verified.claims)
    }
}
