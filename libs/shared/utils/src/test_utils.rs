use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use shared_config::AppConfig;
use shared_models::auth::SessionClaims;
use shared_models::identity::{AccountKind, ADMIN_ROLE, DEFAULT_ROLE};

use crate::jwt::TokenService;

pub struct TestConfig {
    pub token_secret: String,
    pub cipher_key: String,
    pub hash_cost: u32,
    pub base_url: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            token_secret: "test-secret-key-for-jwt-validation-must-be-long-enough".to_string(),
            cipher_key: "test-cipher-key-for-field-encryption".to_string(),
            // Lowest cost keeps hashing fast in tests.
            hash_cost: 1,
            base_url: "http://localhost:3000".to_string(),
        }
    }
}

impl TestConfig {
    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            supabase_url: String::new(),
            supabase_anon_key: String::new(),
            token_secret: self.token_secret.clone(),
            cipher_key: self.cipher_key.clone(),
            hash_cost: self.hash_cost,
            public_base_url: self.base_url.clone(),
            port: 3000,
            mail: None,
        }
    }

    pub fn token_service(&self) -> Arc<TokenService> {
        Arc::new(TokenService::new(&self.token_secret))
    }
}

pub struct TestUser {
    pub id: i64,
    pub email: String,
    pub kind: AccountKind,
    pub role: Option<String>,
}

impl Default for TestUser {
    fn default() -> Self {
        Self::patient("test@example.com")
    }
}

impl TestUser {
    pub fn patient(email: &str) -> Self {
        Self {
            id: 1,
            email: email.to_string(),
            kind: AccountKind::Patient,
            role: Some(DEFAULT_ROLE.to_string()),
        }
    }

    pub fn doctor(email: &str) -> Self {
        Self {
            id: 1,
            email: email.to_string(),
            kind: AccountKind::Doctor,
            role: None,
        }
    }

    pub fn admin(email: &str) -> Self {
        Self {
            role: Some(ADMIN_ROLE.to_string()),
            ..Self::patient(email)
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = id;
        self
    }

    pub fn to_claims(&self) -> SessionClaims {
        SessionClaims {
            id: self.id,
            email: self.email.clone(),
            phone: "encrypted-phone".to_string(),
            role: self.role.clone(),
            kind: self.kind,
        }
    }
}

pub struct JwtTestUtils;

impl JwtTestUtils {
    pub fn create_test_token(user: &TestUser, secret: &str, exp_hours: Option<u64>) -> String {
        let ttl = Duration::from_secs(exp_hours.unwrap_or(1) * 60 * 60);
        TokenService::new(secret)
            .issue(&user.to_claims(), ttl)
            .unwrap_or_default()
    }

    pub fn create_expired_token(user: &TestUser, secret: &str) -> String {
        let issued_at = Utc::now() - chrono::Duration::hours(2);
        TokenService::new(secret)
            .issue_at(&user.to_claims(), Duration::from_secs(60 * 60), issued_at)
            .unwrap_or_default()
    }

    pub fn create_invalid_signature_token(user: &TestUser) -> String {
        Self::create_test_token(user, "wrong-secret", Some(1))
    }

    pub fn create_malformed_token() -> String {
        "invalid.token.format".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_creation() {
        let config = TestConfig::default();
        let app_config = config.to_app_config();

        assert!(!app_config.token_secret.is_empty());
        assert!(!app_config.cipher_key.is_empty());
        assert!(!app_config.has_remote_store());
    }

    #[test]
    fn test_user_claims() {
        let user = TestUser::admin("root@example.com").with_id(9);
        let claims = user.to_claims();

        assert_eq!(claims.id, 9);
        assert!(claims.is_admin());
        assert!(claims.is_patient());
        assert!(!TestUser::doctor("d@example.com").to_claims().is_admin());
    }

    #[test]
    fn test_jwt_token_creation() {
        let user = TestUser::default();
        let token = JwtTestUtils::create_test_token(&user, "test-secret", Some(1));

        assert_eq!(token.split('.').count(), 3);
    }
}
