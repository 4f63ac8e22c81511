// =====================================================================================
// ACCOUNT SERVICE - REGISTRATION, LOGIN & ACTIVATION FOR PATIENTS AND DOCTORS
// =====================================================================================
//
// Unregistered -> PendingActivation -> Active. There is no way back and no
// re-registration. The email/phone uniqueness check is a read followed by an
// insert with nothing in between holding a lock, so two concurrent
// registrations for the same address can both succeed.
//
// =====================================================================================

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use notification_cell::{NewAccountNotice, NotificationDispatcher};
use security_cell::{CredentialHasher, FieldCipher};
use shared_database::ClinicStore;
use shared_models::auth::{ActivationClaims, SessionClaims};
use shared_models::error::AppError;
use shared_models::identity::{AccountKind, IdentityRecord, NewIdentity};
use shared_utils::{TokenService, SESSION_TOKEN_TTL};

use crate::models::{AccountView, DoctorView, LoginOutcome, Registration};

pub struct AccountService {
    store: Arc<dyn ClinicStore>,
    hasher: CredentialHasher,
    cipher: Arc<FieldCipher>,
    tokens: Arc<TokenService>,
    notifier: NotificationDispatcher,
}

impl AccountService {
    pub fn new(
        store: Arc<dyn ClinicStore>,
        hasher: CredentialHasher,
        cipher: Arc<FieldCipher>,
        tokens: Arc<TokenService>,
        notifier: NotificationDispatcher,
    ) -> Self {
        Self {
            store,
            hasher,
            cipher,
            tokens,
            notifier,
        }
    }

    /// Persists an inactive account and queues its activation email.
    /// Returns the new account id.
    #[instrument(skip(self, registration), fields(kind = %registration.kind))]
    pub async fn register(&self, registration: Registration) -> Result<i64, AppError> {
        let kind = registration.kind;
        let encrypted_phone = self.cipher.encrypt(&registration.phone)?;

        let existing = self
            .store
            .find_identities_by_email_or_phone(kind, &registration.email, &encrypted_phone)
            .await?;

        if existing.iter().any(|identity| identity.email == registration.email) {
            warn!("Registration rejected: email already in use");
            return Err(AppError::DuplicateEmail);
        }
        if existing.iter().any(|identity| identity.phone == encrypted_phone) {
            warn!("Registration rejected: phone already in use");
            return Err(AppError::DuplicatePhone);
        }

        let password_hash = self.hash_password(registration.password).await?;

        let record = self
            .store
            .insert_identity(NewIdentity {
                kind,
                name: registration.name,
                email: registration.email,
                phone: encrypted_phone,
                password_hash,
                role: None,
                doctor: registration.doctor,
            })
            .await?;

        info!("Registered {} account {}", kind, record.id);

        self.notifier.notify_new_account(NewAccountNotice {
            kind,
            email: record.email,
            name: record.name,
        });

        Ok(record.id)
    }

    /// Activation is checked before the password so an inactive account
    /// answers the same whatever password is supplied.
    #[instrument(skip(self, email_or_phone, password))]
    pub async fn login(
        &self,
        kind: AccountKind,
        email_or_phone: &str,
        password: &str,
    ) -> Result<LoginOutcome, AppError> {
        let encrypted = self.cipher.encrypt(email_or_phone)?;

        let mut candidates = self
            .store
            .find_identities_by_email_or_phone(kind, email_or_phone, &encrypted)
            .await?;

        if candidates.is_empty() {
            debug!("Login failed: no matching {} account", kind);
            self.burn_password_check(password).await?;
            return Err(AppError::InvalidCredentials);
        }

        // An email match wins over a phone match.
        let position = candidates
            .iter()
            .position(|identity| identity.email == email_or_phone)
            .unwrap_or(0);
        let identity = candidates.swap_remove(position);

        if !identity.is_active {
            debug!("Login refused: {} account {} not activated", kind, identity.id);
            return Err(AppError::AccountNotActivated);
        }

        if !self.verify_password(password, &identity.password_hash).await? {
            debug!("Login failed: wrong password for {} account {}", kind, identity.id);
            return Err(AppError::InvalidCredentials);
        }

        let claims = SessionClaims {
            id: identity.id,
            email: identity.email.clone(),
            phone: identity.phone.clone(),
            role: identity.role.clone(),
            kind,
        };
        let token = self
            .tokens
            .issue(&claims, SESSION_TOKEN_TTL)
            .map_err(|e| AppError::Internal(e.to_string()))?;

        info!("{} account {} logged in", kind.label(), identity.id);

        Ok(LoginOutcome {
            account: self.view(&identity)?,
            token,
        })
    }

    /// Idempotent: activating an active account succeeds again.
    #[instrument(skip(self, token))]
    pub async fn activate(&self, kind: AccountKind, token: &str) -> Result<(), AppError> {
        let claims: ActivationClaims = self.tokens.verify(token).map_err(|e| {
            debug!("Activation token rejected: {}", e);
            AppError::InvalidActivationToken
        })?;

        let identity = self
            .store
            .find_identity_by_email(kind, &claims.email)
            .await?
            .ok_or(AppError::AccountNotFound)?;

        self.store.activate_identity(kind, &identity.email).await?;

        info!("{} account {} activated", kind.label(), identity.id);
        Ok(())
    }

    pub async fn get_account(&self, kind: AccountKind, id: i64) -> Result<AccountView, AppError> {
        let identity = self
            .store
            .find_identity_by_id(kind, id)
            .await?
            .ok_or(match kind {
                AccountKind::Patient => AppError::AccountNotFound,
                AccountKind::Doctor => AppError::DoctorNotFound,
            })?;

        self.view(&identity)
    }

    pub async fn list_accounts(&self, kind: AccountKind) -> Result<Vec<AccountView>, AppError> {
        self.store
            .list_identities(kind)
            .await?
            .iter()
            .map(|identity| self.view(identity))
            .collect()
    }

    fn view(&self, identity: &IdentityRecord) -> Result<AccountView, AppError> {
        let phone = self.cipher.decrypt(&identity.phone)?;

        Ok(AccountView {
            id: identity.id,
            name: identity.name.clone(),
            email: identity.email.clone(),
            phone,
            doctor: identity.doctor.as_ref().map(|profile| DoctorView {
                specialty: profile.specialty.clone(),
                description: profile.description.clone(),
                experience_years: profile.experience_years,
                image: profile.image.clone(),
                is_active: identity.is_active,
            }),
        })
    }

    // Argon2 is CPU bound; keep it off the async workers.
    async fn hash_password(&self, password: String) -> Result<String, AppError> {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(AppError::internal)?
            .map_err(AppError::from)
    }

    async fn burn_password_check(&self, password: &str) -> Result<bool, AppError> {
        let hasher = self.hasher.clone();
        let password = password.to_string();
        tokio::task::spawn_blocking(move || hasher.verify_absent(&password))
            .await
            .map_err(AppError::internal)?
            .map_err(AppError::from)
    }

    async fn verify_password(&self, password: &str, hash: &str) -> Result<bool, AppError> {
        let hasher = self.hasher.clone();
        let (password, hash) = (password.to_string(), hash.to_string());
        tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .map_err(AppError::internal)?
            .map_err(AppError::from)
    }
}
