use std::env;
use thiserror::Error;
use tracing::warn;

pub const DEFAULT_HASH_COST: u32 = 10;
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";
pub const DEFAULT_PORT: u16 = 3000;

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Mail relay settings. Absent when no relay is configured, in which case
/// activation emails are only logged.
#[derive(Debug, Clone)]
pub struct MailConfig {
    pub api_url: String,
    pub api_key: String,
    pub from: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub token_secret: String,
    pub cipher_key: String,
    pub hash_cost: u32,
    pub public_base_url: String,
    pub port: u16,
    pub mail: Option<MailConfig>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let token_secret = var("TOKEN_SECRET").ok_or(ConfigError::Missing("TOKEN_SECRET"))?;
        let cipher_key = var("CIPHER_KEY").ok_or(ConfigError::Missing("CIPHER_KEY"))?;

        let hash_cost = match var("HASH_COST").or_else(|| var("ROUND")) {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|cost| *cost > 0)
                .ok_or(ConfigError::Invalid { name: "HASH_COST", value: raw })?,
            None => DEFAULT_HASH_COST,
        };

        let port = match var("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::Invalid { name: "PORT", value: raw })?,
            None => DEFAULT_PORT,
        };

        let supabase_url = var("SUPABASE_URL").unwrap_or_else(|| {
            warn!("SUPABASE_URL not set, falling back to the in-memory store");
            String::new()
        });
        let supabase_anon_key = var("SUPABASE_ANON_PUBLIC_KEY").unwrap_or_else(|| {
            if !supabase_url.is_empty() {
                warn!("SUPABASE_ANON_PUBLIC_KEY not set, using empty value");
            }
            String::new()
        });

        let public_base_url = var("APP_BASE_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let mail = match (var("MAIL_API_URL"), var("MAIL_API_KEY")) {
            (Some(api_url), Some(api_key)) => Some(MailConfig {
                api_url,
                api_key,
                from: var("MAIL_FROM").unwrap_or_else(|| "no-reply@localhost".to_string()),
            }),
            _ => {
                warn!("MAIL_API_URL/MAIL_API_KEY not set, activation emails will only be logged");
                None
            }
        };

        Ok(Self {
            supabase_url,
            supabase_anon_key,
            token_secret,
            cipher_key,
            hash_cost,
            public_base_url,
            port,
            mail,
        })
    }

    pub fn has_remote_store(&self) -> bool {
        !self.supabase_url.is_empty()
    }
}
