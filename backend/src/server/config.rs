//! Server configuration loaded from the environment.

use std::env;
use std::net::SocketAddr;

use actix_web::cookie::Key;
use reqwest::Url;
use tracing::warn;

use crate::outbound::email::SmtpSettings;

/// Configuration failures that prevent the server from starting.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required environment variable is missing.
    #[error("missing required environment variable {name}")]
    Missing { name: &'static str },

    /// An environment variable holds an unusable value.
    #[error("invalid value for {name}: {message}")]
    Invalid { name: &'static str, message: String },
}

impl ConfigError {
    fn invalid(name: &'static str, message: impl Into<String>) -> Self {
        Self::Invalid {
            name,
            message: message.into(),
        }
    }
}

/// Credentials and endpoint for the triage model API.
pub struct TriageConfig {
    pub endpoint: Url,
    pub api_key: String,
}

/// Assembled runtime configuration.
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub database_url: String,
    pub session_key: Key,
    pub cookie_secure: bool,
    pub evidence_store_url: Url,
    /// Base URL of the web client, used for links in notification email.
    pub client_url: Option<String>,
    /// Absent when triage is not configured; submissions then default to
    /// medium priority with no summary.
    pub triage: Option<TriageConfig>,
    /// Absent when no relay is configured; notifications are then skipped.
    pub smtp: Option<SmtpSettings>,
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::Missing { name })
}

fn parse_url(name: &'static str, raw: &str) -> Result<Url, ConfigError> {
    raw.parse::<Url>()
        .map_err(|err| ConfigError::invalid(name, err.to_string()))
}

/// Interpret a boolean-ish environment value; everything except `0` is on.
fn flag_enabled(value: Option<String>, default: bool) -> bool {
    match value {
        Some(raw) => raw != "0",
        None => default,
    }
}

/// Load the session signing key from `SESSION_KEY_FILE`.
///
/// Debug builds (and `SESSION_ALLOW_EPHEMERAL=1`) fall back to a generated
/// key so local development works without a mounted secret; sessions then
/// reset on restart.
fn session_key() -> Result<Key, ConfigError> {
    let key_path =
        env::var("SESSION_KEY_FILE").unwrap_or_else(|_| "/var/run/secrets/session_key".into());
    match std::fs::read(&key_path) {
        Ok(bytes) => Ok(Key::derive_from(&bytes)),
        Err(err) => {
            let allow_dev = env::var("SESSION_ALLOW_EPHEMERAL").ok().as_deref() == Some("1");
            if cfg!(debug_assertions) || allow_dev {
                warn!(path = %key_path, error = %err, "using temporary session key (dev only)");
                Ok(Key::generate())
            } else {
                Err(ConfigError::invalid(
                    "SESSION_KEY_FILE",
                    format!("failed to read {key_path}: {err}"),
                ))
            }
        }
    }
}

impl ServerConfig {
    /// Assemble the configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Fails when `DATABASE_URL` or `EVIDENCE_UPLOAD_URL` are missing or
    /// malformed, or when no session key is available outside development.
    pub fn from_env() -> Result<Self, ConfigError> {
        let bind_addr = env::var("BIND_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:8080".into())
            .parse::<SocketAddr>()
            .map_err(|err| ConfigError::invalid("BIND_ADDR", err.to_string()))?;

        let evidence_store_url =
            parse_url("EVIDENCE_UPLOAD_URL", &required("EVIDENCE_UPLOAD_URL")?)?;

        let triage = match (
            env::var("TRIAGE_API_URL").ok(),
            env::var("TRIAGE_API_KEY").ok(),
        ) {
            (Some(raw), Some(api_key)) => Some(TriageConfig {
                endpoint: parse_url("TRIAGE_API_URL", &raw)?,
                api_key,
            }),
            (None, None) => None,
            _ => {
                warn!("TRIAGE_API_URL and TRIAGE_API_KEY must both be set; triage disabled");
                None
            }
        };

        let smtp = match (
            env::var("SMTP_HOST").ok(),
            env::var("SMTP_USERNAME").ok(),
            env::var("SMTP_PASSWORD").ok(),
            env::var("MAIL_FROM").ok(),
        ) {
            (Some(relay), Some(username), Some(password), Some(sender)) => Some(SmtpSettings {
                relay,
                username,
                password,
                sender,
            }),
            (None, None, None, None) => None,
            _ => {
                warn!(
                    "SMTP_HOST, SMTP_USERNAME, SMTP_PASSWORD, and MAIL_FROM must all be set; email disabled"
                );
                None
            }
        };

        Ok(Self {
            bind_addr,
            database_url: required("DATABASE_URL")?,
            session_key: session_key()?,
            cookie_secure: flag_enabled(env::var("SESSION_COOKIE_SECURE").ok(), true),
            evidence_store_url,
            client_url: env::var("CLIENT_URL").ok(),
            triage,
            smtp,
        })
    }
}
