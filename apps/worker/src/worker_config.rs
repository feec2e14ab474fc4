use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use claimsync_core::{AppError, AppResult};
use claimsync_domain::DEFAULT_ROLE_COLLECTION;
use claimsync_infrastructure::{DEFAULT_METADATA_SERVER_URL, IdentityToolkitConfig};
use url::Url;

const DEFAULT_IDENTITY_PROVIDER_BASE_URL: &str = "https://identitytoolkit.googleapis.com";
const TRIGGER_SHARED_SECRET_MIN_LENGTH: usize = 32;

/// Identity provider adapter selected at start-up.
#[derive(Debug, Clone)]
pub enum IdentityProviderSettings {
    /// Admin REST surface of the identity provider.
    Http {
        toolkit: IdentityToolkitConfig,
        credentials: CredentialSettings,
        timeout_ms: u64,
    },
    /// Log-only adapter for local development.
    Console,
}

/// Where the HTTP adapter gets its bearer tokens.
#[derive(Debug, Clone)]
pub enum CredentialSettings {
    /// Service-account tokens from the metadata server, refreshed before expiry.
    Metadata { metadata_url: Url },
    /// Fixed token, for emulators and local runs.
    Static { access_token: String },
}

impl IdentityProviderSettings {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Http { .. } => "http",
            Self::Console => "console",
        }
    }
}

#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub host: IpAddr,
    pub port: u16,
    pub trigger_shared_secret: String,
    pub role_document_collection: String,
    pub identity_provider: IdentityProviderSettings,
}

impl WorkerConfig {
    pub fn load() -> AppResult<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> AppResult<Self> {
        let host_value =
            optional(&lookup, "WORKER_HOST").unwrap_or_else(|| "127.0.0.1".to_owned());
        let host = IpAddr::from_str(host_value.as_str()).map_err(|error| {
            AppError::Validation(format!("invalid WORKER_HOST value '{host_value}': {error}"))
        })?;
        let port = parse_or_default(&lookup, "WORKER_PORT", 3002_u16)?;

        let trigger_shared_secret = required(&lookup, "TRIGGER_SHARED_SECRET")?;
        if trigger_shared_secret.len() < TRIGGER_SHARED_SECRET_MIN_LENGTH {
            return Err(AppError::Validation(format!(
                "TRIGGER_SHARED_SECRET must be at least \
                 {TRIGGER_SHARED_SECRET_MIN_LENGTH} characters"
            )));
        }

        let role_document_collection = optional(&lookup, "ROLE_DOCUMENT_COLLECTION")
            .unwrap_or_else(|| DEFAULT_ROLE_COLLECTION.to_owned());

        let provider =
            optional(&lookup, "IDENTITY_PROVIDER").unwrap_or_else(|| "http".to_owned());
        let identity_provider = match provider.as_str() {
            "http" => http_settings(&lookup)?,
            "console" => IdentityProviderSettings::Console,
            _ => {
                return Err(AppError::Validation(format!(
                    "IDENTITY_PROVIDER must be either 'http' or 'console', got '{provider}'"
                )));
            }
        };

        Ok(Self {
            host,
            port,
            trigger_shared_secret,
            role_document_collection,
            identity_provider,
        })
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn http_settings(
    lookup: &impl Fn(&str) -> Option<String>,
) -> AppResult<IdentityProviderSettings> {
    let base_url = url_or_default(
        lookup,
        "IDENTITY_PROVIDER_BASE_URL",
        DEFAULT_IDENTITY_PROVIDER_BASE_URL,
    )?;
    let timeout_ms = parse_or_default(lookup, "IDENTITY_PROVIDER_TIMEOUT_MS", 10_000_u64)?;
    if timeout_ms == 0 {
        return Err(AppError::Validation(
            "IDENTITY_PROVIDER_TIMEOUT_MS must be greater than zero".to_owned(),
        ));
    }

    let credentials = optional(lookup, "IDENTITY_PROVIDER_CREDENTIALS")
        .unwrap_or_else(|| "metadata".to_owned());
    let credentials = match credentials.as_str() {
        "metadata" => CredentialSettings::Metadata {
            metadata_url: url_or_default(
                lookup,
                "IDENTITY_PROVIDER_METADATA_URL",
                DEFAULT_METADATA_SERVER_URL,
            )?,
        },
        "static" => CredentialSettings::Static {
            access_token: required(lookup, "IDENTITY_PROVIDER_ACCESS_TOKEN")?,
        },
        _ => {
            return Err(AppError::Validation(format!(
                "IDENTITY_PROVIDER_CREDENTIALS must be either 'metadata' or 'static', \
                 got '{credentials}'"
            )));
        }
    };

    Ok(IdentityProviderSettings::Http {
        toolkit: IdentityToolkitConfig {
            base_url,
            project_id: required(lookup, "IDENTITY_PROVIDER_PROJECT_ID")?,
        },
        credentials,
        timeout_ms,
    })
}

fn optional(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<String> {
    lookup(name)
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

fn required(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> AppResult<String> {
    optional(lookup, name).ok_or_else(|| AppError::Validation(format!("{name} is required")))
}

fn url_or_default(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: &str,
) -> AppResult<Url> {
    let value = optional(lookup, name).unwrap_or_else(|| default.to_owned());
    Url::parse(value.as_str())
        .map_err(|error| AppError::Validation(format!("invalid {name}: {error}")))
}

fn parse_or_default<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: T,
) -> AppResult<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match optional(lookup, name) {
        Some(value) => value.parse::<T>().map_err(|error| {
            AppError::Validation(format!("invalid {name} value '{value}': {error}"))
        }),
        None => Ok(default),
    }
}
