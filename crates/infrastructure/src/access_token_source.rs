use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use claimsync_core::{AppError, AppResult};
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::debug;
use url::Url;

/// Default host of the compute metadata server.
pub const DEFAULT_METADATA_SERVER_URL: &str = "http://metadata.google.internal";

const METADATA_TOKEN_PATH: &str = "computeMetadata/v1/instance/service-accounts/default/token";

/// Tokens this close to expiry are refreshed before use.
const REFRESH_MARGIN_SECONDS: i64 = 60;

/// Supplies OAuth bearer tokens for identity provider calls.
#[async_trait]
pub trait AccessTokenSource: Send + Sync {
    /// Returns a token that is valid for at least the next request.
    async fn access_token(&self) -> AppResult<String>;

    /// Drops any cached token after the provider rejected it.
    async fn invalidate(&self) {}
}

/// Fixed token for emulators and local development.
pub struct StaticAccessTokenSource {
    token: String,
}

impl StaticAccessTokenSource {
    /// Wraps a pre-issued token.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl AccessTokenSource for StaticAccessTokenSource {
    async fn access_token(&self) -> AppResult<String> {
        Ok(self.token.clone())
    }
}

/// Service-account tokens from the compute metadata server, cached until
/// shortly before they expire.
pub struct MetadataServerAccessTokenSource {
    http_client: reqwest::Client,
    token_url: Url,
    cached: Mutex<Option<CachedAccessToken>>,
}

struct CachedAccessToken {
    token: String,
    expires_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct MetadataTokenResponse {
    access_token: String,
    expires_in: i64,
}

impl MetadataServerAccessTokenSource {
    /// Creates a source that reads tokens from `metadata_url`.
    pub fn new(http_client: reqwest::Client, metadata_url: Url) -> AppResult<Self> {
        let mut metadata_url = metadata_url;
        if !metadata_url.path().ends_with('/') {
            let path = format!("{}/", metadata_url.path());
            metadata_url.set_path(path.as_str());
        }

        let token_url = metadata_url.join(METADATA_TOKEN_PATH).map_err(|error| {
            AppError::Validation(format!("failed to build metadata token endpoint: {error}"))
        })?;

        Ok(Self {
            http_client,
            token_url,
            cached: Mutex::new(None),
        })
    }

    async fn fetch(&self) -> AppResult<CachedAccessToken> {
        let response = self
            .http_client
            .get(self.token_url.clone())
            .header("Metadata-Flavor", "Google")
            .send()
            .await
            .map_err(|error| {
                AppError::Unavailable(format!("failed to call metadata server: {error}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_owned());
            return Err(AppError::Unavailable(format!(
                "metadata server returned status {}: {body}",
                status.as_u16()
            )));
        }

        let token = response
            .json::<MetadataTokenResponse>()
            .await
            .map_err(|error| {
                AppError::Unavailable(format!("invalid metadata token response: {error}"))
            })?;

        debug!(expires_in = token.expires_in, "fetched identity provider access token");

        Ok(CachedAccessToken {
            token: token.access_token,
            expires_at: Utc::now() + Duration::seconds(token.expires_in),
        })
    }
}

#[async_trait]
impl AccessTokenSource for MetadataServerAccessTokenSource {
    async fn access_token(&self) -> AppResult<String> {
        let mut cached = self.cached.lock().await;

        let refresh_after = Utc::now() + Duration::seconds(REFRESH_MARGIN_SECONDS);
        if let Some(current) = cached.as_ref()
            && current.expires_at > refresh_after
        {
            return Ok(current.token.clone());
        }

        let fresh = self.fetch().await?;
        let token = fresh.token.clone();
        *cached = Some(fresh);
        Ok(token)
    }

    async fn invalidate(&self) {
        *self.cached.lock().await = None;
    }
}
