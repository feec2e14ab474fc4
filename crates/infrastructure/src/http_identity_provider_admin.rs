use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use claimsync_application::IdentityProviderAdmin;
use claimsync_core::{AppError, AppResult, UserId};
use claimsync_domain::CustomClaims;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::access_token_source::AccessTokenSource;

/// Largest serialized custom-claims payload the provider accepts.
const MAX_CUSTOM_CLAIMS_BYTES: usize = 1000;

/// Serialized form of cleared custom claims.
const CLEARED_CUSTOM_CLAIMS: &str = "{}";

/// Connection settings for the identity provider's admin REST surface.
#[derive(Debug, Clone)]
pub struct IdentityToolkitConfig {
    /// Service root, e.g. `https://identitytoolkit.googleapis.com` or an
    /// emulator prefix.
    pub base_url: Url,
    /// Project owning the user pool.
    pub project_id: String,
}

/// HTTP implementation of identity-provider user administration.
pub struct HttpIdentityProviderAdmin {
    http_client: reqwest::Client,
    accounts_update_url: Url,
    token_source: Arc<dyn AccessTokenSource>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AccountUpdateRequest<'a> {
    local_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    custom_attributes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    valid_since: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    error: ProviderErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorDetail {
    message: String,
}

impl HttpIdentityProviderAdmin {
    /// Creates an adapter using a shared HTTP client. A bearer token is taken
    /// from `token_source` for every request.
    pub fn new(
        http_client: reqwest::Client,
        config: IdentityToolkitConfig,
        token_source: Arc<dyn AccessTokenSource>,
    ) -> AppResult<Self> {
        let project_id = config.project_id.trim();
        if project_id.is_empty() || project_id.contains('/') {
            return Err(AppError::Validation(format!(
                "invalid identity provider project id '{}'",
                config.project_id
            )));
        }

        let mut base_url = config.base_url;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(path.as_str());
        }

        let accounts_update_url = base_url
            .join(format!("v1/projects/{project_id}/accounts:update").as_str())
            .map_err(|error| {
                AppError::Validation(format!(
                    "failed to build identity provider accounts endpoint: {error}"
                ))
            })?;

        Ok(Self {
            http_client,
            accounts_update_url,
            token_source,
        })
    }

    async fn update_account(
        &self,
        user_id: &UserId,
        request: &AccountUpdateRequest<'_>,
    ) -> AppResult<()> {
        let access_token = self.token_source.access_token().await?;
        let response = self
            .http_client
            .post(self.accounts_update_url.clone())
            .bearer_auth(access_token)
            .json(request)
            .send()
            .await
            .map_err(|error| {
                AppError::Unavailable(format!(
                    "failed to call identity provider for user '{user_id}': {error}"
                ))
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        if status == StatusCode::UNAUTHORIZED {
            self.token_source.invalidate().await;
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<body unavailable>".to_owned());

        Err(map_error_response(user_id, status, body.as_str()))
    }
}

#[async_trait]
impl IdentityProviderAdmin for HttpIdentityProviderAdmin {
    async fn set_custom_claims(
        &self,
        user_id: &UserId,
        claims: Option<&CustomClaims>,
    ) -> AppResult<()> {
        let custom_attributes = custom_attributes_payload(claims)?;

        self.update_account(
            user_id,
            &AccountUpdateRequest {
                local_id: user_id.as_str(),
                custom_attributes: Some(custom_attributes),
                valid_since: None,
            },
        )
        .await?;

        debug!(user_id = %user_id, "identity provider accepted custom claims");
        Ok(())
    }

    async fn revoke_refresh_tokens(&self, user_id: &UserId) -> AppResult<()> {
        let valid_since = Utc::now().timestamp().to_string();

        self.update_account(
            user_id,
            &AccountUpdateRequest {
                local_id: user_id.as_str(),
                custom_attributes: None,
                valid_since: Some(valid_since),
            },
        )
        .await?;

        debug!(user_id = %user_id, "identity provider revoked refresh tokens");
        Ok(())
    }
}

/// Serializes claims into the provider's `customAttributes` string.
fn custom_attributes_payload(claims: Option<&CustomClaims>) -> AppResult<String> {
    let Some(claims) = claims else {
        return Ok(CLEARED_CUSTOM_CLAIMS.to_owned());
    };

    let payload = serde_json::to_string(&claims.to_value()).map_err(|error| {
        AppError::Internal(format!("failed to serialize custom claims: {error}"))
    })?;

    if payload.len() > MAX_CUSTOM_CLAIMS_BYTES {
        return Err(AppError::Validation(format!(
            "custom claims payload is {} bytes, limit is {MAX_CUSTOM_CLAIMS_BYTES}",
            payload.len()
        )));
    }

    Ok(payload)
}

fn map_error_response(user_id: &UserId, status: StatusCode, body: &str) -> AppError {
    let message = serde_json::from_str::<ProviderErrorBody>(body)
        .map(|parsed| parsed.error.message)
        .unwrap_or_else(|_| body.to_owned());
    let detail = format!(
        "identity provider returned status {} for user '{user_id}': {message}",
        status.as_u16()
    );

    if message.starts_with("USER_NOT_FOUND") {
        return AppError::NotFound(detail);
    }

    match status {
        StatusCode::UNAUTHORIZED => AppError::Unauthorized(detail),
        StatusCode::FORBIDDEN => AppError::Forbidden(detail),
        StatusCode::TOO_MANY_REQUESTS => AppError::Unavailable(detail),
        status if status.is_server_error() => AppError::Unavailable(detail),
        _ => AppError::Validation(detail),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use claimsync_application::IdentityProviderAdmin;
    use claimsync_core::{AppError, UserId};
    use claimsync_domain::CustomClaims;
    use reqwest::StatusCode;
    use serde_json::json;
    use url::Url;

    use super::{
        AccountUpdateRequest, HttpIdentityProviderAdmin, IdentityToolkitConfig,
        MAX_CUSTOM_CLAIMS_BYTES, custom_attributes_payload, map_error_response,
    };
    use crate::access_token_source::{MetadataServerAccessTokenSource, StaticAccessTokenSource};
    use crate::test_support::FakeGoogleApis;

    fn config(base_url: &str, project_id: &str) -> IdentityToolkitConfig {
        IdentityToolkitConfig {
            base_url: Url::parse(base_url)
                .unwrap_or_else(|error| panic!("invalid test url: {error}")),
            project_id: project_id.to_owned(),
        }
    }

    fn static_token_admin(
        base_url: &str,
        project_id: &str,
    ) -> Result<HttpIdentityProviderAdmin, AppError> {
        HttpIdentityProviderAdmin::new(
            reqwest::Client::new(),
            config(base_url, project_id),
            Arc::new(StaticAccessTokenSource::new("token")),
        )
    }

    fn metadata_backed_admin(base_url: &Url) -> HttpIdentityProviderAdmin {
        let token_source =
            MetadataServerAccessTokenSource::new(reqwest::Client::new(), base_url.clone())
                .unwrap_or_else(|error| panic!("invalid metadata source: {error}"));

        HttpIdentityProviderAdmin::new(
            reqwest::Client::new(),
            IdentityToolkitConfig {
                base_url: base_url.clone(),
                project_id: "demo-project".to_owned(),
            },
            Arc::new(token_source),
        )
        .unwrap_or_else(|error| panic!("invalid adapter: {error}"))
    }

    fn user() -> UserId {
        UserId::new("uid-1").unwrap_or_else(|error| panic!("invalid test user: {error}"))
    }

    #[test]
    fn builds_accounts_update_endpoint_for_project() {
        let admin =
            static_token_admin("https://identitytoolkit.googleapis.com", "demo-project");

        assert_eq!(
            admin.map(|admin| admin.accounts_update_url.to_string()).ok(),
            Some(
                "https://identitytoolkit.googleapis.com/v1/projects/demo-project/accounts:update"
                    .to_owned()
            )
        );
    }

    #[test]
    fn keeps_emulator_path_prefix() {
        let admin = static_token_admin(
            "http://127.0.0.1:9099/identitytoolkit.googleapis.com",
            "demo-project",
        );

        assert_eq!(
            admin.map(|admin| admin.accounts_update_url.path().to_owned()).ok(),
            Some(
                "/identitytoolkit.googleapis.com/v1/projects/demo-project/accounts:update"
                    .to_owned()
            )
        );
    }

    #[test]
    fn rejects_blank_project_id() {
        let admin = static_token_admin("https://identitytoolkit.googleapis.com", "  ");

        assert!(matches!(admin, Err(AppError::Validation(_))));
    }

    #[test]
    fn cleared_claims_serialize_as_empty_object() {
        assert_eq!(custom_attributes_payload(None).ok(), Some("{}".to_owned()));
    }

    #[test]
    fn claims_serialize_with_roles_key() {
        let claims = CustomClaims::with_roles(json!({"admin": true}));

        assert_eq!(
            custom_attributes_payload(Some(&claims)).ok(),
            Some(r#"{"roles":{"admin":true}}"#.to_owned())
        );
    }

    #[test]
    fn oversized_claims_are_rejected() {
        let claims = CustomClaims::with_roles(json!({
            "notes": "x".repeat(MAX_CUSTOM_CLAIMS_BYTES),
        }));

        assert!(matches!(
            custom_attributes_payload(Some(&claims)),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn request_body_uses_provider_field_names() {
        let request = AccountUpdateRequest {
            local_id: "uid-1",
            custom_attributes: None,
            valid_since: Some("1700000000".to_owned()),
        };

        assert_eq!(
            serde_json::to_value(&request).ok(),
            Some(json!({"localId": "uid-1", "validSince": "1700000000"}))
        );
    }

    #[test]
    fn user_not_found_maps_to_not_found() {
        let error = map_error_response(
            &user(),
            StatusCode::BAD_REQUEST,
            r#"{"error":{"code":400,"message":"USER_NOT_FOUND"}}"#,
        );

        assert!(matches!(error, AppError::NotFound(_)));
        assert!(error.to_string().contains("uid-1"));
    }

    #[test]
    fn throttling_and_server_errors_map_to_unavailable() {
        assert!(matches!(
            map_error_response(&user(), StatusCode::TOO_MANY_REQUESTS, "quota exceeded"),
            AppError::Unavailable(_)
        ));
        assert!(matches!(
            map_error_response(&user(), StatusCode::BAD_GATEWAY, ""),
            AppError::Unavailable(_)
        ));
    }

    #[test]
    fn auth_failures_keep_their_category() {
        assert!(matches!(
            map_error_response(&user(), StatusCode::UNAUTHORIZED, "{}"),
            AppError::Unauthorized(_)
        ));
        assert!(matches!(
            map_error_response(&user(), StatusCode::FORBIDDEN, "{}"),
            AppError::Forbidden(_)
        ));
    }

    #[test]
    fn other_client_errors_map_to_validation() {
        let error = map_error_response(
            &user(),
            StatusCode::BAD_REQUEST,
            r#"{"error":{"code":400,"message":"CLAIMS_TOO_LARGE"}}"#,
        );

        assert!(matches!(error, AppError::Validation(_)));
        assert!(error.to_string().contains("CLAIMS_TOO_LARGE"));
    }

    #[tokio::test]
    async fn refreshed_token_is_sent_on_next_call() {
        let fake = FakeGoogleApis::with_token_lifetime(30);
        let base_url = fake.spawn().await;
        let admin = metadata_backed_admin(&base_url);
        let claims = CustomClaims::with_roles(json!({"admin": true}));

        assert!(admin.set_custom_claims(&user(), Some(&claims)).await.is_ok());
        assert!(admin.revoke_refresh_tokens(&user()).await.is_ok());

        assert_eq!(
            fake.authorizations().await,
            vec!["Bearer token-1".to_owned(), "Bearer token-2".to_owned()]
        );
    }

    #[tokio::test]
    async fn rejected_token_is_replaced_before_next_call() {
        let fake = FakeGoogleApis::with_token_lifetime(3600).rejecting_first_updates(1);
        let base_url = fake.spawn().await;
        let admin = metadata_backed_admin(&base_url);

        assert!(matches!(
            admin.revoke_refresh_tokens(&user()).await,
            Err(AppError::Unauthorized(_))
        ));
        assert!(admin.revoke_refresh_tokens(&user()).await.is_ok());

        assert_eq!(
            fake.authorizations().await,
            vec!["Bearer token-1".to_owned(), "Bearer token-2".to_owned()]
        );
    }
}
