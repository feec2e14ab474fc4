//! Console identity provider for development. Logs admin calls to tracing output.

use async_trait::async_trait;
use claimsync_application::IdentityProviderAdmin;
use claimsync_core::{AppResult, UserId};
use claimsync_domain::CustomClaims;
use serde_json::Value;
use tracing::info;

/// Development identity provider that logs admin calls instead of sending them.
#[derive(Clone)]
pub struct ConsoleIdentityProviderAdmin;

impl ConsoleIdentityProviderAdmin {
    /// Creates a new console identity provider.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for ConsoleIdentityProviderAdmin {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IdentityProviderAdmin for ConsoleIdentityProviderAdmin {
    async fn set_custom_claims(
        &self,
        user_id: &UserId,
        claims: Option<&CustomClaims>,
    ) -> AppResult<()> {
        let claims = claims.map_or(Value::Null, CustomClaims::to_value);
        info!(
            user_id = %user_id,
            claims = %claims,
            "--- SET CUSTOM CLAIMS (console) ---"
        );

        Ok(())
    }

    async fn revoke_refresh_tokens(&self, user_id: &UserId) -> AppResult<()> {
        info!(user_id = %user_id, "--- REVOKE REFRESH TOKENS (console) ---");

        Ok(())
    }
}
