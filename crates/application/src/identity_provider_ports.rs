use async_trait::async_trait;
use claimsync_core::{AppResult, UserId};
use claimsync_domain::CustomClaims;

/// Port for the identity provider's administrative user operations.
///
/// Both operations are full-state and idempotent: repeating a call with the
/// same arguments leaves the provider in the same state.
#[async_trait]
pub trait IdentityProviderAdmin: Send + Sync {
    /// Replaces the user's custom claims. `None` clears them.
    async fn set_custom_claims(
        &self,
        user_id: &UserId,
        claims: Option<&CustomClaims>,
    ) -> AppResult<()>;

    /// Invalidates every refresh token issued to the user so far.
    async fn revoke_refresh_tokens(&self, user_id: &UserId) -> AppResult<()>;
}
