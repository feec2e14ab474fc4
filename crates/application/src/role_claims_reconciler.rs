//! Role-document to custom-claims reconciliation.
//!
//! Each role document write is turned into one claims update on the identity
//! provider, optionally followed by a refresh-token revocation so the new
//! claims reach freshly issued tokens.
//!
//! Provider failures are logged and folded into the returned report instead of
//! being propagated. Trigger delivery retries every failed invocation, and
//! turning provider errors into invocation errors would replay the whole
//! write against a provider that is already failing. Do not convert
//! [`RoleClaimsReconciler::reconcile`] into a fallible call or add a retry loop
//! here without a delivery contract that bounds redelivery.

use std::sync::Arc;

use claimsync_core::UserId;
use claimsync_domain::{ClaimsReconciliation, ReconciliationBranch, RoleDocumentChange};
use tracing::{error, info};

use crate::identity_provider_ports::IdentityProviderAdmin;

mod outcome;


pub use outcome::{CallOutcome, ReconciliationReport};

/// Application service that keeps custom claims in sync with role documents.
#[derive(Clone)]
pub struct RoleClaimsReconciler {
    identity_provider: Arc<dyn IdentityProviderAdmin>,
}

impl RoleClaimsReconciler {
    /// Creates a reconciler bound to one identity-provider client.
    #[must_use]
    pub fn new(identity_provider: Arc<dyn IdentityProviderAdmin>) -> Self {
        Self { identity_provider }
    }

    /// Applies one role document write to the identity provider.
    ///
    /// Always completes: provider failures are logged with the user id and
    /// reported through [`CallOutcome::Failed`]. Token revocation only runs
    /// after the claims update succeeded.
    pub async fn reconcile(&self, change: &RoleDocumentChange) -> ReconciliationReport {
        let user_id = change.user_id();
        let plan = ClaimsReconciliation::plan(change.after());
        let branch = plan.branch();

        log_planned_branch(user_id, &plan);

        let claims = match self
            .identity_provider
            .set_custom_claims(user_id, plan.desired_claims().as_ref())
            .await
        {
            Ok(()) => CallOutcome::Applied,
            Err(error) => {
                error!(
                    user_id = %user_id,
                    branch = branch.as_str(),
                    error = %error,
                    "failed to update custom claims"
                );
                CallOutcome::Failed(error.to_string())
            }
        };

        let revocation = if !plan.revokes_tokens() {
            CallOutcome::NotRequired
        } else if claims.is_failed() {
            CallOutcome::Skipped
        } else {
            match self.identity_provider.revoke_refresh_tokens(user_id).await {
                Ok(()) => CallOutcome::Applied,
                Err(error) => {
                    error!(
                        user_id = %user_id,
                        branch = branch.as_str(),
                        error = %error,
                        "failed to revoke refresh tokens"
                    );
                    CallOutcome::Failed(error.to_string())
                }
            }
        };

        if !claims.is_failed() && !revocation.is_failed() {
            log_applied_branch(user_id, branch);
        }

        ReconciliationReport {
            user_id: user_id.clone(),
            branch,
            claims,
            revocation,
        }
    }
}

fn log_planned_branch(user_id: &UserId, plan: &ClaimsReconciliation) {
    match plan {
        ClaimsReconciliation::DocumentDeleted => {
            info!(user_id = %user_id, "role document deleted, removing custom claims");
        }
        ClaimsReconciliation::RolesEmpty => {
            info!(user_id = %user_id, "no roles found, setting empty roles claim");
        }
        ClaimsReconciliation::RolesPresent(claims) => {
            info!(
                user_id = %user_id,
                claims = %claims.to_value(),
                "setting custom claims"
            );
        }
    }
}

fn log_applied_branch(user_id: &UserId, branch: ReconciliationBranch) {
    match branch {
        ReconciliationBranch::DocumentDeleted => {
            info!(user_id = %user_id, "custom claims removed and refresh tokens revoked");
        }
        ReconciliationBranch::RolesEmpty => {
            info!(user_id = %user_id, "empty roles claim set");
        }
        ReconciliationBranch::RolesPresent => {
            info!(user_id = %user_id, "custom claims set and refresh tokens revoked");
        }
    }
}
