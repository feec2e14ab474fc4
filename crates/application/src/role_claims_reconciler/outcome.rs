use claimsync_core::UserId;
use claimsync_domain::ReconciliationBranch;
use serde::Serialize;

/// Result of one guarded identity-provider call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "error", rename_all = "snake_case")]
pub enum CallOutcome {
    /// The provider accepted the call.
    Applied,
    /// The provider call failed; carries the logged error message.
    Failed(String),
    /// Not attempted because the preceding claims update failed.
    Skipped,
    /// Not part of the branch taken.
    NotRequired,
}

impl CallOutcome {
    /// Returns whether the call was attempted and failed.
    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// What one reconciliation did. Returned for every invocation, including
/// those where provider calls failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconciliationReport {
    /// User whose claims were reconciled.
    pub user_id: UserId,
    /// Decision branch taken from the post-write snapshot.
    pub branch: ReconciliationBranch,
    /// Outcome of the claims update.
    pub claims: CallOutcome,
    /// Outcome of the refresh-token revocation.
    pub revocation: CallOutcome,
}

impl ReconciliationReport {
    /// Returns whether every call of the branch reached the provider.
    #[must_use]
    pub fn is_fully_applied(&self) -> bool {
        matches!(self.claims, CallOutcome::Applied)
            && matches!(
                self.revocation,
                CallOutcome::Applied | CallOutcome::NotRequired
            )
    }
}
