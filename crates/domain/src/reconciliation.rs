use serde::{Deserialize, Serialize};

use crate::claims::CustomClaims;
use crate::role_document::{DocumentSnapshot, roles_value_is_empty};

/// Decision branch taken for one role document write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconciliationBranch {
    /// The role document was deleted.
    DocumentDeleted,
    /// The document exists without any roles.
    RolesEmpty,
    /// The document exists and carries roles.
    RolesPresent,
}

impl ReconciliationBranch {
    /// Returns a stable label for logs and responses.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DocumentDeleted => "document_deleted",
            Self::RolesEmpty => "roles_empty",
            Self::RolesPresent => "roles_present",
        }
    }
}

/// Desired identity-provider state computed from a role document snapshot.
#[derive(Debug, Clone, PartialEq)]
pub enum ClaimsReconciliation {
    /// Clear claims and revoke issued tokens.
    DocumentDeleted,
    /// Set `{ "roles": {} }` without revoking tokens.
    RolesEmpty,
    /// Set the carried claims and revoke issued tokens.
    RolesPresent(CustomClaims),
}

impl ClaimsReconciliation {
    /// Plans the claims state for the snapshot taken after a write.
    ///
    /// The snapshot prior to the write plays no part: provider calls are
    /// full-state sets, so only the resulting document matters.
    #[must_use]
    pub fn plan(after: &DocumentSnapshot) -> Self {
        if !after.exists() {
            return Self::DocumentDeleted;
        }

        match after.roles() {
            Some(roles) if !roles_value_is_empty(roles) => {
                Self::RolesPresent(CustomClaims::with_roles(roles.clone()))
            }
            _ => Self::RolesEmpty,
        }
    }

    /// Returns the branch label of this plan.
    #[must_use]
    pub fn branch(&self) -> ReconciliationBranch {
        match self {
            Self::DocumentDeleted => ReconciliationBranch::DocumentDeleted,
            Self::RolesEmpty => ReconciliationBranch::RolesEmpty,
            Self::RolesPresent(_) => ReconciliationBranch::RolesPresent,
        }
    }

    /// Returns the claims to set; `None` clears the user's claims.
    #[must_use]
    pub fn desired_claims(&self) -> Option<CustomClaims> {
        match self {
            Self::DocumentDeleted => None,
            Self::RolesEmpty => Some(CustomClaims::empty_roles()),
            Self::RolesPresent(claims) => Some(claims.clone()),
        }
    }

    /// Returns whether issued tokens are revoked after the claims update.
    ///
    /// The empty-roles branch intentionally leaves issued tokens alone.
    #[must_use]
    pub fn revokes_tokens(&self) -> bool {
        match self {
            Self::DocumentDeleted | Self::RolesPresent(_) => true,
            Self::RolesEmpty => false,
        }
    }
}
