//! Application services and ports.

#![forbid(unsafe_code)]

mod identity_provider_ports;
mod role_claims_reconciler;

pub use identity_provider_ports::IdentityProviderAdmin;
pub use role_claims_reconciler::{CallOutcome, ReconciliationReport, RoleClaimsReconciler};
