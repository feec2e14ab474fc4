//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod claims;
mod document_path;
mod reconciliation;
mod role_document;

pub use claims::CustomClaims;
pub use document_path::{DEFAULT_ROLE_COLLECTION, RoleDocumentPath};
pub use reconciliation::{ClaimsReconciliation, ReconciliationBranch};
pub use role_document::{DocumentSnapshot, RoleDocumentChange};
