use std::sync::Arc;

use claimsync_application::RoleClaimsReconciler;
use claimsync_domain::RoleDocumentPath;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub reconciler: RoleClaimsReconciler,
    pub document_path: RoleDocumentPath,
    pub trigger_shared_secret: Arc<str>,
}
