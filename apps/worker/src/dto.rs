use claimsync_application::ReconciliationReport;
use claimsync_core::{AppError, AppResult, UserId};
use claimsync_domain::{DocumentSnapshot, RoleDocumentChange, RoleDocumentPath};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Change notification for one role document write.
#[derive(Debug, Deserialize)]
pub struct RoleDocumentWrittenRequest {
    pub id: Option<String>,
    pub document: Option<String>,
    #[serde(default)]
    pub params: TriggerParamsRequest,
    pub data: DocumentChangeRequest,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerParamsRequest {
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DocumentChangeRequest {
    #[serde(default)]
    pub before: Option<DocumentSnapshotRequest>,
    #[serde(default)]
    pub after: Option<DocumentSnapshotRequest>,
}

#[derive(Debug, Deserialize)]
pub struct DocumentSnapshotRequest {
    pub exists: bool,
    #[serde(default)]
    pub data: Option<Map<String, Value>>,
}

#[derive(Debug, Serialize)]
pub struct ReconciliationResponse {
    pub event_id: String,
    #[serde(flatten)]
    pub report: ReconciliationReport,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

impl RoleDocumentWrittenRequest {
    /// Returns the event id, if the delivery system supplied one.
    pub fn event_id(&self) -> Option<&str> {
        self.id
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }

    /// Converts the payload into a domain change for the configured collection.
    pub fn into_change(self, document_path: &RoleDocumentPath) -> AppResult<RoleDocumentChange> {
        let user_id = resolve_user_id(
            self.params.user_id.as_deref(),
            self.document.as_deref(),
            document_path,
        )?;

        Ok(RoleDocumentChange::new(
            user_id,
            snapshot(self.data.before),
            snapshot(self.data.after),
        ))
    }
}

fn resolve_user_id(
    param_user_id: Option<&str>,
    document: Option<&str>,
    document_path: &RoleDocumentPath,
) -> AppResult<UserId> {
    let from_document = document
        .map(|document| document_path.user_id_from_document(document))
        .transpose()?;

    match (param_user_id, from_document) {
        (Some(param_user_id), Some(from_document)) => {
            let param_user_id = UserId::new(param_user_id)?;
            if param_user_id != from_document {
                return Err(AppError::Validation(format!(
                    "params.userId '{param_user_id}' does not match document user '{from_document}'"
                )));
            }
            Ok(param_user_id)
        }
        (Some(param_user_id), None) => UserId::new(param_user_id),
        (None, Some(from_document)) => Ok(from_document),
        (None, None) => Err(AppError::Validation(
            "event must carry params.userId or a document path".to_owned(),
        )),
    }
}

fn snapshot(request: Option<DocumentSnapshotRequest>) -> DocumentSnapshot {
    request.map_or_else(DocumentSnapshot::missing, |snapshot| {
        DocumentSnapshot::from_parts(snapshot.exists, snapshot.data)
    })
}
