use claimsync_core::{AppError, AppResult, NonEmptyString, UserId};

/// Default collection holding one role document per user.
pub const DEFAULT_ROLE_COLLECTION: &str = "users";

/// Path pattern `{collection}/{userId}` for role documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleDocumentPath {
    collection: String,
}

impl RoleDocumentPath {
    /// Creates a path pattern for the given collection.
    pub fn new(collection: impl Into<String>) -> AppResult<Self> {
        let collection = String::from(NonEmptyString::new(collection)?);
        if collection.contains('/') {
            return Err(AppError::Validation(format!(
                "role document collection '{collection}' must be a single path segment"
            )));
        }

        Ok(Self { collection })
    }

    /// Returns the collection name.
    #[must_use]
    pub fn collection(&self) -> &str {
        self.collection.as_str()
    }

    /// Extracts the user id from a document path.
    ///
    /// Accepts `users/{userId}` as well as fully qualified names of the form
    /// `projects/{project}/databases/{database}/documents/users/{userId}`.
    pub fn user_id_from_document(&self, document: &str) -> AppResult<UserId> {
        let mut segments = relative_document_path(document)
            .unwrap_or_default()
            .split('/');
        match (segments.next(), segments.next(), segments.next()) {
            (Some(collection), Some(user_id), None) if collection == self.collection() => {
                UserId::new(user_id)
            }
            _ => Err(AppError::Validation(format!(
                "document '{document}' does not match '{}/{{userId}}'",
                self.collection()
            ))),
        }
    }
}

/// Strips the `projects/{p}/databases/{d}/documents/` prefix of a qualified
/// name. Paths without a `projects/` prefix are already relative.
fn relative_document_path(document: &str) -> Option<&str> {
    let Some(qualified) = document.strip_prefix("projects/") else {
        return Some(document.trim_matches('/'));
    };

    let mut parts = qualified.splitn(4, '/');
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(project), Some("databases"), Some(database), Some(rest))
            if !project.is_empty() && !database.is_empty() =>
        {
            rest.strip_prefix("documents/")
                .map(|relative| relative.trim_end_matches('/'))
        }
        _ => None,
    }
}

impl Default for RoleDocumentPath {
    fn default() -> Self {
        Self {
            collection: DEFAULT_ROLE_COLLECTION.to_owned(),
        }
    }
}
