use claimsync_core::UserId;
use serde_json::{Map, Value};

/// Field of the role document that carries the role mapping.
const ROLES_FIELD: &str = "roles";

/// Point-in-time view of a role document as delivered with a change event.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentSnapshot {
    exists: bool,
    data: Option<Map<String, Value>>,
}

impl DocumentSnapshot {
    /// Creates a snapshot for a document that does not exist.
    #[must_use]
    pub fn missing() -> Self {
        Self {
            exists: false,
            data: None,
        }
    }

    /// Creates a snapshot for an existing document with the given fields.
    #[must_use]
    pub fn existing(data: Map<String, Value>) -> Self {
        Self {
            exists: true,
            data: Some(data),
        }
    }

    /// Creates a snapshot from transport parts.
    ///
    /// Data is discarded when the document does not exist.
    #[must_use]
    pub fn from_parts(exists: bool, data: Option<Map<String, Value>>) -> Self {
        if exists {
            Self { exists, data }
        } else {
            Self::missing()
        }
    }

    /// Returns whether the document exists in this snapshot.
    #[must_use]
    pub fn exists(&self) -> bool {
        self.exists
    }

    /// Returns the raw `roles` field value, if the document carries one.
    #[must_use]
    pub fn roles(&self) -> Option<&Value> {
        self.data.as_ref().and_then(|data| data.get(ROLES_FIELD))
    }
}

/// One observed write to a user's role document.
#[derive(Debug, Clone, PartialEq)]
pub struct RoleDocumentChange {
    user_id: UserId,
    before: DocumentSnapshot,
    after: DocumentSnapshot,
}

impl RoleDocumentChange {
    /// Creates a change notification for one user.
    #[must_use]
    pub fn new(user_id: UserId, before: DocumentSnapshot, after: DocumentSnapshot) -> Self {
        Self {
            user_id,
            before,
            after,
        }
    }

    /// Returns the user the document belongs to.
    #[must_use]
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Returns the snapshot prior to the write.
    #[must_use]
    pub fn before(&self) -> &DocumentSnapshot {
        &self.before
    }

    /// Returns the snapshot after the write.
    #[must_use]
    pub fn after(&self) -> &DocumentSnapshot {
        &self.after
    }
}

/// Returns whether a `roles` value carries no roles.
///
/// Null, booleans, numbers, empty strings, empty lists and empty mappings
/// carry no roles. Anything else is treated as role content and passed
/// through untouched, even when it is not a mapping.
#[must_use]
pub(crate) fn roles_value_is_empty(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(_) | Value::Number(_) => true,
        Value::String(text) => text.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(entries) => entries.is_empty(),
    }
}
