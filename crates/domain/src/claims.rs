use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Custom claims attached to an identity-provider user.
///
/// Always serializes as `{ "roles": <value> }`; no other top-level shape can
/// be constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomClaims {
    roles: Value,
}

impl CustomClaims {
    /// Wraps a role value verbatim under the `roles` claim.
    #[must_use]
    pub fn with_roles(roles: Value) -> Self {
        Self { roles }
    }

    /// Claims for a user whose document exists but carries no roles.
    #[must_use]
    pub fn empty_roles() -> Self {
        Self {
            roles: Value::Object(Map::new()),
        }
    }

    /// Returns the role value carried by the claims.
    #[must_use]
    pub fn roles(&self) -> &Value {
        &self.roles
    }

    /// Returns the claims as a JSON value.
    #[must_use]
    pub fn to_value(&self) -> Value {
        let mut claims = Map::new();
        claims.insert("roles".to_owned(), self.roles.clone());
        Value::Object(claims)
    }
}
