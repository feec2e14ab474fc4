//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod access_token_source;
mod console_identity_provider_admin;
mod http_identity_provider_admin;

#[cfg(test)]
mod test_support;

pub use access_token_source::{
    AccessTokenSource, DEFAULT_METADATA_SERVER_URL, MetadataServerAccessTokenSource,
    StaticAccessTokenSource,
};
pub use console_identity_provider_admin::ConsoleIdentityProviderAdmin;
pub use http_identity_provider_admin::{HttpIdentityProviderAdmin, IdentityToolkitConfig};
