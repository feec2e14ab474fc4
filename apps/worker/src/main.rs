//! Claimsync role-claims worker runtime.

#![forbid(unsafe_code)]

mod dto;
mod error;
mod handlers;
mod middleware;
mod state;
mod trigger_router;
mod worker_config;

use std::sync::Arc;
use std::time::Duration;

use claimsync_application::{IdentityProviderAdmin, RoleClaimsReconciler};
use claimsync_core::{AppError, AppResult};
use claimsync_domain::RoleDocumentPath;
use claimsync_infrastructure::{
    AccessTokenSource, ConsoleIdentityProviderAdmin, HttpIdentityProviderAdmin,
    MetadataServerAccessTokenSource, StaticAccessTokenSource,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::state::AppState;
use crate::worker_config::{CredentialSettings, IdentityProviderSettings, WorkerConfig};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = WorkerConfig::load()?;
    let identity_provider = build_identity_provider(&config.identity_provider)?;
    let document_path = RoleDocumentPath::new(config.role_document_collection.as_str())?;

    let app_state = AppState {
        reconciler: RoleClaimsReconciler::new(identity_provider),
        document_path,
        trigger_shared_secret: Arc::from(config.trigger_shared_secret.as_str()),
    };
    let app = trigger_router::build_router(app_state);

    let address = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind {address}: {error}")))?;

    info!(
        address = %address,
        identity_provider = config.identity_provider.kind(),
        role_document_collection = %config.role_document_collection,
        "claimsync-worker listening"
    );

    axum::serve(listener, app)
        .await
        .map_err(|error| AppError::Internal(format!("worker server failed: {error}")))
}

fn build_identity_provider(
    settings: &IdentityProviderSettings,
) -> AppResult<Arc<dyn IdentityProviderAdmin>> {
    match settings {
        IdentityProviderSettings::Http {
            toolkit,
            credentials,
            timeout_ms,
        } => {
            let http_client = reqwest::Client::builder()
                .timeout(Duration::from_millis(*timeout_ms))
                .build()
                .map_err(|error| {
                    AppError::Internal(format!("failed to build HTTP client: {error}"))
                })?;

            let token_source: Arc<dyn AccessTokenSource> = match credentials {
                CredentialSettings::Metadata { metadata_url } => {
                    Arc::new(MetadataServerAccessTokenSource::new(
                        http_client.clone(),
                        metadata_url.clone(),
                    )?)
                }
                CredentialSettings::Static { access_token } => {
                    Arc::new(StaticAccessTokenSource::new(access_token.as_str()))
                }
            };

            Ok(Arc::new(HttpIdentityProviderAdmin::new(
                http_client,
                toolkit.clone(),
                token_source,
            )?))
        }
        IdentityProviderSettings::Console => Ok(Arc::new(ConsoleIdentityProviderAdmin::new())),
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}
