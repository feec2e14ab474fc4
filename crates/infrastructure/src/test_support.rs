use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::extract::State;
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use tokio::sync::Mutex;
use url::Url;

/// Local stand-in for the metadata server and the accounts endpoint.
#[derive(Clone)]
pub(crate) struct FakeGoogleApis {
    token_lifetime_seconds: i64,
    tokens_issued: Arc<AtomicUsize>,
    rejected_updates: Arc<AtomicUsize>,
    authorizations: Arc<Mutex<Vec<String>>>,
}

impl FakeGoogleApis {
    pub(crate) fn with_token_lifetime(token_lifetime_seconds: i64) -> Self {
        Self {
            token_lifetime_seconds,
            tokens_issued: Arc::new(AtomicUsize::new(0)),
            rejected_updates: Arc::new(AtomicUsize::new(0)),
            authorizations: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Answers the next `count` account updates with 401.
    pub(crate) fn rejecting_first_updates(self, count: usize) -> Self {
        self.rejected_updates.store(count, Ordering::SeqCst);
        self
    }

    pub(crate) fn tokens_issued(&self) -> usize {
        self.tokens_issued.load(Ordering::SeqCst)
    }

    pub(crate) async fn authorizations(&self) -> Vec<String> {
        self.authorizations.lock().await.clone()
    }

    pub(crate) async fn spawn(&self) -> Url {
        let app = Router::new()
            .route(
                "/computeMetadata/v1/instance/service-accounts/default/token",
                get(metadata_token),
            )
            .route("/v1/projects/{project}/accounts:update", post(accounts_update))
            .with_state(self.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .unwrap_or_else(|error| panic!("failed to bind fake server: {error}"));
        let address = listener
            .local_addr()
            .unwrap_or_else(|error| panic!("fake server has no address: {error}"));
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Url::parse(&format!("http://{address}/"))
            .unwrap_or_else(|error| panic!("invalid fake server url: {error}"))
    }
}

async fn metadata_token(
    State(fake): State<FakeGoogleApis>,
    headers: HeaderMap,
) -> Result<Json<Value>, StatusCode> {
    let flavor = headers
        .get("metadata-flavor")
        .and_then(|value| value.to_str().ok());
    if flavor != Some("Google") {
        return Err(StatusCode::FORBIDDEN);
    }

    let issued = fake.tokens_issued.fetch_add(1, Ordering::SeqCst) + 1;
    Ok(Json(json!({
        "access_token": format!("token-{issued}"),
        "expires_in": fake.token_lifetime_seconds,
        "token_type": "Bearer",
    })))
}

async fn accounts_update(
    State(fake): State<FakeGoogleApis>,
    headers: HeaderMap,
) -> (StatusCode, Json<Value>) {
    let authorization = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_owned();
    fake.authorizations.lock().await.push(authorization);

    let rejected = fake
        .rejected_updates
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |remaining| {
            remaining.checked_sub(1)
        })
        .is_ok();
    if rejected {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": {"code": 401, "message": "INVALID_ID_TOKEN"}})),
        );
    }

    (StatusCode::OK, Json(json!({"kind": "identitytoolkit#SetAccountInfoResponse"})))
}
