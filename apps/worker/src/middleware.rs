use axum::extract::{Request, State};
use axum::http::{HeaderMap, header};
use axum::middleware::Next;
use axum::response::Response;
use claimsync_core::AppError;
use subtle::ConstantTimeEq;

use crate::error::ApiResult;
use crate::state::AppState;

pub async fn require_trigger_auth(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> ApiResult<Response> {
    if !bearer_matches(request.headers(), &state.trigger_shared_secret) {
        return Err(AppError::Unauthorized("invalid trigger credentials".to_owned()).into());
    }

    Ok(next.run(request).await)
}

fn bearer_matches(headers: &HeaderMap, secret: &str) -> bool {
    let Some(presented) = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
    else {
        return false;
    };

    presented.trim().as_bytes().ct_eq(secret.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use axum::http::{HeaderMap, HeaderValue, header};

    use super::bearer_matches;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn headers(authorization: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Ok(value) = HeaderValue::from_str(authorization) {
            headers.insert(header::AUTHORIZATION, value);
        }
        headers
    }

    #[test]
    fn accepts_matching_bearer_secret() {
        assert!(bearer_matches(&headers(&format!("Bearer {SECRET}")), SECRET));
    }

    #[test]
    fn rejects_missing_or_wrong_credentials() {
        assert!(!bearer_matches(&HeaderMap::new(), SECRET));
        assert!(!bearer_matches(&headers("Bearer nope"), SECRET));
        assert!(!bearer_matches(&headers(&format!("Basic {SECRET}")), SECRET));
    }

    #[test]
    fn rejects_secret_prefix_and_extension() {
        assert!(!bearer_matches(&headers(&format!("Bearer {}", &SECRET[..16])), SECRET));
        assert!(!bearer_matches(&headers(&format!("Bearer {SECRET}0")), SECRET));
    }
}
