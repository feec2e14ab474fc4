use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::{handlers, middleware};

pub fn build_router(app_state: AppState) -> Router {
    let trigger_routes = Router::new()
        .route(
            "/triggers/role-documents",
            post(handlers::role_document_written_handler),
        )
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_trigger_auth,
        ));

    Router::new()
        .route("/health", get(handlers::health_handler))
        .merge(trigger_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
