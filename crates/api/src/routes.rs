//! API route definitions.

use crate::auth::{AuthState, auth_middleware};
use crate::handlers::*;
use crate::state::AppState;
use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Routes served under `/api/v1`.
pub fn create_api_routes() -> Router<AppState> {
    Router::new()
        .route("/fee-percent", get(get_fee_percent).put(set_fee_percent))
        .route("/liquidity", post(add_liquidity))
        .route("/positions", get(list_positions))
        .route("/positions/{owner}", get(get_position))
        .route("/fees/{token}", get(get_accrued_fees))
        .route("/events", get(list_events))
        .route("/stats", get(get_stats))
}

/// Creates the full application router.
///
/// `/health` stays reachable without an API key.
pub fn create_router(state: AppState, auth: AuthState) -> Router {
    let api = create_api_routes().layer(middleware::from_fn_with_state(auth, auth_middleware));

    Router::new()
        .nest("/api/v1", api)
        .route("/health", get(health))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
}
