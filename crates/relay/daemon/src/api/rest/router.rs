//! API Router configuration

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers;
use super::state::AppState;

/// Create the main API router
pub fn create_router(state: AppState, enable_cors: bool) -> Router {
    let api_routes = Router::new()
        // Health
        .route("/health", get(handlers::health_check))
        // Actions
        .route("/execute", post(handlers::execute_action))
        .route("/evaluate", post(handlers::evaluate_action))
        // Governance
        .route(
            "/governance/executors/:principal",
            post(handlers::add_executor).delete(handlers::remove_executor),
        )
        .route(
            "/governance/targets/:target/allowed",
            put(handlers::set_target_allowed),
        )
        .route(
            "/governance/targets/:target/scoped",
            put(handlers::set_target_scoped),
        )
        .route(
            "/governance/targets/:target/selectors/:selector",
            put(handlers::set_allowed_function),
        )
        // Inspection
        .route("/executors", get(handlers::list_executors))
        .route("/targets", get(handlers::list_targets))
        .route("/targets/:target", get(handlers::get_target))
        .route("/ledger", get(handlers::query_ledger));

    // Build router with middleware
    let router = Router::new()
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http());

    let router = if enable_cors {
        router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
    } else {
        router
    };

    router.with_state(state)
}
