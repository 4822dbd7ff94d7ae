pub mod analytics_routes;
pub mod auth_routes;
pub mod candidate_routes;
pub mod health;
pub mod result_routes;
pub mod session_routes;
pub mod test_routes;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, patch, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{
    auth::require_bearer_auth,
    rate_limit::{rps_middleware, RateLimiter},
};
use crate::AppState;

const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

pub fn build_router(state: AppState, rps: u32) -> Router {
    let public_api = Router::new()
        .route("/auth/register", post(auth_routes::register))
        .route("/auth/login", post(auth_routes::login));

    let protected_api = Router::new()
        .route("/auth/profile", get(auth_routes::profile))
        .route(
            "/tests",
            get(test_routes::list_tests).post(test_routes::create_test),
        )
        .route("/tests/type/:test_type", get(test_routes::list_tests_by_type))
        .route(
            "/tests/:id",
            get(test_routes::get_test)
                .patch(test_routes::update_test)
                .delete(test_routes::delete_test),
        )
        .route(
            "/candidates",
            get(candidate_routes::list_candidates).post(candidate_routes::create_candidate),
        )
        .route(
            "/candidates/:id",
            get(candidate_routes::get_candidate)
                .patch(candidate_routes::update_candidate)
                .delete(candidate_routes::delete_candidate),
        )
        .route(
            "/sessions",
            get(session_routes::list_sessions).post(session_routes::create_session),
        )
        .route("/sessions/:id", get(session_routes::get_session))
        .route("/sessions/:id/start", patch(session_routes::start_session))
        .route("/sessions/:id/answer", post(session_routes::submit_answer))
        .route("/sessions/:id/submit", post(session_routes::submit_session))
        .route(
            "/results/generate/:session_id",
            post(result_routes::generate_result),
        )
        .route("/results", get(result_routes::list_results))
        .route(
            "/results/candidate/:candidate_id",
            get(result_routes::candidate_results),
        )
        .route("/results/:id", get(result_routes::get_result))
        .route("/results/:id/verify", patch(result_routes::verify_result))
        .route("/analytics/dashboard", get(analytics_routes::dashboard))
        .route(
            "/analytics/test-performance",
            get(analytics_routes::test_performance),
        )
        .route(
            "/reports/candidate/:id",
            get(analytics_routes::candidate_report),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            require_bearer_auth,
        ));

    let api = public_api
        .merge(protected_api)
        .layer(axum::middleware::from_fn_with_state(
            RateLimiter::new(rps),
            rps_middleware,
        ));

    Router::new()
        .route("/health", get(health::health))
        .nest("/api/v1", api)
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
}
