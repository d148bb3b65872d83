use axum::{
    Json, Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, header::{AUTHORIZATION, CONTENT_TYPE}, request::Parts},
    middleware,
    routing::{get, post, put},
};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use geoquiz_types::api::HealthResponse;
use geoquiz_types::models::AttributionMode;

use crate::middleware::require_auth;
use crate::state::AppState;
use crate::{auth, quizzes};

/// Assemble the full HTTP surface for the deployment's attribution mode.
pub fn router(state: AppState, max_upload_bytes: usize) -> Router {
    let quiz_routes = Router::new()
        .route("/api/quizzes", get(quizzes::list_quizzes).post(quizzes::create_quiz))
        .route("/api/quizzes/{id}", put(quizzes::update_quiz).delete(quizzes::delete_quiz))
        .route("/api/quizzes/{id}/photos", get(quizzes::list_photos))
        .layer(DefaultBodyLimit::max(max_upload_bytes));

    let mut app = Router::new().route("/api/health", get(health));

    app = match state.mode() {
        AttributionMode::Authenticated => app
            .route("/api/auth/signup", post(auth::signup))
            .route("/api/auth/login", post(auth::login))
            .merge(quiz_routes.layer(middleware::from_fn_with_state(state.clone(), require_auth))),
        AttributionMode::Anonymous => app.merge(quiz_routes),
    };

    app.nest_service("/images", ServeDir::new(state.images.dir()))
        .layer(cors())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
        message: "Quiz server ready".into(),
    })
}

/// Browser clients run on any localhost port during development.
fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(|origin: &HeaderValue, _: &Parts| {
            origin.to_str().is_ok_and(is_localhost_origin)
        }))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .allow_credentials(true)
}

fn is_localhost_origin(origin: &str) -> bool {
    origin
        .strip_prefix("http://localhost:")
        .is_some_and(|port| !port.is_empty() && port.chars().all(|c| c.is_ascii_digit()))
}
