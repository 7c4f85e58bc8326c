use axum::{
    http::HeaderValue,
    middleware,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde_json::{json, Value};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::middleware::{request_id_middleware, span_for_request};

pub mod ai;
pub mod auth;
pub mod extract;
pub mod matching;
pub mod profile;
pub mod state;
pub mod students;

pub use state::AppState;

/// Creates the application router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors_origin);

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http().make_span_with(span_for_request))
        .layer(cors)
        // Outermost, so the trace span can see the id
        .layer(middleware::from_fn(request_id_middleware))
}

/// API routes under /api
fn api_routes() -> Router<AppState> {
    Router::new()
        // Accounts
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/me", get(auth::me))
        // Profile
        .route("/profile/me", get(profile::me))
        .route("/profile/confidence", post(profile::save_confidence))
        // Peer matching
        .route("/match/peers", get(matching::peers))
        // Students
        .route("/students/courses", get(students::courses))
        .route("/students/enroll", post(students::enroll))
        .route("/students/recommendations", get(students::recommendations))
        // AI proxy
        .route("/ai/recommendations/:user_id", get(ai::recommendations))
        .route("/ai/chatbot", post(ai::chatbot))
        .route("/ai/chatbot/history", get(ai::history))
        .route(
            "/ai/chatbot/archive",
            post(ai::archive).get(ai::archived),
        )
        .route("/ai/learning-path", get(ai::learning_path))
        .route("/ai/full-recommendations", get(ai::full_recommendations))
        .route("/ai/summarize", post(ai::summarize))
}

fn cors_layer(origin: &str) -> CorsLayer {
    let allow_origin = match origin.parse::<HeaderValue>() {
        Ok(value) => AllowOrigin::exact(value),
        Err(e) => {
            tracing::warn!(origin, error = %e, "Invalid CORS origin, allowing any origin");
            AllowOrigin::any()
        }
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Health check endpoint
async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "OK",
        "timestamp": Utc::now().to_rfc3339(),
        "service": env!("CARGO_PKG_NAME"),
    }))
}
