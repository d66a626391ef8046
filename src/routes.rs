// routes.rs
use std::time::Duration;

use axum::{
    routing::{get, post},
    Router,
};
use http::{
    header::{AUTHORIZATION, CONTENT_TYPE},
    Method,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{handlers, state::AppState};

/// Every route, mounted under `prefix` (empty for the root).
pub fn create_routes(state: AppState, prefix: &str) -> Router {
    let api = Router::new()
        .route("/health", get(handlers::health))
        .route("/quiz", get(handlers::list_quizzes).post(handlers::create_quiz))
        .route(
            "/quiz/{id}",
            get(handlers::get_quiz)
                .put(handlers::update_quiz)
                .delete(handlers::delete_quiz),
        )
        .route("/recipes", get(handlers::list_recipes).post(handlers::create_recipe))
        .route(
            "/recipes/{id}",
            get(handlers::get_recipe)
                .put(handlers::update_recipe)
                .delete(handlers::delete_recipe),
        )
        .route("/admin/login", post(handlers::login))
        .route("/admin/session", get(handlers::session));

    let router = if prefix.is_empty() {
        api
    } else {
        Router::new().nest(prefix, api)
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .max_age(Duration::from_secs(60 * 60));

    router
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
