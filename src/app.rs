use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware,
    routing::get,
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

use crate::config::{AppConfig, SecurityConfig};
use crate::handlers::{cats, health, users};
use crate::middleware::identity_middleware;
use crate::state::AppState;

/// Full application router, mounted under `/api/v1`
pub fn app(state: AppState, config: &AppConfig) -> Router {
    let api = Router::new()
        .merge(cat_routes())
        .merge(user_routes())
        .route("/auth/token", get(users::token_check))
        .route("/health", get(health::health));

    Router::new()
        .nest("/api/v1", api)
        .layer(middleware::from_fn_with_state(state.clone(), identity_middleware))
        .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes))
        .layer(cors_layer(&config.security))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cat_routes() -> Router<AppState> {
    Router::new()
        .route("/cats", get(cats::cat_list).post(cats::cat_post))
        .route(
            "/cats/:id",
            get(cats::cat_get).put(cats::cat_put).delete(cats::cat_delete),
        )
}

fn user_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/users",
            get(users::user_list)
                .post(users::user_post)
                .put(users::user_put_current)
                .delete(users::user_delete_current),
        )
        .route(
            "/users/:id",
            get(users::user_get).put(users::user_put).delete(users::user_delete),
        )
        .route("/users/:id/cats", get(cats::cats_by_user))
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    if !security.enable_cors {
        return CorsLayer::new();
    }
    if security.cors_origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}
