// src/registrations/routes.rs

use axum::{
    routing::{get, post},
    Json, Router,
};

use super::handlers;

pub fn registrations_routes() -> Router {
    Router::new()
        .route("/health", get(|| async { Json(serde_json::json!({ "status": "ok" })) }))
        .route(
            "/api/users",
            get(handlers::list_registrations).post(handlers::create_registration),
        )
        .route("/api/users/count", get(handlers::count_registrations))
        .route("/api/users/validate", post(handlers::validate_registration))
        .route(
            "/api/users/validate/:field",
            post(handlers::validate_registration_field),
        )
}
