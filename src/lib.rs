//! Content-management REST API built with Rust.
//!
//! User registration and login with argon2-hashed passwords and JWT bearer
//! tokens, email-category management, and a form builder whose forms hold
//! ordered sections of ordered, typed fields.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

pub use config::Config;
pub use error::AppError;
pub use handlers::http::AppState;
pub use services::category::CategoryService;
pub use services::form::FormService;

use axum::routing::{get, post};
use handlers::http;
use tower_http::trace::TraceLayer;

/// Build the API router (health, auth, email categories, forms). Used by main and by integration tests.
pub fn create_app(state: AppState) -> axum::Router {
    let auth_routes = axum::Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/me", get(auth::me));

    let api_routes = axum::Router::new()
        .route(
            "/email-categories",
            get(handlers::list_categories).post(handlers::create_category),
        )
        .route(
            "/email-categories/:id",
            get(handlers::get_category)
                .put(handlers::update_category)
                .delete(handlers::delete_category),
        )
        .route("/email-categories/:id/form", get(handlers::get_category_form))
        .route("/forms", get(handlers::list_forms).post(handlers::create_form))
        .route(
            "/forms/:id",
            get(handlers::get_form)
                .put(handlers::update_form)
                .delete(handlers::delete_form),
        );

    axum::Router::new()
        .route("/health", get(http::health))
        .nest("/auth", auth_routes)
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
