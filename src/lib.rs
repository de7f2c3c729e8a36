//! LabDesk server
//!
//! Institutional IT asset inventory and service request management, exposed
//! as a REST JSON API. Departments own labs and assets; HODs, the Dean, system
//! admins and lab incharges move requests and tickets through their approval
//! workflows.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;
pub mod workflow;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        // Health check
        .route("/health", get(api::health::health_check))
        .route("/ready", get(api::health::readiness_check))
        // Authentication
        .route("/auth/login", post(api::auth::login))
        .route("/auth/me", get(api::auth::me))
        .route("/register", post(api::auth::register))
        // Users
        .route("/users", get(api::users::list_users).post(api::users::create_user))
        .route(
            "/users/:id",
            get(api::users::get_user)
                .put(api::users::update_user)
                .delete(api::users::delete_user),
        )
        // Departments
        .route(
            "/departments",
            get(api::departments::list_departments).post(api::departments::create_department),
        )
        .route(
            "/departments/:id",
            get(api::departments::get_department)
                .put(api::departments::update_department)
                .patch(api::departments::update_department)
                .delete(api::departments::delete_department),
        )
        // Labs
        .route("/labs", get(api::labs::list_labs).post(api::labs::create_lab))
        .route(
            "/labs/:id",
            get(api::labs::get_lab)
                .put(api::labs::update_lab)
                .delete(api::labs::delete_lab),
        )
        // Assets
        .route("/assets", get(api::assets::list_assets).post(api::assets::create_asset))
        .route(
            "/assets/:id",
            get(api::assets::get_asset)
                .put(api::assets::update_asset)
                .delete(api::assets::delete_asset),
        )
        // Tickets
        .route("/tickets", get(api::tickets::list_tickets).post(api::tickets::create_ticket))
        .route(
            "/tickets/:id",
            get(api::tickets::get_ticket).patch(api::tickets::update_ticket),
        )
        // Requests
        .route(
            "/requests",
            get(api::requests::list_requests).post(api::requests::create_request),
        )
        .route(
            "/requests/:id",
            get(api::requests::get_request).patch(api::requests::update_request),
        )
        // Activity and statistics
        .route("/activities", get(api::activities::list_activities))
        .route("/stats", get(api::stats::get_stats))
        .with_state(state);

    // OpenAPI documentation
    let openapi = api::openapi::create_openapi_router();

    Router::new()
        .nest("/api", api)
        .merge(openapi)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
}
