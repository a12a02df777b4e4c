//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST API routes over the core services
//! - Authentication middleware delegating to an external identity provider
//! - Request/response types

pub mod middleware;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use konsern_core::app::AppContext;

use crate::middleware::auth::IdentityProvider;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// The application context (services, caches, lifecycle).
    pub ctx: Arc<AppContext>,
    /// External identity provider resolving bearer tokens.
    pub identity: Arc<dyn IdentityProvider>,
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes_with_state(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
