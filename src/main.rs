//! CyberSlide Backend
//!
//! Turns a topic into a slide deck: text draft, generated backgrounds,
//! optional vector reconstruction, and export to a presentation service.

mod api;
mod auth;
mod config;
mod errors;
mod icons;
mod models;
mod pipeline;
mod render;
mod services;
mod workflow;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::Config;
use services::Collaborators;
use workflow::WorkflowController;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub controller: Arc<WorkflowController>,
    pub config: Arc<Config>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env();

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let registry = tracing_subscriber::registry().with(env_filter);
    if config.log_json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!("Starting CyberSlide Backend");
    tracing::info!("Upstream services: {}", config.upstream_url);
    tracing::info!("Icon provider: {}", config.icon_base_url);
    tracing::info!("Bind address: {}", config.bind_addr);

    // Warn if PSK is not configured
    if config.api_psk.is_none() {
        tracing::warn!("No API PSK configured (CYBERSLIDE_API_PSK). Authentication is disabled!");
    }
    if config.image_timeout.is_none() {
        tracing::warn!("Image requests have no timeout (CYBERSLIDE_IMAGE_TIMEOUT_SECS=0)");
    }

    let services = Collaborators::over_http(&config.upstream_url, &config.icon_base_url);
    let controller = Arc::new(WorkflowController::new(services, config.image_timeout));

    // Create application state
    let state = AppState {
        controller,
        config: Arc::new(config.clone()),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Clone PSK for the auth layer
    let psk = state.config.api_psk.clone();

    // API routes
    let api_routes = Router::new()
        // Session and stage transitions
        .route("/project", get(api::get_project))
        .route("/project/draft", post(api::submit_draft))
        .route("/project/advance", post(api::advance_project))
        .route("/project/reset", post(api::reset_project))
        .route("/project/export", post(api::export_project))
        // Slides
        .route("/project/slides/{index}", put(api::edit_slide))
        .route("/project/slides/{index}/layout", put(api::update_layout))
        .route("/project/slides/{index}/view", put(api::set_view_mode))
        .route("/project/slides/{index}/remake", post(api::remake_slide))
        .route("/project/slides/{index}/scene", get(api::get_scene))
        .route("/project/slides/{index}/preview.svg", get(api::get_preview_svg))
        // Apply PSK auth middleware
        .layer(middleware::from_fn(move |req, next| {
            auth::psk_auth_layer(psk.clone(), req, next)
        }));

    // Health check (no auth required)
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
