//! # Salon API
//!
//! HTTP surface of the salon booking service: free-slot lookup, the
//! appointment lifecycle and master work-schedule management.
//!
//! ## Architecture
//!
//! - **Routes**: Define API endpoints and URL structure
//! - **Handlers**: Translate HTTP requests into [`BookingService`] calls
//! - **Middleware**: Actor extraction and error mapping
//! - **Config**: Environment-driven settings
//!
//! The API uses Axum as the web framework. Storage and notification
//! backends are injected through the [`BookingService`] handed to
//! [`start_server`].

/// Configuration module for API settings
pub mod config;
/// Request handlers
pub mod handlers;
/// Actor extraction and error handling
pub mod middleware;
/// Route definitions and API endpoint structure
pub mod routes;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    http::{HeaderValue, Method, header},
};
use eyre::{Result, WrapErr};
use salon_core::booking::BookingService;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::FmtSubscriber;

use middleware::actor::{ACTOR_ID_HEADER, ACTOR_ROLE_HEADER};

/// Shared application state that is accessible to all request handlers
pub struct ApiState {
    pub bookings: BookingService,
}

impl ApiState {
    pub fn new(bookings: BookingService) -> Arc<Self> {
        Arc::new(Self { bookings })
    }
}

/// Builds the application router with all routes attached to `state`.
pub fn app(state: Arc<ApiState>) -> Router {
    Router::new()
        // Health check endpoints
        .merge(routes::health::routes())
        // Slots and appointment lifecycle
        .merge(routes::appointments::routes())
        // Work schedules and exceptions
        .merge(routes::masters::routes())
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> Result<CorsLayer> {
    let origins = origins
        .iter()
        .map(|origin| {
            origin
                .parse::<HeaderValue>()
                .wrap_err_with(|| format!("Invalid CORS origin '{}'", origin))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::ACCEPT,
            ACTOR_ID_HEADER,
            ACTOR_ROLE_HEADER,
        ])
        .allow_origin(origins)
        .allow_credentials(true))
}

/// Starts the API server.
///
/// Installs the global tracing subscriber, wires routes, CORS and the
/// request timeout, then serves until the listener fails.
///
/// # Example
///
/// ```ignore
/// let config = ApiConfig::from_env()?;
/// let bookings = BookingService::new(store.clone(), store, notifier, clock, config.booking_settings());
/// start_server(config, bookings).await?;
/// ```
pub async fn start_server(config: config::ApiConfig, bookings: BookingService) -> Result<()> {
    // Initialize tracing for logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let state = ApiState::new(bookings);
    let app = app(state);

    // Apply CORS configuration if origins are specified
    let app = match &config.cors_origins {
        Some(origins) => app.layer(cors_layer(origins)?),
        None => app,
    };

    // Request tracing and timeout
    let app = app.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout))),
    );

    // Start the HTTP server
    let addr = config.server_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!(
        timezone = %config.timezone,
        slot_step_minutes = config.slot_step_minutes,
        "Server listening on http://{}",
        addr
    );
    axum::serve(listener, app).await?;

    Ok(())
}
