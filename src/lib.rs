//! Stockcast - next-day stock movement prediction service

pub mod api;
pub mod config;
pub mod error;
pub mod services;
pub mod sources;
pub mod types;

use axum::{middleware, Router};
use services::{Metrics, PredictionService};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub predictor: Arc<PredictionService>,
    pub metrics: Metrics,
}

/// Build the HTTP application with its middleware stack.
pub fn build_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(api::router())
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            api::metrics::track_metrics,
        ))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(CatchPanicLayer::custom(error::panic_response)),
        )
        .with_state(state)
}

// Re-export commonly used types
pub use error::AppError;
pub use types::*;
