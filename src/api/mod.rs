pub mod health;
pub mod metrics;
pub mod predict;

use crate::AppState;
use axum::Router;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(predict::router())
        .merge(metrics::router())
}
