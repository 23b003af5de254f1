use crate::error::{AppError, Result};
use crate::types::{PredictRequest, PredictionResult};
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use tracing::info;

/// POST /predict/
async fn predict(
    State(state): State<AppState>,
    payload: std::result::Result<Json<PredictRequest>, JsonRejection>,
) -> Result<Json<PredictionResult>> {
    let Json(request) = payload.map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
    info!("Prediction requested for {:?}", request.company_name);

    let result = state.predictor.predict(&request.company_name).await?;
    state.metrics.inc_prediction(result.prediction);

    Ok(Json(result))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/predict/", post(predict))
        .route("/predict", post(predict))
}
