use serde::{Deserialize, Serialize};

/// Body of a prediction request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictRequest {
    pub company_name: String,
}

/// Prediction for one company.
///
/// `prediction` is the index of the larger logit: 1 for an upward move, 0 otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub company_name: String,
    pub prediction: u8,
}
