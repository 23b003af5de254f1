//! Fitted per-feature standardization.

use super::features::{check_schema, FeatureVector, SchemaMismatch, FEATURE_COUNT};
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum ScalerError {
    #[error("scaler file {path} could not be read: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("scaler file is malformed: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("scaler {field} has {actual} entries, expected {expected}")]
    Length {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error(transparent)]
    Schema(#[from] SchemaMismatch),

    #[error("scaler {field}[{index}] is {value}")]
    InvalidValue {
        field: &'static str,
        index: usize,
        value: f64,
    },
}

/// On-disk scaler parameters. sklearn's attribute names are accepted.
#[derive(Debug, Deserialize)]
struct ScalerFile {
    #[serde(alias = "feature_names_in_")]
    feature_names: Vec<String>,
    #[serde(alias = "mean_")]
    mean: Vec<f64>,
    #[serde(alias = "scale_")]
    scale: Vec<f64>,
}

/// Standardizer applying `(x - mean) / scale` per feature.
#[derive(Debug, Clone, PartialEq)]
pub struct StandardScaler {
    mean: [f64; FEATURE_COUNT],
    scale: [f64; FEATURE_COUNT],
}

impl StandardScaler {
    /// Load fitted parameters from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ScalerError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ScalerError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let scaler = Self::from_json(&content)?;
        info!("Loaded scaler from {}", path.display());
        Ok(scaler)
    }

    pub fn from_json(content: &str) -> Result<Self, ScalerError> {
        let file: ScalerFile = serde_json::from_str(content)?;
        check_schema(&file.feature_names)?;
        Self::new(&file.mean, &file.scale)
    }

    /// Build from parameters in schema order.
    pub fn new(mean: &[f64], scale: &[f64]) -> Result<Self, ScalerError> {
        let mean = to_array("mean", mean)?;
        let scale = to_array("scale", scale)?;

        for (index, &value) in mean.iter().enumerate() {
            if !value.is_finite() {
                return Err(ScalerError::InvalidValue {
                    field: "mean",
                    index,
                    value,
                });
            }
        }
        for (index, &value) in scale.iter().enumerate() {
            if !value.is_finite() || value == 0.0 {
                return Err(ScalerError::InvalidValue {
                    field: "scale",
                    index,
                    value,
                });
            }
        }

        Ok(Self { mean, scale })
    }

    /// Standardize a feature vector, preserving schema order.
    pub fn transform(&self, features: &FeatureVector) -> [f64; FEATURE_COUNT] {
        let mut out = *features.values();
        for ((value, mean), scale) in out.iter_mut().zip(&self.mean).zip(&self.scale) {
            *value = (*value - mean) / scale;
        }
        out
    }
}

fn to_array(field: &'static str, values: &[f64]) -> Result<[f64; FEATURE_COUNT], ScalerError> {
    values.try_into().map_err(|_| ScalerError::Length {
        field,
        expected: FEATURE_COUNT,
        actual: values.len(),
    })
}
