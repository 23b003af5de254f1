//! Transformer-encoder sequence classifier.
//!
//! The scaled feature vector is projected to the model width and treated as a
//! one-token sequence. A learned classification token is prepended, the pair
//! runs through the encoder stack, and the classification token's output is
//! mapped to class logits.

pub mod layers;
pub mod weights;

pub use weights::{ClassifierConfig, ModelArtifact, RawTensor};

use crate::services::features::{check_schema, SchemaMismatch, FEATURE_COUNT};
use layers::{EncoderLayer, Linear};
use ndarray::{Array1, Array2, Axis};
use std::path::Path;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("model file {path} could not be read: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("model file is malformed: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("model tensor {0} is missing")]
    MissingTensor(String),

    #[error("model tensor {name} has shape {actual:?} with {elements} values, expected {expected:?}")]
    Shape {
        name: String,
        expected: Vec<usize>,
        actual: Vec<usize>,
        elements: usize,
    },

    #[error(transparent)]
    Tensor(#[from] ndarray::ShapeError),

    #[error("invalid model config: {0}")]
    Config(String),

    #[error(transparent)]
    Schema(#[from] SchemaMismatch),

    #[error("model expects {expected} input features, got {actual}")]
    Input { expected: usize, actual: usize },

    #[error("model produced non-finite logits {0:?}")]
    NonFinite(Vec<f32>),
}

/// Pretrained classifier, evaluation mode only.
#[derive(Debug, Clone)]
pub struct SequenceClassifier {
    config: ClassifierConfig,
    input_proj: Linear,
    cls_token: Array1<f32>,
    layers: Vec<EncoderLayer>,
    fc: Linear,
}

impl SequenceClassifier {
    /// Load a model artifact from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ModelError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let artifact: ModelArtifact = serde_json::from_str(&content)?;
        let model = Self::from_artifact(&artifact)?;

        info!(
            "Loaded model from {} ({} layers, width {}, {} heads)",
            path.display(),
            model.config.num_layers,
            model.config.model_dim,
            model.config.num_heads
        );
        Ok(model)
    }

    /// Build the model, validating every tensor against the config.
    pub fn from_artifact(artifact: &ModelArtifact) -> Result<Self, ModelError> {
        let config = artifact.config.clone();
        validate_config(&config)?;

        if let Some(names) = &artifact.feature_names {
            check_schema(names)?;
        }

        let d = config.model_dim;
        let layers = (0..config.num_layers)
            .map(|i| EncoderLayer::load(artifact, i, d, config.num_heads, config.ff_dim, config.layer_norm_eps))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            input_proj: Linear::load(artifact, "input_proj", config.input_dim, d)?,
            cls_token: artifact.embedding("cls_token", d)?,
            layers,
            fc: Linear::load(artifact, "fc", d, config.num_classes)?,
            config,
        })
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Class logits for one feature vector.
    pub fn logits(&self, features: &[f64]) -> Result<Vec<f32>, ModelError> {
        if features.len() != self.config.input_dim {
            return Err(ModelError::Input {
                expected: self.config.input_dim,
                actual: features.len(),
            });
        }

        let input = Array2::from_shape_vec(
            (1, features.len()),
            features.iter().map(|&v| v as f32).collect(),
        )?;
        let projected = self.input_proj.forward(&input);

        // [cls, x]
        let mut sequence = Array2::zeros((2, self.config.model_dim));
        sequence.row_mut(0).assign(&self.cls_token);
        sequence.row_mut(1).assign(&projected.row(0));

        for layer in &self.layers {
            sequence = layer.forward(&sequence);
        }

        let cls = sequence.row(0).to_owned().insert_axis(Axis(0));
        let logits = self.fc.forward(&cls).row(0).to_vec();

        if logits.iter().any(|v| !v.is_finite()) {
            return Err(ModelError::NonFinite(logits));
        }
        Ok(logits)
    }

    /// Predicted class index.
    pub fn predict(&self, features: &[f64]) -> Result<usize, ModelError> {
        Ok(argmax(&self.logits(features)?))
    }
}

/// Index of the largest value; the lowest index wins on exact ties.
pub fn argmax(values: &[f32]) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate().skip(1) {
        if v > values[best] {
            best = i;
        }
    }
    best
}

fn validate_config(config: &ClassifierConfig) -> Result<(), ModelError> {
    if config.input_dim != FEATURE_COUNT {
        return Err(ModelError::Config(format!(
            "input_dim is {}, the feature schema has {} columns",
            config.input_dim, FEATURE_COUNT
        )));
    }
    if config.num_heads == 0 || config.model_dim % config.num_heads != 0 {
        return Err(ModelError::Config(format!(
            "model_dim {} is not divisible by num_heads {}",
            config.model_dim, config.num_heads
        )));
    }
    if config.num_classes != 2 {
        return Err(ModelError::Config(format!(
            "expected 2 classes, got {}",
            config.num_classes
        )));
    }
    Ok(())
}
