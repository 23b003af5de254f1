//! Model artifact format.
//!
//! A JSON document with the architecture config and a flat tensor map keyed by
//! PyTorch state-dict names (`input_proj.weight`, `cls_token`,
//! `transformer_encoder.layers.0.self_attn.in_proj_weight`, `fc.bias`, ...).

use super::ModelError;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Architecture hyperparameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub input_dim: usize,
    pub model_dim: usize,
    pub num_heads: usize,
    pub num_layers: usize,
    pub ff_dim: usize,
    pub num_classes: usize,
    pub layer_norm_eps: f32,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            input_dim: 9,
            model_dim: 64,
            num_heads: 4,
            num_layers: 2,
            ff_dim: 2048,
            num_classes: 2,
            layer_norm_eps: 1e-5,
        }
    }
}

/// Row-major tensor as stored in the artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTensor {
    pub shape: Vec<usize>,
    pub data: Vec<f32>,
}

/// Deserialized model artifact.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelArtifact {
    #[serde(default)]
    pub config: ClassifierConfig,
    /// Feature columns the model was trained on, if recorded.
    #[serde(default)]
    pub feature_names: Option<Vec<String>>,
    pub tensors: BTreeMap<String, RawTensor>,
}

impl ModelArtifact {
    pub fn new(config: ClassifierConfig) -> Self {
        Self {
            config,
            feature_names: None,
            tensors: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, name: impl Into<String>, shape: &[usize], data: Vec<f32>) {
        self.tensors.insert(
            name.into(),
            RawTensor {
                shape: shape.to_vec(),
                data,
            },
        );
    }

    fn data(&self, name: &str, shape: &[usize]) -> Result<Vec<f32>, ModelError> {
        let tensor = self
            .tensors
            .get(name)
            .ok_or_else(|| ModelError::MissingTensor(name.to_string()))?;

        let elements: usize = tensor.shape.iter().product();
        if tensor.shape != shape || tensor.data.len() != elements {
            return Err(ModelError::Shape {
                name: name.to_string(),
                expected: shape.to_vec(),
                actual: tensor.shape.clone(),
                elements: tensor.data.len(),
            });
        }

        Ok(tensor.data.clone())
    }

    pub(crate) fn matrix(&self, name: &str, rows: usize, cols: usize) -> Result<Array2<f32>, ModelError> {
        let data = self.data(name, &[rows, cols])?;
        Ok(Array2::from_shape_vec((rows, cols), data)?)
    }

    pub(crate) fn vector(&self, name: &str, len: usize) -> Result<Array1<f32>, ModelError> {
        let data = self.data(name, &[len])?;
        Ok(Array1::from(data))
    }

    /// Vector stored with leading unit axes, e.g. `cls_token` as `[1, 1, d]`.
    pub(crate) fn embedding(&self, name: &str, len: usize) -> Result<Array1<f32>, ModelError> {
        let data = self.data(name, &[1, 1, len])?;
        Ok(Array1::from(data))
    }
}

pub(crate) fn layer_key(layer: usize, suffix: &str) -> String {
    format!("transformer_encoder.layers.{}.{}", layer, suffix)
}
