//! Inference-only transformer building blocks.

use super::weights::{layer_key, ModelArtifact};
use super::ModelError;
use ndarray::{s, Array1, Array2, Axis};

/// Linear layer: `y = x W^T + b`, with `W` stored as `[out, in]`.
#[derive(Debug, Clone)]
pub struct Linear {
    weight: Array2<f32>,
    bias: Array1<f32>,
}

impl Linear {
    pub fn new(weight: Array2<f32>, bias: Array1<f32>) -> Self {
        Self { weight, bias }
    }

    pub fn load(
        artifact: &ModelArtifact,
        prefix: &str,
        in_features: usize,
        out_features: usize,
    ) -> Result<Self, ModelError> {
        Ok(Self::new(
            artifact.matrix(&format!("{}.weight", prefix), out_features, in_features)?,
            artifact.vector(&format!("{}.bias", prefix), out_features)?,
        ))
    }

    /// Forward pass over rows of `x` (`[seq, in]` → `[seq, out]`).
    pub fn forward(&self, x: &Array2<f32>) -> Array2<f32> {
        x.dot(&self.weight.t()) + &self.bias
    }
}

/// Layer normalization over the last axis.
#[derive(Debug, Clone)]
pub struct LayerNorm {
    gamma: Array1<f32>,
    beta: Array1<f32>,
    eps: f32,
}

impl LayerNorm {
    pub fn new(gamma: Array1<f32>, beta: Array1<f32>, eps: f32) -> Self {
        Self { gamma, beta, eps }
    }

    pub fn load(artifact: &ModelArtifact, prefix: &str, features: usize, eps: f32) -> Result<Self, ModelError> {
        Ok(Self::new(
            artifact.vector(&format!("{}.weight", prefix), features)?,
            artifact.vector(&format!("{}.bias", prefix), features)?,
            eps,
        ))
    }

    pub fn forward(&self, x: &Array2<f32>) -> Array2<f32> {
        let mut output = x.clone();
        for mut row in output.axis_iter_mut(Axis(0)) {
            let mean = row.mean().unwrap_or(0.0);
            let var = row.mapv(|v| (v - mean).powi(2)).mean().unwrap_or(0.0);
            let denom = (var + self.eps).sqrt();
            row.mapv_inplace(|v| (v - mean) / denom);
            row *= &self.gamma;
            row += &self.beta;
        }
        output
    }
}

/// Softmax along each row.
pub fn softmax(x: &Array2<f32>) -> Array2<f32> {
    let mut out = x.clone();
    for mut row in out.axis_iter_mut(Axis(0)) {
        let max = row.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
        row.mapv_inplace(|v| (v - max).exp());
        let sum = row.sum();
        row.mapv_inplace(|v| v / sum);
    }
    out
}

/// Multi-head self-attention with PyTorch's packed input projection.
#[derive(Debug, Clone)]
pub struct MultiHeadAttention {
    num_heads: usize,
    head_dim: usize,
    query_proj: Linear,
    key_proj: Linear,
    value_proj: Linear,
    output_proj: Linear,
}

impl MultiHeadAttention {
    pub fn new(
        num_heads: usize,
        query_proj: Linear,
        key_proj: Linear,
        value_proj: Linear,
        output_proj: Linear,
    ) -> Self {
        let model_dim = output_proj.bias.len();
        Self {
            num_heads,
            head_dim: model_dim / num_heads.max(1),
            query_proj,
            key_proj,
            value_proj,
            output_proj,
        }
    }

    /// Split `in_proj_weight` `[3d, d]` into query, key and value projections.
    pub fn load(artifact: &ModelArtifact, prefix: &str, model_dim: usize, num_heads: usize) -> Result<Self, ModelError> {
        let d = model_dim;
        let in_weight = artifact.matrix(&format!("{}.in_proj_weight", prefix), 3 * d, d)?;
        let in_bias = artifact.vector(&format!("{}.in_proj_bias", prefix), 3 * d)?;

        let part = |i: usize| {
            Linear::new(
                in_weight.slice(s![i * d..(i + 1) * d, ..]).to_owned(),
                in_bias.slice(s![i * d..(i + 1) * d]).to_owned(),
            )
        };

        Ok(Self::new(
            num_heads,
            part(0),
            part(1),
            part(2),
            Linear::load(artifact, &format!("{}.out_proj", prefix), d, d)?,
        ))
    }

    pub fn forward(&self, x: &Array2<f32>) -> Array2<f32> {
        let q = self.query_proj.forward(x);
        let k = self.key_proj.forward(x);
        let v = self.value_proj.forward(x);

        let scale = (self.head_dim as f32).sqrt();
        let mut heads = Array2::zeros(q.raw_dim());

        for h in 0..self.num_heads {
            let (start, end) = (h * self.head_dim, (h + 1) * self.head_dim);
            let qh = q.slice(s![.., start..end]);
            let kh = k.slice(s![.., start..end]);
            let vh = v.slice(s![.., start..end]);

            // Q * K^T / sqrt(d_k)
            let scores = qh.dot(&kh.t()) / scale;
            let weights = softmax(&scores);
            heads.slice_mut(s![.., start..end]).assign(&weights.dot(&vh));
        }

        self.output_proj.forward(&heads)
    }
}

/// Post-norm encoder layer with a ReLU feed-forward block.
#[derive(Debug, Clone)]
pub struct EncoderLayer {
    self_attn: MultiHeadAttention,
    linear1: Linear,
    linear2: Linear,
    norm1: LayerNorm,
    norm2: LayerNorm,
}

impl EncoderLayer {
    pub fn load(
        artifact: &ModelArtifact,
        layer: usize,
        model_dim: usize,
        num_heads: usize,
        ff_dim: usize,
        eps: f32,
    ) -> Result<Self, ModelError> {
        Ok(Self {
            self_attn: MultiHeadAttention::load(artifact, &layer_key(layer, "self_attn"), model_dim, num_heads)?,
            linear1: Linear::load(artifact, &layer_key(layer, "linear1"), model_dim, ff_dim)?,
            linear2: Linear::load(artifact, &layer_key(layer, "linear2"), ff_dim, model_dim)?,
            norm1: LayerNorm::load(artifact, &layer_key(layer, "norm1"), model_dim, eps)?,
            norm2: LayerNorm::load(artifact, &layer_key(layer, "norm2"), model_dim, eps)?,
        })
    }

    pub fn forward(&self, x: &Array2<f32>) -> Array2<f32> {
        let attended = self.self_attn.forward(x);
        let x = self.norm1.forward(&(x + &attended));

        let hidden = self.linear1.forward(&x).mapv(|v| v.max(0.0));
        let ff = self.linear2.forward(&hidden);
        self.norm2.forward(&(&x + &ff))
    }
}
