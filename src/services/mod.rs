pub mod classifier;
pub mod features;
pub mod indicators;
pub mod metrics;
pub mod predictor;
pub mod registry;
pub mod scaler;

pub use classifier::{argmax, ModelError, SequenceClassifier};
pub use features::{latest_feature_vector, Feature, FeatureError, FeatureVector};
pub use metrics::Metrics;
pub use predictor::PredictionService;
pub use registry::{RegistryError, TickerRegistry};
pub use scaler::{ScalerError, StandardScaler};
