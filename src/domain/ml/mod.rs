// Fixed feature-column order shared by training and prediction
pub mod feature_registry;

// Train / predict-next request and response shapes
pub mod types;

pub use feature_registry::{FEATURE_COLUMNS, FeatureColumn};
pub use types::{DirectionLabel, PredictRequest, Prediction, TrainRequest, TrainSummary};
