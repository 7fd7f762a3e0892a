pub mod metrics;
pub mod model_cache;
pub mod model_service;
pub mod predictor;
pub mod smartcore_predictor;
pub mod trainer;
pub mod training_frame;

pub use model_cache::{ModelCache, ModelCacheEntry};
pub use model_service::{DirectionModelService, ModelServiceConfig};
pub use predictor::{DirectionClassifier, TrainedModel};
pub use trainer::{ModelTrainer, TrainerConfig};
pub use training_frame::{TrainingFrame, TrainingFrameBuilder};
