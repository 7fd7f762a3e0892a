use super::model_cache::{ModelCache, ModelCacheEntry};
use super::trainer::{ModelTrainer, TrainerConfig, TrainingRun};
use super::training_frame::{DEFAULT_MIN_COVERAGE, TrainingFrameBuilder, validate_request};
use crate::application::feature_engineering_service::{
    DailyFeatureEngineeringService, FeatureConfig,
};
use crate::application::market_data::{PriceNormalizer, canonicalize_tickers};
use crate::domain::errors::ModelError;
use crate::domain::market::RawBars;
use crate::domain::ml::{Prediction, TrainRequest, TrainSummary};
use crate::domain::ports::{FeatureEngineeringService, PriceProvider};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Tunables of the train pipeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelServiceConfig {
    pub features: FeatureConfig,
    pub min_rows: usize,
    /// Share of labeled rows a selected column set must keep.
    pub min_coverage: f64,
    pub trainer: TrainerConfig,
}

impl Default for ModelServiceConfig {
    fn default() -> Self {
        Self {
            features: FeatureConfig::default(),
            min_rows: 2,
            min_coverage: DEFAULT_MIN_COVERAGE,
            trainer: TrainerConfig::default(),
        }
    }
}

/// Entry point for the two operations: `train` and `predict_next`.
///
/// Owns the process-wide model slot. A failed train leaves the slot as it
/// was.
pub struct DirectionModelService {
    provider: Arc<dyn PriceProvider>,
    normalizer: PriceNormalizer,
    feature_engine: Arc<dyn FeatureEngineeringService>,
    frame_builder: TrainingFrameBuilder,
    trainer: ModelTrainer,
    cache: Arc<ModelCache>,
}

impl DirectionModelService {
    pub fn new(provider: Arc<dyn PriceProvider>, config: ModelServiceConfig) -> Self {
        Self {
            provider,
            normalizer: PriceNormalizer::new(),
            feature_engine: Arc::new(DailyFeatureEngineeringService::new(config.features)),
            frame_builder: TrainingFrameBuilder::new(config.min_rows)
                .with_min_coverage(config.min_coverage),
            trainer: ModelTrainer::new(config.trainer),
            cache: Arc::new(ModelCache::new()),
        }
    }

    pub fn cache(&self) -> Arc<ModelCache> {
        self.cache.clone()
    }

    pub async fn train(&self, request: &TrainRequest) -> Result<TrainSummary, ModelError> {
        let result = self.run_training(request).await;
        match &result {
            Ok(summary) => info!(
                "ModelService: trained on {:?} ({} rows, roc_auc={:?})",
                summary.tickers, summary.n_rows, summary.roc_auc
            ),
            Err(e) if e.is_user_error() => warn!("ModelService: train rejected: {}", e),
            Err(e) => error!("ModelService: train failed: {}", e),
        }
        result
    }

    async fn run_training(&self, request: &TrainRequest) -> Result<TrainSummary, ModelError> {
        let tickers = canonicalize_tickers(request.requested_tickers());
        let (start, end) = (request.start_date, request.end_date);
        validate_request(&tickers, start, end)?;

        info!(
            "ModelService: fetching {:?} {}..{} from {}",
            tickers,
            start,
            end,
            self.provider.name()
        );
        let raw = match self.provider.fetch_daily_bars(&tickers, start, end).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!("ModelService: provider {} failed: {:#}", self.provider.name(), e);
                RawBars::empty()
            }
        };

        let bars = self.normalizer.normalize(raw, &tickers)?;
        let features = self.feature_engine.compute(&bars);
        let frame = self.frame_builder.build(&features)?;

        let model = self.trainer.fit(
            &frame,
            TrainingRun {
                tickers: tickers.clone(),
                start_date: start,
                end_date: end,
            },
        )?;

        let summary = TrainSummary {
            message: "Training completed".to_string(),
            tickers,
            start_date: start,
            end_date: end,
            n_rows: frame.n_rows(),
            n_samples: frame.n_rows(),
            n_features: frame.n_features(),
            feature_columns: model.feature_names(),
            price_rows: bars.len(),
            roc_auc: model.roc_auc,
        };

        self.cache.install(ModelCacheEntry::new(model, features));
        Ok(summary)
    }

    pub fn predict_next(&self, ticker: &str) -> Result<Prediction, ModelError> {
        let result = self.cache.predict_next(ticker);
        if let Err(e) = &result {
            if e.is_user_error() {
                warn!("ModelService: predict rejected for '{}': {}", ticker.trim(), e);
            } else {
                error!("ModelService: predict failed for '{}': {}", ticker.trim(), e);
            }
        }
        result
    }
}
