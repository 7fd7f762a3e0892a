use super::predictor::TrainedModel;
use crate::application::market_data::canonicalize_ticker;
use crate::domain::errors::ModelError;
use crate::domain::market::FeatureRow;
use crate::domain::ml::feature_registry;
use crate::domain::ml::{DirectionLabel, Prediction};
use std::sync::{Arc, RwLock};
use tracing::{debug, error};

/// The most recent model and the feature table it was trained from,
/// including each ticker's final, label-less row.
#[derive(Debug)]
pub struct ModelCacheEntry {
    pub model: TrainedModel,
    pub features: Vec<FeatureRow>,
}

impl ModelCacheEntry {
    pub fn new(model: TrainedModel, features: Vec<FeatureRow>) -> Self {
        Self { model, features }
    }

    /// Probability that `ticker` closes higher on the next trading day.
    ///
    /// Scores the ticker's most recent row. Columns that row has not warmed
    /// up yet take the model's fit-time means.
    pub fn predict_next(&self, ticker: &str) -> Result<Prediction, ModelError> {
        let row = self
            .features
            .iter()
            .filter(|r| r.ticker == ticker)
            .max_by_key(|r| r.date)
            .ok_or_else(|| ModelError::UnknownTicker {
                ticker: ticker.to_string(),
            })?;

        let (input, filled) = feature_registry::project_filled(
            row,
            &self.model.feature_columns,
            &self.model.fill_values,
        );
        if filled > 0 {
            debug!(
                "ModelCache: {} row {} missing {} of {} features, using fit-time means",
                ticker,
                row.date,
                filled,
                input.len()
            );
        }

        let prob_up = self.model.classifier.predict_proba(&input)?.clamp(0.0, 1.0);

        Ok(Prediction {
            ticker: ticker.to_string(),
            prob_up,
            label: DirectionLabel::from_probability(prob_up),
            as_of: row.date,
        })
    }
}

/// Single-slot holder of the most recently trained model.
///
/// Writers build a complete entry first and swap it in under a short write
/// lock; readers clone the `Arc` and score without holding the lock.
pub struct ModelCache {
    slot: RwLock<Option<Arc<ModelCacheEntry>>>,
}

impl std::fmt::Debug for ModelCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelCache")
            .field("slot", &"<RwLock>")
            .finish()
    }
}

impl ModelCache {
    pub fn new() -> Self {
        Self {
            slot: RwLock::new(None),
        }
    }

    /// Replace whatever is cached with `entry`.
    pub fn install(&self, entry: ModelCacheEntry) {
        let entry = Arc::new(entry);
        match self.slot.write() {
            Ok(mut guard) => {
                *guard = Some(entry);
            }
            Err(poisoned) => {
                error!("ModelCache: Lock poisoned during write, recovering");
                *poisoned.into_inner() = Some(entry);
            }
        }
    }

    pub fn snapshot(&self) -> Option<Arc<ModelCacheEntry>> {
        match self.slot.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => {
                error!("ModelCache: Lock poisoned during read, recovering");
                poisoned.into_inner().clone()
            }
        }
    }

    pub fn is_populated(&self) -> bool {
        self.snapshot().is_some()
    }

    pub fn predict_next(&self, ticker: &str) -> Result<Prediction, ModelError> {
        let ticker = canonicalize_ticker(ticker);
        let entry = self.snapshot().ok_or(ModelError::ModelNotTrained)?;
        entry.predict_next(&ticker)
    }
}

impl Default for ModelCache {
    fn default() -> Self {
        Self::new()
    }
}
