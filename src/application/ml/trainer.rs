use super::metrics::roc_auc;
use super::predictor::{DirectionClassifier, TrainedModel};
use super::smartcore_predictor::{ConstantDirectionModel, LogisticDirectionModel};
use super::training_frame::TrainingFrame;
use crate::application::market_data::statistical_features::column_means;
use crate::domain::errors::ModelError;
use chrono::{NaiveDate, Utc};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainerConfig {
    /// L2 penalty of the logistic regression.
    pub l2_alpha: f64,
    /// Below this many rows a warning is logged; training still proceeds.
    pub small_sample_warning: usize,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            l2_alpha: 1.0,
            small_sample_warning: 20,
        }
    }
}

/// Identity of a training run, echoed into the fitted model.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingRun {
    pub tickers: Vec<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Fits one global classifier across every ticker of the frame.
pub struct ModelTrainer {
    config: TrainerConfig,
}

impl ModelTrainer {
    pub fn new(config: TrainerConfig) -> Self {
        Self { config }
    }

    pub fn fit(&self, frame: &TrainingFrame, run: TrainingRun) -> Result<TrainedModel, ModelError> {
        let x = frame.matrix();
        let y = frame.labels();

        if x.len() != y.len() || x.is_empty() {
            return Err(ModelError::Fit {
                reason: format!("{} feature rows for {} labels", x.len(), y.len()),
            });
        }

        if y.len() < self.config.small_sample_warning {
            warn!(
                "ModelTrainer: only {} training rows (< {}), estimates will be noisy",
                y.len(),
                self.config.small_sample_warning
            );
        }

        let positives = y.iter().filter(|&&l| l == 1).count();
        let single_class = positives == 0 || positives == y.len();

        let (classifier, auc): (Box<dyn DirectionClassifier>, Option<f64>) = if single_class {
            info!(
                "ModelTrainer: single label class in {} rows, using constant model",
                y.len()
            );
            let constant = ConstantDirectionModel::from_labels(&y);
            (Box::new(constant) as Box<dyn DirectionClassifier>, None)
        } else {
            let model = LogisticDirectionModel::fit(&x, &y, self.config.l2_alpha)?;
            let scores = x
                .iter()
                .map(|row| model.predict_proba(row))
                .collect::<Result<Vec<f64>, ModelError>>()?;
            (
                Box::new(model) as Box<dyn DirectionClassifier>,
                roc_auc(&y, &scores),
            )
        };

        info!(
            "ModelTrainer: fitted {} on {} rows x {} features (roc_auc={:?})",
            classifier.name(),
            y.len(),
            frame.n_features(),
            auc
        );

        Ok(TrainedModel {
            classifier,
            feature_columns: frame.feature_columns.clone(),
            fill_values: column_means(&x),
            tickers: run.tickers,
            start_date: run.start_date,
            end_date: run.end_date,
            roc_auc: auc,
            n_rows: frame.n_rows(),
            trained_at: Utc::now(),
        })
    }
}

impl Default for ModelTrainer {
    fn default() -> Self {
        Self::new(TrainerConfig::default())
    }
}
