use crate::domain::errors::ModelError;
use crate::domain::ml::FeatureColumn;
use chrono::{DateTime, NaiveDate, Utc};
use std::fmt;

/// Interface for fitted direction classifiers
pub trait DirectionClassifier: Send + Sync {
    /// Probability (0.0 to 1.0) that the next close is strictly higher.
    /// `features` follows the column order the model was fitted on.
    fn predict_proba(&self, features: &[f64]) -> Result<f64, ModelError>;

    /// Get model name/type
    fn name(&self) -> &str;
}

/// A fitted classifier plus everything needed to score new rows with it.
pub struct TrainedModel {
    pub classifier: Box<dyn DirectionClassifier>,
    pub feature_columns: Vec<FeatureColumn>,
    /// Fit-time mean of each feature column, used in place of a value a
    /// prediction row does not have yet.
    pub fill_values: Vec<f64>,
    pub tickers: Vec<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub roc_auc: Option<f64>,
    pub n_rows: usize,
    pub trained_at: DateTime<Utc>,
}

impl TrainedModel {
    pub fn feature_names(&self) -> Vec<String> {
        crate::domain::ml::feature_registry::column_names(&self.feature_columns)
    }
}

impl fmt::Debug for TrainedModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrainedModel")
            .field("classifier", &self.classifier.name())
            .field("feature_columns", &self.feature_columns)
            .field("tickers", &self.tickers)
            .field("start_date", &self.start_date)
            .field("end_date", &self.end_date)
            .field("roc_auc", &self.roc_auc)
            .field("n_rows", &self.n_rows)
            .field("trained_at", &self.trained_at)
            .finish()
    }
}
