use crate::domain::errors::ModelError;
use crate::domain::market::{FeatureRow, TrainingSample, group_by_ticker};
use crate::domain::ml::feature_registry::{self, FEATURE_COLUMNS, FeatureColumn};
use chrono::NaiveDate;
use tracing::{debug, info};

/// Cleaned, labeled rows ready for fitting.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingFrame {
    pub feature_columns: Vec<FeatureColumn>,
    pub samples: Vec<TrainingSample>,
}

impl TrainingFrame {
    pub fn n_rows(&self) -> usize {
        self.samples.len()
    }

    pub fn n_features(&self) -> usize {
        self.feature_columns.len()
    }

    /// Feature matrix in `feature_columns` order.
    ///
    /// Every sample is complete on the selected columns by construction.
    pub fn matrix(&self) -> Vec<Vec<f64>> {
        self.samples
            .iter()
            .filter_map(|s| feature_registry::project(&s.row, &self.feature_columns))
            .collect()
    }

    pub fn labels(&self) -> Vec<u8> {
        self.samples.iter().map(|s| s.target_up).collect()
    }
}

/// Checks that hold before any data is fetched.
pub fn validate_request(
    tickers: &[String],
    start: NaiveDate,
    end: NaiveDate,
) -> Result<(), ModelError> {
    if tickers.is_empty() {
        return Err(ModelError::MissingTickers);
    }
    if start > end {
        return Err(ModelError::InvalidDateRange { start, end });
    }
    if start == end {
        // a one-day window holds at most one bar per ticker
        return Err(ModelError::InsufficientRows { n: 1 });
    }
    Ok(())
}

/// Share of the labeled rows a column set must keep complete.
pub const DEFAULT_MIN_COVERAGE: f64 = 0.9;

pub struct TrainingFrameBuilder {
    min_rows: usize,
    min_coverage: f64,
}

impl TrainingFrameBuilder {
    pub fn new(min_rows: usize) -> Self {
        Self {
            min_rows: min_rows.max(2),
            min_coverage: DEFAULT_MIN_COVERAGE,
        }
    }

    pub fn with_min_coverage(mut self, min_coverage: f64) -> Self {
        self.min_coverage = min_coverage.clamp(0.0, 1.0);
        self
    }

    /// Complete rows a column set needs out of `labeled` labeled rows.
    fn required_rows(&self, labeled: usize) -> usize {
        // tolerance keeps e.g. 0.9 * 260 from rounding up to 235
        let share = (self.min_coverage * labeled as f64 - 1e-9).ceil().max(0.0) as usize;
        share.max(self.min_rows)
    }

    /// Attach `target_up` to every row that has a successor for its ticker.
    /// Each ticker's final row has no label and is left out.
    pub fn label(rows: &[FeatureRow]) -> Vec<TrainingSample> {
        let mut samples = Vec::with_capacity(rows.len());
        for (_, mut series) in group_by_ticker(rows, |r| r.ticker.as_str()) {
            series.sort_by_key(|r| r.date);
            for pair in series.windows(2) {
                samples.push(TrainingSample {
                    row: pair[0].clone(),
                    target_up: u8::from(pair[1].close > pair[0].close),
                });
            }
        }
        samples
    }

    /// Pick the feature columns to fit on.
    ///
    /// Walks the registry order and keeps a column only while the labeled rows
    /// complete on every kept column still number at least `min_rows` and at
    /// least `min_coverage` of all labeled rows. A long warm-up column is
    /// skipped rather than allowed to throw away most of the window.
    pub fn select_columns(&self, samples: &[TrainingSample]) -> Vec<FeatureColumn> {
        let required = self.required_rows(samples.len());
        let mut selected: Vec<FeatureColumn> = Vec::new();

        for candidate in FEATURE_COLUMNS {
            let mut trial = selected.clone();
            trial.push(candidate);
            let complete = samples
                .iter()
                .filter(|s| feature_registry::project(&s.row, &trial).is_some())
                .count();

            if complete >= required {
                selected = trial;
            } else {
                debug!(
                    "TrainingFrame: skipping {} ({} complete rows < {} of {})",
                    candidate,
                    complete,
                    required,
                    samples.len()
                );
            }
        }

        selected
    }

    pub fn build(&self, rows: &[FeatureRow]) -> Result<TrainingFrame, ModelError> {
        let labeled = Self::label(rows);
        let feature_columns = self.select_columns(&labeled);

        if feature_columns.is_empty() {
            return Err(ModelError::InsufficientRows { n: labeled.len() });
        }

        let samples: Vec<TrainingSample> = labeled
            .into_iter()
            .filter(|s| feature_registry::project(&s.row, &feature_columns).is_some())
            .collect();

        if samples.len() < self.min_rows {
            return Err(ModelError::InsufficientRows { n: samples.len() });
        }

        info!(
            "TrainingFrame: {} rows, features [{}]",
            samples.len(),
            feature_registry::column_names(&feature_columns).join(", ")
        );

        Ok(TrainingFrame {
            feature_columns,
            samples,
        })
    }
}

impl Default for TrainingFrameBuilder {
    fn default() -> Self {
        Self::new(2)
    }
}
