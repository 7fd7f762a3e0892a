use super::predictor::DirectionClassifier;
use crate::domain::errors::ModelError;
use smartcore::linalg::basic::arrays::Array;
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::linear::logistic_regression::{LogisticRegression, LogisticRegressionParameters};
use statrs::statistics::{Data, Distribution};
use tracing::debug;

fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let exp_z = z.exp();
        exp_z / (1.0 + exp_z)
    }
}

/// Per-column standardization captured at fit time.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureScaler {
    means: Vec<f64>,
    stds: Vec<f64>,
}

impl FeatureScaler {
    /// Fit on `rows`, all of the same width. A constant (or non-finite)
    /// column keeps a unit scale so it maps to 0 instead of NaN.
    pub fn fit(rows: &[Vec<f64>]) -> Self {
        let width = rows.first().map(Vec::len).unwrap_or(0);
        let mut means = Vec::with_capacity(width);
        let mut stds = Vec::with_capacity(width);

        for j in 0..width {
            let data = Data::new(rows.iter().map(|r| r[j]).collect::<Vec<f64>>());
            let mean = data.mean().filter(|m| m.is_finite()).unwrap_or(0.0);
            let std_dev = data
                .std_dev()
                .filter(|s| s.is_finite() && *s > 0.0)
                .unwrap_or(1.0);
            means.push(mean);
            stds.push(std_dev);
        }

        Self { means, stds }
    }

    pub fn width(&self) -> usize {
        self.means.len()
    }

    pub fn transform(&self, row: &[f64]) -> Vec<f64> {
        row.iter()
            .zip(self.means.iter().zip(self.stds.iter()))
            .map(|(x, (m, s))| (x - m) / s)
            .collect()
    }
}

/// L2-regularized logistic regression fitted with smartcore.
///
/// The fitted weights are read back out of the smartcore model so scoring a
/// single row is a dot product plus a sigmoid.
#[derive(Debug, Clone)]
pub struct LogisticDirectionModel {
    scaler: FeatureScaler,
    weights: Vec<f64>,
    intercept: f64,
}

impl LogisticDirectionModel {
    pub fn fit(rows: &[Vec<f64>], labels: &[u8], alpha: f64) -> Result<Self, ModelError> {
        if rows.is_empty() || rows.len() != labels.len() {
            return Err(ModelError::Fit {
                reason: format!(
                    "feature/label length mismatch ({} rows, {} labels)",
                    rows.len(),
                    labels.len()
                ),
            });
        }

        let scaler = FeatureScaler::fit(rows);
        let scaled: Vec<Vec<f64>> = rows.iter().map(|r| scaler.transform(r)).collect();
        let y: Vec<i32> = labels.iter().map(|&l| l as i32).collect();

        let x = DenseMatrix::from_2d_vec(&scaled).map_err(|e| ModelError::Fit {
            reason: format!("Matrix creation failed: {}", e),
        })?;

        let params = LogisticRegressionParameters::default().with_alpha(alpha);
        let model = LogisticRegression::fit(&x, &y, params).map_err(|e| ModelError::Fit {
            reason: format!("{}", e),
        })?;

        let width = scaler.width();
        let coefficients = model.coefficients();
        let weights: Vec<f64> = match coefficients.shape() {
            (1, n) if n == width => (0..n).map(|j| *coefficients.get((0, j))).collect(),
            (n, 1) if n == width => (0..n).map(|i| *coefficients.get((i, 0))).collect(),
            shape => {
                return Err(ModelError::Fit {
                    reason: format!(
                        "unexpected coefficient shape {:?} for {} features",
                        shape, width
                    ),
                });
            }
        };
        let intercept = *model.intercept().get((0, 0));

        if !intercept.is_finite() || weights.iter().any(|w| !w.is_finite()) {
            return Err(ModelError::Fit {
                reason: "non-finite coefficients".to_string(),
            });
        }

        debug!(
            "LogisticDirectionModel: fitted {} weights, intercept={:.4}",
            weights.len(),
            intercept
        );

        Ok(Self {
            scaler,
            weights,
            intercept,
        })
    }
}

impl DirectionClassifier for LogisticDirectionModel {
    fn predict_proba(&self, features: &[f64]) -> Result<f64, ModelError> {
        if features.len() != self.weights.len() {
            return Err(ModelError::Fit {
                reason: format!(
                    "expected {} features, got {}",
                    self.weights.len(),
                    features.len()
                ),
            });
        }

        let z = self
            .scaler
            .transform(features)
            .iter()
            .zip(self.weights.iter())
            .fold(self.intercept, |acc, (x, w)| acc + x * w);

        Ok(sigmoid(z).clamp(0.0, 1.0))
    }

    fn name(&self) -> &str {
        "SmartCore Logistic Regression"
    }
}

/// Degenerate classifier for a training set with a single label class:
/// always answers the observed class frequency.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstantDirectionModel {
    prob_up: f64,
}

impl ConstantDirectionModel {
    pub fn from_labels(labels: &[u8]) -> Self {
        let prob_up = if labels.is_empty() {
            0.5
        } else {
            labels.iter().filter(|&&l| l == 1).count() as f64 / labels.len() as f64
        };
        Self { prob_up }
    }
}

impl DirectionClassifier for ConstantDirectionModel {
    fn predict_proba(&self, _features: &[f64]) -> Result<f64, ModelError> {
        Ok(self.prob_up)
    }

    fn name(&self) -> &str {
        "Constant"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn separable() -> (Vec<Vec<f64>>, Vec<u8>) {
        let mut rows = Vec::new();
        let mut labels = Vec::new();
        for i in 0..40 {
            let x = i as f64 / 10.0 - 2.0;
            rows.push(vec![x, (i % 5) as f64]);
            labels.push(u8::from(x > 0.0));
        }
        (rows, labels)
    }

    #[test]
    fn test_sigmoid_is_stable() {
        assert!((sigmoid(0.0) - 0.5).abs() < 1e-12);
        assert!(sigmoid(800.0) <= 1.0);
        assert!(sigmoid(-800.0) >= 0.0);
        assert!(sigmoid(-800.0).is_finite());
    }

    #[test]
    fn test_scaler_handles_constant_column() {
        let scaler = FeatureScaler::fit(&[vec![1.0, 3.0], vec![3.0, 3.0]]);
        let t = scaler.transform(&[3.0, 3.0]);
        assert!(t[0] > 0.0);
        assert_eq!(t[1], 0.0);
    }

    #[test]
    fn test_logistic_learns_direction() {
        let (rows, labels) = separable();
        let model = LogisticDirectionModel::fit(&rows, &labels, 1.0).unwrap();

        let high = model.predict_proba(&[1.5, 2.0]).unwrap();
        let low = model.predict_proba(&[-1.5, 2.0]).unwrap();
        assert!((0.0..=1.0).contains(&high));
        assert!((0.0..=1.0).contains(&low));
        assert!(high > low);
    }

    #[test]
    fn test_logistic_rejects_wrong_width() {
        let (rows, labels) = separable();
        let model = LogisticDirectionModel::fit(&rows, &labels, 1.0).unwrap();
        assert!(matches!(
            model.predict_proba(&[1.0]),
            Err(ModelError::Fit { .. })
        ));
    }

    #[test]
    fn test_logistic_rejects_mismatched_labels() {
        let err = LogisticDirectionModel::fit(&[vec![1.0]], &[0, 1], 1.0).unwrap_err();
        assert!(!err.is_user_error());
    }

    #[test]
    fn test_constant_model() {
        let up = ConstantDirectionModel::from_labels(&[1, 1, 1]);
        assert_eq!(up.predict_proba(&[0.3]).unwrap(), 1.0);
        let down = ConstantDirectionModel::from_labels(&[0, 0]);
        assert_eq!(down.predict_proba(&[]).unwrap(), 0.0);
    }
}
