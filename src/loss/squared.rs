//! Squared error loss for continuous targets

use crate::error::{FerriteError, Result};
use crate::loss::Loss;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// Sum of squared residuals, `sum_n w_n * |p_n - y_n|^2`.
///
/// The gradient with respect to a prediction row is `2 w_n (p_n - y_n)`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SquaredError;

impl SquaredError {
    fn check_shapes(
        predictions: &Array2<f64>,
        labels: &Array2<f64>,
        weights: Option<&Array1<f64>>,
    ) -> Result<()> {
        if predictions.dim() != labels.dim() {
            return Err(FerriteError::ShapeError {
                expected: format!("{:?}", labels.dim()),
                actual: format!("{:?}", predictions.dim()),
            });
        }
        if let Some(w) = weights {
            if w.len() != predictions.nrows() {
                return Err(FerriteError::ShapeError {
                    expected: format!("{} weights", predictions.nrows()),
                    actual: format!("{} weights", w.len()),
                });
            }
        }
        Ok(())
    }
}

impl Loss for SquaredError {
    type Labels = Array2<f64>;

    fn eval(
        &self,
        predictions: &Array2<f64>,
        labels: &Array2<f64>,
        weights: Option<&Array1<f64>>,
    ) -> Result<f64> {
        Self::check_shapes(predictions, labels, weights)?;
        let residuals = predictions - labels;
        let mut total = 0.0;
        for (sample, row) in residuals.rows().into_iter().enumerate() {
            let w = weights.map_or(1.0, |w| w[sample]);
            total += w * row.iter().map(|r| r * r).sum::<f64>();
        }
        Ok(total)
    }

    fn eval_derivative(
        &self,
        predictions: &Array2<f64>,
        labels: &Array2<f64>,
        weights: Option<&Array1<f64>>,
        gradient: &mut Array2<f64>,
    ) -> Result<f64> {
        Self::check_shapes(predictions, labels, weights)?;
        let residuals = predictions - labels;
        let mut total = 0.0;
        gradient.assign(&residuals);
        for (sample, mut row) in gradient.rows_mut().into_iter().enumerate() {
            let w = weights.map_or(1.0, |w| w[sample]);
            total += w * row.iter().map(|r| r * r).sum::<f64>();
            row.mapv_inplace(|r| 2.0 * w * r);
        }
        Ok(total)
    }
}
