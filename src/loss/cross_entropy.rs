//! Softmax cross-entropy loss for class-index targets

use crate::error::{FerriteError, Result};
use crate::loss::Loss;
use ndarray::{Array1, Array2, ArrayView1};
use serde::{Deserialize, Serialize};

/// Softmax cross-entropy over raw scores.
///
/// Labels are class indices; each prediction row holds one unnormalized
/// score per class. The gradient of a row is `w_n * (softmax(p_n) - onehot)`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct CrossEntropy;

fn softmax_row(row: ArrayView1<'_, f64>) -> Vec<f64> {
    let max = row.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = row.iter().map(|v| (v - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

impl Loss for CrossEntropy {
    type Labels = Array1<usize>;

    fn eval(
        &self,
        predictions: &Array2<f64>,
        labels: &Array1<usize>,
        weights: Option<&Array1<f64>>,
    ) -> Result<f64> {
        if labels.len() != predictions.nrows() {
            return Err(FerriteError::ShapeError {
                expected: format!("{} labels", predictions.nrows()),
                actual: format!("{} labels", labels.len()),
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
        let num_classes = predictions.ncols();
        let mut total = 0.0;
        for (sample, row) in predictions.rows().into_iter().enumerate() {
            let class = labels[sample];
            if class >= num_classes {
                return Err(FerriteError::ClassOutOfRange { class, num_classes });
            }
            let probs = softmax_row(row);
            let w = weights.map_or(1.0, |w| w[sample]);
            total += -w * probs[class].max(1e-15).ln();
        }
        Ok(total)
    }

    fn eval_derivative(
        &self,
        predictions: &Array2<f64>,
        labels: &Array1<usize>,
        weights: Option<&Array1<f64>>,
        gradient: &mut Array2<f64>,
    ) -> Result<f64> {
        let total = self.eval(predictions, labels, weights)?;
        for (sample, row) in predictions.rows().into_iter().enumerate() {
            let probs = softmax_row(row);
            let w = weights.map_or(1.0, |w| w[sample]);
            for (class, &p) in probs.iter().enumerate() {
                let target = if labels[sample] == class { 1.0 } else { 0.0 };
                gradient[[sample, class]] = w * (p - target);
            }
        }
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_uniform_scores() {
        let preds = array![[0.0, 0.0, 0.0]];
        let labels = array![1usize];
        let loss = CrossEntropy.eval(&preds, &labels, None).unwrap();
        assert!((loss - (3.0f64).ln()).abs() < 1e-12);
    }

    #[test]
    fn test_confident_correct_prediction_is_cheap() {
        let preds = array![[10.0, -10.0]];
        let labels = array![0usize];
        let loss = CrossEntropy.eval(&preds, &labels, None).unwrap();
        assert!(loss < 1e-6);
    }

    #[test]
    fn test_gradient_rows_sum_to_zero() {
        let preds = array![[1.0, 2.0, 0.5], [0.0, -1.0, 3.0]];
        let labels = array![2usize, 0];
        let mut grad = Array2::zeros((2, 3));
        CrossEntropy
            .eval_derivative(&preds, &labels, None, &mut grad)
            .unwrap();
        for row in grad.rows() {
            assert!(row.sum().abs() < 1e-12);
        }
    }

    #[test]
    fn test_short_weight_vector_rejected() {
        let preds = array![[1.0, 2.0], [0.5, 0.5]];
        let labels = array![0usize, 1];
        let weights = array![1.0];
        let mut grad = Array2::zeros((2, 2));
        assert!(matches!(
            CrossEntropy.eval(&preds, &labels, Some(&weights)),
            Err(FerriteError::ShapeError { .. })
        ));
        assert!(CrossEntropy
            .eval_derivative(&preds, &labels, Some(&weights), &mut grad)
            .is_err());
    }

    #[test]
    fn test_label_out_of_range() {
        let preds = array![[1.0, 2.0]];
        let labels = array![2usize];
        assert!(matches!(
            CrossEntropy.eval(&preds, &labels, None),
            Err(FerriteError::ClassOutOfRange { .. })
        ));
    }
}
