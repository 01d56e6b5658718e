//! Loss functions
//!
//! A [`Loss`] scores a batch of model predictions against labels and can
//! produce the gradient of that score with respect to the predictions.
//! Values are batch **sums**; per-sample normalization is the objective's
//! job, so varying batch sizes stay on one scale.

mod cross_entropy;
mod squared;

pub use cross_entropy::CrossEntropy;
pub use squared::SquaredError;

use crate::error::Result;
use ndarray::{Array1, Array2};

/// Discrepancy measure between batched predictions and labels
pub trait Loss: Clone + Send + Sync {
    /// Label type this loss consumes
    type Labels;

    /// Total loss over the batch, with optional per-sample weights
    fn eval(
        &self,
        predictions: &Array2<f64>,
        labels: &Self::Labels,
        weights: Option<&Array1<f64>>,
    ) -> Result<f64>;

    /// Total loss over the batch; fills `gradient` with the derivative of
    /// that total with respect to every prediction entry
    fn eval_derivative(
        &self,
        predictions: &Array2<f64>,
        labels: &Self::Labels,
        weights: Option<&Array1<f64>>,
        gradient: &mut Array2<f64>,
    ) -> Result<f64>;
}
