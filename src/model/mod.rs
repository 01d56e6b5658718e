//! Model traits
//!
//! Two capability surfaces:
//! - [`EnsembleMember`]: a clonable batch predictor usable inside a
//!   [`MeanModel`](crate::ensemble::MeanModel). Its output kind (continuous
//!   rows vs. class indices) is declared through the associated
//!   [`MemberOutput`] type, so aggregation dispatch is resolved at compile
//!   time rather than per sample.
//! - [`ParametricModel`]: a differentiable batch model with a flat `f64`
//!   parameter vector, the optimization variable of an
//!   [`ErrorFunction`](crate::objective::ErrorFunction).

mod linear;

pub use linear::LinearModel;

use crate::error::{FerriteError, Result};
use ndarray::{Array1, Array2};

/// Output kind of an ensemble member.
///
/// Implemented for `Array2<f64>` (continuous rows, averaged directly) and
/// `Array1<usize>` (predicted class indices, converted into vote mass).
pub trait MemberOutput {
    /// Adds this output's contribution, scaled by `weight`, into the
    /// per-sample tally matrix.
    fn accumulate(&self, weight: f64, tallies: &mut Array2<f64>) -> Result<()>;
}

impl MemberOutput for Array2<f64> {
    fn accumulate(&self, weight: f64, tallies: &mut Array2<f64>) -> Result<()> {
        if self.dim() != tallies.dim() {
            return Err(FerriteError::ShapeError {
                expected: format!("{:?}", tallies.dim()),
                actual: format!("{:?}", self.dim()),
            });
        }
        tallies.scaled_add(weight, self);
        Ok(())
    }
}

impl MemberOutput for Array1<usize> {
    fn accumulate(&self, weight: f64, tallies: &mut Array2<f64>) -> Result<()> {
        if self.len() != tallies.nrows() {
            return Err(FerriteError::ShapeError {
                expected: format!("{} predictions", tallies.nrows()),
                actual: format!("{} predictions", self.len()),
            });
        }
        let num_classes = tallies.ncols();
        for (sample, &class) in self.iter().enumerate() {
            if class >= num_classes {
                return Err(FerriteError::ClassOutOfRange { class, num_classes });
            }
            tallies[[sample, class]] += weight;
        }
        Ok(())
    }
}

/// A sub-model usable inside a weighted ensemble
pub trait EnsembleMember: Clone + Send + Sync {
    /// Output kind produced for a batch of inputs
    type Output: MemberOutput;

    /// Evaluates the member on a batch of inputs, one sample per row
    fn eval(&self, inputs: &Array2<f64>) -> Result<Self::Output>;

    /// Expected number of input columns
    fn input_dim(&self) -> usize;

    /// Output dimensionality (number of outputs or classes)
    fn output_dim(&self) -> usize;
}

/// A differentiable batch model with a flat tunable parameter vector
pub trait ParametricModel: Clone + Send + Sync {
    /// Forward-pass state reused by
    /// [`parameter_gradient`](ParametricModel::parameter_gradient).
    type State;

    /// Predicts a batch of outputs, one sample per row
    fn predict(&self, inputs: &Array2<f64>) -> Result<Array2<f64>>;

    /// Predicts a batch and returns the forward state needed for the
    /// backward pass
    fn predict_with_state(&self, inputs: &Array2<f64>) -> Result<(Array2<f64>, Self::State)>;

    /// Gradient of `sum_n loss_grad[n] . output[n]` with respect to the
    /// parameter vector, given the forward state for the same batch
    fn parameter_gradient(
        &self,
        inputs: &Array2<f64>,
        state: &Self::State,
        loss_grad: &Array2<f64>,
    ) -> Result<Array1<f64>>;

    /// Current parameter vector
    fn parameters(&self) -> Array1<f64>;

    /// Replaces the parameter vector; the length must match
    /// [`num_parameters`](ParametricModel::num_parameters)
    fn set_parameters(&mut self, theta: &Array1<f64>) -> Result<()>;

    /// Length of the parameter vector
    fn num_parameters(&self) -> usize;

    /// Expected number of input columns
    fn input_dim(&self) -> usize;

    /// Number of output columns per sample
    fn output_dim(&self) -> usize;
}
