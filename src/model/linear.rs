//! Dense affine model `y = W x + b`

use crate::error::{FerriteError, Result};
use crate::model::{EnsembleMember, ParametricModel};
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

/// Dense affine map with an analytic parameter gradient.
///
/// Parameters are flattened as the rows of `W` followed by `b`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearModel {
    weights: Array2<f64>,
    bias: Array1<f64>,
}

impl LinearModel {
    /// Zero-initialized model mapping `input_dim` columns to `output_dim`
    pub fn new(input_dim: usize, output_dim: usize) -> Self {
        Self {
            weights: Array2::zeros((output_dim, input_dim)),
            bias: Array1::zeros(output_dim),
        }
    }

    /// Builds a model from an explicit weight matrix (`output_dim` rows,
    /// `input_dim` columns) and bias vector
    pub fn from_parts(weights: Array2<f64>, bias: Array1<f64>) -> Result<Self> {
        if weights.nrows() != bias.len() {
            return Err(FerriteError::ShapeError {
                expected: format!("{} bias entries", weights.nrows()),
                actual: format!("{} bias entries", bias.len()),
            });
        }
        Ok(Self { weights, bias })
    }

    /// Weight matrix, one row per output
    pub fn weights(&self) -> &Array2<f64> {
        &self.weights
    }

    /// Bias vector
    pub fn bias(&self) -> &Array1<f64> {
        &self.bias
    }

    fn check_inputs(&self, inputs: &Array2<f64>) -> Result<()> {
        if inputs.ncols() != self.weights.ncols() {
            return Err(FerriteError::ShapeError {
                expected: format!("{} input columns", self.weights.ncols()),
                actual: format!("{} input columns", inputs.ncols()),
            });
        }
        Ok(())
    }
}

impl ParametricModel for LinearModel {
    // The affine map needs no cached forward state; the backward pass only
    // uses the inputs.
    type State = ();

    fn predict(&self, inputs: &Array2<f64>) -> Result<Array2<f64>> {
        self.check_inputs(inputs)?;
        let mut outputs = inputs.dot(&self.weights.t());
        outputs += &self.bias;
        Ok(outputs)
    }

    fn predict_with_state(&self, inputs: &Array2<f64>) -> Result<(Array2<f64>, Self::State)> {
        Ok((self.predict(inputs)?, ()))
    }

    fn parameter_gradient(
        &self,
        inputs: &Array2<f64>,
        _state: &Self::State,
        loss_grad: &Array2<f64>,
    ) -> Result<Array1<f64>> {
        self.check_inputs(inputs)?;
        if loss_grad.dim() != (inputs.nrows(), self.weights.nrows()) {
            return Err(FerriteError::ShapeError {
                expected: format!("({}, {})", inputs.nrows(), self.weights.nrows()),
                actual: format!("{:?}", loss_grad.dim()),
            });
        }
        let grad_w = loss_grad.t().dot(inputs);
        let grad_b = loss_grad.sum_axis(Axis(0));
        Ok(Array1::from_iter(
            grad_w.iter().copied().chain(grad_b.iter().copied()),
        ))
    }

    fn parameters(&self) -> Array1<f64> {
        Array1::from_iter(
            self.weights
                .iter()
                .copied()
                .chain(self.bias.iter().copied()),
        )
    }

    fn set_parameters(&mut self, theta: &Array1<f64>) -> Result<()> {
        let expected = self.num_parameters();
        if theta.len() != expected {
            return Err(FerriteError::ShapeError {
                expected: format!("{} parameters", expected),
                actual: format!("{} parameters", theta.len()),
            });
        }
        let (out, inp) = self.weights.dim();
        let flat: Vec<f64> = theta.iter().copied().collect();
        self.weights = Array2::from_shape_vec((out, inp), flat[..out * inp].to_vec())?;
        self.bias = Array1::from_vec(flat[out * inp..].to_vec());
        Ok(())
    }

    fn num_parameters(&self) -> usize {
        self.weights.len() + self.bias.len()
    }

    fn input_dim(&self) -> usize {
        self.weights.ncols()
    }

    fn output_dim(&self) -> usize {
        self.weights.nrows()
    }
}

impl EnsembleMember for LinearModel {
    type Output = Array2<f64>;

    fn eval(&self, inputs: &Array2<f64>) -> Result<Self::Output> {
        self.predict(inputs)
    }

    fn input_dim(&self) -> usize {
        self.weights.ncols()
    }

    fn output_dim(&self) -> usize {
        self.weights.nrows()
    }
}
