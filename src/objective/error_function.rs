//! Objective function for supervised learning

use std::sync::Arc;

use ndarray::Array1;
use rand::Rng;
use tracing::debug;

use crate::data::{Dataset, Labels};
use crate::error::{FerriteError, Result};
use crate::loss::Loss;
use crate::model::ParametricModel;
use crate::objective::regularizer::Regularizer;
use crate::objective::strategies::{
    EvalStrategy, FullDatasetStrategy, MiniBatchStrategy, WeightedDatasetStrategy,
};

/// Objective function scoring a model's predictions on labeled data.
///
/// The value at a parameter vector `theta` is the per-sample mean loss of
/// the model's predictions over the dataset, plus
/// `regularization_strength * regularizer(theta)` when a regularizer is
/// set. [`eval_derivative`](Self::eval_derivative) additionally composes
/// the gradient with respect to `theta` from the loss gradient and the
/// model's backward pass.
///
/// The evaluation mode — full dataset, per-sample weighted, or one random
/// mini-batch per call — is fixed at construction. [`init`](Self::init)
/// must be called once before evaluating; it seeds the mini-batch RNG
/// (fixed via [`with_random_state`](Self::with_random_state) for
/// reproducible batch sequences).
pub struct ErrorFunction<M, L>
where
    M: ParametricModel,
    L: Loss,
{
    strategy: Box<dyn EvalStrategy<M, L>>,
    regularizer: Option<Arc<dyn Regularizer>>,
    regularization_strength: f64,
    random_state: Option<u64>,
    initialized: bool,
}

impl<M, L> ErrorFunction<M, L>
where
    M: ParametricModel + 'static,
    L: Loss + 'static,
    L::Labels: Labels + Send + Sync + 'static,
{
    /// Full-dataset objective.
    ///
    /// Samples are weighted when the dataset carries per-sample weights;
    /// the strategy is picked here and never re-dispatched.
    pub fn new(data: Arc<Dataset<L::Labels>>, model: M, loss: L) -> Result<Self> {
        Self::check_dims(&data, &model)?;
        let strategy: Box<dyn EvalStrategy<M, L>> = if data.is_weighted() {
            debug!("using per-sample weighted full-dataset evaluation");
            Box::new(WeightedDatasetStrategy { data, model, loss })
        } else {
            debug!("using full-dataset evaluation");
            Box::new(FullDatasetStrategy { data, model, loss })
        };
        Ok(Self::from_strategy(strategy))
    }

    /// Mini-batch objective: each evaluation draws one batch uniformly at
    /// random from the dataset's partition.
    pub fn with_minibatches(data: Arc<Dataset<L::Labels>>, model: M, loss: L) -> Result<Self> {
        Self::check_dims(&data, &model)?;
        debug!(batches = data.num_batches(), "using mini-batch evaluation");
        let strategy = Box::new(MiniBatchStrategy {
            data,
            model,
            loss,
            rng: None,
        });
        Ok(Self::from_strategy(strategy))
    }

    fn from_strategy(strategy: Box<dyn EvalStrategy<M, L>>) -> Self {
        Self {
            strategy,
            regularizer: None,
            regularization_strength: 0.0,
            random_state: None,
            initialized: false,
        }
    }

    fn check_dims(data: &Dataset<L::Labels>, model: &M) -> Result<()> {
        let cols = data.batch(0).inputs.ncols();
        if cols != model.input_dim() {
            return Err(FerriteError::ShapeError {
                expected: format!("{} input columns", model.input_dim()),
                actual: format!("{} input columns", cols),
            });
        }
        Ok(())
    }

    /// Fixes the seed used by [`init`](Self::init) for mini-batch sampling
    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = Some(seed);
        self
    }

    /// Adds `strength * regularizer(theta)` to the objective and its
    /// gradient
    pub fn set_regularizer(&mut self, strength: f64, regularizer: Arc<dyn Regularizer>) {
        self.regularization_strength = strength;
        self.regularizer = Some(regularizer);
    }

    /// One-time setup; must be called before evaluating
    pub fn init(&mut self) {
        let seed = self
            .random_state
            .unwrap_or_else(|| rand::thread_rng().gen());
        self.strategy.init(seed);
        self.initialized = true;
        debug!(seed, "error function initialized");
    }

    /// The model's parameter vector at construction time
    pub fn propose_starting_point(&self) -> Array1<f64> {
        self.strategy.propose_starting_point()
    }

    /// Dimensionality of the search space
    pub fn num_variables(&self) -> usize {
        self.strategy.num_variables()
    }

    /// Objective value at `theta`
    pub fn eval(&mut self, theta: &Array1<f64>) -> Result<f64> {
        if !self.initialized {
            return Err(FerriteError::NotInitialized);
        }
        let mut value = self.strategy.eval(theta)?;
        if let Some(regularizer) = &self.regularizer {
            value += self.regularization_strength * regularizer.eval(theta);
        }
        Ok(value)
    }

    /// Objective value at `theta` and its gradient
    pub fn eval_derivative(&mut self, theta: &Array1<f64>) -> Result<(f64, Array1<f64>)> {
        if !self.initialized {
            return Err(FerriteError::NotInitialized);
        }
        let (mut value, mut gradient) = self.strategy.eval_derivative(theta)?;
        if let Some(regularizer) = &self.regularizer {
            let mut reg_grad = Array1::zeros(theta.len());
            value += self.regularization_strength
                * regularizer.eval_derivative(theta, &mut reg_grad);
            gradient.scaled_add(self.regularization_strength, &reg_grad);
        }
        Ok((value, gradient))
    }
}

impl<M, L> Clone for ErrorFunction<M, L>
where
    M: ParametricModel + 'static,
    L: Loss + 'static,
    L::Labels: Labels + Send + Sync + 'static,
{
    /// Deep-copies the evaluation strategy (it owns model state); the
    /// regularizer stays shared.
    fn clone(&self) -> Self {
        Self {
            strategy: self.strategy.boxed_clone(),
            regularizer: self.regularizer.clone(),
            regularization_strength: self.regularization_strength,
            random_state: self.random_state,
            initialized: self.initialized,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loss::SquaredError;
    use crate::model::LinearModel;
    use ndarray::array;

    fn simple_objective() -> ErrorFunction<LinearModel, SquaredError> {
        let x = array![[1.0], [2.0], [3.0], [4.0]];
        let y = array![[2.0], [4.0], [6.0], [8.0]];
        let data = Arc::new(Dataset::from_arrays(&x, &y, 2).unwrap());
        ErrorFunction::new(data, LinearModel::new(1, 1), SquaredError).unwrap()
    }

    #[test]
    fn test_eval_before_init_fails() {
        let mut objective = simple_objective();
        let theta = array![2.0, 0.0];
        assert!(matches!(
            objective.eval(&theta),
            Err(FerriteError::NotInitialized)
        ));
        assert!(objective.eval_derivative(&theta).is_err());
    }

    #[test]
    fn test_perfect_fit_has_zero_error() {
        let mut objective = simple_objective();
        objective.init();
        // y = 2x exactly
        let value = objective.eval(&array![2.0, 0.0]).unwrap();
        assert!(value.abs() < 1e-12);
    }

    #[test]
    fn test_num_variables_and_starting_point() {
        let objective = simple_objective();
        assert_eq!(objective.num_variables(), 2);
        assert_eq!(objective.propose_starting_point(), array![0.0, 0.0]);
    }

    #[test]
    fn test_input_dim_mismatch_rejected() {
        let x = array![[1.0, 2.0]];
        let y = array![[1.0]];
        let data = Arc::new(Dataset::from_arrays(&x, &y, 1).unwrap());
        let result = ErrorFunction::new(data, LinearModel::new(1, 1), SquaredError);
        assert!(matches!(result, Err(FerriteError::ShapeError { .. })));
    }

    #[test]
    fn test_clone_is_independent() {
        let mut objective = simple_objective();
        objective.init();
        let mut copy = objective.clone();

        let theta = array![1.0, 1.0];
        let a = objective.eval(&theta).unwrap();
        let b = copy.eval(&theta).unwrap();
        assert_eq!(a, b);
    }
}
