//! Evaluation strategies behind [`ErrorFunction`](super::ErrorFunction)
//!
//! One strategy is resolved at construction and stored behind a boxed
//! handle: full-dataset iteration over unweighted samples, full-dataset
//! iteration with per-sample weights, or a single uniformly random batch
//! per evaluation. All three normalize by the number of samples they
//! considered, so values are per-sample mean errors regardless of the mode.

use std::sync::Arc;

use ndarray::{Array1, Array2};
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::data::{Dataset, Labels};
use crate::error::{FerriteError, Result};
use crate::loss::Loss;
use crate::model::ParametricModel;

pub(super) trait EvalStrategy<M, L>: Send
where
    M: ParametricModel,
    L: Loss,
{
    /// One-time setup; `seed` feeds the strategy's RNG where one is used.
    fn init(&mut self, _seed: u64) {}

    /// The model's parameter vector at construction time.
    fn propose_starting_point(&self) -> Array1<f64>;

    /// Dimensionality of the search space.
    fn num_variables(&self) -> usize;

    /// Per-sample mean loss at `theta`.
    fn eval(&mut self, theta: &Array1<f64>) -> Result<f64>;

    /// Per-sample mean loss and its gradient with respect to `theta`.
    fn eval_derivative(&mut self, theta: &Array1<f64>) -> Result<(f64, Array1<f64>)>;

    /// Deep copy, including owned model-evaluation state.
    fn boxed_clone(&self) -> Box<dyn EvalStrategy<M, L>>;
}

/// Iterates every batch of an unweighted dataset.
#[derive(Clone)]
pub(super) struct FullDatasetStrategy<M, L: Loss> {
    pub(super) data: Arc<Dataset<L::Labels>>,
    pub(super) model: M,
    pub(super) loss: L,
}

impl<M, L> EvalStrategy<M, L> for FullDatasetStrategy<M, L>
where
    M: ParametricModel + 'static,
    L: Loss + 'static,
    L::Labels: Labels + Send + Sync + 'static,
{
    fn propose_starting_point(&self) -> Array1<f64> {
        self.model.parameters()
    }

    fn num_variables(&self) -> usize {
        self.model.num_parameters()
    }

    fn eval(&mut self, theta: &Array1<f64>) -> Result<f64> {
        self.model.set_parameters(theta)?;
        let mut total = 0.0;
        for batch in self.data.batches() {
            let preds = self.model.predict(&batch.inputs)?;
            total += self.loss.eval(&preds, &batch.labels, None)?;
        }
        Ok(total / self.data.num_samples() as f64)
    }

    fn eval_derivative(&mut self, theta: &Array1<f64>) -> Result<(f64, Array1<f64>)> {
        self.model.set_parameters(theta)?;
        let mut total = 0.0;
        let mut grad = Array1::zeros(self.model.num_parameters());
        for batch in self.data.batches() {
            let (preds, state) = self.model.predict_with_state(&batch.inputs)?;
            let mut loss_grad = Array2::zeros(preds.raw_dim());
            total += self
                .loss
                .eval_derivative(&preds, &batch.labels, None, &mut loss_grad)?;
            grad += &self
                .model
                .parameter_gradient(&batch.inputs, &state, &loss_grad)?;
        }
        let n = self.data.num_samples() as f64;
        grad /= n;
        Ok((total / n, grad))
    }

    fn boxed_clone(&self) -> Box<dyn EvalStrategy<M, L>> {
        Box::new(self.clone())
    }
}

/// Iterates every batch of a per-sample weighted dataset.
#[derive(Clone)]
pub(super) struct WeightedDatasetStrategy<M, L: Loss> {
    pub(super) data: Arc<Dataset<L::Labels>>,
    pub(super) model: M,
    pub(super) loss: L,
}

impl<M, L> EvalStrategy<M, L> for WeightedDatasetStrategy<M, L>
where
    M: ParametricModel + 'static,
    L: Loss + 'static,
    L::Labels: Labels + Send + Sync + 'static,
{
    fn propose_starting_point(&self) -> Array1<f64> {
        self.model.parameters()
    }

    fn num_variables(&self) -> usize {
        self.model.num_parameters()
    }

    fn eval(&mut self, theta: &Array1<f64>) -> Result<f64> {
        self.model.set_parameters(theta)?;
        let mut total = 0.0;
        for batch in self.data.batches() {
            let preds = self.model.predict(&batch.inputs)?;
            total += self
                .loss
                .eval(&preds, &batch.labels, batch.weights.as_ref())?;
        }
        Ok(total / self.data.num_samples() as f64)
    }

    fn eval_derivative(&mut self, theta: &Array1<f64>) -> Result<(f64, Array1<f64>)> {
        self.model.set_parameters(theta)?;
        let mut total = 0.0;
        let mut grad = Array1::zeros(self.model.num_parameters());
        for batch in self.data.batches() {
            let (preds, state) = self.model.predict_with_state(&batch.inputs)?;
            let mut loss_grad = Array2::zeros(preds.raw_dim());
            total += self.loss.eval_derivative(
                &preds,
                &batch.labels,
                batch.weights.as_ref(),
                &mut loss_grad,
            )?;
            grad += &self
                .model
                .parameter_gradient(&batch.inputs, &state, &loss_grad)?;
        }
        let n = self.data.num_samples() as f64;
        grad /= n;
        Ok((total / n, grad))
    }

    fn boxed_clone(&self) -> Box<dyn EvalStrategy<M, L>> {
        Box::new(self.clone())
    }
}

/// Draws one batch uniformly at random per evaluation.
///
/// The RNG is owned by the strategy instance and seeded in `init`, never
/// shared global state.
#[derive(Clone)]
pub(super) struct MiniBatchStrategy<M, L: Loss> {
    pub(super) data: Arc<Dataset<L::Labels>>,
    pub(super) model: M,
    pub(super) loss: L,
    pub(super) rng: Option<Xoshiro256PlusPlus>,
}

impl<M, L> EvalStrategy<M, L> for MiniBatchStrategy<M, L>
where
    M: ParametricModel + 'static,
    L: Loss + 'static,
    L::Labels: Labels + Send + Sync + 'static,
{
    fn init(&mut self, seed: u64) {
        self.rng = Some(Xoshiro256PlusPlus::seed_from_u64(seed));
    }

    fn propose_starting_point(&self) -> Array1<f64> {
        self.model.parameters()
    }

    fn num_variables(&self) -> usize {
        self.model.num_parameters()
    }

    fn eval(&mut self, theta: &Array1<f64>) -> Result<f64> {
        let index = self
            .rng
            .as_mut()
            .ok_or(FerriteError::NotInitialized)?
            .gen_range(0..self.data.num_batches());
        self.model.set_parameters(theta)?;
        let batch = self.data.batch(index);
        let preds = self.model.predict(&batch.inputs)?;
        let total = self
            .loss
            .eval(&preds, &batch.labels, batch.weights.as_ref())?;
        Ok(total / batch.inputs.nrows() as f64)
    }

    fn eval_derivative(&mut self, theta: &Array1<f64>) -> Result<(f64, Array1<f64>)> {
        let index = self
            .rng
            .as_mut()
            .ok_or(FerriteError::NotInitialized)?
            .gen_range(0..self.data.num_batches());
        self.model.set_parameters(theta)?;
        let batch = self.data.batch(index);
        let (preds, state) = self.model.predict_with_state(&batch.inputs)?;
        let mut loss_grad = Array2::zeros(preds.raw_dim());
        let total = self.loss.eval_derivative(
            &preds,
            &batch.labels,
            batch.weights.as_ref(),
            &mut loss_grad,
        )?;
        let mut grad = self
            .model
            .parameter_gradient(&batch.inputs, &state, &loss_grad)?;
        let n = batch.inputs.nrows() as f64;
        grad /= n;
        Ok((total / n, grad))
    }

    fn boxed_clone(&self) -> Box<dyn EvalStrategy<M, L>> {
        Box::new(self.clone())
    }
}
