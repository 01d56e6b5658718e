//! Weighted mean of a set of models

use crate::error::{FerriteError, Result};
use crate::model::{EnsembleMember, MemberOutput};
use ndarray::{Array1, Array2};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Weighted ensemble aggregator over identically-typed sub-models.
///
/// Every added model contributes `weight / weight_sum` of the output. How a
/// member's output enters the combination depends on its declared output
/// kind: continuous rows are averaged elementwise, while class predictions
/// add vote mass at `(sample, class)`. Either way each output row ends up
/// normalized by the total weight.
///
/// The ensemble owns independent copies of its members and has no trainable
/// parameters of its own.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(serialize = "M: Serialize", deserialize = "M: Deserialize<'de>"))]
pub struct MeanModel<M: EnsembleMember> {
    models: Vec<M>,
    weights: Vec<f64>,
    weight_sum: f64,
    output_dim: usize,
}

impl<M: EnsembleMember> MeanModel<M> {
    /// Empty ensemble producing `output_dim` columns per sample
    pub fn new(output_dim: usize) -> Self {
        Self {
            models: Vec::new(),
            weights: Vec::new(),
            weight_sum: 0.0,
            output_dim,
        }
    }

    /// Appends a model with the given positive weight
    pub fn add_model(&mut self, model: M, weight: f64) -> Result<()> {
        if weight <= 0.0 {
            return Err(FerriteError::InvalidParameter {
                name: "weight".to_string(),
                value: weight.to_string(),
                reason: "model weights must be positive".to_string(),
            });
        }
        self.models.push(model);
        self.weights.push(weight);
        self.weight_sum += weight;
        Ok(())
    }

    /// Replaces the weight of the `index`-th model.
    ///
    /// The positivity invariant from [`add_model`](Self::add_model) applies
    /// here as well.
    pub fn set_weight(&mut self, index: usize, new_weight: f64) -> Result<()> {
        if index >= self.models.len() {
            return Err(FerriteError::ValidationError(format!(
                "model index {} out of bounds for {} models",
                index,
                self.models.len()
            )));
        }
        if new_weight <= 0.0 {
            return Err(FerriteError::InvalidParameter {
                name: "new_weight".to_string(),
                value: new_weight.to_string(),
                reason: "model weights must be positive".to_string(),
            });
        }
        self.weight_sum += new_weight - self.weights[index];
        self.weights[index] = new_weight;
        Ok(())
    }

    /// Removes all models from the ensemble
    pub fn clear_models(&mut self) {
        self.models.clear();
        self.weights.clear();
        self.weight_sum = 0.0;
    }

    /// Evaluates the ensemble on a batch of inputs, one sample per row.
    ///
    /// Returns a `(batch_size, output_dim)` matrix of weighted means (or
    /// normalized vote distributions for classifying members).
    pub fn evaluate(&self, inputs: &Array2<f64>) -> Result<Array2<f64>> {
        if self.models.is_empty() {
            return Err(FerriteError::ValidationError(
                "ensemble contains no models".to_string(),
            ));
        }
        let mut outputs = Array2::zeros((inputs.nrows(), self.output_dim));
        for (model, &weight) in self.models.iter().zip(self.weights.iter()) {
            model.eval(inputs)?.accumulate(weight, &mut outputs)?;
        }
        outputs /= self.weight_sum;
        Ok(outputs)
    }

    /// Number of models in the ensemble
    pub fn num_models(&self) -> usize {
        self.models.len()
    }

    /// Returns the `index`-th model
    pub fn model(&self, index: usize) -> Option<&M> {
        self.models.get(index)
    }

    /// Returns the weight of the `index`-th model
    pub fn weight(&self, index: usize) -> Option<f64> {
        self.weights.get(index).copied()
    }

    /// Total sum of member weights
    pub fn weight_sum(&self) -> f64 {
        self.weight_sum
    }

    /// Output dimensionality
    pub fn output_size(&self) -> usize {
        self.output_dim
    }

    /// Changes the output dimensionality
    pub fn set_output_size(&mut self, dim: usize) {
        self.output_dim = dim;
    }

    /// Expected input columns, delegated to the first member
    pub fn input_shape(&self) -> Option<usize> {
        self.models.first().map(|m| m.input_dim())
    }

    /// Output columns of the members, delegated to the first member
    pub fn output_shape(&self) -> Option<usize> {
        self.models.first().map(|m| m.output_dim())
    }

    /// The ensemble itself has no trainable parameters
    pub fn parameter_vector(&self) -> Array1<f64> {
        Array1::zeros(0)
    }

    /// Accepts only an empty parameter vector
    pub fn set_parameter_vector(&mut self, theta: &Array1<f64>) -> Result<()> {
        if !theta.is_empty() {
            return Err(FerriteError::ShapeError {
                expected: "0 parameters".to_string(),
                actual: format!("{} parameters", theta.len()),
            });
        }
        Ok(())
    }
}

impl<M: EnsembleMember + Serialize> MeanModel<M> {
    /// Saves the full ensemble state as JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(&path, json)?;
        debug!(models = self.models.len(), "ensemble saved");
        Ok(())
    }
}

impl<M: EnsembleMember + DeserializeOwned> MeanModel<M> {
    /// Loads an ensemble previously written by [`save`](Self::save)
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = fs::read_to_string(&path)?;
        let ensemble: Self = serde_json::from_str(&json)?;
        debug!(models = ensemble.models.len(), "ensemble loaded");
        Ok(ensemble)
    }
}
