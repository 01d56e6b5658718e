//! Batched labeled datasets
//!
//! A [`Dataset`] is an immutable partition of labeled samples into batches,
//! optionally carrying per-sample weights. Objectives iterate the batches
//! (or sample one at random in mini-batch mode) and normalize by the total
//! sample count, so batches of different sizes stay comparable.

use crate::error::{FerriteError, Result};
use ndarray::{s, Array1, Array2};
use serde::{Deserialize, Serialize};

/// Label container usable inside a [`Batch`].
///
/// Implemented for continuous targets (`Array2<f64>`, one row per sample)
/// and class-index targets (`Array1<usize>`).
pub trait Labels: Clone {
    /// Number of labeled samples in this container.
    fn num_samples(&self) -> usize;

    /// Copies the labels for samples in `start..end`.
    fn slice_samples(&self, start: usize, end: usize) -> Self;
}

impl Labels for Array2<f64> {
    fn num_samples(&self) -> usize {
        self.nrows()
    }

    fn slice_samples(&self, start: usize, end: usize) -> Self {
        self.slice(s![start..end, ..]).to_owned()
    }
}

impl Labels for Array1<usize> {
    fn num_samples(&self) -> usize {
        self.len()
    }

    fn slice_samples(&self, start: usize, end: usize) -> Self {
        self.slice(s![start..end]).to_owned()
    }
}

/// One batch of labeled samples
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Batch<L> {
    /// Input rows, one sample per row
    pub inputs: Array2<f64>,
    /// Labels for the same rows
    pub labels: L,
    /// Optional per-sample weights
    pub weights: Option<Array1<f64>>,
}

impl<L: Labels> Batch<L> {
    /// Number of samples in this batch
    pub fn num_samples(&self) -> usize {
        self.inputs.nrows()
    }
}

/// Immutable labeled data partitioned into batches
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataset<L> {
    batches: Vec<Batch<L>>,
    num_samples: usize,
    weighted: bool,
}

impl<L: Labels> Dataset<L> {
    /// Builds a dataset from pre-partitioned batches.
    ///
    /// Every batch must have matching input/label/weight row counts, and
    /// either all batches carry weights or none do.
    pub fn from_batches(batches: Vec<Batch<L>>) -> Result<Self> {
        if batches.is_empty() {
            return Err(FerriteError::ValidationError(
                "dataset must contain at least one batch".to_string(),
            ));
        }

        let weighted = batches[0].weights.is_some();
        let mut num_samples = 0;
        for batch in &batches {
            let n = batch.inputs.nrows();
            if batch.labels.num_samples() != n {
                return Err(FerriteError::ShapeError {
                    expected: format!("{} labels", n),
                    actual: format!("{} labels", batch.labels.num_samples()),
                });
            }
            match &batch.weights {
                Some(w) if w.len() != n => {
                    return Err(FerriteError::ShapeError {
                        expected: format!("{} weights", n),
                        actual: format!("{} weights", w.len()),
                    });
                }
                Some(_) if !weighted => {
                    return Err(FerriteError::ValidationError(
                        "either all batches carry weights or none do".to_string(),
                    ));
                }
                None if weighted => {
                    return Err(FerriteError::ValidationError(
                        "either all batches carry weights or none do".to_string(),
                    ));
                }
                _ => {}
            }
            num_samples += n;
        }

        Ok(Self {
            batches,
            num_samples,
            weighted,
        })
    }

    /// Builds an unweighted dataset by splitting `inputs`/`labels` into
    /// batches of at most `batch_size` rows.
    pub fn from_arrays(inputs: &Array2<f64>, labels: &L, batch_size: usize) -> Result<Self> {
        Self::partition(inputs, labels, None, batch_size)
    }

    /// Builds a per-sample weighted dataset by splitting `inputs`/`labels`/
    /// `weights` into batches of at most `batch_size` rows.
    pub fn with_weights(
        inputs: &Array2<f64>,
        labels: &L,
        weights: &Array1<f64>,
        batch_size: usize,
    ) -> Result<Self> {
        if weights.len() != inputs.nrows() {
            return Err(FerriteError::ShapeError {
                expected: format!("{} weights", inputs.nrows()),
                actual: format!("{} weights", weights.len()),
            });
        }
        Self::partition(inputs, labels, Some(weights), batch_size)
    }

    fn partition(
        inputs: &Array2<f64>,
        labels: &L,
        weights: Option<&Array1<f64>>,
        batch_size: usize,
    ) -> Result<Self> {
        if batch_size == 0 {
            return Err(FerriteError::InvalidParameter {
                name: "batch_size".to_string(),
                value: "0".to_string(),
                reason: "batches must hold at least one sample".to_string(),
            });
        }
        let n = inputs.nrows();
        if labels.num_samples() != n {
            return Err(FerriteError::ShapeError {
                expected: format!("{} labels", n),
                actual: format!("{} labels", labels.num_samples()),
            });
        }

        let mut batches = Vec::with_capacity(n.div_ceil(batch_size));
        let mut start = 0;
        while start < n {
            let end = usize::min(start + batch_size, n);
            batches.push(Batch {
                inputs: inputs.slice(s![start..end, ..]).to_owned(),
                labels: labels.slice_samples(start, end),
                weights: weights.map(|w| w.slice(s![start..end]).to_owned()),
            });
            start = end;
        }
        Self::from_batches(batches)
    }

    /// Total number of samples across all batches
    pub fn num_samples(&self) -> usize {
        self.num_samples
    }

    /// Number of batches
    pub fn num_batches(&self) -> usize {
        self.batches.len()
    }

    /// Returns the `index`-th batch
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.num_batches()`.
    pub fn batch(&self, index: usize) -> &Batch<L> {
        &self.batches[index]
    }

    /// Iterates over all batches
    pub fn batches(&self) -> impl Iterator<Item = &Batch<L>> {
        self.batches.iter()
    }

    /// Whether the samples carry individual weights
    pub fn is_weighted(&self) -> bool {
        self.weighted
    }
}
