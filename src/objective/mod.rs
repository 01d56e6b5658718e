//! Supervised objective functions
//!
//! An [`ErrorFunction`] scores a parametric model's predictions against a
//! labeled dataset and exposes the gradient of that score with respect to
//! the model parameters. Evaluation over the full dataset, a per-sample
//! weighted dataset, or a random mini-batch is selected once at
//! construction. An optional [`Regularizer`] is added on top with a scalar
//! strength.

mod error_function;
mod regularizer;
mod strategies;

pub use error_function::ErrorFunction;
pub use regularizer::{OneNorm, Regularizer, TwoNorm};
