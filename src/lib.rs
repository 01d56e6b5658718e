//! ferrite-ml — weighted model ensembles and dataset-driven objectives
//!
//! This crate provides two building blocks for supervised learning:
//! - [`ensemble`] - Weighted mean/vote aggregation over a set of sub-models
//! - [`objective`] - Supervised error functions with gradients, mini-batch
//!   sampling, and additive regularization
//!
//! Supporting modules:
//! - [`model`] - Model capability traits and a dense linear model
//! - [`loss`] - Loss functions over batched predictions
//! - [`data`] - Batched labeled datasets with optional sample weights
//! - [`error`] - Crate-wide error type

// Core error handling
pub mod error;

// Data and collaborator contracts
pub mod data;
pub mod loss;
pub mod model;

// Core components
pub mod ensemble;
pub mod objective;

// Re-export commonly used types
pub use error::{FerriteError, Result};
