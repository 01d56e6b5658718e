//! Ensemble methods module
//!
//! Provides the weighted mean ensemble:
//! - Continuous members are combined into a weighted arithmetic mean
//! - Classifying members are combined into a normalized weighted vote
//!   distribution

mod mean;

pub use mean::MeanModel;
