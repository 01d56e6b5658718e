//! Error types for the ferrite-ml crate

use thiserror::Error;

/// Result type alias for ferrite-ml operations
pub type Result<T> = std::result::Result<T, FerriteError>;

/// Main error type for the crate
#[derive(Error, Debug)]
pub enum FerriteError {
    #[error("Invalid parameter: {name} = {value}, {reason}")]
    InvalidParameter {
        name: String,
        value: String,
        reason: String,
    },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Class index {class} out of range for {num_classes} classes")]
    ClassOutOfRange { class: usize, num_classes: usize },

    #[error("Objective not initialized: call init() before evaluating")]
    NotInitialized,

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<serde_json::Error> for FerriteError {
    fn from(err: serde_json::Error) -> Self {
        FerriteError::SerializationError(err.to_string())
    }
}

impl From<ndarray::ShapeError> for FerriteError {
    fn from(err: ndarray::ShapeError) -> Self {
        FerriteError::ShapeError {
            expected: "valid shape".to_string(),
            actual: err.to_string(),
        }
    }
}
