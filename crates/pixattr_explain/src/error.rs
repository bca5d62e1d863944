//! Error types for pixattr_explain.

use pixattr_core::ImageShape;
use thiserror::Error;

/// Result type alias using [`ExplainError`].
pub type Result<T> = std::result::Result<T, ExplainError>;

/// Errors that can occur while computing attributions.
#[derive(Error, Debug)]
pub enum ExplainError {
    /// A caller-supplied argument was rejected before any computation ran.
    #[error("Invalid argument: {0}")]
    InvalidArgument(#[from] ArgumentError),

    /// The gradient oracle failed. The failure is reported to the caller
    /// without retries; gradient failures typically indicate a
    /// non-differentiable model or an invalid evaluation point.
    #[error("Gradient oracle failure: {0}")]
    Oracle(String),
}

/// Rejected argument details.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArgumentError {
    /// Input and baseline tensors must share a shape.
    #[error("input shape {input} does not match baseline shape {baseline}")]
    ShapeMismatch {
        /// Shape of the input tensor.
        input: ImageShape,
        /// Shape of the baseline tensor.
        baseline: ImageShape,
    },

    /// The input tensor has a zero-sized dimension.
    #[error("empty input shape {0}")]
    EmptyShape(ImageShape),

    /// At least one integration step is required.
    #[error("steps must be at least 1, got {0}")]
    NonPositiveSteps(usize),

    /// Quadrature rule name could not be parsed.
    #[error("unknown quadrature rule '{0}'")]
    UnknownRule(String),

    /// Target class index exceeds the scorer's output width.
    #[error("target class {target} out of range for {n_classes} model classes")]
    TargetOutOfRange {
        /// Requested class index.
        target: usize,
        /// Number of classes the model scores.
        n_classes: usize,
    },
}
