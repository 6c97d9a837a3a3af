//! Error types for grid integration

use std::fmt;

/// Errors raised by the integration kernels and their configuration.
///
/// Returned inside `eyre::Report`; use `downcast_ref::<NumIntError>()` to
/// match on them.
#[derive(Debug, Clone, PartialEq)]
pub enum NumIntError {
    /// Array shapes that cannot be combined
    ShapeMismatch(String),
    /// Entry point that this integrator deliberately does not provide
    Unsupported(&'static str),
    /// Rejected configuration value
    InvalidConfig(String),
}

impl fmt::Display for NumIntError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumIntError::ShapeMismatch(msg) => write!(f, "Shape mismatch: {}", msg),
            NumIntError::Unsupported(what) => write!(f, "{} is not implemented", what),
            NumIntError::InvalidConfig(msg) => write!(f, "Invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for NumIntError {}
