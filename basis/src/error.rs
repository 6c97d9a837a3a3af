//! Error types for basis construction and collocation

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum BasisError {
    /// Element symbol not found in the periodic table
    UnknownElement(String),
    /// Malformed line or unsupported shell label in an NWChem block
    Parse(String),
    /// Non-zero-shell table or coordinate array with the wrong shape
    Shape(String),
}

impl fmt::Display for BasisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BasisError::UnknownElement(symbol) => write!(f, "Unknown element symbol: '{}'", symbol),
            BasisError::Parse(msg) => write!(f, "Failed to parse basis set: {}", msg),
            BasisError::Shape(msg) => write!(f, "Shape mismatch: {}", msg),
        }
    }
}

impl std::error::Error for BasisError {}
