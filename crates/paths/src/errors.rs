//! Error types for PathBuilder

use std::fmt;

/// Errors that can occur during path construction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathBuilderError {
    /// Required parameter is missing
    MissingRequiredParameter(String),

    /// Parameter is present but cannot be used in a path
    InvalidParameter { name: String, value: String },

    /// Invalid format for the operation
    InvalidFormatForOperation,
}

impl fmt::Display for PathBuilderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathBuilderError::MissingRequiredParameter(param) => {
                write!(f, "Missing required parameter: {param}")
            }
            PathBuilderError::InvalidParameter { name, value } => {
                write!(f, "Invalid value for parameter {name}: {value:?}")
            }
            PathBuilderError::InvalidFormatForOperation => {
                write!(f, "Invalid format for the operation")
            }
        }
    }
}

impl std::error::Error for PathBuilderError {}
