//! Error types for histogram binning and contour extraction.

use thiserror::Error;

/// Errors raised while validating contour inputs.
///
/// Every variant is produced before any grid is allocated, and each one can
/// name the parameter that caused it via [`ContourError::param`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ContourError {
    /// A parameter value is out of its allowed domain.
    #[error("invalid value for '{param}': {message}")]
    InvalidArgument { param: &'static str, message: String },

    /// Two mutually exclusive parameters were both supplied.
    #[error("cannot supply both '{first}' and '{second}'")]
    Conflicting {
        first: &'static str,
        second: &'static str,
    },

    /// The x and y sample arrays have different lengths.
    #[error("array_x and array_y must have the same length (got {x_len} and {y_len})")]
    LengthMismatch { x_len: usize, y_len: usize },
}

impl ContourError {
    /// Create an InvalidArgument error.
    pub fn invalid_argument(param: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            param,
            message: message.into(),
        }
    }

    /// Create a Conflicting error.
    pub fn conflicting(first: &'static str, second: &'static str) -> Self {
        Self::Conflicting { first, second }
    }

    /// Name of the offending parameter.
    pub fn param(&self) -> &'static str {
        match self {
            Self::InvalidArgument { param, .. } => param,
            Self::Conflicting { second, .. } => second,
            Self::LengthMismatch { .. } => "array_y",
        }
    }
}

/// Result type for contour operations.
pub type Result<T> = std::result::Result<T, ContourError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_parameter() {
        let err = ContourError::invalid_argument("bins", "must be positive");
        assert_eq!(err.to_string(), "invalid value for 'bins': must be positive");
        assert_eq!(err.param(), "bins");

        let err = ContourError::conflicting("bins", "edges");
        assert!(err.to_string().contains("'bins'"));
        assert!(err.to_string().contains("'edges'"));
        assert_eq!(err.param(), "edges");

        let err = ContourError::LengthMismatch { x_len: 3, y_len: 4 };
        assert!(err.to_string().contains("3 and 4"));
        assert_eq!(err.param(), "array_y");
    }
}
