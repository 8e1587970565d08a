//! Errors
//!
//! Custom error types used throughout the `mvforest` crate.
use thiserror::Error;

/// Errors that can occur while configuring, fitting, or persisting a forest.
#[derive(Debug, Error)]
pub enum ForestError {
    /// First value is the name of the parameter, second is expected, third is what was passed.
    #[error("Invalid parameter value passed for {0}, expected {1} but {2} provided.")]
    InvalidParameter(String, String, String),
    /// Shapes of the supplied data, responses, or dispersion matrix disagree.
    #[error("Dimension mismatch: {0}.")]
    DimensionMismatch(String),
    /// The dispersion matrix could not be inverted.
    #[error("The dispersion matrix is singular and cannot be inverted.")]
    SingularDispersion,
    /// Unable to write model to file.
    #[error("Unable to write model to file: {0}")]
    UnableToWrite(String),
    /// Unable to read model from file.
    #[error("Unable to read model from a file {0}")]
    UnableToRead(String),
}
