//! Error types for the CAM tools crate.
//!
//! This module provides structured error types for toolpath synthesis,
//! parameter validation, and geometry file loading.

use std::io;
use thiserror::Error;

/// Errors that can occur during CAM tool operations.
#[derive(Error, Debug)]
pub enum CamToolError {
    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    /// JSON serialization/deserialization error.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// A parameter validation error occurred.
    #[error("Parameter error: {0}")]
    Parameter(#[from] ParameterError),

    /// A file format error occurred.
    #[error("File format error: {0}")]
    FileFormat(#[from] FileFormatError),
}

/// Errors related to CAM tool parameter validation.
#[derive(Error, Debug)]
pub enum ParameterError {
    /// A parameter value is out of the valid range.
    #[error("Parameter '{name}' out of range: {value} (valid: {min}..{max})")]
    OutOfRange {
        name: String,
        value: f64,
        min: f64,
        max: f64,
    },

    /// A parameter value is invalid.
    #[error("Invalid value for '{name}': {reason}")]
    InvalidValue { name: String, reason: String },

    /// Parameters are mutually incompatible.
    #[error("Incompatible parameters: {0}")]
    Incompatible(String),
}

/// Errors related to geometry file parsing.
#[derive(Error, Debug)]
pub enum FileFormatError {
    /// The DXF file could not be parsed.
    #[error("DXF parse error: {0}")]
    DxfParseError(String),

    /// The file extension is not recognized.
    #[error("Unknown file extension: {0}")]
    UnknownExtension(String),

    /// I/O error during file reading.
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),
}

/// Result type alias for CAM tool operations.
pub type CamToolResult<T> = Result<T, CamToolError>;

/// Result type alias for parameter validation.
pub type ParameterResult<T> = Result<T, ParameterError>;

/// Result type alias for file format operations.
pub type FileFormatResult<T> = Result<T, FileFormatError>;
