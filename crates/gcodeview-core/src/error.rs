//! Error handling for GCodeView
//!
//! Provides error types for the layers of the core:
//! - G-Code errors (parsing)
//! - Playback errors (clock control)
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// G-Code error type
///
/// Represents errors raised while interpreting a G-Code program. Any of these
/// aborts the whole parse; no partial program is produced.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GcodeError {
    /// A parameter word carried a value that is not a decimal number
    #[error("Invalid parameter '{param}' at line {line_number}: {reason}")]
    InvalidParameter {
        /// The 1-based line number where the invalid parameter was found.
        line_number: u32,
        /// The parameter letter.
        param: char,
        /// The reason the parameter is invalid.
        reason: String,
    },
}

impl GcodeError {
    /// Line number the error refers to, if any
    pub fn line_number(&self) -> Option<u32> {
        match self {
            Self::InvalidParameter { line_number, .. } => Some(*line_number),
        }
    }
}

/// Playback error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlaybackError {
    /// Speed multiplier must be finite and strictly positive
    #[error("Invalid playback speed: {speed}")]
    InvalidSpeed {
        /// The rejected speed value.
        speed: f64,
    },

    /// The playback timer has been stopped and no longer accepts commands
    #[error("Playback timer stopped")]
    TimerStopped,
}

/// Main error type for GCodeView
///
/// A unified error type that can represent any error from the core layers.
#[derive(Error, Debug)]
pub enum Error {
    /// G-Code error
    #[error(transparent)]
    Gcode(#[from] GcodeError),

    /// Playback error
    #[error(transparent)]
    Playback(#[from] PlaybackError),

    /// JSON serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a G-Code error
    pub fn is_gcode_error(&self) -> bool {
        matches!(self, Error::Gcode(_))
    }

    /// Check if this is a playback error
    pub fn is_playback_error(&self) -> bool {
        matches!(self, Error::Playback(_))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gcode_error_display() {
        let err = GcodeError::InvalidParameter {
            line_number: 3,
            param: 'X',
            reason: "'1.2.3' is not a number".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid parameter 'X' at line 3: '1.2.3' is not a number"
        );
        assert_eq!(err.line_number(), Some(3));
    }

    #[test]
    fn test_playback_error_display() {
        let err = PlaybackError::InvalidSpeed { speed: -1.0 };
        assert_eq!(err.to_string(), "Invalid playback speed: -1");
        assert_eq!(
            PlaybackError::TimerStopped.to_string(),
            "Playback timer stopped"
        );
    }

    #[test]
    fn test_error_conversion() {
        let err: Error = GcodeError::InvalidParameter {
            line_number: 1,
            param: 'F',
            reason: "'-' is not a number".to_string(),
        }
        .into();
        assert!(err.is_gcode_error());
        assert!(!err.is_playback_error());

        let err: Error = PlaybackError::TimerStopped.into();
        assert!(err.is_playback_error());

        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
