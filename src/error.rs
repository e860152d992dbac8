//! Error handling for Crushon
//!
//! Nothing in here is ever constructed on the audio thread: block
//! processing is infallible and every fallible operation lives on the
//! control side (parameter lookup, preset state, WAV I/O).

use thiserror::Error;

/// Result type alias for Crushon operations
pub type Result<T> = std::result::Result<T, CrushError>;

/// Main error type for Crushon operations
#[derive(Error, Debug)]
pub enum CrushError {
    // Parameter Errors
    #[error("Unknown parameter: {id}")]
    UnknownParameter { id: String },

    #[error("Invalid value for parameter {id}: {reason}")]
    InvalidParameterValue { id: String, reason: String },

    // Preset State Errors
    #[error("Invalid preset state: {reason}")]
    InvalidState { reason: String },

    #[error("Unsupported preset state version {found} (expected {expected})")]
    UnsupportedStateVersion { found: u32, expected: u32 },

    // Audio Errors
    #[error("Invalid audio: {reason}")]
    InvalidAudio { reason: String },

    #[error("Unsupported audio format: {details}")]
    UnsupportedFormat { details: String },

    #[error("Failed to read audio file: {path}")]
    AudioReadError {
        path: String,
        #[source]
        source: hound::Error,
    },

    #[error("Failed to write audio file: {path}")]
    AudioWriteError {
        path: String,
        #[source]
        source: hound::Error,
    },

    // I/O Errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization Errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CrushError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            CrushError::UnknownParameter { .. } => "UNKNOWN_PARAMETER",
            CrushError::InvalidParameterValue { .. } => "INVALID_PARAMETER_VALUE",
            CrushError::InvalidState { .. } => "INVALID_STATE",
            CrushError::UnsupportedStateVersion { .. } => "UNSUPPORTED_STATE_VERSION",
            CrushError::InvalidAudio { .. } => "INVALID_AUDIO",
            CrushError::UnsupportedFormat { .. } => "UNSUPPORTED_FORMAT",
            CrushError::AudioReadError { .. } => "AUDIO_READ_ERROR",
            CrushError::AudioWriteError { .. } => "AUDIO_WRITE_ERROR",
            CrushError::Io(_) => "IO_ERROR",
            CrushError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Returns a suggested recovery action for this error
    pub fn recovery_hint(&self) -> &'static str {
        match self {
            Self::UnknownParameter { .. } => {
                "Run 'crushon-cli params' to list the valid parameter ids"
            }
            Self::InvalidParameterValue { .. } => "Pass a number, or 'on'/'off' for switches",
            Self::InvalidState { .. } => "Re-save the preset from a known-good session",
            Self::UnsupportedStateVersion { .. } => {
                "The preset was written by a different version; re-create it"
            }
            Self::InvalidAudio { .. } => "Check that the buffer has equal-length channels",
            Self::UnsupportedFormat { .. } => "Convert to mono or stereo WAV (16/24/32-bit)",
            Self::AudioReadError { .. } => "Check that the file exists and is a valid WAV file",
            Self::AudioWriteError { .. } => "Check that the output directory is writable",
            Self::Io(_) => "Check file paths and permissions",
            Self::Serialization(_) => "The preset file is not valid JSON",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = CrushError::UnknownParameter {
            id: "drive".to_string(),
        };
        assert_eq!(err.error_code(), "UNKNOWN_PARAMETER");
        assert_eq!(err.to_string(), "Unknown parameter: drive");
    }

    #[test]
    fn test_version_message() {
        let err = CrushError::UnsupportedStateVersion {
            found: 7,
            expected: 1,
        };
        assert_eq!(
            err.to_string(),
            "Unsupported preset state version 7 (expected 1)"
        );
        assert!(!err.recovery_hint().is_empty());
    }

    #[test]
    fn test_from_serde() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: CrushError = parse_err.into();
        assert_eq!(err.error_code(), "SERIALIZATION_ERROR");
    }
}
