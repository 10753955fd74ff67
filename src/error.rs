//! Error types for padmap.

use crate::midi::MidiMessageType;
use thiserror::Error;

/// Result alias used across the mapping core.
pub type Result<T> = std::result::Result<T, MappingError>;

/// Error returned by every mutating mapping operation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MappingError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Mapping profile '{0}' not found")]
    ProfileNotFound(String),

    #[error("Parameter mapping not found in profile '{profile_id}'")]
    ParameterMappingNotFound { profile_id: String },
}

/// Reasons a profile, parameter mapping or transform argument is rejected.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Profile id must not be blank")]
    BlankProfileId,

    #[error("Profile name must not be blank")]
    BlankProfileName,

    #[error("Profile id '{0}' already exists")]
    DuplicateProfileId(String),

    #[error("MIDI channel {0} out of range. Must be between 0 and 15")]
    ChannelOutOfRange(u8),

    #[error("MIDI controller {0} out of range. Must be between 0 and 127")]
    ControllerOutOfRange(u8),

    #[error("Target id must not be blank")]
    BlankTargetId,

    #[error("Parameter bounds must be finite: min={min}, max={max}")]
    NonFiniteBounds { min: f64, max: f64 },

    #[error("Invalid parameter range: min={min}, max={max}")]
    InvalidRange { min: f64, max: f64 },

    #[error("Quantization steps must be at least 1, got {0}")]
    InvalidQuantizationSteps(usize),

    #[error("{0:?} messages carry no controller number to reassign")]
    NoControllerToReassign(MidiMessageType),

    #[error("Mappings do not share the same MIDI source")]
    SourceMismatch,
}
