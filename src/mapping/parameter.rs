//! Parameter mappings: one MIDI source bound to one sound parameter

use super::MidiCurve;
use crate::error::ValidationError;
use crate::midi::MidiMessageType;
use serde::{Deserialize, Serialize};

/// Logical sound parameters a mapping can drive.
///
/// The `target_id` paired with a target type is resolved by the parameter
/// sink (e.g. "pad0" -> the first pad).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetType {
    /// Pad output level
    PadVolume,
    /// Pad stereo position
    PadPan,
    /// Pad playback pitch
    PadPitch,
    /// Fire a pad
    PadTrigger,
    /// Sequencer tempo in BPM
    SequencerTempo,
    /// Master output level
    MasterVolume,
}

impl TargetType {
    /// Whether changes for this target are trigger events rather than levels.
    pub fn is_trigger(self) -> bool {
        matches!(self, TargetType::PadTrigger)
    }
}

/// The (type, channel, controller) triple two mappings collide on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MidiSource {
    pub midi_type: MidiMessageType,
    pub channel: u8,
    pub controller: u8,
}

/// Binds a MIDI source to a target parameter range under a response curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MidiParameterMapping {
    pub midi_type: MidiMessageType,
    /// MIDI channel (0-15)
    pub midi_channel: u8,
    /// Controller number (0-127), only matched for control change
    #[serde(default)]
    pub midi_controller: u8,
    pub target_type: TargetType,
    pub target_id: String,
    pub min_value: f64,
    pub max_value: f64,
    #[serde(default)]
    pub curve: MidiCurve,
    /// Set when the bounds were swapped on purpose (min > max)
    #[serde(default)]
    pub inverted: bool,
}

impl MidiParameterMapping {
    /// Create a mapping over [0, 1] with a linear curve.
    pub fn new(
        midi_type: MidiMessageType,
        midi_channel: u8,
        midi_controller: u8,
        target_type: TargetType,
        target_id: impl Into<String>,
    ) -> Self {
        Self {
            midi_type,
            midi_channel,
            midi_controller,
            target_type,
            target_id: target_id.into(),
            min_value: 0.0,
            max_value: 1.0,
            curve: MidiCurve::Linear,
            inverted: false,
        }
    }

    /// Control change mapping shorthand.
    pub fn control_change(
        channel: u8,
        controller: u8,
        target_type: TargetType,
        target_id: impl Into<String>,
    ) -> Self {
        Self::new(MidiMessageType::ControlChange, channel, controller, target_type, target_id)
    }

    /// Set the parameter range (builder pattern)
    pub fn with_range(mut self, min_value: f64, max_value: f64) -> Self {
        self.min_value = min_value;
        self.max_value = max_value;
        self
    }

    /// Set the response curve (builder pattern)
    pub fn with_curve(mut self, curve: MidiCurve) -> Self {
        self.curve = curve;
        self
    }

    /// The MIDI source this mapping listens to.
    ///
    /// The controller is only part of the source for control change; other
    /// types match on type and channel alone, so it reads as 0 for them.
    pub fn source(&self) -> MidiSource {
        MidiSource {
            midi_type: self.midi_type,
            channel: self.midi_channel,
            controller: if self.midi_type.uses_controller() {
                self.midi_controller
            } else {
                0
            },
        }
    }

    /// Whether both mappings respond to the same messages.
    pub fn shares_source(&self, other: &MidiParameterMapping) -> bool {
        self.source() == other.source()
    }

    /// Lower and upper bound regardless of inversion.
    pub fn bounds(&self) -> (f64, f64) {
        (
            self.min_value.min(self.max_value),
            self.min_value.max(self.max_value),
        )
    }

    /// Check ranges, target id and bound ordering.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.midi_channel > 15 {
            return Err(ValidationError::ChannelOutOfRange(self.midi_channel));
        }
        if self.midi_controller > 127 {
            return Err(ValidationError::ControllerOutOfRange(self.midi_controller));
        }
        if self.target_id.trim().is_empty() {
            return Err(ValidationError::BlankTargetId);
        }
        if !self.min_value.is_finite() || !self.max_value.is_finite() {
            return Err(ValidationError::NonFiniteBounds {
                min: self.min_value,
                max: self.max_value,
            });
        }
        let ordered = if self.inverted {
            self.min_value >= self.max_value
        } else {
            self.min_value <= self.max_value
        };
        if !ordered {
            return Err(ValidationError::InvalidRange {
                min: self.min_value,
                max: self.max_value,
            });
        }
        Ok(())
    }
}
