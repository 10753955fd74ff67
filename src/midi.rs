//! Parsed MIDI messages as delivered by the transport layer.
//!
//! The driver hands over already-decoded messages; this module only gives
//! them a type, convenience constructors and the raw value a mapping reads.

use serde::{Deserialize, Serialize};

/// Centre of the 14-bit pitch bend range.
pub const PITCH_BEND_CENTER: u16 = 8192;

/// Largest 14-bit pitch bend value.
pub const PITCH_BEND_MAX: u16 = 16383;

/// Largest 7-bit data value.
pub const DATA_MAX: u16 = 127;

/// MIDI message types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MidiMessageType {
    NoteOn,
    NoteOff,
    ControlChange,
    PitchBend,
    ProgramChange,
    /// Channel pressure (single data byte)
    Aftertouch,
    /// Polyphonic key pressure (note, pressure)
    PolyAftertouch,
    Clock,
    Start,
    Stop,
    Continue,
    SysEx,
}

impl MidiMessageType {
    /// Largest raw value this message type carries.
    pub fn native_range(self) -> u16 {
        match self {
            MidiMessageType::PitchBend => PITCH_BEND_MAX,
            _ => DATA_MAX,
        }
    }

    /// Whether messages of this type are told apart by controller number.
    pub fn uses_controller(self) -> bool {
        self == MidiMessageType::ControlChange
    }

    /// Whether this is a system real-time message without data bytes.
    pub fn is_realtime(self) -> bool {
        matches!(
            self,
            MidiMessageType::Clock
                | MidiMessageType::Start
                | MidiMessageType::Stop
                | MidiMessageType::Continue
        )
    }

    /// Parse a type from its config/CLI name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "note_on" | "noteon" | "note" => Some(Self::NoteOn),
            "note_off" | "noteoff" => Some(Self::NoteOff),
            "cc" | "control_change" | "controlchange" => Some(Self::ControlChange),
            "pitch_bend" | "pitchbend" | "bend" => Some(Self::PitchBend),
            "program_change" | "programchange" | "program" => Some(Self::ProgramChange),
            "aftertouch" | "channel_pressure" => Some(Self::Aftertouch),
            "poly_aftertouch" | "poly_pressure" => Some(Self::PolyAftertouch),
            "clock" => Some(Self::Clock),
            "start" => Some(Self::Start),
            "stop" => Some(Self::Stop),
            "continue" => Some(Self::Continue),
            "sysex" => Some(Self::SysEx),
            _ => None,
        }
    }
}

/// A single parsed MIDI message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MidiMessage {
    pub message_type: MidiMessageType,
    /// Channel (0-15)
    pub channel: u8,
    /// First data byte (0-127)
    pub data1: u8,
    /// Second data byte (0-127)
    pub data2: u8,
    /// Monotonic timestamp in nanoseconds
    pub timestamp: u64,
}

impl MidiMessage {
    /// Create a message from its parts. Channel and data bytes are masked to range.
    pub fn new(message_type: MidiMessageType, channel: u8, data1: u8, data2: u8) -> Self {
        Self {
            message_type,
            channel: channel & 0x0F,
            data1: data1 & 0x7F,
            data2: data2 & 0x7F,
            timestamp: 0,
        }
    }

    /// Note on: channel (0-15), note (0-127), velocity (0-127)
    pub fn note_on(channel: u8, note: u8, velocity: u8) -> Self {
        Self::new(MidiMessageType::NoteOn, channel, note, velocity)
    }

    /// Note off: channel (0-15), note (0-127), velocity (0-127)
    pub fn note_off(channel: u8, note: u8, velocity: u8) -> Self {
        Self::new(MidiMessageType::NoteOff, channel, note, velocity)
    }

    /// Control change: channel (0-15), controller (0-127), value (0-127)
    pub fn control_change(channel: u8, controller: u8, value: u8) -> Self {
        Self::new(MidiMessageType::ControlChange, channel, controller, value)
    }

    /// Program change: channel (0-15), program (0-127)
    pub fn program_change(channel: u8, program: u8) -> Self {
        Self::new(MidiMessageType::ProgramChange, channel, program, 0)
    }

    /// Channel pressure: channel (0-15), pressure (0-127)
    pub fn aftertouch(channel: u8, pressure: u8) -> Self {
        Self::new(MidiMessageType::Aftertouch, channel, pressure, 0)
    }

    /// Pitch bend: channel (0-15), value (0-16383, center at 8192)
    pub fn pitch_bend(channel: u8, value: u16) -> Self {
        let value = value.min(PITCH_BEND_MAX);
        let lsb = (value & 0x7F) as u8;
        let msb = ((value >> 7) & 0x7F) as u8;
        Self::new(MidiMessageType::PitchBend, channel, lsb, msb)
    }

    /// System real-time message (clock, start, stop, continue).
    pub fn realtime(message_type: MidiMessageType) -> Self {
        Self::new(message_type, 0, 0, 0)
    }

    /// Attach a timestamp (nanoseconds).
    pub fn with_timestamp(mut self, timestamp: u64) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Combined 14-bit pitch bend value (data2 is the MSB).
    pub fn pitch_bend_value(&self) -> u16 {
        ((self.data2 as u16) << 7) | self.data1 as u16
    }

    /// Raw value a mapping reads from this message, in the type's native range.
    ///
    /// Real-time messages carry no data and read as full scale so they can
    /// drive triggers. SysEx has no usable value.
    pub fn source_value(&self) -> Option<u16> {
        match self.message_type {
            MidiMessageType::ControlChange
            | MidiMessageType::NoteOn
            | MidiMessageType::NoteOff
            | MidiMessageType::PolyAftertouch => Some(self.data2 as u16),
            MidiMessageType::ProgramChange | MidiMessageType::Aftertouch => {
                Some(self.data1 as u16)
            }
            MidiMessageType::PitchBend => Some(self.pitch_bend_value()),
            MidiMessageType::Clock
            | MidiMessageType::Start
            | MidiMessageType::Stop
            | MidiMessageType::Continue => Some(DATA_MAX),
            MidiMessageType::SysEx => None,
        }
    }
}
