//! padmap - MIDI control mapping for pad instruments
//!
//! Maps incoming MIDI messages to pad, sequencer and master parameters
//! through switchable profiles. Knobs get response curves, pitch bend is
//! bipolar, and shared controller assignments are detected and resolved.

pub mod config;
pub mod engine;
pub mod error;
pub mod mapping;
pub mod midi;
pub mod store;

pub use config::PadmapConfig;
pub use engine::{MappingEngine, MidiParameterChange};
pub use error::{MappingError, Result, ValidationError};
pub use midi::{MidiMessage, MidiMessageType};
pub use store::MappingStore;
