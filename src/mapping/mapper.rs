//! Mapper trait, MIDI transforms and pipeline

use super::{transform, MidiParameterMapping};
use crate::midi::MidiMessageType;

/// Trait for mapping functions
pub trait Mapper: Send + Sync {
    /// Get the name of this mapper
    fn name(&self) -> &str;

    /// Map an input value to an output value
    fn map(&self, input: f64) -> f64;
}

/// MIDI value -> parameter value for one mapping.
///
/// Input is a raw MIDI value as a float (0-127, or 0-16383 for pitch bend).
#[derive(Debug, Clone)]
pub struct ForwardTransform {
    mapping: MidiParameterMapping,
}

impl ForwardTransform {
    pub fn new(mapping: MidiParameterMapping) -> Self {
        Self { mapping }
    }

    pub fn mapping(&self) -> &MidiParameterMapping {
        &self.mapping
    }
}

impl Mapper for ForwardTransform {
    fn name(&self) -> &str {
        &self.mapping.target_id
    }

    fn map(&self, input: f64) -> f64 {
        let range = self.mapping.midi_type.native_range() as f64;
        let raw = if input.is_nan() { 0.0 } else { input.round().clamp(0.0, range) };
        transform::midi_to_parameter(raw as u16, &self.mapping, self.mapping.midi_type)
    }
}

/// Parameter value -> MIDI value for one mapping (controller feedback).
#[derive(Debug, Clone)]
pub struct InverseTransform {
    mapping: MidiParameterMapping,
}

impl InverseTransform {
    pub fn new(mapping: MidiParameterMapping) -> Self {
        Self { mapping }
    }

    /// Inverse as an integer MIDI value
    pub fn to_midi(&self, parameter_value: f64) -> u16 {
        transform::parameter_to_midi(parameter_value, &self.mapping, self.mapping.midi_type)
    }

    /// Native MIDI type of the produced values
    pub fn midi_type(&self) -> MidiMessageType {
        self.mapping.midi_type
    }
}

impl Mapper for InverseTransform {
    fn name(&self) -> &str {
        &self.mapping.target_id
    }

    fn map(&self, input: f64) -> f64 {
        self.to_midi(input) as f64
    }
}

/// A pipeline of mappers applied in sequence
#[derive(Default)]
pub struct MappingPipeline {
    mappers: Vec<Box<dyn Mapper>>,
}

impl MappingPipeline {
    /// Create an empty pipeline
    pub fn new() -> Self {
        Self { mappers: Vec::new() }
    }

    /// Add a mapper to the pipeline (builder pattern)
    pub fn with<M: Mapper + 'static>(mut self, mapper: M) -> Self {
        self.mappers.push(Box::new(mapper));
        self
    }

    /// Apply all mappers in sequence
    pub fn apply(&self, input: f64) -> f64 {
        self.mappers.iter().fold(input, |value, mapper| mapper.map(value))
    }

    /// Names of the stages, in order
    pub fn stage_names(&self) -> Vec<&str> {
        self.mappers.iter().map(|m| m.name()).collect()
    }

    /// Check if the pipeline is empty
    pub fn is_empty(&self) -> bool {
        self.mappers.is_empty()
    }
}
