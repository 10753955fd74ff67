//! Mapping system for transforming MIDI values to sound parameters
//!
//! Holds the mapping data model (parameter mappings and profiles), the
//! response curves and the pure transform functions between MIDI space and
//! parameter space.

mod bidirectional;
mod curve;
mod mapper;
mod parameter;
mod profile;
mod quantize;
pub mod transform;

pub use bidirectional::{create_bidirectional_mapping, BidirectionalMapping, CONSISTENCY_PROBES};
pub use curve::MidiCurve;
pub use mapper::{ForwardTransform, InverseTransform, Mapper, MappingPipeline};
pub use parameter::{MidiParameterMapping, MidiSource, TargetType};
pub use profile::MidiMapping;
pub use quantize::{quantize_parameter_value, QuantizeMapper};
pub use transform::{
    calculate_mapping_sensitivity, change_mapping_curve, clamp_parameter_value,
    interpolate_mappings, invert_mapping, is_valid_parameter_value, midi_to_parameter,
    parameter_to_midi, scale_mapping,
};
