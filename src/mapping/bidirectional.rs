//! Paired forward/inverse transforms with a round-trip self-check

use super::{ForwardTransform, InverseTransform, Mapper, MidiParameterMapping};

/// MIDI values probed by [`BidirectionalMapping::validate_consistency`].
pub const CONSISTENCY_PROBES: [u16; 5] = [0, 32, 64, 96, 127];

/// Forward and inverse transforms built from the same mapping.
#[derive(Debug, Clone)]
pub struct BidirectionalMapping {
    pub forward: ForwardTransform,
    pub inverse: InverseTransform,
}

/// Build the forward/inverse pair for a mapping.
pub fn create_bidirectional_mapping(mapping: &MidiParameterMapping) -> BidirectionalMapping {
    BidirectionalMapping {
        forward: ForwardTransform::new(mapping.clone()),
        inverse: InverseTransform::new(mapping.clone()),
    }
}

impl BidirectionalMapping {
    /// Round-trip each probe MIDI -> parameter -> MIDI.
    ///
    /// Passes when every probe comes back within `tolerance * 127` units.
    /// Probes are 7-bit values; for pitch bend they address the low end of
    /// the 14-bit range.
    pub fn validate_consistency(&self, tolerance: f64) -> bool {
        let allowed = tolerance * 127.0;
        CONSISTENCY_PROBES.iter().all(|&probe| {
            let parameter = self.forward.map(probe as f64);
            let back = self.inverse.map(parameter);
            (probe as f64 - back).abs() <= allowed
        })
    }

    /// Largest round-trip deviation over the probe set, in MIDI units.
    pub fn max_round_trip_error(&self) -> f64 {
        CONSISTENCY_PROBES
            .iter()
            .map(|&probe| {
                let back = self.inverse.map(self.forward.map(probe as f64));
                (probe as f64 - back).abs()
            })
            .fold(0.0, f64::max)
    }
}
