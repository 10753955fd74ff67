//! Conversion between MIDI integer space and parameter space
//!
//! All functions here are pure and allocation-free. The normalization step is
//! shared with the engine hot path, so a value read from a message and a value
//! computed through the transform API always agree.
//!
//! Pipeline for MIDI -> parameter:
//!   raw value -> normalize to [0, 1] -> response curve -> scale to [min, max]
//!
//! Pitch bend is bipolar around 8192: (raw - 8192) / 8192 gives [-1, 1],
//! which is folded onto [0, 1] as (n + 1) / 2 before the curve. The bend
//! centre therefore lands on the middle of the parameter range.

use super::{MidiCurve, MidiParameterMapping};
use crate::error::{Result, ValidationError};
use crate::midi::{MidiMessageType, PITCH_BEND_CENTER, PITCH_BEND_MAX};

/// Bipolar pitch bend position in [-1, 1) for a 14-bit value.
#[inline]
pub fn pitch_bend_bipolar(raw: u16) -> f64 {
    let raw = raw.min(PITCH_BEND_MAX) as f64;
    let center = PITCH_BEND_CENTER as f64;
    (raw - center) / center
}

/// Normalize a raw MIDI value of the given type to [0, 1].
#[inline]
pub fn normalize_midi_value(raw: u16, midi_type: MidiMessageType) -> f64 {
    match midi_type {
        MidiMessageType::PitchBend => (pitch_bend_bipolar(raw) + 1.0) * 0.5,
        _ => raw.min(127) as f64 / 127.0,
    }
}

/// Map a normalized value in [0, 1] back to the native integer range of the type.
#[inline]
pub fn denormalize_midi_value(normalized: f64, midi_type: MidiMessageType) -> u16 {
    let normalized = if normalized.is_nan() {
        0.0
    } else {
        normalized.clamp(0.0, 1.0)
    };
    match midi_type {
        MidiMessageType::PitchBend => {
            let bipolar = normalized * 2.0 - 1.0;
            let center = PITCH_BEND_CENTER as f64;
            (bipolar * center + center)
                .round()
                .clamp(0.0, PITCH_BEND_MAX as f64) as u16
        }
        _ => (normalized * 127.0).round().clamp(0.0, 127.0) as u16,
    }
}

/// Normalize a parameter value against the mapping bounds.
///
/// Returns 0.0 when min == max; a degenerate range is not an error.
#[inline]
pub fn normalize_parameter_value(value: f64, mapping: &MidiParameterMapping) -> f64 {
    let range = mapping.max_value - mapping.min_value;
    if range == 0.0 {
        return 0.0;
    }
    (value - mapping.min_value) / range
}

/// Convert a raw MIDI value to a parameter value.
#[inline]
pub fn midi_to_parameter(
    midi_value: u16,
    mapping: &MidiParameterMapping,
    midi_type: MidiMessageType,
) -> f64 {
    let normalized = normalize_midi_value(midi_value, midi_type);
    let shaped = mapping.curve.apply(normalized);
    mapping.min_value + shaped * (mapping.max_value - mapping.min_value)
}

/// Convert a parameter value back to a raw MIDI value. Inverse of [`midi_to_parameter`].
pub fn parameter_to_midi(
    parameter_value: f64,
    mapping: &MidiParameterMapping,
    midi_type: MidiMessageType,
) -> u16 {
    let normalized = normalize_parameter_value(parameter_value, mapping);
    let normalized = if normalized.is_nan() {
        0.0
    } else {
        normalized.clamp(0.0, 1.0)
    };
    denormalize_midi_value(mapping.curve.inverse(normalized), midi_type)
}

/// Clamp a value into the mapping's range. NaN clamps to the lower bound.
pub fn clamp_parameter_value(value: f64, mapping: &MidiParameterMapping) -> f64 {
    let (lo, hi) = mapping.bounds();
    if value.is_nan() {
        return lo;
    }
    value.clamp(lo, hi)
}

/// Whether a value is finite and inside the mapping's range.
pub fn is_valid_parameter_value(value: f64, mapping: &MidiParameterMapping) -> bool {
    let (lo, hi) = mapping.bounds();
    value.is_finite() && value >= lo && value <= hi
}

/// Parameter change per MIDI unit.
pub fn calculate_mapping_sensitivity(mapping: &MidiParameterMapping) -> f64 {
    (mapping.max_value - mapping.min_value) / mapping.midi_type.native_range() as f64
}

/// Replace the bounds of a mapping.
///
/// Requires `new_min <= new_max`. An explicitly inverted mapping stays
/// inverted: its bounds are stored swapped.
pub fn scale_mapping(
    mapping: &MidiParameterMapping,
    new_min: f64,
    new_max: f64,
) -> Result<MidiParameterMapping> {
    if !new_min.is_finite() || !new_max.is_finite() {
        return Err(ValidationError::NonFiniteBounds {
            min: new_min,
            max: new_max,
        }
        .into());
    }
    if new_min > new_max {
        return Err(ValidationError::InvalidRange {
            min: new_min,
            max: new_max,
        }
        .into());
    }

    let mut scaled = mapping.clone();
    if mapping.inverted {
        scaled.min_value = new_max;
        scaled.max_value = new_min;
    } else {
        scaled.min_value = new_min;
        scaled.max_value = new_max;
    }
    Ok(scaled)
}

/// Swap the bounds, reversing the response direction. The curve is kept.
pub fn invert_mapping(mapping: &MidiParameterMapping) -> MidiParameterMapping {
    let mut inverted = mapping.clone();
    inverted.min_value = mapping.max_value;
    inverted.max_value = mapping.min_value;
    inverted.inverted = !mapping.inverted;
    inverted
}

/// Same mapping with a different response curve.
pub fn change_mapping_curve(mapping: &MidiParameterMapping, curve: MidiCurve) -> MidiParameterMapping {
    let mut changed = mapping.clone();
    changed.curve = curve;
    changed
}

/// Blend two mappings of the same MIDI source.
///
/// Bounds are interpolated linearly. Curve and target are not blended: they
/// come from `a` when `blend < 0.5`, otherwise from `b`.
pub fn interpolate_mappings(
    a: &MidiParameterMapping,
    b: &MidiParameterMapping,
    blend: f64,
) -> Result<MidiParameterMapping> {
    if !a.shares_source(b) {
        return Err(ValidationError::SourceMismatch.into());
    }
    let blend = if blend.is_nan() { 0.0 } else { blend.clamp(0.0, 1.0) };
    let lerp = |from: f64, to: f64| from + (to - from) * blend;

    let dominant = if blend < 0.5 { a } else { b };
    let mut blended = dominant.clone();
    blended.min_value = lerp(a.min_value, b.min_value);
    blended.max_value = lerp(a.max_value, b.max_value);
    blended.inverted = blended.min_value > blended.max_value;
    Ok(blended)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MappingError;
    use crate::mapping::TargetType;
    use approx::assert_abs_diff_eq;

    const PROBES: [u16; 5] = [0, 32, 64, 96, 127];

    fn cc(min: f64, max: f64, curve: MidiCurve) -> MidiParameterMapping {
        MidiParameterMapping::control_change(0, 7, TargetType::PadVolume, "pad0")
            .with_range(min, max)
            .with_curve(curve)
    }

    #[test]
    fn test_round_trip_within_one_unit() {
        let ranges = [(0.0, 1.0), (-1.0, 1.0), (20.0, 300.0), (-60.0, 6.0)];
        for curve in MidiCurve::ALL {
            for &(min, max) in &ranges {
                let mapping = cc(min, max, curve);
                for &midi in &PROBES {
                    let value = midi_to_parameter(midi, &mapping, MidiMessageType::ControlChange);
                    let back = parameter_to_midi(value, &mapping, MidiMessageType::ControlChange);
                    assert!(
                        (back as i32 - midi as i32).abs() <= 1,
                        "{:?} [{}, {}]: {} -> {} -> {}",
                        curve, min, max, midi, value, back
                    );
                }
            }
        }
    }

    #[test]
    fn test_monotonic_for_every_curve() {
        for curve in MidiCurve::ALL {
            let mapping = cc(-10.0, 10.0, curve);
            let mut previous = f64::NEG_INFINITY;
            for midi in 0..=127u16 {
                let value = midi_to_parameter(midi, &mapping, MidiMessageType::ControlChange);
                assert!(value >= previous, "{:?} decreased at {}", curve, midi);
                previous = value;
            }
        }
    }

    #[test]
    fn test_pitch_bend_round_trip_and_monotonic() {
        let probes = [0u16, 1, 4096, 8191, 8192, 8193, 12288, 16382, 16383];
        for curve in MidiCurve::ALL {
            for &(min, max) in &[(-1.0, 1.0), (-12.0, 12.0), (0.0, 2.0)] {
                let mapping = MidiParameterMapping::new(
                    MidiMessageType::PitchBend,
                    0,
                    0,
                    TargetType::PadPitch,
                    "pad0",
                )
                .with_range(min, max)
                .with_curve(curve);

                for &raw in &probes {
                    let value = midi_to_parameter(raw, &mapping, MidiMessageType::PitchBend);
                    let back = parameter_to_midi(value, &mapping, MidiMessageType::PitchBend);
                    assert!(
                        (back as i32 - raw as i32).abs() <= 1,
                        "{:?} [{}, {}]: {} -> {} -> {}",
                        curve, min, max, raw, value, back
                    );
                }

                let mut previous = f64::NEG_INFINITY;
                for raw in 0..=PITCH_BEND_MAX {
                    let value = midi_to_parameter(raw, &mapping, MidiMessageType::PitchBend);
                    assert!(value >= previous, "{:?} decreased at {}", curve, raw);
                    previous = value;
                }
            }
        }
    }

    #[test]
    fn test_linear_midpoint() {
        let mapping = cc(10.0, 20.0, MidiCurve::Linear);
        let value = midi_to_parameter(64, &mapping, MidiMessageType::ControlChange);
        assert_abs_diff_eq!(value, 10.0 + (64.0 / 127.0) * 10.0, epsilon = 1e-12);
        assert_abs_diff_eq!(value, 15.04, epsilon = 0.01);
    }

    #[test]
    fn test_exponential_volume() {
        let mapping = cc(0.0, 1.0, MidiCurve::Exponential);
        let value = midi_to_parameter(64, &mapping, MidiMessageType::ControlChange);
        assert_abs_diff_eq!(value, 0.254, epsilon = 0.001);
    }

    #[test]
    fn test_pitch_bend_center_is_no_bend() {
        let mapping = MidiParameterMapping::new(
            MidiMessageType::PitchBend,
            0,
            0,
            TargetType::PadPitch,
            "pad0",
        )
        .with_range(-1.0, 1.0);

        assert_abs_diff_eq!(
            midi_to_parameter(8192, &mapping, MidiMessageType::PitchBend),
            0.0,
            epsilon = 1e-12
        );
        assert_abs_diff_eq!(
            midi_to_parameter(0, &mapping, MidiMessageType::PitchBend),
            -1.0,
            epsilon = 1e-12
        );
        assert_eq!(parameter_to_midi(0.0, &mapping, MidiMessageType::PitchBend), 8192);
        assert_eq!(parameter_to_midi(1.0, &mapping, MidiMessageType::PitchBend), 16383);
        assert_eq!(parameter_to_midi(-1.0, &mapping, MidiMessageType::PitchBend), 0);
    }

    #[test]
    fn test_degenerate_range_normalizes_to_zero() {
        let mapping = cc(0.5, 0.5, MidiCurve::Linear);
        assert_eq!(normalize_parameter_value(0.9, &mapping), 0.0);
        assert_eq!(parameter_to_midi(0.9, &mapping, MidiMessageType::ControlChange), 0);
        assert_eq!(midi_to_parameter(100, &mapping, MidiMessageType::ControlChange), 0.5);
    }

    #[test]
    fn test_parameter_to_midi_clamps_out_of_range() {
        let mapping = cc(0.0, 1.0, MidiCurve::Linear);
        assert_eq!(parameter_to_midi(5.0, &mapping, MidiMessageType::ControlChange), 127);
        assert_eq!(parameter_to_midi(-5.0, &mapping, MidiMessageType::ControlChange), 0);
        assert_eq!(parameter_to_midi(f64::NAN, &mapping, MidiMessageType::ControlChange), 0);
    }

    #[test]
    fn test_clamp_parameter_value() {
        let mapping = cc(-2.0, 3.0, MidiCurve::Linear);
        assert_eq!(clamp_parameter_value(1e6, &mapping), 3.0);
        assert_eq!(clamp_parameter_value(-1e6, &mapping), -2.0);
        assert_eq!(clamp_parameter_value(0.5, &mapping), 0.5);
        assert_eq!(clamp_parameter_value(f64::NAN, &mapping), -2.0);

        let inverted = invert_mapping(&mapping);
        assert_eq!(clamp_parameter_value(1e6, &inverted), 3.0);
        assert_eq!(clamp_parameter_value(-1e6, &inverted), -2.0);
    }

    #[test]
    fn test_is_valid_parameter_value() {
        let mapping = cc(0.0, 1.0, MidiCurve::Linear);
        assert!(is_valid_parameter_value(0.5, &mapping));
        assert!(is_valid_parameter_value(1.0, &mapping));
        assert!(!is_valid_parameter_value(1.01, &mapping));
        assert!(!is_valid_parameter_value(f64::NAN, &mapping));
    }

    #[test]
    fn test_sensitivity() {
        let mapping = cc(0.0, 127.0, MidiCurve::Linear);
        assert_abs_diff_eq!(calculate_mapping_sensitivity(&mapping), 1.0, epsilon = 1e-12);

        let mut bend = cc(0.0, 16383.0, MidiCurve::Linear);
        bend.midi_type = MidiMessageType::PitchBend;
        assert_abs_diff_eq!(calculate_mapping_sensitivity(&bend), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_invert_mapping_reverses_response() {
        let mapping = cc(0.0, 1.0, MidiCurve::Exponential);
        let inverted = invert_mapping(&mapping);

        assert!(inverted.inverted);
        assert_eq!(inverted.curve, MidiCurve::Exponential);
        assert!(inverted.validate().is_ok());
        assert_abs_diff_eq!(
            midi_to_parameter(0, &inverted, MidiMessageType::ControlChange),
            1.0,
            epsilon = 1e-12
        );
        assert_abs_diff_eq!(
            midi_to_parameter(127, &inverted, MidiMessageType::ControlChange),
            0.0,
            epsilon = 1e-12
        );

        // Round trip still holds through an inverted range
        for &midi in &PROBES {
            let value = midi_to_parameter(midi, &inverted, MidiMessageType::ControlChange);
            let back = parameter_to_midi(value, &inverted, MidiMessageType::ControlChange);
            assert!((back as i32 - midi as i32).abs() <= 1);
        }

        assert_eq!(invert_mapping(&inverted), mapping);
    }

    #[test]
    fn test_scale_mapping() {
        let mapping = cc(0.0, 1.0, MidiCurve::Linear);
        let scaled = scale_mapping(&mapping, 60.0, 180.0).unwrap();
        assert_eq!((scaled.min_value, scaled.max_value), (60.0, 180.0));

        let err = scale_mapping(&mapping, 2.0, 1.0).unwrap_err();
        assert!(matches!(err, MappingError::Validation(ValidationError::InvalidRange { .. })));
    }

    #[test]
    fn test_scale_keeps_inversion() {
        let inverted = invert_mapping(&cc(0.0, 1.0, MidiCurve::Linear));
        let scaled = scale_mapping(&inverted, 10.0, 20.0).unwrap();
        assert_eq!((scaled.min_value, scaled.max_value), (20.0, 10.0));
        assert!(scaled.validate().is_ok());
    }

    #[test]
    fn test_change_mapping_curve() {
        let mapping = cc(0.0, 1.0, MidiCurve::Linear);
        let changed = change_mapping_curve(&mapping, MidiCurve::SCurve);
        assert_eq!(changed.curve, MidiCurve::SCurve);
        assert_eq!(changed.target_id, mapping.target_id);
    }

    #[test]
    fn test_interpolate_mappings() {
        let a = cc(0.0, 1.0, MidiCurve::Linear);
        let mut b = cc(10.0, 20.0, MidiCurve::Exponential);
        b.target_id = "pad1".to_string();

        let quarter = interpolate_mappings(&a, &b, 0.25).unwrap();
        assert_abs_diff_eq!(quarter.min_value, 2.5, epsilon = 1e-12);
        assert_abs_diff_eq!(quarter.max_value, 5.75, epsilon = 1e-12);
        assert_eq!(quarter.curve, MidiCurve::Linear);
        assert_eq!(quarter.target_id, "pad0");

        let half = interpolate_mappings(&a, &b, 0.5).unwrap();
        assert_eq!(half.curve, MidiCurve::Exponential);
        assert_eq!(half.target_id, "pad1");
    }

    #[test]
    fn test_interpolate_requires_shared_source() {
        let a = cc(0.0, 1.0, MidiCurve::Linear);
        let mut b = a.clone();
        b.midi_controller = 8;
        let err = interpolate_mappings(&a, &b, 0.5).unwrap_err();
        assert_eq!(err, MappingError::Validation(ValidationError::SourceMismatch));
    }
}
