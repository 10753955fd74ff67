//! Quantization of continuous parameter values to discrete steps

use super::Mapper;
use crate::error::{Result, ValidationError};

/// Snap `value` to the nearest of `steps` evenly spaced points in [min, max].
///
/// With one step the only point is `min`. Values outside the range are
/// clamped first. Fails for `steps == 0`, `min > max` or non-finite bounds.
pub fn quantize_parameter_value(value: f64, min: f64, max: f64, steps: usize) -> Result<f64> {
    check_quantize_args(min, max, steps)?;
    Ok(snap(value, min, max, steps))
}

fn check_quantize_args(min: f64, max: f64, steps: usize) -> Result<()> {
    if steps == 0 {
        return Err(ValidationError::InvalidQuantizationSteps(steps).into());
    }
    if !min.is_finite() || !max.is_finite() {
        return Err(ValidationError::NonFiniteBounds { min, max }.into());
    }
    if min > max {
        return Err(ValidationError::InvalidRange { min, max }.into());
    }
    Ok(())
}

#[inline]
fn snap(value: f64, min: f64, max: f64, steps: usize) -> f64 {
    if steps == 1 || max == min {
        return min;
    }
    let value = if value.is_nan() { min } else { value.clamp(min, max) };
    let step = (max - min) / (steps - 1) as f64;
    let index = ((value - min) / step).round();
    (min + index * step).min(max)
}

/// A mapper that snaps its input to a fixed number of levels
///
/// Useful at the end of a pipeline to turn a continuous controller into a
/// stepped one (tempo in whole BPM ranges, pan in detents).
#[derive(Debug, Clone)]
pub struct QuantizeMapper {
    name: String,
    min: f64,
    max: f64,
    steps: usize,
}

impl QuantizeMapper {
    /// Create a new quantize mapper. Arguments are checked once here.
    pub fn new(name: impl Into<String>, min: f64, max: f64, steps: usize) -> Result<Self> {
        check_quantize_args(min, max, steps)?;
        Ok(Self {
            name: name.into(),
            min,
            max,
            steps,
        })
    }

    /// Number of output levels
    pub fn steps(&self) -> usize {
        self.steps
    }
}

impl Mapper for QuantizeMapper {
    fn name(&self) -> &str {
        &self.name
    }

    fn map(&self, input: f64) -> f64 {
        snap(input, self.min, self.max, self.steps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MappingError;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_quantize_to_nearest_step() {
        // Points: 0, 0.25, 0.5, 0.75, 1.0
        let result = quantize_parameter_value(0.37, 0.0, 1.0, 5).unwrap();
        assert_abs_diff_eq!(result, 0.25, epsilon = 1e-12);

        let result = quantize_parameter_value(0.38, 0.0, 1.0, 5).unwrap();
        assert_abs_diff_eq!(result, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_quantize_endpoints_and_clamping() {
        assert_eq!(quantize_parameter_value(-3.0, 0.0, 1.0, 5).unwrap(), 0.0);
        assert_eq!(quantize_parameter_value(3.0, 0.0, 1.0, 5).unwrap(), 1.0);
        assert_eq!(quantize_parameter_value(1.0, 0.0, 1.0, 3).unwrap(), 1.0);
    }

    #[test]
    fn test_quantize_single_step_is_min() {
        assert_eq!(quantize_parameter_value(0.9, 0.2, 1.0, 1).unwrap(), 0.2);
    }

    #[test]
    fn test_quantize_degenerate_range() {
        assert_eq!(quantize_parameter_value(0.9, 0.5, 0.5, 4).unwrap(), 0.5);
    }

    #[test]
    fn test_quantize_rejects_zero_steps() {
        let err = quantize_parameter_value(0.5, 0.0, 1.0, 0).unwrap_err();
        assert_eq!(
            err,
            MappingError::Validation(ValidationError::InvalidQuantizationSteps(0))
        );
    }

    #[test]
    fn test_quantize_rejects_reversed_bounds() {
        assert!(quantize_parameter_value(0.5, 1.0, 0.0, 4).is_err());
    }

    #[test]
    fn test_quantize_mapper() {
        // Tempo in 10 BPM detents between 60 and 180
        let mapper = QuantizeMapper::new("tempo", 60.0, 180.0, 13).unwrap();
        assert_eq!(mapper.name(), "tempo");
        assert_eq!(mapper.steps(), 13);
        assert_abs_diff_eq!(mapper.map(123.0), 120.0, epsilon = 1e-9);
        assert_abs_diff_eq!(mapper.map(126.0), 130.0, epsilon = 1e-9);
        assert!(QuantizeMapper::new("bad", 0.0, 1.0, 0).is_err());
    }
}
