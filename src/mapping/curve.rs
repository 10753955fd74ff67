//! Response curves between normalized MIDI input and normalized output
//!
//! Every curve works on x in [0, 1] and has an exact inverse so values can
//! travel back from parameter space to MIDI space (controller feedback,
//! motorized faders, LED rings).

use serde::{Deserialize, Serialize};

/// Steepness of the logistic S-curve.
const S_CURVE_STEEPNESS: f64 = 6.0;

/// Bounds applied before inverting the S-curve, avoiding the poles at 0 and 1.
const S_CURVE_INVERSE_MIN: f64 = 0.001;
const S_CURVE_INVERSE_MAX: f64 = 0.999;

/// Response shape applied between normalized input and output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MidiCurve {
    /// f(x) = x
    #[default]
    Linear,
    /// f(x) = x², fine control at the low end (volume faders)
    Exponential,
    /// f(x) = √x, fine control at the high end
    Logarithmic,
    /// Logistic curve centred on 0.5, soft at both ends
    SCurve,
}

impl MidiCurve {
    /// All curves, in declaration order.
    pub const ALL: [MidiCurve; 4] = [
        MidiCurve::Linear,
        MidiCurve::Exponential,
        MidiCurve::Logarithmic,
        MidiCurve::SCurve,
    ];

    /// Apply the curve to a normalized value.
    #[inline]
    pub fn apply(self, x: f64) -> f64 {
        match self {
            MidiCurve::Linear => x,
            MidiCurve::Exponential => x * x,
            MidiCurve::Logarithmic => x.max(0.0).sqrt(),
            MidiCurve::SCurve => 1.0 / (1.0 + (-S_CURVE_STEEPNESS * (x - 0.5)).exp()),
        }
    }

    /// Apply the inverse curve to a normalized value.
    ///
    /// For the S-curve the input is clamped to [0.001, 0.999] first, so the
    /// result stays finite.
    #[inline]
    pub fn inverse(self, x: f64) -> f64 {
        match self {
            MidiCurve::Linear => x,
            MidiCurve::Exponential => x.max(0.0).sqrt(),
            MidiCurve::Logarithmic => x * x,
            MidiCurve::SCurve => {
                let x = x.clamp(S_CURVE_INVERSE_MIN, S_CURVE_INVERSE_MAX);
                (x / (1.0 - x)).ln() / S_CURVE_STEEPNESS + 0.5
            }
        }
    }

    /// Config/CLI name of this curve.
    pub fn name(self) -> &'static str {
        match self {
            MidiCurve::Linear => "linear",
            MidiCurve::Exponential => "exponential",
            MidiCurve::Logarithmic => "logarithmic",
            MidiCurve::SCurve => "s_curve",
        }
    }

    /// Get curve by name
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "linear" | "lin" => Some(Self::Linear),
            "exponential" | "exp" => Some(Self::Exponential),
            "logarithmic" | "log" => Some(Self::Logarithmic),
            "s_curve" | "scurve" | "s" => Some(Self::SCurve),
            _ => None,
        }
    }
}
