//! Keyframe animation curves
//!
//! A curve is an ordered list of keyframes. Between two keyframes the
//! normalized segment time is remapped by the left keyframe's `CurveType`
//! and then used to blend the two values linearly.

use std::cell::Cell;
use std::f64::consts::TAU;
use serde::{Serialize, Deserialize};
use crate::error::{RenderError, Result};

/// Remap applied to the normalized segment time before blending
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum CurveType {
    Linear,
    /// `t^power`
    Exponential(f64),
    /// `t^(1/power)`
    Root(f64),
    /// `(sin(2*pi*cycles*t) + 1) / 2`
    Sine(f64),
    /// `(cos(2*pi*cycles*t) + 1) / 2`
    Cosine(f64),
    /// Blend factor pinned to 0: the segment holds its starting value
    Hold,
}

impl CurveType {
    /// Parameters must be finite; powers must be non-negative, and `Root` needs a
    /// non-zero power. Anything else can evaluate to NaN or infinity at t = 0.
    fn validate(self) -> std::result::Result<(), String> {
        let (name, param) = match self {
            CurveType::Linear | CurveType::Hold => return Ok(()),
            CurveType::Exponential(p) => ("Exponential", p),
            CurveType::Root(p) => ("Root", p),
            CurveType::Sine(c) => ("Sine", c),
            CurveType::Cosine(c) => ("Cosine", c),
        };
        if !param.is_finite() {
            return Err(format!("{} parameter must be finite, got {}", name, param));
        }
        match self {
            CurveType::Exponential(p) if p < 0.0 => Err(format!("Exponential power must be >= 0, got {}", p)),
            CurveType::Root(p) if p <= 0.0 => Err(format!("Root power must be > 0, got {}", p)),
            _ => Ok(()),
        }
    }

    /// Remap a normalized segment time in [0, 1]
    pub fn apply(self, t: f64) -> f64 {
        match self {
            CurveType::Linear => t,
            CurveType::Exponential(power) => t.powf(power),
            CurveType::Root(power) => t.powf(1.0 / power),
            CurveType::Sine(cycles) => ((TAU * cycles * t).sin() + 1.0) / 2.0,
            CurveType::Cosine(cycles) => ((TAU * cycles * t).cos() + 1.0) / 2.0,
            CurveType::Hold => 0.0,
        }
    }
}

/// One control point of a curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    pub value: f64,
    pub time: f64,
    /// Shape of the segment that starts at this keyframe
    pub curve: CurveType,
}

impl Keyframe {
    pub fn new(value: f64, time: f64, curve: CurveType) -> Self {
        Self { value, time, curve }
    }

    pub fn linear(value: f64, time: f64) -> Self {
        Self::new(value, time, CurveType::Linear)
    }
}

/// Piecewise keyframe curve.
///
/// Evaluation keeps a scan cursor on the last segment used, so a sequence of
/// non-decreasing query times costs O(1) amortized per query. A query earlier
/// than the cursor rewinds it and rescans from the start.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "Vec<Keyframe>", into = "Vec<Keyframe>")]
pub struct Curve {
    keyframes: Vec<Keyframe>,
    cursor: Cell<usize>,
}

impl Curve {
    /// Build a curve from keyframes sorted by time.
    ///
    /// Fails on an empty list, non-finite entries, decreasing times, or a
    /// segment shape whose parameter can produce NaN (see `CurveType::validate`).
    pub fn new(keyframes: Vec<Keyframe>) -> Result<Self> {
        if keyframes.is_empty() {
            return Err(RenderError::InvalidCurve("curve has no keyframes".to_string()));
        }

        for (i, key) in keyframes.iter().enumerate() {
            if !key.value.is_finite() || !key.time.is_finite() {
                return Err(RenderError::InvalidCurve(format!(
                    "keyframe {} is not finite (value {}, time {})",
                    i, key.value, key.time
                )));
            }
            if let Err(msg) = key.curve.validate() {
                return Err(RenderError::InvalidCurve(format!("keyframe {}: {}", i, msg)));
            }
        }

        if let Some(i) = keyframes.windows(2).position(|w| w[1].time < w[0].time) {
            return Err(RenderError::InvalidCurve(format!(
                "keyframe {} at time {} comes before keyframe {} at time {}",
                i + 1,
                keyframes[i + 1].time,
                i,
                keyframes[i].time
            )));
        }

        Ok(Self {
            keyframes,
            cursor: Cell::new(0),
        })
    }

    /// A curve that always evaluates to `value`
    pub fn constant(value: f64) -> Self {
        Self {
            keyframes: vec![Keyframe::linear(value, 0.0)],
            cursor: Cell::new(0),
        }
    }

    /// Linear curve through `(value, time)` pairs
    pub fn linear(points: &[(f64, f64)]) -> Result<Self> {
        Self::new(points.iter().map(|&(v, t)| Keyframe::linear(v, t)).collect())
    }

    pub fn keyframes(&self) -> &[Keyframe] {
        &self.keyframes
    }

    pub fn start_time(&self) -> f64 {
        self.keyframes[0].time
    }

    pub fn end_time(&self) -> f64 {
        self.keyframes[self.keyframes.len() - 1].time
    }

    /// Rewind the scan cursor to the first segment
    pub fn reset(&self) {
        self.cursor.set(0);
    }

    /// Evaluate the curve at `time`.
    ///
    /// Times at or before the first keyframe give the first value; times at or
    /// after the last keyframe give the last value.
    pub fn interpolate(&self, time: f64) -> f64 {
        let keys = &self.keyframes;
        let first = &keys[0];

        if time.is_nan() || time <= first.time {
            self.cursor.set(0);
            return first.value;
        }

        let mut i = self.cursor.get();
        if i >= keys.len() || time < keys[i].time {
            i = 0;
        }
        while i + 1 < keys.len() && keys[i + 1].time <= time {
            i += 1;
        }
        self.cursor.set(i);

        if i + 1 == keys.len() {
            return keys[i].value;
        }

        let (from, to) = (&keys[i], &keys[i + 1]);
        let span = to.time - from.time;
        // Duplicate times are stepped over by the scan above
        if span <= 0.0 {
            return to.value;
        }

        let t = from.curve.apply((time - from.time) / span);
        (1.0 - t) * from.value + t * to.value
    }
}

impl PartialEq for Curve {
    fn eq(&self, other: &Self) -> bool {
        self.keyframes == other.keyframes
    }
}

impl TryFrom<Vec<Keyframe>> for Curve {
    type Error = RenderError;

    fn try_from(keyframes: Vec<Keyframe>) -> Result<Self> {
        Curve::new(keyframes)
    }
}

impl From<Curve> for Vec<Keyframe> {
    fn from(curve: Curve) -> Self {
        curve.keyframes
    }
}
