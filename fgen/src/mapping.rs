use crate::*;

/// Affine function `f(x) = slope * x + intercept`.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Affine {
    /// Slope
    pub slope: f64,
    /// Intercept
    pub intercept: f64,
}

impl Affine {
    /// Solve the affine function passing `(x0, v0)` and `(x1, v1)`.
    ///
    /// Return `None` if `x0` and `x1` are not distinguishable.
    pub fn through([x0, x1]: [f64; 2], [v0, v1]: [f64; 2]) -> Option<Self> {
        let dx = x1 - x0;
        let scale = x0.abs().max(x1.abs());
        if !dx.is_finite() || dx.abs() <= 1e-12 * scale {
            return None;
        }
        let slope = (v1 - v0) / dx;
        Some(Self { slope, intercept: v0 - slope * x0 })
    }

    /// Apply the function.
    pub fn map(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Maps of the domain to the input angle `θ2` and the range to the output
/// angle `θ4`.
///
/// Only valid for one pair of start angles.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AngleMapping {
    /// `x -> θ2`
    pub input: Affine,
    /// `y -> θ4`
    pub output: Affine,
}

impl AngleMapping {
    /// Build the maps from start angles `[θ2_start, θ4_start]` and rotation
    /// spans `[θ2_rot, θ4_rot]`.
    ///
    /// `x_min` maps to `θ2_start` and `x_max` to `θ2_start + θ2_rot`;
    /// `f(x_min)` maps to `θ4_start` and `f(x_max)` to `θ4_start + θ4_rot`.
    pub fn new(tar: &FnTarget, [t2, t4]: [f64; 2], [rot2, rot4]: [f64; 2]) -> Result<Self, Reject> {
        let input = Affine::through(tar.x_bound, [t2, t2 + rot2]).ok_or(Reject::Mapping)?;
        let output = Affine::through(tar.y_bound, [t4, t4 + rot4]).ok_or(Reject::Mapping)?;
        Ok(Self { input, output })
    }

    /// Angle pair `[θ2, θ4]` of a point `[x, y]`.
    pub fn angles(&self, [x, y]: [f64; 2]) -> [f64; 2] {
        [self.input.map(x), self.output.map(y)]
    }

    /// Angle pairs `[θ2, θ4]` of the precision points.
    pub fn pairs(&self, pp: &PrecisionPoints) -> [[f64; 2]; 3] {
        let [x1, x2, x3] = pp.x;
        let [y1, y2, y3] = pp.y;
        [[x1, y1], [x2, y2], [x3, y3]].map(|p| self.angles(p))
    }
}
