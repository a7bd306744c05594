use crate::*;
use std::f64::consts::PI;

/// Chebyshev spacing of three precision points in `[x_min, x_max]`.
///
/// The points are returned in solving order, `x1 > x2 > x3`.
///
/// ```
/// let [x1, x2, x3] = fgen::chebyshev(1., 2.);
/// assert!(x1 > x2 && x2 > x3);
/// assert_eq!(x2, 1.5);
/// ```
pub fn chebyshev(x_min: f64, x_max: f64) -> [f64; 3] {
    let mid = 0.5 * (x_max + x_min);
    let half = 0.5 * (x_max - x_min);
    [3., 2., 1.].map(|j: f64| mid - half * ((2. * j - 1.) * PI / 6.).cos())
}

/// Three precision points and their function values.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct PrecisionPoints {
    /// Input values, `x1 > x2 > x3`
    pub x: [f64; 3],
    /// Function values
    pub y: [f64; 3],
}

impl PrecisionPoints {
    /// Sample the function at the Chebyshev points of the domain.
    pub fn sample<F>(func: &F, [x_min, x_max]: [f64; 2]) -> Result<Self, SynError>
    where
        F: TargetFn + ?Sized,
    {
        let x = chebyshev(x_min, x_max);
        let y = eval3(func, x)?;
        Ok(Self { x, y })
    }

    /// Iterate over the `(x, y)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = [f64; 2]> + '_ {
        self.x.iter().zip(&self.y).map(|(&x, &y)| [x, y])
    }
}

/// Sampled target data of the function generation.
///
/// Computed once per task, independent of the link start angles.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct FnTarget {
    /// Precision points
    pub pp: PrecisionPoints,
    /// Domain `[x_min, x_max]`
    pub x_bound: [f64; 2],
    /// Function values at the domain ends, `[f(x_min), f(x_max)]`
    pub y_bound: [f64; 2],
}

impl FnTarget {
    /// Sample the target function in the domain.
    ///
    /// The domain is assumed valid, see [`LinkageSpec::new()`].
    pub fn new<F>(func: &F, x_bound: [f64; 2]) -> Result<Self, SynError>
    where
        F: TargetFn + ?Sized,
    {
        let pp = PrecisionPoints::sample(func, x_bound)?;
        let [y_min, y_max] = eval2(func, x_bound)?;
        Ok(Self { pp, x_bound, y_bound: [y_min, y_max] })
    }
}

fn eval_at<F: TargetFn + ?Sized>(func: &F, x: f64) -> Result<f64, SynError> {
    func.eval(x).map_err(|source| SynError::Eval { x, source })
}

fn eval2<F: TargetFn + ?Sized>(func: &F, [a, b]: [f64; 2]) -> Result<[f64; 2], SynError> {
    Ok([eval_at(func, a)?, eval_at(func, b)?])
}

fn eval3<F: TargetFn + ?Sized>(func: &F, [a, b, c]: [f64; 3]) -> Result<[f64; 3], SynError> {
    Ok([eval_at(func, a)?, eval_at(func, b)?, eval_at(func, c)?])
}
