use crate::*;
use nalgebra as na;

/// Determinant threshold of a singular Freudenstein system.
pub const SINGULAR_EPS: f64 = 1e-10;

/// Coefficients of Freudenstein's equation.
///
/// ```text
/// K1 cos(θ2) + K2 cos(θ4) + K3 = cos(θ2 - θ4)
/// K1 = r1 / r4
/// K2 = r1 / r2
/// K3 = (r1² + r2² + r4² - r3²) / (2 r2 r4)
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FreudensteinCoef {
    /// `K1`
    pub k1: f64,
    /// `K2`
    pub k2: f64,
    /// `K3`
    pub k3: f64,
}

impl FreudensteinCoef {
    /// Solve the coefficients from three angle pairs `[θ2, θ4]`.
    pub fn solve(pairs: &[[f64; 2]; 3]) -> Result<Self, Reject> {
        let a = na::Matrix3::from_fn(|i, j| {
            let [t2, t4] = pairs[i];
            match j {
                0 => t2.cos(),
                1 => t4.cos(),
                _ => 1.,
            }
        });
        let b = na::Vector3::from_fn(|i, _| {
            let [t2, t4] = pairs[i];
            (t2 - t4).cos()
        });
        let det = a.determinant();
        if det.is_nan() || det.abs() <= SINGULAR_EPS {
            return Err(Reject::Singular);
        }
        let k = a.lu().solve(&b).ok_or(Reject::Singular)?;
        if k.iter().all(|k| k.is_finite()) {
            Ok(Self { k1: k[0], k2: k[1], k3: k[2] })
        } else {
            Err(Reject::Singular)
        }
    }

    /// Residual of the equation at an angle pair.
    pub fn residual(&self, [t2, t4]: [f64; 2]) -> f64 {
        self.k1 * t2.cos() + self.k2 * t4.cos() + self.k3 - (t2 - t4).cos()
    }

    /// Coefficients of a linkage `[r1, r2, r3, r4]`.
    pub fn from_loop([r1, r2, r3, r4]: [f64; 4]) -> Self {
        Self {
            k1: r1 / r4,
            k2: r1 / r2,
            k3: (r1 * r1 + r2 * r2 + r4 * r4 - r3 * r3) / (2. * r2 * r4),
        }
    }
}
