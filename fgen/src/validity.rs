//! Validity filter of the synthesized linkages.
use crate::*;

/// Validity options.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Filter {
    /// Enforce Grashof's inequality
    pub grashof: bool,
    /// Enforce the loop closure at the start position
    pub closure: bool,
}

impl Default for Filter {
    fn default() -> Self {
        Self::new()
    }
}

impl Filter {
    /// Default options, only the closure check is enabled.
    pub const fn new() -> Self {
        Self { grashof: false, closure: true }
    }

    /// Check the linkage at input start angle `t2`.
    ///
    /// The checks run in order and stop at the first failure:
    /// positive lengths, Grashof's inequality, start closure.
    pub fn check(&self, fb: &FourBar, t2: f64) -> Result<(), Reject> {
        check_positive(fb)?;
        if self.grashof {
            check_grashof(fb)?;
        }
        if self.closure {
            check_closure(fb, t2)?;
        }
        Ok(())
    }
}

/// All link lengths are positive numbers.
pub fn check_positive(fb: &FourBar) -> Result<(), Reject> {
    if fb.planar_loop().iter().all(|l| l.is_finite() && *l > 0.) {
        Ok(())
    } else {
        Err(Reject::NonPositive)
    }
}

/// Sorted lengths `s <= p <= q <= l` satisfy `s + l < p + q`.
pub fn check_grashof(fb: &FourBar) -> Result<(), Reject> {
    let [s, p, q, l] = crate::fb::sorted(fb.planar_loop());
    if s + l < p + q {
        Ok(())
    } else {
        Err(Reject::NonGrashof)
    }
}

/// The follower link reaches the coupler at input angle `t2`,
/// `BD + r4 > r3`.
pub fn check_closure(fb: &FourBar, t2: f64) -> Result<(), Reject> {
    if fb.diagonal(t2) + fb.l4 > fb.l3 {
        Ok(())
    } else {
        Err(Reject::NotClosed)
    }
}
