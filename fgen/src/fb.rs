//! Planar four-bar linkage of the function generator.
use crate::*;

/// Coefficient threshold of a vanishing `K1` or `K2`.
pub const COEF_EPS: f64 = 1e-12;

/// Motion class of the linkage, named by which links revolve.
///
/// A leading `G` marks a Grashof linkage. The other letters describe the
/// input link, the coupler and the output link: `C` turns a full rotation
/// and `R` oscillates.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
#[allow(clippy::upper_case_acronyms)]
pub enum FourBarTy {
    /// Both side links revolve, the ground link is the shortest
    GCCC,
    /// The input link revolves, the output link oscillates
    GCRR,
    /// Only the coupler revolves
    GRCR,
    /// The output link revolves, the input link oscillates
    GRRC,
    /// No link revolves, the ground link is the longest
    RRR1,
    /// No link revolves, the input link is the longest
    RRR2,
    /// No link revolves, the coupler is the longest
    RRR3,
    /// No link revolves, the output link is the longest
    RRR4,
    /// The loop cannot be assembled
    Invalid,
}

impl FourBarTy {
    /// Classify the loop `[r1, r2, r3, r4]`.
    ///
    /// The shortest link decides the Grashof classes and the longest link
    /// decides the triple rocker classes. Ties pick the lowest link index.
    pub fn from_loop(fb_loop: [f64; 4]) -> Self {
        if fb_loop.iter().any(|l| !(l.is_finite() && *l > 0.)) {
            return Self::Invalid;
        }
        let [s, p, q, l] = sorted(fb_loop);
        if l >= s + p + q {
            return Self::Invalid;
        }
        let pos = |v: f64| fb_loop.iter().position(|&d| d == v).unwrap_or_default();
        if s + l < p + q {
            [Self::GCCC, Self::GCRR, Self::GRCR, Self::GRRC][pos(s)]
        } else {
            [Self::RRR1, Self::RRR2, Self::RRR3, Self::RRR4][pos(l)]
        }
    }

    /// Readable description of the class.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::GCCC => "drag link, input and output revolve",
            Self::GCRR => "crank rocker, input revolves",
            Self::GRCR => "double rocker, coupler revolves",
            Self::GRRC => "rocker crank, output revolves",
            Self::RRR1 => "triple rocker, longest ground",
            Self::RRR2 => "triple rocker, longest input",
            Self::RRR3 => "triple rocker, longest coupler",
            Self::RRR4 => "triple rocker, longest output",
            Self::Invalid => "unassemblable loop",
        }
    }

    /// Return true if the loop can be assembled.
    pub const fn is_valid(&self) -> bool {
        !matches!(self, Self::Invalid)
    }

    /// Return true if some link makes a full rotation (`s + l < p + q`).
    pub const fn is_grashof(&self) -> bool {
        matches!(self, Self::GCCC | Self::GCRR | Self::GRCR | Self::GRRC)
    }
}

impl std::fmt::Display for FourBarTy {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

pub(crate) fn sorted(mut fb_loop: [f64; 4]) -> [f64; 4] {
    fb_loop.sort_unstable_by(f64::total_cmp);
    fb_loop
}

/// Four-bar linkage with the ground link as the length unit.
///
/// # Parameters
///
/// + Ground link `l1` (`r1`, fixed to 1 by synthesis)
/// + Driver link `l2` (`r2`), pivot A at the origin
/// + Coupler link `l3` (`r3`)
/// + Follower link `l4` (`r4`), pivot D at `(l1, 0)`
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq, Default)]
pub struct FourBar {
    /// Length of the ground link
    pub l1: f64,
    /// Length of the driver link
    pub l2: f64,
    /// Length of the coupler link
    pub l3: f64,
    /// Length of the follower link
    pub l4: f64,
}

impl FourBar {
    /// Create a linkage from the loop `[l1, l2, l3, l4]`.
    pub const fn new([l1, l2, l3, l4]: [f64; 4]) -> Self {
        Self { l1, l2, l3, l4 }
    }

    /// Derive the link lengths from Freudenstein's coefficients, `l1 = 1`.
    ///
    /// Lengths can be negative, they are checked by the
    /// [`validity`](crate::validity) filter.
    pub fn from_coef(k: &FreudensteinCoef) -> Result<Self, Reject> {
        if k.k1.abs() < COEF_EPS || k.k2.abs() < COEF_EPS {
            return Err(Reject::Coefficient);
        }
        let l1 = 1.;
        let l4 = l1 / k.k1;
        let l2 = l1 / k.k2;
        let l3 = coupler(l1, l2, l4, k.k3).ok_or(Reject::NoRealCoupler)?;
        Ok(Self { l1, l2, l3, l4 })
    }

    /// Get the planar loop `[l1, l2, l3, l4]`.
    pub const fn planar_loop(&self) -> [f64; 4] {
        [self.l1, self.l2, self.l3, self.l4]
    }

    /// Return the type of this linkage.
    pub fn ty(&self) -> FourBarTy {
        FourBarTy::from_loop(self.planar_loop())
    }

    /// Difference between the longest and the shortest link.
    pub fn range(&self) -> f64 {
        let [s, .., l] = sorted(self.planar_loop());
        l - s
    }

    /// Length of the longest link.
    pub fn max_len(&self) -> f64 {
        sorted(self.planar_loop())[3]
    }

    /// Distance between the driver tip B and the follower pivot D at input
    /// angle `t`.
    pub fn diagonal(&self, t: f64) -> f64 {
        let Self { l1, l2, .. } = *self;
        (l1 * l1 + l2 * l2 - 2. * l1 * l2 * t.cos()).max(0.).sqrt()
    }

    /// Joint positions `[A, B, C, D]` at input angle `t`.
    ///
    /// Return `None` if the loop cannot close.
    pub fn pos(&self, t: f64) -> Option<[[f64; 2]; 4]> {
        let Self { l1, l2, l3, l4 } = *self;
        let p1 = [0., 0.];
        let p2 = [l2 * t.cos(), l2 * t.sin()];
        let p4 = [l1, 0.];
        let d = self.diagonal(t);
        if d < f64::EPSILON {
            return None;
        }
        // Triangle ABD always exists
        let a1 = ((l1 * l1 + d * d - l2 * l2) / (2. * l1 * d)).clamp(-1., 1.).acos();
        let a1 = if p2[1] < 0. { -a1 } else { a1 };
        let a2 = ((l4 * l4 + d * d - l3 * l3) / (2. * l4 * d)).acos();
        let a = a1 + a2;
        let p3 = [l1 - l4 * a.cos(), l4 * a.sin()];
        let js = [p1, p2, p3, p4];
        js.iter().flatten().all(|x| x.is_finite()).then_some(js)
    }

    /// Joint positions from `start` to `start + rot` in `res` steps.
    ///
    /// Stop at the first position where the loop cannot close.
    pub fn trace(&self, start: f64, rot: f64, res: usize) -> Vec<[[f64; 2]; 4]> {
        let step = if res == 0 { 0. } else { rot / res as f64 };
        (0..=res)
            .map(|n| start + n as f64 * step)
            .map_while(|t| self.pos(t))
            .collect()
    }
}

// The larger root of `l3² = l1² + l2² + l4² - 2 l2 l4 K3`
fn coupler(l1: f64, l2: f64, l4: f64, k3: f64) -> Option<f64> {
    let l3_2 = l1 * l1 + l2 * l2 + l4 * l4 - 2. * l2 * l4 * k3;
    (l3_2.is_finite() && l3_2 >= 0.).then(|| l3_2.sqrt())
}
